//! # postdata
//!
//! The POSTDATA 2 DraCor API application: HTTP server, CLI and the Stardog
//! adapter around `postdata-core`.

pub mod api;
pub mod cli;
pub mod config;
pub mod stardog;
