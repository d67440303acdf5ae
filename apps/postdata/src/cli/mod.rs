//! # POSTDATA CLI Module
//!
//! This module implements the CLI interface for the POSTDATA service.
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server (default)
//! - `poems` - List the poems of the corpus
//! - `poem` - Show the metadata of a poem
//! - `analysis` - Show the metrical analysis of a poem
//! - `id` - Print the short identifier of a poem URI
//! - `queries` - List the query catalog
//! - `query` - Run one catalog query and print the normalized rows
//!
//! Store and service settings come from flags, their `PD_*` / `SERVICE_*`
//! environment variables, and an optional TOML file (`--config`).

mod commands;

use clap::{Args, Parser, Subcommand};
use postdata_core::{Datatype, PostdataError};
use std::path::PathBuf;

use crate::config::{Config, ConfigLayer, ServiceLayer, StoreLayer};

pub use commands::*;

/// Default bind address of `serve`.
const DEFAULT_BIND_HOST: &str = "0.0.0.0";

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// POSTDATA 2 DraCor API
///
/// Poem metadata and metrical analysis from the POSTDATA knowledge graph.
#[derive(Parser, Debug)]
#[command(name = "postdata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress the startup summary of `serve`
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// TOML configuration file
    #[arg(short, long, global = true, env = "POSTDATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Answer queries from a JSON fixture file instead of the triple store
    #[arg(long, global = true, env = "POSTDATA_FIXTURES")]
    pub fixtures: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Triple store connection flags.
///
/// Store and service flags are global, so their ids carry a prefix to stay
/// apart from each other and from subcommand arguments.
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// Triple store product
    #[arg(id = "store_triplestore", long = "triplestore", global = true, env = "PD_TRIPLESTORE")]
    pub triplestore: Option<String>,

    /// Protocol of the store endpoint (http, https)
    #[arg(id = "store_protocol", long = "protocol", global = true, env = "PD_PROTOCOL")]
    pub protocol: Option<String>,

    /// Host of the store
    #[arg(id = "store_host", long = "store-host", global = true, env = "PD_URL")]
    pub host: Option<String>,

    /// Port of the store
    #[arg(id = "store_port", long = "store-port", global = true, env = "PD_PORT")]
    pub port: Option<u16>,

    /// Database holding the knowledge graph
    #[arg(id = "store_database", long = "database", global = true, env = "PD_DATABASE")]
    pub database: Option<String>,

    /// Store user
    #[arg(id = "store_user", long = "user", global = true, env = "PD_USER")]
    pub user: Option<String>,

    /// Store password
    #[arg(
        id = "store_password",
        long = "password",
        global = true,
        env = "PD_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,
}

/// Service flags.
#[derive(Args, Debug, Default)]
pub struct ServiceArgs {
    /// Version reported by `/info`
    #[arg(
        id = "service_version",
        long = "service-version",
        global = true,
        env = "SERVICE_VERSION"
    )]
    pub version: Option<String>,

    /// Default port of `serve`
    #[arg(
        id = "service_port",
        long = "service-port",
        global = true,
        env = "SERVICE_PORT"
    )]
    pub port: Option<u16>,

    /// Requests per second accepted by the server (0 disables limiting)
    #[arg(
        id = "service_rate_limit",
        long = "rate-limit",
        global = true,
        env = "POSTDATA_RATE_LIMIT"
    )]
    pub rate_limit: Option<u32>,

    /// Base URL of the Poetry Lab frontend
    #[arg(
        id = "service_poetry_lab_url",
        long = "poetry-lab-url",
        global = true,
        env = "POETRY_LAB_URL"
    )]
    pub poetry_lab_url: Option<String>,

    /// Language segment of Poetry Lab links
    #[arg(
        id = "service_poetry_lab_lang",
        long = "poetry-lab-lang",
        global = true,
        env = "POETRY_LAB_LANG"
    )]
    pub poetry_lab_lang: Option<String>,
}

impl Cli {
    /// The command-line configuration layer.
    #[must_use]
    pub fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            store: StoreLayer {
                triplestore: self.store.triplestore.clone(),
                protocol: self.store.protocol.clone(),
                host: self.store.host.clone(),
                port: self.store.port,
                database: self.store.database.clone(),
                user: self.store.user.clone(),
                password: self.store.password.clone(),
            },
            service: ServiceLayer {
                version: self.service.version.clone(),
                port: self.service.port,
                rate_limit: self.service.rate_limit,
                poetry_lab_url: self.service.poetry_lab_url.clone(),
                poetry_lab_lang: self.service.poetry_lab_lang.clone(),
            },
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = DEFAULT_BIND_HOST)]
        host: String,

        /// Port to bind to (default: the service port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the poems of the corpus
    Poems,

    /// Show the metadata of a poem
    Poem {
        /// Poem URI
        uri: String,

        /// Include author metadata
        #[arg(short, long)]
        authors: bool,

        /// Include the metrical analysis
        #[arg(long)]
        analysis: bool,
    },

    /// Show the metrical analysis of a poem
    Analysis {
        /// Poem URI
        uri: String,
    },

    /// Print the short identifier of a poem URI
    Id {
        /// Poem URI
        uri: String,
    },

    /// List the query catalog
    Queries,

    /// Run one catalog query and print the normalized rows
    Query {
        /// Query name (see `queries`)
        name: String,

        /// Positional query parameters
        params: Vec<String>,

        /// Field coercion as `field=flag` (flags: int, str)
        #[arg(short = 't', long = "type", value_parser = parse_field_type)]
        types: Vec<(String, Datatype)>,
    },
}

/// Parse a `field=flag` coercion.
fn parse_field_type(arg: &str) -> Result<(String, Datatype), PostdataError> {
    let (field, flag) = arg
        .split_once('=')
        .ok_or_else(|| PostdataError::InvalidDatatypeFlag(arg.to_string()))?;
    Ok((field.to_string(), flag.parse()?))
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), PostdataError> {
    let config = Config::load(cli.config.as_deref(), cli.config_layer())?;
    let fixtures = cli.fixtures;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            cmd_serve(config, fixtures, &host, port, cli.quiet).await
        }
        Some(Commands::Poems) => cmd_poems(config, fixtures).await,
        Some(Commands::Poem {
            uri,
            authors,
            analysis,
        }) => cmd_poem(config, fixtures, uri, authors, analysis).await,
        Some(Commands::Analysis { uri }) => cmd_analysis(config, fixtures, uri).await,
        Some(Commands::Id { uri }) => cmd_id(&uri),
        Some(Commands::Queries) => cmd_queries(),
        Some(Commands::Query {
            name,
            params,
            types,
        }) => cmd_query(config, fixtures, name, params, types).await,
        None => {
            // No subcommand - serve by default
            cmd_serve(config, fixtures, DEFAULT_BIND_HOST, None, cli.quiet).await
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_field_types() {
        let (field, datatype) = parse_field_type("count=int").expect("parse");
        assert_eq!(field, "count");
        assert_eq!(datatype, Datatype::Int);

        assert!(matches!(
            parse_field_type("count=float"),
            Err(PostdataError::InvalidDatatypeFlag(_))
        ));
        assert!(matches!(
            parse_field_type("count"),
            Err(PostdataError::InvalidDatatypeFlag(_))
        ));
    }

    #[test]
    fn query_command_collects_types() {
        let cli = Cli::try_parse_from([
            "postdata",
            "query",
            "PoemCountStanzas",
            "http://postdata.linhd.uned.es/resource/pw_a_b",
            "--type",
            "count=int",
        ])
        .expect("parse");

        assert!(matches!(
            cli.command,
            Some(Commands::Query { ref name, ref params, ref types })
                if name == "PoemCountStanzas"
                    && params.len() == 1
                    && *types == vec![("count".to_string(), Datatype::Int)]
        ));
    }

    #[test]
    fn store_and_service_ports_stay_apart() {
        let cli = Cli::try_parse_from([
            "postdata",
            "--store-port",
            "5821",
            "--service-port",
            "6000",
            "--service-version",
            "2.1",
            "--rate-limit",
            "0",
            "serve",
            "--port",
            "8000",
        ])
        .expect("parse");

        let layer = cli.config_layer();
        assert_eq!(layer.store.port, Some(5821));
        assert_eq!(layer.service.port, Some(6000));
        assert_eq!(layer.service.version.as_deref(), Some("2.1"));
        assert_eq!(layer.service.rate_limit, Some(0));
        assert!(matches!(
            cli.command,
            Some(Commands::Serve { port: Some(8000), .. })
        ));
    }

    #[test]
    fn version_flag_is_not_shadowed() {
        let error = Cli::try_parse_from(["postdata", "--version"]).expect_err("version exits");
        assert_eq!(error.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn store_flags_become_a_config_layer() {
        let cli = Cli::try_parse_from([
            "postdata",
            "--store-host",
            "stardog.internal",
            "--store-port",
            "5821",
            "poems",
        ])
        .expect("parse");

        let layer = cli.config_layer();
        assert_eq!(layer.store.host.as_deref(), Some("stardog.internal"));
        assert_eq!(layer.store.port, Some(5821));
    }
}
