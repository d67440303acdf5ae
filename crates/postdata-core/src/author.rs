//! # Author
//!
//! Authors are resolved from the URIs a poem lists. The poem never interprets
//! author data itself; it only constructs one [`Author`] per URI.

use serde::Serialize;
use std::cell::OnceCell;

use crate::PostdataError;
use crate::catalog::AUTHOR_NAME;
use crate::executor::{QueryExecutor, execute};
use crate::identifiers::shorthash;
use crate::results::at_most_one;

/// Serializable author metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorMetadata {
    pub id: String,
    pub uri: String,
    pub name: Option<String>,
}

/// An author, resolved lazily against the shared executor.
#[derive(Debug)]
pub struct Author<'db, E: QueryExecutor + ?Sized> {
    uri: String,
    id: String,
    database: &'db E,
    name: OnceCell<Option<String>>,
}

impl<'db, E: QueryExecutor + ?Sized> Author<'db, E> {
    pub fn new(uri: impl Into<String>, database: &'db E) -> Self {
        let uri = uri.into();
        Self {
            id: shorthash(&uri),
            uri,
            database,
            name: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the author; `None` when the graph has none.
    pub fn get_name(&self) -> Result<Option<&str>, PostdataError> {
        if let Some(name) = self.name.get() {
            return Ok(name.as_deref());
        }
        let outcome = execute(self.database, AUTHOR_NAME.bind(&[self.uri.as_str()])?)?;
        let name = at_most_one(outcome.results.strings()?, "name")?;
        Ok(self.name.get_or_init(|| name).as_deref())
    }

    pub fn get_metadata(&self) -> Result<AuthorMetadata, PostdataError> {
        Ok(AuthorMetadata {
            id: self.id.clone(),
            uri: self.uri.clone(),
            name: self.get_name()?.map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::InMemoryExecutor;
    use crate::results::ResultSet;

    const URI: &str = "http://postdata.linhd.uned.es/resource/p_juana-ines-de-la-cruz";

    #[test]
    fn metadata_carries_short_id_and_name() {
        let db = InMemoryExecutor::new().with_result(
            "AuthorName",
            ResultSet::column("name", ["Juana Inés de la Cruz"]),
        );
        let author = Author::new(URI, &db);
        let meta = author.get_metadata().expect("metadata");
        assert_eq!(meta.id, "8a359667");
        assert_eq!(meta.name.as_deref(), Some("Juana Inés de la Cruz"));
    }

    #[test]
    fn name_is_queried_once() {
        let db = InMemoryExecutor::new().with_result("AuthorName", ResultSet::column("name", ["A"]));
        let author = Author::new(URI, &db);
        author.get_name().expect("first");
        author.get_name().expect("second");
        assert_eq!(db.executions(), 1);
    }

    #[test]
    fn missing_name_is_none() {
        let db = InMemoryExecutor::new().with_result("AuthorName", ResultSet::default());
        let author = Author::new(URI, &db);
        assert_eq!(author.get_name().expect("name"), None);
    }

    #[test]
    fn two_names_are_an_error() {
        let db = InMemoryExecutor::new()
            .with_result("AuthorName", ResultSet::column("name", ["A", "B"]));
        let author = Author::new(URI, &db);
        assert!(matches!(
            author.get_metadata(),
            Err(PostdataError::MultipleValues { count: 2, .. })
        ));
    }
}
