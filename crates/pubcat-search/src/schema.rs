//! Tantivy schema definition for publications.
//!
//! Every field is stored so a hit can be turned back into a full
//! publication without a round trip to the record store.

use tantivy::schema::{Field, Schema, STORED, STRING, TEXT};

use crate::SearchError;

/// Schema field handles for efficient access
#[derive(Debug, Clone)]
pub struct PublicationSchema {
    schema: Schema,
    /// Primary key: publication id (STRING | STORED)
    pub doc_id: Field,
    /// Title (TEXT | STORED)
    pub title: Field,
    /// Author names, one value per author (TEXT | STORED)
    pub authors: Field,
    /// Body text (TEXT | STORED)
    pub text: Field,
    /// Optional rank (f64, STORED)
    pub rank: Field,
    /// Publication date in milliseconds (i64, STORED)
    pub date_ms: Field,
}

impl PublicationSchema {
    /// Get the underlying Tantivy schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Create a PublicationSchema from an existing Tantivy Schema
    pub fn from_schema(schema: Schema) -> Result<Self, SearchError> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| SearchError::SchemaMismatch(format!("missing {} field", name)))
        };

        Ok(Self {
            doc_id: field("doc_id")?,
            title: field("title")?,
            authors: field("authors")?,
            text: field("text")?,
            rank: field("rank")?,
            date_ms: field("date_ms")?,
            schema,
        })
    }
}

/// Build the publication schema.
///
/// Schema fields:
/// - doc_id: STRING | STORED - exact-match key, never tokenized
/// - title: TEXT | STORED - analyzed for search
/// - authors: TEXT | STORED - multi-valued
/// - text: TEXT | STORED - analyzed for search
/// - rank: f64 STORED
/// - date_ms: i64 STORED
pub fn build_publication_schema() -> PublicationSchema {
    let mut schema_builder = Schema::builder();

    let doc_id = schema_builder.add_text_field("doc_id", STRING | STORED);
    let title = schema_builder.add_text_field("title", TEXT | STORED);
    let authors = schema_builder.add_text_field("authors", TEXT | STORED);
    let text = schema_builder.add_text_field("text", TEXT | STORED);
    let rank = schema_builder.add_f64_field("rank", STORED);
    let date_ms = schema_builder.add_i64_field("date_ms", STORED);

    let schema = schema_builder.build();

    PublicationSchema {
        schema,
        doc_id,
        title,
        authors,
        text,
        rank,
        date_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_schema() {
        let schema = build_publication_schema();
        for name in ["doc_id", "title", "authors", "text", "rank", "date_ms"] {
            assert!(schema.schema().get_field(name).is_ok(), "missing {}", name);
        }
    }

    #[test]
    fn test_from_schema() {
        let original = build_publication_schema();
        let rebuilt = PublicationSchema::from_schema(original.schema().clone()).unwrap();
        assert_eq!(rebuilt.doc_id, original.doc_id);
        assert_eq!(rebuilt.title, original.title);
        assert_eq!(rebuilt.date_ms, original.date_ms);
    }

    #[test]
    fn test_from_foreign_schema_fails() {
        let mut builder = Schema::builder();
        builder.add_text_field("doc_id", STRING | STORED);
        let err = PublicationSchema::from_schema(builder.build()).unwrap_err();
        assert!(matches!(err, SearchError::SchemaMismatch(_)));
    }
}
