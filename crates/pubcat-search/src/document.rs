//! Document mapping between publications and Tantivy documents.

use chrono::DateTime;
use tantivy::schema::Value;
use tantivy::TantivyDocument;

use pubcat_types::Publication;

use crate::error::SearchError;
use crate::schema::PublicationSchema;

/// Convert a publication to a Tantivy document.
///
/// Authors become one value each; rank is omitted when absent.
pub fn publication_to_doc(schema: &PublicationSchema, publication: &Publication) -> TantivyDocument {
    let mut doc = TantivyDocument::default();
    doc.add_text(schema.doc_id, &publication.id);
    doc.add_text(schema.title, &publication.title);
    for author in &publication.authors {
        doc.add_text(schema.authors, author);
    }
    doc.add_text(schema.text, &publication.text);
    if let Some(rank) = publication.rank {
        doc.add_f64(schema.rank, rank);
    }
    doc.add_i64(schema.date_ms, publication.date_ms());
    doc
}

/// Rebuild a publication from a stored document.
pub fn doc_to_publication(
    schema: &PublicationSchema,
    doc: &TantivyDocument,
) -> Result<Publication, SearchError> {
    let id = doc
        .get_first(schema.doc_id)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| SearchError::InvalidDocument("missing doc_id".into()))?;

    let title = doc
        .get_first(schema.title)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let authors = doc
        .get_all(schema.authors)
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect();

    let text = doc
        .get_first(schema.text)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let rank = doc.get_first(schema.rank).and_then(|v| v.as_f64());

    let date_ms = doc
        .get_first(schema.date_ms)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| SearchError::InvalidDocument(format!("{}: missing date_ms", id)))?;
    let date = DateTime::from_timestamp_millis(date_ms)
        .ok_or_else(|| SearchError::InvalidDocument(format!("{}: date out of range", id)))?;

    Ok(Publication {
        id,
        title,
        rank,
        authors,
        date,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build_publication_schema;
    use chrono::{TimeZone, Utc};
    use pubcat_types::NewPublication;

    fn sample() -> Publication {
        NewPublication::titled("Ownership in Practice")
            .with_text("Borrowing rules explained")
            .with_author("Jane Roe")
            .with_author("John Doe")
            .with_rank(4.5)
            .into_publication_at(
                "01HN4QXKN6YWXVKZ3JMHP4BCDE".into(),
                Utc.with_ymd_and_hms(2023, 2, 1, 12, 30, 0).unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn test_publication_to_doc() {
        let schema = build_publication_schema();
        let doc = publication_to_doc(&schema, &sample());

        let doc_id = doc.get_first(schema.doc_id).and_then(|v| v.as_str());
        assert_eq!(doc_id, Some("01HN4QXKN6YWXVKZ3JMHP4BCDE"));
        assert_eq!(doc.get_all(schema.authors).count(), 2);
        assert_eq!(doc.get_first(schema.rank).and_then(|v| v.as_f64()), Some(4.5));
    }

    #[test]
    fn test_doc_back_to_publication() {
        let schema = build_publication_schema();
        let original = sample();
        let doc = publication_to_doc(&schema, &original);

        let rebuilt = doc_to_publication(&schema, &doc).unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_minted_publication_survives_index_roundtrip() {
        let schema = build_publication_schema();
        let minted = NewPublication::titled("Created now")
            .with_text("Dated by the server")
            .into_publication()
            .unwrap();

        let rebuilt = doc_to_publication(&schema, &publication_to_doc(&schema, &minted)).unwrap();
        assert_eq!(rebuilt, minted);
    }

    #[test]
    fn test_unranked_publication_omits_rank() {
        let schema = build_publication_schema();
        let mut publication = sample();
        publication.rank = None;

        let doc = publication_to_doc(&schema, &publication);
        assert!(doc.get_first(schema.rank).is_none());
        assert_eq!(doc_to_publication(&schema, &doc).unwrap().rank, None);
    }

    #[test]
    fn test_doc_without_id_is_invalid() {
        let schema = build_publication_schema();
        let doc = TantivyDocument::default();
        let err = doc_to_publication(&schema, &doc).unwrap_err();
        assert!(matches!(err, SearchError::InvalidDocument(_)));
    }
}
