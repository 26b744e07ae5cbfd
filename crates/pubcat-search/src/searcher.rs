//! Search implementation using BM25 scoring.
//!
//! Query text is plain text, never query syntax. It is split with each
//! field's own analyzer and every resulting term is OR-ed over title and
//! text, so operators, field prefixes and quotes are just words.

use std::collections::HashSet;

use tantivy::collector::{Count, TopDocs};
use tantivy::query::{AllQuery, BooleanQuery, EmptyQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, IndexReader, TantivyDocument, Term};
use tracing::debug;

use pubcat_types::Publication;

use crate::document::doc_to_publication;
use crate::error::SearchError;
use crate::index::SearchIndex;
use crate::schema::PublicationSchema;

/// Searcher for publication queries using BM25 ranking.
pub struct PublicationSearcher {
    index: Index,
    reader: IndexReader,
    schema: PublicationSchema,
}

impl PublicationSearcher {
    /// Create a new searcher from a SearchIndex.
    pub fn new(index: &SearchIndex) -> Result<Self, SearchError> {
        let reader = index.reader()?;
        let schema = index.schema().clone();

        Ok(Self {
            index: index.index().clone(),
            reader,
            schema,
        })
    }

    /// Reload the reader to see recent commits.
    pub fn reload(&self) -> Result<(), SearchError> {
        self.reader.reload()?;
        debug!("Reloaded search reader");
        Ok(())
    }

    /// Search with a query string.
    ///
    /// An empty or whitespace-only query matches every document.
    pub fn search(&self, query_str: &str, limit: usize) -> Result<Vec<Publication>, SearchError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = self.build_query(query_str)?;
        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;
            results.push(doc_to_publication(&self.schema, &doc)?);
        }

        debug!(
            query = query_str,
            results = results.len(),
            "Publication search complete"
        );

        Ok(results)
    }

    /// Whether a live document with this id is visible to the reader.
    pub fn contains(&self, id: &str) -> Result<bool, SearchError> {
        let term = Term::from_field_text(self.schema.doc_id, id);
        let query = TermQuery::new(term, IndexRecordOption::Basic);
        let hits = self.reader.searcher().search(&query, &Count)?;
        Ok(hits > 0)
    }

    /// Get the number of indexed documents.
    pub fn num_docs(&self) -> u64 {
        let searcher = self.reader.searcher();
        searcher
            .segment_readers()
            .iter()
            .map(|r| r.num_docs() as u64)
            .sum()
    }

    fn build_query(&self, query_str: &str) -> Result<Box<dyn Query>, SearchError> {
        if query_str.trim().is_empty() {
            return Ok(Box::new(AllQuery));
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for field in [self.schema.title, self.schema.text] {
            for token in self.field_terms(field, query_str)? {
                let term = Term::from_field_text(field, &token);
                clauses.push((
                    Occur::Should,
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)),
                ));
            }
        }

        if clauses.is_empty() {
            debug!(query = query_str, "Query has no searchable terms");
            return Ok(Box::new(EmptyQuery));
        }
        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    /// Distinct terms of `text` as the field's analyzer indexes them.
    fn field_terms(&self, field: Field, text: &str) -> Result<Vec<String>, SearchError> {
        let mut analyzer = self.index.tokenizer_for_field(field)?;
        let mut stream = analyzer.token_stream(text);
        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        while stream.advance() {
            let token = stream.token().text.clone();
            if seen.insert(token.clone()) {
                terms.push(token);
            }
        }
        Ok(terms)
    }
}
