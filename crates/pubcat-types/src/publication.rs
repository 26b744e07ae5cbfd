//! Publication record types.
//!
//! A `Publication` is the canonical record held by the record store.
//! A `NewPublication` is the partial form accepted on create: it never
//! carries an identifier, the identifier is minted when it is promoted.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::CatalogError;

/// A stored publication.
///
/// The `id` is serialized as `_id` and is the join key between the record
/// store and the search index copy of the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Unique identifier (ULID string), immutable once assigned
    #[serde(rename = "_id")]
    pub id: String,

    /// Title, analyzed for search
    pub title: String,

    /// Optional numeric rank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<f64>,

    /// Ordered author names
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication date
    pub date: DateTime<Utc>,

    /// Free-form body, analyzed for search
    #[serde(default)]
    pub text: String,
}

impl Publication {
    /// Serialize to JSON bytes for storage
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Date as milliseconds since Unix epoch
    pub fn date_ms(&self) -> i64 {
        self.date.timestamp_millis()
    }
}

/// Partial publication accepted by the create operation.
///
/// Any `_id` in the incoming JSON is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPublication {
    pub title: String,

    #[serde(default)]
    pub rank: Option<f64>,

    #[serde(default)]
    pub authors: Vec<String>,

    /// Defaults to the creation time when absent
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub text: String,
}

impl NewPublication {
    /// Draft with only a title set.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_rank(mut self, rank: f64) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Check field constraints.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::InvalidInput("title is required".into()));
        }
        if let Some(rank) = self.rank {
            if !rank.is_finite() {
                return Err(CatalogError::InvalidInput(format!(
                    "rank must be a finite number, got {}",
                    rank
                )));
            }
        }
        if self.authors.iter().any(|a| a.trim().is_empty()) {
            return Err(CatalogError::InvalidInput(
                "author names must not be blank".into(),
            ));
        }
        Ok(())
    }

    /// Validate and promote to a full record with a freshly minted id.
    pub fn into_publication(self) -> Result<Publication, CatalogError> {
        self.into_publication_at(new_publication_id(), Utc::now())
    }

    /// Validate and promote with an explicit id and creation time.
    ///
    /// The date is truncated to milliseconds, the precision the search
    /// index keeps, so both copies of a record carry the same date.
    pub fn into_publication_at(
        self,
        id: String,
        now: DateTime<Utc>,
    ) -> Result<Publication, CatalogError> {
        self.validate()?;
        Ok(Publication {
            id,
            title: self.title,
            rank: self.rank,
            authors: self.authors,
            date: self.date.unwrap_or(now).trunc_subsecs(3),
            text: self.text,
        })
    }
}

/// Mint a new publication identifier.
pub fn new_publication_id() -> String {
    Ulid::new().to_string()
}

/// The sample record stored at startup when seeding is enabled.
pub fn sample_publication() -> NewPublication {
    NewPublication::titled("Sample Publication")
        .with_rank(1.0)
        .with_author("John Doe")
        .with_date(Utc::now())
        .with_text("Sample Publication Text")
}
