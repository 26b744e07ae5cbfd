//! Helpers over an in-memory list of publications.

use chrono::{DateTime, Utc};

use crate::publication::Publication;

/// Mean rank of the ranked publications, `None` when none are ranked.
pub fn average_rank(publications: &[Publication]) -> Option<f64> {
    let ranks: Vec<f64> = publications.iter().filter_map(|p| p.rank).collect();
    if ranks.is_empty() {
        return None;
    }
    Some(ranks.iter().sum::<f64>() / ranks.len() as f64)
}

/// Publications listing `author` (exact name match).
pub fn by_author<'a>(publications: &'a [Publication], author: &str) -> Vec<&'a Publication> {
    publications
        .iter()
        .filter(|p| p.authors.iter().any(|a| a == author))
        .collect()
}

/// Publications dated on or after `cutoff`.
pub fn since(publications: &[Publication], cutoff: DateTime<Utc>) -> Vec<&Publication> {
    publications.iter().filter(|p| p.date >= cutoff).collect()
}
