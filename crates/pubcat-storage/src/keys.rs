//! Key encoding for the record store.
//!
//! Key format: `pub:{id}`. Ids are ULIDs, so byte order of keys is also
//! creation order for records minted by this service.

use crate::error::StorageError;

const PUBLICATION_PREFIX: &str = "pub:";

/// Key for publication storage
/// Format: pub:{id}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationKey {
    pub id: String,
}

impl PublicationKey {
    pub fn new(id: impl Into<String>) -> Result<Self, StorageError> {
        let id = id.into();
        if id.is_empty() {
            return Err(StorageError::Key("publication id must not be empty".into()));
        }
        Ok(Self { id })
    }

    /// Encode key to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}{}", PUBLICATION_PREFIX, self.id).into_bytes()
    }

    /// Prefix shared by every publication key
    pub fn prefix() -> &'static [u8] {
        PUBLICATION_PREFIX.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publication_key_encoding() {
        let key = PublicationKey::new("01HN4QXKN6YWXVKZ3JMHP4BCDE").unwrap();
        assert_eq!(key.to_bytes(), b"pub:01HN4QXKN6YWXVKZ3JMHP4BCDE".to_vec());
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(PublicationKey::new("").is_err());
    }

    #[test]
    fn test_keys_sort_by_id() {
        let a = PublicationKey::new("01A").unwrap();
        let b = PublicationKey::new("01B").unwrap();
        assert!(a.to_bytes() < b.to_bytes());
        assert!(a.to_bytes().starts_with(PublicationKey::prefix()));
    }
}
