// src/ident.rs
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Derive the stable identifier for an item from its GUID.
///
/// BLAKE2b-256 over the GUID bytes, rendered as lowercase hex. The same GUID
/// yields the same identifier across restarts, which is what lets the dedup
/// store survive process churn and downstream sinks stay idempotent on key.
pub fn identifier(guid: &str) -> String {
    let mut hasher = Blake2b256::new();
    hasher.update(guid.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_is_deterministic() {
        assert_eq!(identifier("abc"), identifier("abc"));
    }

    #[test]
    fn identifier_is_64_lowercase_hex_chars() {
        let id = identifier("https://example.com/posts/1");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn distinct_guids_get_distinct_identifiers() {
        assert_ne!(identifier("abc"), identifier("abd"));
        assert_ne!(identifier(""), identifier(" "));
    }
}
