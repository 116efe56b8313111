//! Textual encoding of a note's source list.
//!
//! Sources are persisted as a JSON array of strings in a single text column.
//! Decoding is lenient: an absent, empty, or corrupt value reads back as an
//! empty list so one bad column never fails the whole record.

use tracing::warn;

use crate::error::Result;

/// Encode a source list for storage.
pub fn encode_sources(sources: &[String]) -> Result<String> {
    Ok(serde_json::to_string(sources)?)
}

/// Decode a stored source list, degrading to empty on any defect.
pub fn decode_sources(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(sources) => sources,
        Err(e) => {
            warn!(
                subsystem = "core",
                component = "sources",
                error = %e,
                raw_len = raw.len(),
                "Stored sources are not a JSON string array, reading as empty"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(sources: Vec<String>) -> Vec<String> {
        let encoded = encode_sources(&sources).unwrap();
        decode_sources(Some(&encoded))
    }

    #[test]
    fn test_roundtrip_preserves_order_and_content() {
        let sources = vec![
            "https://b.example/report".to_string(),
            "https://a.example/vote?id=1&x=\"q\"".to_string(),
            "Congressional Record, p. 12 (ünïcode)".to_string(),
        ];
        assert_eq!(roundtrip(sources.clone()), sources);
    }

    #[test]
    fn test_empty_list_is_symmetric() {
        let encoded = encode_sources(&[]).unwrap();
        assert_eq!(encoded, "[]");
        assert!(decode_sources(Some(&encoded)).is_empty());
    }

    #[test]
    fn test_duplicates_survive_roundtrip() {
        let sources = vec!["same".to_string(), "same".to_string()];
        assert_eq!(roundtrip(sources.clone()), sources);
    }

    #[test]
    fn test_absent_value_reads_empty() {
        assert!(decode_sources(None).is_empty());
        assert!(decode_sources(Some("")).is_empty());
        assert!(decode_sources(Some("   ")).is_empty());
    }

    #[test]
    fn test_corrupt_value_reads_empty() {
        assert!(decode_sources(Some("not json")).is_empty());
        assert!(decode_sources(Some("[\"unterminated")).is_empty());
        assert!(decode_sources(Some("{\"a\": 1}")).is_empty());
        assert!(decode_sources(Some("[1, 2, 3]")).is_empty());
        assert!(decode_sources(Some("null")).is_empty());
    }
}
