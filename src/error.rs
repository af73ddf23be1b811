// ============================================================================
// spark-selection - Errors
// ============================================================================
//
// Selection mutators and reads are total; only snapshot JSON encoding and
// decoding can fail.
// ============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode {what} as JSON: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {what} from JSON: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_the_payload() {
        let source = serde_json::from_str::<u8>("not json").unwrap_err();
        let err = SnapshotError::Decode {
            what: "selection snapshot",
            source,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("failed to decode selection snapshot from JSON"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
