use serde::{Deserialize, Serialize};

use lotostat_db::models::DIGIT_ALPHABET;

use crate::error::{EngineError, Result};

/// Bucket columns of the multi-period table: counts 0 through 10.
pub const CHAIN_BUCKETS: u32 = 11;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Digits `0..alphabet_size` are counted; anything else in a row is ignored.
    pub alphabet_size: u8,
    /// Suffix appended to a digit label that also shows up in the next draw.
    pub marker: String,
    /// Joins several digit labels inside one table cell.
    pub separator: String,
    pub chain_buckets: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alphabet_size: DIGIT_ALPHABET,
            marker: "$".to_string(),
            separator: ", ".to_string(),
            chain_buckets: CHAIN_BUCKETS,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.alphabet_size == 0 {
            return Err(EngineError::InvalidArgument {
                name: "alphabet_size",
                reason: "must be positive",
            });
        }
        if self.chain_buckets == 0 {
            return Err(EngineError::InvalidArgument {
                name: "chain_buckets",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.alphabet_size, 10);
        assert_eq!(config.marker, "$");
        assert_eq!(config.chain_buckets, 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"marker": "*"}"#).unwrap();
        assert_eq!(config.marker, "*");
        assert_eq!(config.alphabet_size, 10);
        assert_eq!(config.separator, ", ");
    }

    #[test]
    fn test_validate_rejects_empty_alphabet() {
        let config = EngineConfig {
            alphabet_size: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidArgument { name: "alphabet_size", .. })
        ));
    }
}
