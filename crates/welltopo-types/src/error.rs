//! Unified error type for the welltopo crates.
//!
//! The resolver pipeline itself never fails: bad rows are filtered or warned
//! about (see the warning catalog). `TopologyError` covers only the genuinely
//! fallible surface — decoding a loosely-typed configuration document and
//! validating option values.

/// Unified error type for all welltopo subsystems.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Invalid option '{option}': {message}")]
    InvalidOption { option: String, message: String },
}

/// A convenience alias for `Result<T, TopologyError>`.
pub type Result<T> = std::result::Result<T, TopologyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_configuration() {
        let err = TopologyError::InvalidConfiguration {
            message: "casing table is not an array".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: casing table is not an array"
        );
    }

    #[test]
    fn error_display_invalid_option() {
        let err = TopologyError::InvalidOption {
            option: "crossover_epsilon".into(),
            message: "must be finite and non-negative".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid option 'crossover_epsilon': must be finite and non-negative"
        );
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: TopologyError = json_err.into();
        assert!(matches!(err, TopologyError::Json(_)));
    }

    #[test]
    fn result_alias_works() {
        fn example() -> Result<u32> {
            Ok(7)
        }
        assert_eq!(example().unwrap(), 7);
    }
}
