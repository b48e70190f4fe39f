//! Error types for Tapstreak
//!
//! The game core itself is total; these cover the edges around it:
//! loading configuration, touching the highest-streak store, and talking
//! to a feature that has already been torn down.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TapStreakError>;

#[derive(Error, Debug)]
pub enum TapStreakError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Game feature is no longer running")]
    FeatureClosed,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TapStreakError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            TapStreakError::InvalidInput(_) => 3,
            TapStreakError::Config(_) => 2,
            TapStreakError::Storage(_) => 1,
            TapStreakError::FeatureClosed => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt highest-streak file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = TapStreakError::InvalidInput("press needs two coordinates".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_config_error() {
        let error = TapStreakError::Config(ConfigError::Invalid("board.size".to_string()));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_storage_error() {
        let storage_error = StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        let error = TapStreakError::Storage(storage_error);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_feature_closed() {
        assert_eq!(TapStreakError::FeatureClosed.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_config() {
        let error = TapStreakError::Config(ConfigError::Invalid("difficulty.size.divisor".to_string()));
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid value for difficulty.size.divisor"
        );
    }

    #[test]
    fn test_error_message_formatting_missing_field() {
        let error = TapStreakError::Config(ConfigError::MissingField("config directory".to_string()));
        assert_eq!(
            error.to_string(),
            "Configuration error: Missing required field: config directory"
        );
    }

    #[test]
    fn test_error_message_formatting_corrupt_store() {
        let parse_error = serde_json::from_str::<u32>("not a number").unwrap_err();
        let error = TapStreakError::Storage(StorageError::Corrupt(parse_error));
        assert!(error
            .to_string()
            .starts_with("Storage error: Corrupt highest-streak file:"));
    }

    #[test]
    fn test_error_conversion_from_storage_error() {
        let storage_error = StorageError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));
        let error: TapStreakError = storage_error.into();

        match error {
            TapStreakError::Storage(_) => {
                // Success - correct conversion
            }
            _ => panic!("Expected TapStreakError::Storage"),
        }
    }

    #[test]
    fn test_error_conversion_from_config_error() {
        let config_error = ConfigError::MissingField("test".to_string());
        let error: TapStreakError = config_error.into();

        match error {
            TapStreakError::Config(_) => {
                // Success - correct conversion
            }
            _ => panic!("Expected TapStreakError::Config"),
        }
    }
}
