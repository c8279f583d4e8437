//! Test utilities for Citechat
//!
//! This module provides common test utilities including temporary directory
//! management, config file creation, and assertion helpers.

use crate::config::Config;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if writing the file fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error's display text contains `expected`
///
/// # Panics
///
/// Panics if the result is Ok or the message does not match
pub fn assert_error_contains<T, E: std::fmt::Display>(result: Result<T, E>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Default configuration with an in-memory token store
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.session.store = crate::config::TokenStoreKind::Memory;
    config
}

/// A complete configuration file in YAML form
pub fn test_config_yaml() -> String {
    r#"
server:
  base_url: "https://docs.example.com/api"
  timeout_seconds: 15
  session_expired_status: 401

session:
  store: memory
  key: test-token

chat:
  show_citations: false
  prompt: "? "
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenStoreKind;
    use crate::error::CitechatError;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<(), CitechatError> =
            Err(CitechatError::Config("test error message".to_string()));
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<(), CitechatError> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    fn test_test_config_uses_memory_store() {
        let config = test_config();
        assert_eq!(config.session.store, TokenStoreKind::Memory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml_parses_and_validates() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert_eq!(config.server.session_expired_status, 401);
        assert_eq!(config.session.key, "test-token");
        assert!(config.validate().is_ok());
    }
}
