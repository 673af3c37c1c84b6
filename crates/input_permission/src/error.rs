//! Error types for the input_permission plugin
//!
//! This module defines the error hierarchy for the crate using `thiserror`.
//! All fallible plugin operations return `Result<T, InputPermissionError>`.
//!
//! # Error Variants
//!
//! - [`InputPermissionError::Io`]: Reading or writing the configuration file (auto-converts from `std::io::Error`)
//! - [`InputPermissionError::Yaml`]: Malformed configuration document (auto-converts from `serde_yaml::Error`)
//! - [`InputPermissionError::Json`]: Malformed form payloads (auto-converts from `serde_json::Error`)
//! - [`InputPermissionError::UnknownCategory`]: A name outside the fixed category set
//! - [`InputPermissionError::InvalidDefault`]: A value that is not a permission default
//! - [`InputPermissionError::InvalidState`]: A state argument other than `enabled`/`disabled`
//! - [`InputPermissionError::MissingPermissionNode`]: The host permission tree lacks a group node
//! - [`InputPermissionError::FormTransport`]: The host could not deliver a form
//! - [`InputPermissionError::FormResponse`]: A form response did not match the form that was sent
//! - [`InputPermissionError::FormTimeout`]: No form response arrived in time
//!
//! # Example
//!
//! ```rust
//! use input_permission::error::InputPermissionError;
//! use input_permission::PermissionCategory;
//!
//! fn example(name: &str) -> Result<PermissionCategory, InputPermissionError> {
//!     name.parse()
//! }
//!
//! assert!(matches!(
//!     example("fly"),
//!     Err(InputPermissionError::UnknownCategory { .. })
//! ));
//! ```

use thiserror::Error;

/// The main error type for all input_permission operations
///
/// Three variants support automatic conversion via the `?` operator:
/// - `Io` from `std::io::Error`
/// - `Yaml` from `serde_yaml::Error`
/// - `Json` from `serde_json::Error`
#[derive(Error, Debug)]
pub enum InputPermissionError {
    /// I/O operation on the configuration file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document is not valid YAML
    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A form payload could not be encoded or decoded
    #[error("Failed to encode or decode form payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The name does not belong to the fixed set of input permission categories
    #[error("\"{name}\" is not a valid permission")]
    UnknownCategory {
        /// The rejected name as it was supplied
        name: String,
    },

    /// The value is not one of the recognised permission defaults
    #[error("Unknown permission default name \"{value}\"")]
    InvalidDefault {
        /// The rejected value as it was supplied
        value: String,
    },

    /// The state argument is neither `enabled` nor `disabled`
    #[error("Invalid state \"{value}\": expected enabled or disabled")]
    InvalidState {
        /// The rejected value as it was supplied
        value: String,
    },

    /// The host permission tree has no node with this name
    ///
    /// Raised when the "everyone" or "operators" group node cannot be resolved,
    /// which means the host has not finished registering its default permissions.
    #[error("Permission node \"{name}\" is not registered")]
    MissingPermissionNode {
        /// Name of the node that was looked up
        name: String,
    },

    /// The host failed to deliver a form to the player
    #[error("Failed to send form: {0}")]
    FormTransport(String),

    /// The response does not fit the form that was shown
    #[error("Malformed form response: {reason}")]
    FormResponse {
        /// Description of the mismatch
        reason: String,
    },

    /// The player did not answer the form before the deadline
    #[error("Timed out waiting for response to form {form_id}")]
    FormTimeout {
        /// Identifier of the form that expired
        form_id: String,
    },
}

impl InputPermissionError {
    /// Shorthand for a [`FormResponse`](Self::FormResponse) error
    pub fn form_response(reason: impl Into<String>) -> Self {
        Self::FormResponse {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category_message() {
        let err = InputPermissionError::UnknownCategory {
            name: "fly".to_string(),
        };
        assert_eq!(err.to_string(), "\"fly\" is not a valid permission");
    }

    #[test]
    fn test_invalid_default_message() {
        let err = InputPermissionError::InvalidDefault {
            value: "sometimes".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown permission default name \"sometimes\""
        );
    }

    #[test]
    fn test_missing_node_message() {
        let err = InputPermissionError::MissingPermissionNode {
            name: "pocketmine.group.user".to_string(),
        };
        assert!(err.to_string().contains("pocketmine.group.user"));
    }

    #[test]
    fn test_form_timeout_message() {
        let err = InputPermissionError::FormTimeout {
            form_id: "form_1".to_string(),
        };
        assert!(err.to_string().contains("form_1"));
    }

    #[test]
    fn test_form_response_shorthand() {
        let err = InputPermissionError::form_response("expected 5 values");
        assert!(matches!(err, InputPermissionError::FormResponse { .. }));
        assert!(err.to_string().contains("expected 5 values"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: InputPermissionError = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_with_question_mark_yaml() {
        fn parse() -> Result<serde_yaml::Value, InputPermissionError> {
            Ok(serde_yaml::from_str("default: [unclosed")?)
        }

        assert!(matches!(parse(), Err(InputPermissionError::Yaml(_))));
    }

    #[test]
    fn test_result_with_question_mark_json() {
        fn parse() -> Result<serde_json::Value, InputPermissionError> {
            Ok(serde_json::from_str("{ invalid }")?)
        }

        assert!(matches!(parse(), Err(InputPermissionError::Json(_))));
    }
}
