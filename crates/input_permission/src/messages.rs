//! Chat and form-body messages sent to players
//!
//! Every message the plugin produces is a [`Feedback`] value. Its `Display`
//! output is the English text; hosts with a client-side translation table can
//! use [`Feedback::translation`] instead for the messages that have one.
//!
//! # Example
//!
//! ```
//! use input_permission::messages::Feedback;
//! use input_permission::{InputState, PermissionCategory};
//!
//! let feedback = Feedback::Set {
//!     category: PermissionCategory::Camera,
//!     state: InputState::Disabled,
//!     target: "Alice".to_string(),
//! };
//! assert_eq!(feedback.to_string(), "Set camera permission to disabled for Alice");
//! ```

use std::fmt;

use crate::category::{InputState, PermissionCategory};
use crate::permissions::SymbolicDefault;

/// Prefix that renders the rest of a chat line in red
pub const RED: &str = "§c";

/// Something the plugin tells a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// The sender may not run this action on this target
    NoPermission,
    /// Result of a query with an explicit state
    Query {
        /// Queried category
        category: PermissionCategory,
        /// Number of targets whose state matched (0 or 1)
        count: u32,
        /// Requested state
        state: InputState,
    },
    /// Result of a query without a state
    QueryVerbose {
        /// Queried category
        category: PermissionCategory,
        /// Targets with the category enabled
        enabled: u32,
        /// Targets with the category disabled
        disabled: u32,
    },
    /// Confirmation of a set
    Set {
        /// Changed category
        category: PermissionCategory,
        /// New state
        state: InputState,
        /// Target display name
        target: String,
    },
    /// A value typed in the config form did not parse
    InvalidDefault {
        /// Field the value was typed into
        category: PermissionCategory,
        /// Raw text
        value: String,
    },
    /// The config form changed these defaults
    ConfigUpdated(Vec<(PermissionCategory, SymbolicDefault)>),
    /// The config form was submitted unchanged
    NoChanges,
}

impl Feedback {
    /// Client translation key and parameters, for messages that have one
    pub fn translation(&self) -> Option<(&'static str, Vec<String>)> {
        match self {
            Feedback::Query {
                category,
                count,
                state,
            } => Some((
                "commands.inputpermission.query",
                vec![category.to_string(), count.to_string(), state.to_string()],
            )),
            Feedback::QueryVerbose {
                category,
                enabled,
                disabled,
            } => Some((
                "commands.inputpermission.queryverbose",
                vec![category.to_string(), enabled.to_string(), disabled.to_string()],
            )),
            Feedback::Set {
                category,
                state,
                target,
            } => Some((
                "commands.inputpermission.set.outputoneplayer",
                vec![category.to_string(), state.to_string(), target.clone()],
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::NoPermission => {
                write!(f, "{RED}You don't have permission to use this operation")
            }
            Feedback::Query {
                category,
                count,
                state,
            } => write!(f, "{count} player(s) have {category} permission {state}"),
            Feedback::QueryVerbose {
                category,
                enabled,
                disabled,
            } => write!(
                f,
                "{category} permission is enabled for {enabled} player(s) and disabled for {disabled} player(s)"
            ),
            Feedback::Set {
                category,
                state,
                target,
            } => write!(f, "Set {category} permission to {state} for {target}"),
            Feedback::InvalidDefault { category, value } => {
                write!(f, "{category} has invalid default \"{value}\"")
            }
            Feedback::ConfigUpdated(updated) => {
                f.write_str("Configuration updated: ")?;
                for (i, (category, default)) in updated.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{category} ({default})")?;
                }
                Ok(())
            }
            Feedback::NoChanges => f.write_str("No changes have been made."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_permission_is_red() {
        assert_eq!(
            Feedback::NoPermission.to_string(),
            "§cYou don't have permission to use this operation"
        );
    }

    #[test]
    fn test_query_messages() {
        let query = Feedback::Query {
            category: PermissionCategory::Jump,
            count: 1,
            state: InputState::Enabled,
        };
        assert_eq!(query.to_string(), "1 player(s) have jump permission enabled");

        let verbose = Feedback::QueryVerbose {
            category: PermissionCategory::MoveLeft,
            enabled: 0,
            disabled: 1,
        };
        assert_eq!(
            verbose.to_string(),
            "move_left permission is enabled for 0 player(s) and disabled for 1 player(s)"
        );
        assert_eq!(
            verbose.translation(),
            Some((
                "commands.inputpermission.queryverbose",
                vec!["move_left".to_string(), "0".to_string(), "1".to_string()]
            ))
        );
    }

    #[test]
    fn test_config_messages() {
        let updated = Feedback::ConfigUpdated(vec![
            (PermissionCategory::Camera, SymbolicDefault::Op),
            (PermissionCategory::Mount, SymbolicDefault::NotOp),
        ]);
        assert_eq!(
            updated.to_string(),
            "Configuration updated: camera (op), mount (notop)"
        );
        assert!(updated.translation().is_none());

        let invalid = Feedback::InvalidDefault {
            category: PermissionCategory::Sneak,
            value: "maybe".to_string(),
        };
        assert_eq!(invalid.to_string(), "sneak has invalid default \"maybe\"");
        assert_eq!(Feedback::NoChanges.to_string(), "No changes have been made.");
    }
}
