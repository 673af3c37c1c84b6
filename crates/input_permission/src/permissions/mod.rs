//! Permission defaults and their effect on input sessions
//!
//! This module owns the one piece of real logic in the plugin: turning a
//! declarative default per input category into permission-tree edges, and
//! turning the resulting per-player permissions into input session state.
//!
//! # Architecture
//!
//! ```text
//! config.yml ──► DefaultPolicy ──► PolicyReconciler ──► everyone / operators edges
//!                                                            │
//!                                       host resolution ◄────┘
//!                                             │
//!             join / recalculation ──► Rechecker ──► InputSession flags
//! ```
//!
//! # Default table
//!
//! | Default | everyone edge | operators edge |
//! |---|---|---|
//! | `true` | granted | none |
//! | `op` | none | granted |
//! | `notop` | granted | denied |
//! | `false` | none | none |
//!
//! # Example
//!
//! ```
//! use input_permission::permissions::{PermissionGroup, SymbolicDefault};
//!
//! let edges = SymbolicDefault::Op.edges();
//! assert_eq!(edges.get(PermissionGroup::Everyone), None);
//! assert_eq!(edges.get(PermissionGroup::Operators), Some(true));
//! ```

mod defaults;
mod names;
mod reconciler;
mod recheck;

pub use defaults::{DefaultPolicy, SymbolicDefault};
pub(crate) use defaults::describe_yaml;
pub use names::{Action, PermissionNames};
pub use reconciler::{GroupEdges, PermissionGroup, PolicyReconciler};
pub use recheck::Rechecker;
