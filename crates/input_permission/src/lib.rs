//! Input Permission - input permission management for game server hosts
//!
//! This crate bridges a host's permission tree with the client's input
//! permission categories (camera, movement, jump, ...), and lets players
//! query and toggle those categories through a command and a set of forms.
//!
//! # Overview
//!
//! The plugin keeps a default policy per category in a YAML file. Each
//! default is one of four symbolic values (`true`, `op`, `notop`, `false`)
//! and is written into the host's permission tree as edges from the
//! "everyone" and "operators" groups to `<namespace>.permission.<category>`.
//! Whenever a player joins or has their permissions recalculated, the
//! plugin re-derives which categories they hold and pushes the result into
//! their input session.
//!
//! On top of that:
//! - `/inputpermission query|set <target> <category> [state]` reads or overrides a session flag
//! - a form flow offers the same operations plus an editor for the defaults
//! - per-player command overloads hide the branches a player cannot use
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//! - `host`: collaborator traits the host server implements
//! - `permissions`: symbolic defaults, the reconciler and the per-player recheck
//! - `config`: the persisted default policy
//! - `command`: command argument parsing and overloads
//! - `forms`: form models, their wire JSON and a dispatcher for raw transports
//! - `ui`: the per-player form state machine
//! - `plugin`: lifecycle hooks and the command entry point
//!
//! # Example
//!
//! ```rust,no_run
//! use input_permission::prelude::*;
//! use input_permission::testing::MemoryHost;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), InputPermissionError> {
//!     let memory = MemoryHost::new();
//!     let options = PluginOptions::builder()
//!         .config_path("plugin_data/InputPermission/config.yml")
//!         .build();
//!     let plugin = InputPermissionPlugin::enable(memory.host(), options)?;
//!
//!     let alice = memory.connect("Alice");
//!     plugin.on_player_join(&alice);
//!
//!     if let CommandOutcome::Replied(feedback) = plugin.on_command(
//!         &CommandSender::Player(alice.clone()),
//!         &["query", "Alice", "jump"],
//!     ) {
//!         println!("{feedback}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Input permission categories
///
/// `PermissionCategory` is the closed set of eleven client input classes;
/// `CategorySet` packs a subset of them into a bitset; `InputState` is the
/// enabled/disabled spelling used by commands and messages.
pub mod category;

/// Error types and utilities
///
/// This module defines the `InputPermissionError` enum, which covers all error cases in the crate:
///
/// - `Io` - reading or writing the configuration file (auto-converts from `std::io::Error`)
/// - `Yaml` - malformed configuration documents (auto-converts from `serde_yaml::Error`)
/// - `Json` - malformed form answers (auto-converts from `serde_json::Error`)
/// - `UnknownCategory` / `InvalidDefault` / `InvalidState` - unparseable names and values
/// - `MissingPermissionNode` - the host lacks a group node the reconciler needs
/// - `FormTransport` / `FormResponse` / `FormTimeout` - form delivery failures
pub mod error;

/// Host collaborators
///
/// Traits for the permission engine, input engine, form engine, command
/// registry and server, plus the `Player` and `CommandSender` handles.
pub mod host;

/// Permission defaults and their application
///
/// See `PolicyReconciler` for the default → group edge table and
/// `Rechecker` for the per-player re-derivation.
pub mod permissions;

/// Persisted default policy
pub mod config;

/// Configuration options and builder
pub mod options;

/// The `/inputpermission` command
pub mod command;

/// Messages sent to players
pub mod messages;

/// Server forms
///
/// Action and modal form models, their JSON wire format, and
/// `FormDispatcher` for hosts that only expose a raw form channel.
pub mod forms;

/// Per-player form flow
pub mod ui;

/// The plugin and its lifecycle hooks
pub mod plugin;

/// In-memory host collaborators for tests and demos
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Public API re-exports
pub use category::{CategorySet, InputState, PermissionCategory};
pub use permissions::{DefaultPolicy, SymbolicDefault};
pub use plugin::{CommandOutcome, InputPermissionPlugin};

// Prelude module for common imports
pub mod prelude {
    //! Common imports for input_permission users
    //!
    //! Use `use input_permission::prelude::*;` to import commonly used types.

    pub use crate::category::{CategorySet, InputState, PermissionCategory};
    pub use crate::config::PolicyStore;
    pub use crate::error::InputPermissionError;
    pub use crate::forms::{
        ActionForm, ActionFormResponse, FormDispatcher, FormTransport, ModalForm,
        ModalFormResponse,
    };
    pub use crate::host::{
        CommandRegistry, CommandSender, FormEngine, Host, InputEngine, InputSession,
        PermissionEngine, PermissionNode, Player, Server,
    };
    pub use crate::messages::Feedback;
    pub use crate::options::PluginOptions;
    pub use crate::permissions::{DefaultPolicy, PermissionNames, SymbolicDefault};
    pub use crate::plugin::{CommandOutcome, InputPermissionPlugin};
    pub use crate::ui::FormState;
}
