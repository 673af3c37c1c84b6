//! Collaborator traits implemented by the host server
//!
//! The plugin owns no permission tree, no input state and no UI transport.
//! Each of those is reached through one of the traits below:
//!
//! - [`PermissionEngine`] / [`PermissionNode`] - permission tree and per-player resolution
//! - [`InputEngine`] / [`InputSession`] - per-player input permission state
//! - [`FormEngine`] - showing forms and awaiting the answer
//! - [`CommandRegistry`] - per-player command autocomplete
//! - [`Server`] - player lookup and chat
//!
//! # Example
//!
//! ```
//! use input_permission::host::{InputSession, Player};
//! use input_permission::PermissionCategory;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! struct CameraOnly(AtomicBool);
//!
//! impl InputSession for CameraOnly {
//!     fn set_category_enabled(&self, category: PermissionCategory, enabled: bool) {
//!         if category == PermissionCategory::Camera {
//!             self.0.store(enabled, Ordering::SeqCst);
//!         }
//!     }
//!
//!     fn is_category_enabled(&self, category: PermissionCategory) -> bool {
//!         category != PermissionCategory::Camera || self.0.load(Ordering::SeqCst)
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::category::PermissionCategory;
use crate::command::CommandOverload;
use crate::error::InputPermissionError;
use crate::forms::{ActionForm, ActionFormResponse, ModalForm, ModalFormResponse};
use crate::host::Player;

/// Callback fired when a player's effective permissions may have changed
pub type RecalculationCallback = Arc<dyn Fn(&Player) + Send + Sync>;

/// A node of the host permission tree
///
/// Child edges carry a boolean: `true` grants the child to whoever holds this
/// node, `false` explicitly denies it.
pub trait PermissionNode: Send + Sync {
    /// Add or overwrite the edge to `permission`
    fn add_child(&self, permission: &str, granted: bool);

    /// Remove the edge to `permission`, if any
    fn remove_child(&self, permission: &str);

    /// Value of the edge to `permission`, or `None` if there is no edge
    fn child(&self, permission: &str) -> Option<bool>;
}

/// The host permission engine
///
/// Resolution of [`has_permission`](Self::has_permission) is entirely the
/// host's business: it combines the group edges written by the
/// [`PolicyReconciler`](crate::permissions::PolicyReconciler) with whatever
/// per-player or per-group overrides exist.
pub trait PermissionEngine: Send + Sync {
    /// Look up a permission node by name
    fn node(&self, name: &str) -> Option<Arc<dyn PermissionNode>>;

    /// Whether the player currently holds `permission`
    fn has_permission(&self, player: &Player, permission: &str) -> bool;

    /// Register a callback fired each time `player`'s permissions are recalculated
    ///
    /// The host drops the callbacks when the player disconnects.
    fn subscribe_recalculation(&self, player: &Player, callback: RecalculationCallback);
}

/// Input permission state attached to one connected player
pub trait InputSession: Send + Sync {
    /// Enable or disable a category for this player
    fn set_category_enabled(&self, category: PermissionCategory, enabled: bool);

    /// Whether the category is currently enabled
    fn is_category_enabled(&self, category: PermissionCategory) -> bool;
}

/// The host input-permission engine
pub trait InputEngine: Send + Sync {
    /// Session of a connected player, created on first use
    fn session(&self, player: &Player) -> Arc<dyn InputSession>;
}

/// The host form engine
///
/// Each call resolves once the player answers. A response without a
/// selection (action forms) or without values (modal forms) means the player
/// closed the form.
#[async_trait]
pub trait FormEngine: Send + Sync {
    /// Show a form with a body and buttons
    async fn show_action(
        &self,
        player: &Player,
        form: ActionForm,
    ) -> Result<ActionFormResponse, InputPermissionError>;

    /// Show a form with input fields
    async fn show_modal(
        &self,
        player: &Player,
        form: ModalForm,
    ) -> Result<ModalFormResponse, InputPermissionError>;
}

/// The host command registry
pub trait CommandRegistry: Send + Sync {
    /// Replace the autocomplete overloads `player` sees for `command`
    fn set_overloads(&self, player: &Player, command: &str, overloads: Vec<CommandOverload>);
}

/// The host server
pub trait Server: Send + Sync {
    /// Online player whose name matches exactly (ignoring ASCII case)
    fn player_exact(&self, name: &str) -> Option<Player>;

    /// Every online player, in join order
    fn online_players(&self) -> Vec<Player>;

    /// Send a chat message to a player
    fn send_message(&self, player: &Player, message: &str);
}
