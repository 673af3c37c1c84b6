//! Host-side types and the collaborator bundle
//!
//! [`Host`] gathers the collaborator implementations the plugin needs, the
//! same way a server wires its subsystems into a plugin at enable time.
//!
//! # Example
//!
//! ```
//! use input_permission::host::{CommandSender, Player};
//!
//! let alice = Player::new("Alice");
//! let sender = CommandSender::Player(alice.clone());
//!
//! assert_eq!(sender.as_player(), Some(&alice));
//! assert!(CommandSender::Console.as_player().is_none());
//! ```

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

mod collaborators;

pub use collaborators::{
    CommandRegistry, FormEngine, InputEngine, InputSession, PermissionEngine, PermissionNode,
    RecalculationCallback, Server,
};

/// A connected player
///
/// Identity is the `id`; two handles with the same id are the same player
/// even if the display name was captured at different times.
#[derive(Debug, Clone, Eq)]
pub struct Player {
    /// Stable player identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
}

impl Player {
    /// Create a player with a fresh random id
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Create a player with a known id
    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Whether both handles refer to the same player
    pub fn is(&self, other: &Player) -> bool {
        self.id == other.id
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::hash::Hash for Player {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Whoever issued a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSender {
    /// An in-game player
    Player(Player),
    /// The server console
    Console,
}

impl CommandSender {
    /// The player behind this sender, if any
    pub fn as_player(&self) -> Option<&Player> {
        match self {
            CommandSender::Player(player) => Some(player),
            CommandSender::Console => None,
        }
    }
}

/// Collaborators provided by the host server
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct Host {
    /// Permission tree and resolution
    pub permissions: Arc<dyn PermissionEngine>,
    /// Per-player input permission sessions
    pub inputs: Arc<dyn InputEngine>,
    /// Form display
    pub forms: Arc<dyn FormEngine>,
    /// Command autocomplete
    pub commands: Arc<dyn CommandRegistry>,
    /// Player lookup and chat
    pub server: Arc<dyn Server>,
}

impl Host {
    /// Bundle the host collaborators
    pub fn new(
        permissions: Arc<dyn PermissionEngine>,
        inputs: Arc<dyn InputEngine>,
        forms: Arc<dyn FormEngine>,
        commands: Arc<dyn CommandRegistry>,
        server: Arc<dyn Server>,
    ) -> Self {
        Self {
            permissions,
            inputs,
            forms,
            commands,
            server,
        }
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_is_the_id() {
        let id = Uuid::new_v4();
        let a = Player::with_id(id, "Alice");
        let renamed = Player::with_id(id, "alice_");
        let other = Player::new("Alice");

        assert!(a.is(&renamed));
        assert_eq!(a, renamed);
        assert_ne!(a, other);

        let set: HashSet<Player> = [a, renamed, other].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display_is_name() {
        assert_eq!(Player::new("Steve").to_string(), "Steve");
    }
}
