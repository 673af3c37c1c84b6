//! Per-player re-derivation of input permissions.

use std::sync::Arc;
use tracing::debug;

use crate::category::{CategorySet, PermissionCategory};
use crate::host::{InputEngine, PermissionEngine, Player};
use crate::permissions::PermissionNames;

/// Pushes a player's resolved category permissions into their input session
///
/// Every recheck is a full re-derivation: the permission engine is asked for
/// each category and the session flag is overwritten with the answer.
#[derive(Clone)]
pub struct Rechecker {
    permissions: Arc<dyn PermissionEngine>,
    inputs: Arc<dyn InputEngine>,
    names: PermissionNames,
}

impl Rechecker {
    /// Create a rechecker over the host engines
    pub fn new(
        permissions: Arc<dyn PermissionEngine>,
        inputs: Arc<dyn InputEngine>,
        names: PermissionNames,
    ) -> Self {
        Self {
            permissions,
            inputs,
            names,
        }
    }

    /// Categories the player currently holds the permission for
    pub fn resolve(&self, player: &Player) -> CategorySet {
        PermissionCategory::ALL
            .into_iter()
            .filter(|category| {
                self.permissions
                    .has_permission(player, &self.names.category(*category))
            })
            .collect()
    }

    /// Set every category of the player's session to its resolved state
    ///
    /// Returns the set of enabled categories.
    pub fn recheck(&self, player: &Player) -> CategorySet {
        let enabled = self.resolve(player);
        let session = self.inputs.session(player);
        for category in PermissionCategory::ALL {
            session.set_category_enabled(category, enabled.contains(category));
        }
        debug!(
            player = %player,
            enabled = ?enabled.iter().map(PermissionCategory::name).collect::<Vec<_>>(),
            "Rechecked input permissions"
        );
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryInputEngine, MemoryPermissionEngine};

    fn setup() -> (Arc<MemoryPermissionEngine>, Arc<MemoryInputEngine>, Rechecker) {
        let permissions = Arc::new(MemoryPermissionEngine::new());
        let inputs = Arc::new(MemoryInputEngine::new());
        let rechecker = Rechecker::new(
            permissions.clone(),
            inputs.clone(),
            PermissionNames::new("inputpermission"),
        );
        (permissions, inputs, rechecker)
    }

    #[test]
    fn test_recheck_enables_exactly_held_categories() {
        let (permissions, inputs, rechecker) = setup();
        let player = Player::new("Alice");
        permissions.grant(&player, "inputpermission.permission.jump");
        permissions.grant(&player, "inputpermission.permission.sneak");

        let enabled = rechecker.recheck(&player);

        assert_eq!(
            enabled.iter().collect::<Vec<_>>(),
            vec![PermissionCategory::Sneak, PermissionCategory::Jump]
        );
        let session = inputs.session(&player);
        for category in PermissionCategory::ALL {
            let expected = matches!(category, PermissionCategory::Jump | PermissionCategory::Sneak);
            assert_eq!(session.is_category_enabled(category), expected, "{category}");
        }
    }

    #[test]
    fn test_recheck_overwrites_runtime_overrides() {
        let (permissions, inputs, rechecker) = setup();
        let player = Player::new("Bob");
        permissions.grant(&player, "inputpermission.permission.camera");

        let session = inputs.session(&player);
        session.set_category_enabled(PermissionCategory::Camera, false);
        session.set_category_enabled(PermissionCategory::Jump, true);

        rechecker.recheck(&player);

        assert!(session.is_category_enabled(PermissionCategory::Camera));
        assert!(!session.is_category_enabled(PermissionCategory::Jump));
    }
}
