//! One active form flow per player.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;
use uuid::Uuid;

use crate::host::Player;

#[derive(Default)]
struct Inner {
    active: Mutex<HashMap<Uuid, (u64, AbortHandle)>>,
    generation: AtomicU64,
}

/// Tracks the running flow task of each player
///
/// Starting a flow aborts the one the player already had. A finished flow
/// removes its own entry unless a newer flow replaced it.
///
/// # Thread Safety
///
/// The table sits behind a `std::sync::Mutex` that is only held for map
/// operations, never across an `.await`.
#[derive(Clone, Default)]
pub struct FlowRegistry {
    inner: Arc<Inner>,
}

impl FlowRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, (u64, AbortHandle)>> {
        self.inner.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn `flow` as the player's active flow
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&self, player: &Player, flow: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
        let registry = self.clone();
        let id = player.id;

        let mut active = self.active();
        let handle = tokio::spawn(async move {
            flow.await;
            registry.finish(id, generation);
        });
        if let Some((_, previous)) = active.insert(id, (generation, handle.abort_handle())) {
            previous.abort();
            debug!(player = %player, "Replaced active form flow");
        }
        handle
    }

    fn finish(&self, player: Uuid, generation: u64) {
        let mut active = self.active();
        if active.get(&player).is_some_and(|(g, _)| *g == generation) {
            active.remove(&player);
        }
    }

    /// Abort the player's active flow, returning whether there was one
    pub fn abort(&self, player: &Player) -> bool {
        match self.active().remove(&player.id) {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Whether the player has a flow running
    pub fn is_active(&self, player: &Player) -> bool {
        self.active().contains_key(&player.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_finished_flow_unregisters() {
        let registry = FlowRegistry::new();
        let alice = Player::new("Alice");

        registry.start(&alice, async {}).await.unwrap();
        assert!(!registry.is_active(&alice));
    }

    #[tokio::test]
    async fn test_new_flow_aborts_previous() {
        let registry = FlowRegistry::new();
        let alice = Player::new("Alice");

        let first = registry.start(&alice, std::future::pending());
        let second = registry.start(&alice, std::future::pending());

        assert!(first.await.unwrap_err().is_cancelled());
        assert!(registry.is_active(&alice));

        assert!(registry.abort(&alice));
        assert!(second.await.unwrap_err().is_cancelled());
        assert!(!registry.abort(&alice));
    }

    #[tokio::test]
    async fn test_players_are_independent() {
        let registry = FlowRegistry::new();
        let alice = Player::new("Alice");
        let bob = Player::new("Bob");

        let _a = registry.start(&alice, std::future::pending());
        let _b = registry.start(&bob, std::future::pending());

        registry.abort(&alice);
        assert!(!registry.is_active(&alice));
        assert!(registry.is_active(&bob));
    }
}
