//! Pending form tracking
//!
//! This module pairs forms that were sent to a client with the answer that
//! arrives later, tracking pending forms by id and routing each answer back
//! to the task awaiting it via a oneshot channel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ show form   │ → Generate id, insert sender, send to client
//! └──────┬──────┘
//!        │
//!        ├─ Pending: HashMap<String, (player, oneshot::Sender)>
//!        │
//!        ↓
//! ┌──────────────────┐
//! │ complete()       │ → Remove sender, deliver raw answer
//! └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use input_permission::forms::PendingForms;
//! use serde_json::json;
//! use tokio::sync::oneshot;
//! use uuid::Uuid;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let pending = PendingForms::new();
//! let player = Uuid::new_v4();
//!
//! let (tx, rx) = oneshot::channel();
//! pending.insert("form_1".to_string(), player, tx).await;
//!
//! // Later, when the client answers:
//! pending.complete("form_1", json!(0)).await;
//!
//! assert_eq!(rx.await.unwrap(), json!(0));
//! # }
//! ```

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use uuid::Uuid;

struct PendingForm {
    player: Uuid,
    sender: oneshot::Sender<Value>,
}

/// Tracks forms awaiting an answer
///
/// # Thread Safety
///
/// The internal HashMap is protected by a Tokio Mutex, so the table can be
/// shared between the task showing a form and the task delivering answers.
#[derive(Clone, Default)]
pub struct PendingForms {
    inner: Arc<Mutex<HashMap<String, PendingForm>>>,
}

impl PendingForms {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a form that was sent to `player`
    pub async fn insert(&self, id: String, player: Uuid, sender: oneshot::Sender<Value>) {
        self.inner
            .lock()
            .await
            .insert(id, PendingForm { player, sender });
    }

    /// Deliver the raw answer of a form
    ///
    /// # Returns
    ///
    /// * `true` - Form was pending and the answer was delivered
    /// * `false` - Form was unknown or nobody is waiting for it anymore
    pub async fn complete(&self, id: &str, answer: Value) -> bool {
        if let Some(pending) = self.inner.lock().await.remove(id) {
            pending.sender.send(answer).is_ok()
        } else {
            false
        }
    }

    /// Forget a form without answering it
    ///
    /// The waiting task sees its channel close.
    pub async fn cancel(&self, id: &str) {
        self.inner.lock().await.remove(id);
    }

    /// Forget every form sent to a player, returning how many there were
    pub async fn cancel_player(&self, player: Uuid) -> usize {
        let mut inner = self.inner.lock().await;
        let before = inner.len();
        inner.retain(|_, pending| pending.player != player);
        before - inner.len()
    }

    /// Number of pending forms
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
