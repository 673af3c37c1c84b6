//! [`FormEngine`] over a raw form transport.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use crate::error::InputPermissionError;
use crate::forms::{ActionForm, ActionFormResponse, ModalForm, ModalFormResponse, PendingForms};
use crate::host::{FormEngine, Player};
use crate::options::PluginOptions;

/// Channel that carries form JSON to a client
///
/// Implemented by hosts that can send a form packet but leave pairing
/// answers with forms to the caller. Answers come back through
/// [`FormDispatcher::handle_response`].
#[async_trait]
pub trait FormTransport: Send + Sync {
    /// Send a serialized form to a player
    async fn send_form(
        &self,
        player: &Player,
        form_id: &str,
        payload: Value,
    ) -> Result<(), InputPermissionError>;
}

/// Pairs forms sent over a [`FormTransport`] with their answers
///
/// Each form gets a fresh id. The answer is awaited for at most the
/// configured timeout; a form whose player quits or whose entry is cancelled
/// resolves as closed.
///
/// # Example
///
/// ```no_run
/// use input_permission::forms::{ActionForm, FormDispatcher, FormTransport};
/// use input_permission::host::{FormEngine, Player};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example(transport: Arc<dyn FormTransport>) -> Result<(), input_permission::error::InputPermissionError> {
/// let dispatcher = FormDispatcher::new(transport, Duration::from_secs(300));
/// let player = Player::new("Alice");
///
/// // Resolves once the packet handler calls `dispatcher.handle_response(..)`
/// let response = dispatcher
///     .show_action(&player, ActionForm::new("Hello").button("ok"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FormDispatcher {
    transport: Arc<dyn FormTransport>,
    pending: PendingForms,
    timeout: Duration,
}

impl FormDispatcher {
    /// Create a dispatcher over a transport
    pub fn new(transport: Arc<dyn FormTransport>, timeout: Duration) -> Self {
        Self {
            transport,
            pending: PendingForms::new(),
            timeout,
        }
    }

    /// Create a dispatcher using the form timeout of the plugin options
    pub fn from_options(transport: Arc<dyn FormTransport>, options: &PluginOptions) -> Self {
        Self::new(transport, options.form_timeout)
    }

    /// Deliver the raw JSON answer a client sent for `form_id`
    ///
    /// Returns whether a form was waiting for it.
    pub async fn handle_response(&self, form_id: &str, raw: &str) -> Result<bool, InputPermissionError> {
        let answer: Value = serde_json::from_str(raw.trim())?;
        Ok(self.pending.complete(form_id, answer).await)
    }

    /// Resolve every form still open for a player as closed
    pub async fn player_quit(&self, player: &Player) {
        let dropped = self.pending.cancel_player(player.id).await;
        if dropped > 0 {
            debug!(player = %player, dropped, "Dropped pending forms");
        }
    }

    /// Send a payload and wait for the raw answer
    ///
    /// `Ok(None)` means the entry was cancelled before an answer arrived.
    async fn request(&self, player: &Player, payload: Value) -> Result<Option<Value>, InputPermissionError> {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id.clone(), player.id, tx).await;

        if let Err(e) = self.transport.send_form(player, &id, payload).await {
            self.pending.cancel(&id).await;
            return Err(e);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(answer)) => Ok(Some(answer)),
            Ok(Err(_)) => Ok(None),
            Err(_) => {
                self.pending.cancel(&id).await;
                Err(InputPermissionError::FormTimeout { form_id: id })
            }
        }
    }
}

#[async_trait]
impl FormEngine for FormDispatcher {
    async fn show_action(
        &self,
        player: &Player,
        form: ActionForm,
    ) -> Result<ActionFormResponse, InputPermissionError> {
        match self.request(player, form.to_json()).await? {
            Some(answer) => ActionFormResponse::from_json(&form, &answer),
            None => Ok(ActionFormResponse::closed()),
        }
    }

    async fn show_modal(
        &self,
        player: &Player,
        form: ModalForm,
    ) -> Result<ModalFormResponse, InputPermissionError> {
        match self.request(player, form.to_json()).await? {
            Some(answer) => ModalFormResponse::from_json(&form, &answer),
            None => Ok(ModalFormResponse::closed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    /// Forwards sent forms to the test body
    struct ChannelTransport {
        sent: mpsc::UnboundedSender<(String, Value)>,
    }

    #[async_trait]
    impl FormTransport for ChannelTransport {
        async fn send_form(
            &self,
            _player: &Player,
            form_id: &str,
            payload: Value,
        ) -> Result<(), InputPermissionError> {
            self.sent
                .send((form_id.to_string(), payload))
                .map_err(|e| InputPermissionError::FormTransport(e.to_string()))
        }
    }

    struct BrokenTransport;

    #[async_trait]
    impl FormTransport for BrokenTransport {
        async fn send_form(
            &self,
            _player: &Player,
            _form_id: &str,
            _payload: Value,
        ) -> Result<(), InputPermissionError> {
            Err(InputPermissionError::FormTransport("player offline".to_string()))
        }
    }

    fn setup(timeout: Duration) -> (FormDispatcher, mpsc::UnboundedReceiver<(String, Value)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = FormDispatcher::new(Arc::new(ChannelTransport { sent: tx }), timeout);
        (dispatcher, rx)
    }

    #[tokio::test]
    async fn test_action_answer_is_routed_back() {
        let (dispatcher, mut sent) = setup(Duration::from_secs(5));
        let player = Player::new("Alice");

        let task = {
            let dispatcher = dispatcher.clone();
            let player = player.clone();
            tokio::spawn(async move {
                dispatcher
                    .show_action(&player, ActionForm::new("t").button("a").button("b"))
                    .await
            })
        };

        let (id, payload) = sent.recv().await.unwrap();
        assert_eq!(payload["type"], "form");
        assert!(dispatcher.handle_response(&id, "1\n").await.unwrap());

        let response = task.await.unwrap().unwrap();
        assert_eq!(response.selection, Some(1));
    }

    #[tokio::test]
    async fn test_modal_null_answer_is_closed() {
        let (dispatcher, mut sent) = setup(Duration::from_secs(5));
        let player = Player::new("Alice");

        let task = {
            let dispatcher = dispatcher.clone();
            let player = player.clone();
            tokio::spawn(async move {
                dispatcher
                    .show_modal(&player, ModalForm::new("t").toggle("x", true, None))
                    .await
            })
        };

        let (id, _) = sent.recv().await.unwrap();
        dispatcher.handle_response(&id, "null").await.unwrap();

        assert!(task.await.unwrap().unwrap().is_closed());
    }

    #[tokio::test]
    async fn test_player_quit_closes_open_forms() {
        let (dispatcher, mut sent) = setup(Duration::from_secs(5));
        let player = Player::new("Alice");

        let task = {
            let dispatcher = dispatcher.clone();
            let player = player.clone();
            tokio::spawn(async move { dispatcher.show_action(&player, ActionForm::new("t")).await })
        };

        sent.recv().await.unwrap();
        dispatcher.player_quit(&player).await;

        assert!(task.await.unwrap().unwrap().is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_form_times_out() {
        let (dispatcher, _sent) = setup(Duration::from_secs(30));
        let player = Player::new("Alice");

        let err = dispatcher
            .show_action(&player, ActionForm::new("t"))
            .await
            .unwrap_err();

        assert!(matches!(err, InputPermissionError::FormTimeout { .. }));
        assert_eq!(dispatcher.pending.len().await, 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported() {
        let dispatcher = FormDispatcher::new(Arc::new(BrokenTransport), Duration::from_secs(5));

        let err = dispatcher
            .show_action(&Player::new("Alice"), ActionForm::new("t"))
            .await
            .unwrap_err();

        assert!(matches!(err, InputPermissionError::FormTransport(_)));
        assert_eq!(dispatcher.pending.len().await, 0);
    }

    #[test]
    fn test_from_options_uses_form_timeout() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let options = PluginOptions::builder()
            .form_timeout(Duration::from_secs(12))
            .build();
        let dispatcher = FormDispatcher::from_options(Arc::new(ChannelTransport { sent: tx }), &options);
        assert_eq!(dispatcher.timeout, Duration::from_secs(12));
    }

    #[tokio::test]
    async fn test_unknown_form_id_is_ignored() {
        let (dispatcher, _sent) = setup(Duration::from_secs(5));
        assert!(!dispatcher.handle_response("nope", "0").await.unwrap());
        assert!(dispatcher.handle_response("nope", "{oops").await.is_err());
    }
}
