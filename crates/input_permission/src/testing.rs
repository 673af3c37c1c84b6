//! In-memory host collaborators for tests and demos
//!
//! Every collaborator trait of [`host`](crate::host) has an implementation
//! here that keeps its state in memory and records what the plugin did:
//!
//! - [`MemoryPermissionEngine`] - two group nodes, operator flags and per-player overrides
//! - [`MemoryInputEngine`] - bitset sessions with a read counter
//! - [`ScriptedFormEngine`] - replays queued answers and records every form shown
//! - [`MemoryServer`] - online player list and captured chat
//! - [`RecordingCommandRegistry`] - last overloads published per player
//!
//! [`MemoryHost`] bundles all five.
//!
//! Permission resolution models the host well enough to exercise the
//! plugin: a per-player override wins; otherwise an operator takes the
//! operators-group edge if there is one and falls back to the everyone-group
//! edge; a non-operator takes the everyone-group edge; no edge means `false`.
//! Recalculation callbacks fire after op and override changes for that
//! player and after any group edge change for every subscribed player.
//!
//! Available under `cfg(test)` and with the `testing` feature.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

use crate::category::{CategorySet, PermissionCategory};
use crate::command::CommandOverload;
use crate::error::InputPermissionError;
use crate::forms::{ActionForm, ActionFormResponse, FormValue, ModalForm, ModalFormResponse};
use crate::host::{
    CommandRegistry, FormEngine, Host, InputEngine, InputSession, PermissionEngine,
    PermissionNode, Player, RecalculationCallback, Server,
};
use crate::permissions::PermissionGroup;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Recalculations {
    subscribers: Mutex<HashMap<Uuid, (Player, Vec<RecalculationCallback>)>>,
}

impl Recalculations {
    /// Fire the callbacks of one player, or of everyone when `player` is `None`
    ///
    /// Callbacks are cloned out first so they may call back into the engine.
    fn fire(&self, player: Option<Uuid>) {
        let due: Vec<(Player, RecalculationCallback)> = lock(&self.subscribers)
            .iter()
            .filter(|(id, _)| player.is_none_or(|p| p == **id))
            .flat_map(|(_, (player, callbacks))| {
                callbacks.iter().map(move |cb| (player.clone(), cb.clone()))
            })
            .collect();

        for (player, callback) in due {
            callback(&player);
        }
    }
}

/// A group node whose edge changes trigger recalculation
pub struct MemoryPermissionNode {
    edges: Mutex<HashMap<String, bool>>,
    recalculations: Arc<Recalculations>,
}

impl PermissionNode for MemoryPermissionNode {
    fn add_child(&self, permission: &str, granted: bool) {
        let previous = lock(&self.edges).insert(permission.to_string(), granted);
        if previous != Some(granted) {
            self.recalculations.fire(None);
        }
    }

    fn remove_child(&self, permission: &str) {
        let previous = lock(&self.edges).remove(permission);
        if previous.is_some() {
            self.recalculations.fire(None);
        }
    }

    fn child(&self, permission: &str) -> Option<bool> {
        lock(&self.edges).get(permission).copied()
    }
}

/// In-memory [`PermissionEngine`]
pub struct MemoryPermissionEngine {
    nodes: Mutex<HashMap<String, Arc<MemoryPermissionNode>>>,
    operators: Mutex<HashSet<Uuid>>,
    overrides: Mutex<HashMap<Uuid, HashMap<String, bool>>>,
    recalculations: Arc<Recalculations>,
}

impl Default for MemoryPermissionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPermissionEngine {
    /// An engine with the everyone and operators group nodes
    pub fn new() -> Self {
        let engine = Self::without_groups();
        for group in [PermissionGroup::Everyone, PermissionGroup::Operators] {
            engine.add_node(group.node_name());
        }
        engine
    }

    /// An engine with no nodes at all
    pub fn without_groups() -> Self {
        Self {
            nodes: Mutex::new(HashMap::new()),
            operators: Mutex::new(HashSet::new()),
            overrides: Mutex::new(HashMap::new()),
            recalculations: Arc::new(Recalculations::default()),
        }
    }

    /// Register a node under `name`
    pub fn add_node(&self, name: &str) {
        let node = Arc::new(MemoryPermissionNode {
            edges: Mutex::new(HashMap::new()),
            recalculations: self.recalculations.clone(),
        });
        lock(&self.nodes).insert(name.to_string(), node);
    }

    /// Unregister the node under `name`, returning whether it existed
    pub fn remove_node(&self, name: &str) -> bool {
        lock(&self.nodes).remove(name).is_some()
    }

    fn group(&self, group: PermissionGroup) -> Option<Arc<MemoryPermissionNode>> {
        lock(&self.nodes).get(group.node_name()).cloned()
    }

    /// Edge from a group node to `permission`
    pub fn edge(&self, group: PermissionGroup, permission: &str) -> Option<bool> {
        self.group(group).and_then(|node| node.child(permission))
    }

    /// Give or take operator status
    pub fn set_operator(&self, player: &Player, operator: bool) {
        let changed = {
            let mut operators = lock(&self.operators);
            if operator {
                operators.insert(player.id)
            } else {
                operators.remove(&player.id)
            }
        };
        if changed {
            self.recalculations.fire(Some(player.id));
        }
    }

    /// Whether the player is an operator
    pub fn is_operator(&self, player: &Player) -> bool {
        lock(&self.operators).contains(&player.id)
    }

    fn set_override(&self, player: &Player, permission: &str, value: Option<bool>) {
        let previous = {
            let mut overrides = lock(&self.overrides);
            let entry = overrides.entry(player.id).or_default();
            match value {
                Some(v) => entry.insert(permission.to_string(), v),
                None => entry.remove(permission),
            }
        };
        if previous != value {
            self.recalculations.fire(Some(player.id));
        }
    }

    /// Grant `permission` to the player directly
    pub fn grant(&self, player: &Player, permission: &str) {
        self.set_override(player, permission, Some(true));
    }

    /// Deny `permission` to the player directly
    pub fn deny(&self, player: &Player, permission: &str) {
        self.set_override(player, permission, Some(false));
    }

    /// Drop a direct grant or denial
    pub fn clear(&self, player: &Player, permission: &str) {
        self.set_override(player, permission, None);
    }

    /// Number of recalculation callbacks registered for the player
    pub fn subscriptions(&self, player: &Player) -> usize {
        lock(&self.recalculations.subscribers)
            .get(&player.id)
            .map_or(0, |(_, callbacks)| callbacks.len())
    }

    /// Drop the player's callbacks, as the host does on disconnect
    pub fn disconnect(&self, player: &Player) {
        lock(&self.recalculations.subscribers).remove(&player.id);
    }
}

impl PermissionEngine for MemoryPermissionEngine {
    fn node(&self, name: &str) -> Option<Arc<dyn PermissionNode>> {
        lock(&self.nodes)
            .get(name)
            .cloned()
            .map(|node| node as Arc<dyn PermissionNode>)
    }

    fn has_permission(&self, player: &Player, permission: &str) -> bool {
        let direct = lock(&self.overrides)
            .get(&player.id)
            .and_then(|overrides| overrides.get(permission).copied());
        if let Some(value) = direct {
            return value;
        }

        let everyone = || self.edge(PermissionGroup::Everyone, permission);
        let resolved = if self.is_operator(player) {
            self.edge(PermissionGroup::Operators, permission).or_else(everyone)
        } else {
            everyone()
        };
        resolved.unwrap_or(false)
    }

    fn subscribe_recalculation(&self, player: &Player, callback: RecalculationCallback) {
        lock(&self.recalculations.subscribers)
            .entry(player.id)
            .or_insert_with(|| (player.clone(), Vec::new()))
            .1
            .push(callback);
    }
}

/// In-memory [`InputSession`]; every category starts enabled
pub struct MemoryInputSession {
    enabled: Mutex<CategorySet>,
    reads: AtomicUsize,
}

impl Default for MemoryInputSession {
    fn default() -> Self {
        Self {
            enabled: Mutex::new(CategorySet::all()),
            reads: AtomicUsize::new(0),
        }
    }
}

impl MemoryInputSession {
    /// Enabled categories, without counting as a read
    pub fn enabled(&self) -> CategorySet {
        *lock(&self.enabled)
    }

    /// How many times [`is_category_enabled`](InputSession::is_category_enabled) was called
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl InputSession for MemoryInputSession {
    fn set_category_enabled(&self, category: PermissionCategory, enabled: bool) {
        lock(&self.enabled).set(category, enabled);
    }

    fn is_category_enabled(&self, category: PermissionCategory) -> bool {
        self.reads.fetch_add(1, Ordering::SeqCst);
        lock(&self.enabled).contains(category)
    }
}

/// In-memory [`InputEngine`]
#[derive(Default)]
pub struct MemoryInputEngine {
    sessions: Mutex<HashMap<Uuid, Arc<MemoryInputSession>>>,
}

impl MemoryInputEngine {
    /// An engine with no sessions
    pub fn new() -> Self {
        Self::default()
    }

    /// The concrete session of a player, created on first use
    pub fn memory_session(&self, player: &Player) -> Arc<MemoryInputSession> {
        lock(&self.sessions).entry(player.id).or_default().clone()
    }

    /// Whether a session exists for the player
    pub fn has_session(&self, player: &Player) -> bool {
        lock(&self.sessions).contains_key(&player.id)
    }

    /// Destroy the player's session, as the host does on disconnect
    pub fn remove(&self, player: &Player) {
        lock(&self.sessions).remove(&player.id);
    }
}

impl InputEngine for MemoryInputEngine {
    fn session(&self, player: &Player) -> Arc<dyn InputSession> {
        self.memory_session(player)
    }
}

/// Queued answer for [`ScriptedFormEngine`]
#[derive(Debug, Clone)]
pub enum ScriptedAnswer {
    /// Answer an action form
    Action(ActionFormResponse),
    /// Answer a modal form
    Modal(ModalFormResponse),
    /// Fail the form with a transport error
    Fail(String),
    /// Never answer
    Hang,
}

/// A form as it was shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShownForm {
    /// An action form
    Action(ActionForm),
    /// A modal form
    Modal(ModalForm),
}

impl ShownForm {
    /// Title of the form
    pub fn title(&self) -> &str {
        match self {
            ShownForm::Action(form) => &form.title,
            ShownForm::Modal(form) => &form.title,
        }
    }
}

/// [`FormEngine`] that replays queued answers per player
///
/// A player with no queued answer closes whatever form is shown. An answer
/// of the wrong kind fails the form with a response error.
#[derive(Default)]
pub struct ScriptedFormEngine {
    answers: Mutex<HashMap<Uuid, VecDeque<ScriptedAnswer>>>,
    shown: Mutex<Vec<(Player, ShownForm)>>,
}

impl ScriptedFormEngine {
    /// An engine with no queued answers
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the player's next form
    pub fn push(&self, player: &Player, answer: ScriptedAnswer) {
        lock(&self.answers).entry(player.id).or_default().push_back(answer);
    }

    /// Queue a button press
    pub fn press(&self, player: &Player, button: usize) {
        self.push(player, ScriptedAnswer::Action(ActionFormResponse::selected(button)));
    }

    /// Queue a modal submission
    pub fn submit(&self, player: &Player, values: Vec<FormValue>) {
        self.push(player, ScriptedAnswer::Modal(ModalFormResponse::submitted(values)));
    }

    /// Queue closing the form
    pub fn close(&self, player: &Player) {
        self.push(player, ScriptedAnswer::Action(ActionFormResponse::closed()));
    }

    /// Every form shown so far, in order
    pub fn shown(&self) -> Vec<(Player, ShownForm)> {
        lock(&self.shown).clone()
    }

    /// Forms shown to one player, in order
    pub fn shown_to(&self, player: &Player) -> Vec<ShownForm> {
        lock(&self.shown)
            .iter()
            .filter(|(p, _)| p == player)
            .map(|(_, form)| form.clone())
            .collect()
    }

    /// Titles of the forms shown to one player, in order
    pub fn titles(&self, player: &Player) -> Vec<String> {
        self.shown_to(player)
            .iter()
            .map(|form| form.title().to_string())
            .collect()
    }

    fn next(&self, player: &Player, form: ShownForm) -> Option<ScriptedAnswer> {
        lock(&self.shown).push((player.clone(), form));
        lock(&self.answers)
            .get_mut(&player.id)
            .and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl FormEngine for ScriptedFormEngine {
    async fn show_action(
        &self,
        player: &Player,
        form: ActionForm,
    ) -> Result<ActionFormResponse, InputPermissionError> {
        match self.next(player, ShownForm::Action(form)) {
            None => Ok(ActionFormResponse::closed()),
            Some(ScriptedAnswer::Action(response)) => Ok(response),
            Some(ScriptedAnswer::Modal(response)) if response.is_closed() => {
                Ok(ActionFormResponse::closed())
            }
            Some(ScriptedAnswer::Modal(_)) => Err(InputPermissionError::form_response(
                "modal answer to an action form",
            )),
            Some(ScriptedAnswer::Fail(reason)) => Err(InputPermissionError::FormTransport(reason)),
            Some(ScriptedAnswer::Hang) => std::future::pending().await,
        }
    }

    async fn show_modal(
        &self,
        player: &Player,
        form: ModalForm,
    ) -> Result<ModalFormResponse, InputPermissionError> {
        match self.next(player, ShownForm::Modal(form)) {
            None => Ok(ModalFormResponse::closed()),
            Some(ScriptedAnswer::Modal(response)) => Ok(response),
            Some(ScriptedAnswer::Action(response)) if response.is_closed() => {
                Ok(ModalFormResponse::closed())
            }
            Some(ScriptedAnswer::Action(_)) => Err(InputPermissionError::form_response(
                "button answer to a modal form",
            )),
            Some(ScriptedAnswer::Fail(reason)) => Err(InputPermissionError::FormTransport(reason)),
            Some(ScriptedAnswer::Hang) => std::future::pending().await,
        }
    }
}

/// In-memory [`Server`]
#[derive(Default)]
pub struct MemoryServer {
    players: Mutex<Vec<Player>>,
    messages: Mutex<Vec<(Player, String)>>,
}

impl MemoryServer {
    /// A server with nobody online
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring a player online
    pub fn add_player(&self, player: &Player) {
        let mut players = lock(&self.players);
        if !players.contains(player) {
            players.push(player.clone());
        }
    }

    /// Take a player offline
    pub fn remove_player(&self, player: &Player) {
        lock(&self.players).retain(|p| p != player);
    }

    /// Messages sent to a player, in order
    pub fn messages(&self, player: &Player) -> Vec<String> {
        lock(&self.messages)
            .iter()
            .filter(|(p, _)| p == player)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Server for MemoryServer {
    fn player_exact(&self, name: &str) -> Option<Player> {
        lock(&self.players)
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn online_players(&self) -> Vec<Player> {
        lock(&self.players).clone()
    }

    fn send_message(&self, player: &Player, message: &str) {
        lock(&self.messages).push((player.clone(), message.to_string()));
    }
}

/// [`CommandRegistry`] that keeps the last overloads per player and command
#[derive(Default)]
pub struct RecordingCommandRegistry {
    overloads: Mutex<HashMap<(Uuid, String), Vec<CommandOverload>>>,
    updates: AtomicUsize,
}

impl RecordingCommandRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Last overloads published for the player, if any
    pub fn overloads(&self, player: &Player, command: &str) -> Option<Vec<CommandOverload>> {
        lock(&self.overloads)
            .get(&(player.id, command.to_string()))
            .cloned()
    }

    /// Total number of publications
    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl CommandRegistry for RecordingCommandRegistry {
    fn set_overloads(&self, player: &Player, command: &str, overloads: Vec<CommandOverload>) {
        self.updates.fetch_add(1, Ordering::SeqCst);
        lock(&self.overloads).insert((player.id, command.to_string()), overloads);
    }
}

/// All in-memory collaborators, with typed handles for inspection
#[derive(Clone, Default)]
pub struct MemoryHost {
    /// Permission engine
    pub permissions: Arc<MemoryPermissionEngine>,
    /// Input engine
    pub inputs: Arc<MemoryInputEngine>,
    /// Form engine
    pub forms: Arc<ScriptedFormEngine>,
    /// Command registry
    pub commands: Arc<RecordingCommandRegistry>,
    /// Server
    pub server: Arc<MemoryServer>,
}

impl MemoryHost {
    /// Fresh collaborators with both group nodes present
    pub fn new() -> Self {
        Self::default()
    }

    /// The collaborators as the trait objects the plugin takes
    pub fn host(&self) -> Host {
        Host::new(
            self.permissions.clone(),
            self.inputs.clone(),
            self.forms.clone(),
            self.commands.clone(),
            self.server.clone(),
        )
    }

    /// Bring a new player online
    pub fn connect(&self, name: &str) -> Player {
        let player = Player::new(name);
        self.server.add_player(&player);
        player
    }

    /// Take a player offline and drop their host-side state
    pub fn disconnect(&self, player: &Player) {
        self.server.remove_player(player);
        self.permissions.disconnect(player);
        self.inputs.remove(player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERM: &str = "inputpermission.permission.jump";

    #[test]
    fn test_operator_prefers_operator_edge() {
        let engine = MemoryPermissionEngine::new();
        let alice = Player::new("Alice");
        let everyone = engine.node(PermissionGroup::Everyone.node_name()).unwrap();
        let operators = engine.node(PermissionGroup::Operators.node_name()).unwrap();

        everyone.add_child(PERM, true);
        operators.add_child(PERM, false);
        assert!(engine.has_permission(&alice, PERM));

        engine.set_operator(&alice, true);
        assert!(!engine.has_permission(&alice, PERM));

        operators.remove_child(PERM);
        assert!(engine.has_permission(&alice, PERM));
    }

    #[test]
    fn test_override_wins() {
        let engine = MemoryPermissionEngine::new();
        let alice = Player::new("Alice");
        engine
            .node(PermissionGroup::Everyone.node_name())
            .unwrap()
            .add_child(PERM, true);

        engine.deny(&alice, PERM);
        assert!(!engine.has_permission(&alice, PERM));

        engine.clear(&alice, PERM);
        assert!(engine.has_permission(&alice, PERM));
    }

    #[test]
    fn test_callbacks_fire_on_changes_only() {
        let engine = Arc::new(MemoryPermissionEngine::new());
        let alice = Player::new("Alice");
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = fired.clone();
            engine.subscribe_recalculation(
                &alice,
                Arc::new(move |_| {
                    fired.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }
        let everyone = engine.node(PermissionGroup::Everyone.node_name()).unwrap();

        everyone.add_child(PERM, true);
        everyone.add_child(PERM, true);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        engine.set_operator(&alice, true);
        engine.set_operator(&alice, true);
        engine.grant(&Player::new("Bob"), PERM);
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        engine.disconnect(&alice);
        everyone.remove_child(PERM);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_callback_may_query_engine() {
        let engine = Arc::new(MemoryPermissionEngine::new());
        let alice = Player::new("Alice");
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let weak = Arc::downgrade(&engine);
            let seen = seen.clone();
            engine.subscribe_recalculation(
                &alice,
                Arc::new(move |player| {
                    if let Some(engine) = weak.upgrade() {
                        seen.lock().unwrap().push(engine.has_permission(player, PERM));
                    }
                }),
            );
        }

        engine.grant(&alice, PERM);
        assert_eq!(*seen.lock().unwrap(), vec![true]);
    }

    #[test]
    fn test_session_starts_enabled_and_counts_reads() {
        let inputs = MemoryInputEngine::new();
        let alice = Player::new("Alice");
        let session = inputs.session(&alice);

        assert!(session.is_category_enabled(PermissionCategory::Camera));
        session.set_category_enabled(PermissionCategory::Camera, false);

        let memory = inputs.memory_session(&alice);
        assert!(!memory.enabled().contains(PermissionCategory::Camera));
        assert_eq!(memory.reads(), 1);
    }

    #[tokio::test]
    async fn test_scripted_forms_replay_in_order() {
        let forms = ScriptedFormEngine::new();
        let alice = Player::new("Alice");
        forms.press(&alice, 1);
        forms.push(&alice, ScriptedAnswer::Fail("gone".to_string()));

        let first = forms
            .show_action(&alice, ActionForm::new("one").button("a").button("b"))
            .await
            .unwrap();
        assert_eq!(first.selection, Some(1));

        let second = forms.show_modal(&alice, ModalForm::new("two")).await;
        assert!(matches!(second, Err(InputPermissionError::FormTransport(_))));

        let third = forms.show_action(&alice, ActionForm::new("three")).await.unwrap();
        assert!(third.is_closed());
        assert_eq!(forms.titles(&alice), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_server_lookup_ignores_case() {
        let host = MemoryHost::new();
        let alice = host.connect("Alice");

        assert_eq!(host.server.player_exact("alice"), Some(alice.clone()));
        assert_eq!(host.server.player_exact("Ali"), None);

        host.disconnect(&alice);
        assert!(host.server.online_players().is_empty());
    }
}
