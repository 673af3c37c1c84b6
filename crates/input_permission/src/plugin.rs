//! The input permission plugin
//!
//! [`InputPermissionPlugin`] ties the pieces together and exposes the hooks a
//! host server calls:
//!
//! - **enable** - load the default policy, write it into the permission tree, save
//! - **player join** - recheck the player, subscribe to recalculations, publish overloads
//! - **player quit** - abort the player's form flow
//! - **command** - run `/inputpermission` or open the matching form
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   InputPermissionPlugin                    │
//! │                                                            │
//! │  on_command() ──▶ CommandRequest ──┬──▶ query() / set()    │
//! │                                    └──▶ FormFlow (task)    │
//! │                                            │               │
//! │  PolicyStore ──▶ PolicyReconciler ──▶ group edges          │
//! │                                            │ recalculation │
//! │  on_player_join() ──▶ Rechecker ◀──────────┘               │
//! └────────────────────────────────────────────────────────────┘
//!            ↕ Host collaborators (traits in `host`)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use input_permission::prelude::*;
//! use input_permission::testing::MemoryHost;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), InputPermissionError> {
//! let memory = MemoryHost::new();
//! let plugin = InputPermissionPlugin::enable(memory.host(), PluginOptions::default())?;
//!
//! let alice = memory.connect("Alice");
//! plugin.on_player_join(&alice);
//!
//! let outcome = plugin.on_command(
//!     &CommandSender::Player(alice.clone()),
//!     &["query", "Alice", "camera"],
//! );
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::category::{CategorySet, InputState, PermissionCategory};
use crate::command::{overloads_for, CommandRequest, COMMAND_NAME};
use crate::config::PolicyStore;
use crate::error::InputPermissionError;
use crate::host::{CommandSender, Host, Player, RecalculationCallback};
use crate::messages::Feedback;
use crate::options::PluginOptions;
use crate::permissions::{
    Action, DefaultPolicy, PermissionNames, PolicyReconciler, Rechecker, SymbolicDefault,
};
use crate::ui::{FlowRegistry, FormFlow, FormState, Selection};

/// What handling a command did
#[derive(Debug)]
pub enum CommandOutcome {
    /// The sender is not a player
    Ignored,
    /// A message was sent to the sender
    Replied(Feedback),
    /// A form flow was started; the handle resolves when it ends
    FormOpened(JoinHandle<()>),
}

/// State shared by the plugin handle, its form flows and its callbacks
pub(crate) struct PluginState {
    pub(crate) host: Host,
    options: PluginOptions,
    names: PermissionNames,
    store: Mutex<PolicyStore>,
    reconciler: PolicyReconciler,
    rechecker: Rechecker,
    flows: FlowRegistry,
}

impl PluginState {
    fn store(&self) -> MutexGuard<'_, PolicyStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn holds(&self, player: &Player, permission: &str) -> bool {
        self.host.permissions.has_permission(player, permission)
    }

    /// Whether the player may run `action` on anyone at all
    pub(crate) fn may_use(&self, player: &Player, action: Action) -> bool {
        self.holds(player, &self.names.for_action(action, true))
            || self.holds(player, &self.names.for_action(action, false))
    }

    pub(crate) fn is_admin(&self, player: &Player) -> bool {
        self.holds(player, &self.names.admin())
    }

    /// Whether `sender` may run `action` on `target`
    pub(crate) fn authorized(&self, sender: &Player, target: &Player, action: Action) -> bool {
        self.holds(sender, &self.names.for_action(action, sender.is(target)))
    }

    pub(crate) fn query(
        &self,
        target: &Player,
        category: PermissionCategory,
        state: Option<InputState>,
    ) -> Feedback {
        let enabled = self
            .host
            .inputs
            .session(target)
            .is_category_enabled(category);
        match state {
            Some(state) => Feedback::Query {
                category,
                count: u32::from(InputState::from(enabled) == state),
                state,
            },
            None => Feedback::QueryVerbose {
                category,
                enabled: u32::from(enabled),
                disabled: u32::from(!enabled),
            },
        }
    }

    pub(crate) fn set(&self, target: &Player, category: PermissionCategory, state: InputState) -> Feedback {
        self.host
            .inputs
            .session(target)
            .set_category_enabled(category, state.is_enabled());
        info!(target = %target, category = %category, state = %state, "Set input permission");
        Feedback::Set {
            category,
            state,
            target: target.name.clone(),
        }
    }

    pub(crate) fn tell(&self, player: &Player, feedback: &Feedback) {
        self.host.server.send_message(player, &feedback.to_string());
    }

    pub(crate) fn policy(&self) -> DefaultPolicy {
        *self.store().policy()
    }

    /// Apply and store the given defaults, returning the ones that changed
    ///
    /// A default is committed to the store only after its edges were applied,
    /// so a failed apply can be retried. Whatever was committed is saved, even
    /// when a later apply fails.
    pub(crate) fn update_defaults(
        &self,
        changes: &[(PermissionCategory, SymbolicDefault)],
    ) -> Result<Vec<(PermissionCategory, SymbolicDefault)>, InputPermissionError> {
        let mut updated = Vec::new();
        let mut failure = None;
        for &(category, default) in changes {
            if self.store().get(category) == default {
                continue;
            }
            if let Err(e) = self.reconciler.apply_category(category, default) {
                failure = Some(e);
                break;
            }
            self.store().update(category, default);
            updated.push((category, default));
        }

        if !updated.is_empty() {
            self.store().save()?;
            info!(changed = updated.len(), "Updated default input permissions");
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(updated),
        }
    }

    fn refresh(&self, player: &Player) {
        self.rechecker.recheck(player);
        self.publish_overloads(player);
    }

    fn publish_overloads(&self, player: &Player) {
        let overloads = overloads_for(self.host.permissions.as_ref(), &self.names, player);
        self.host.commands.set_overloads(player, COMMAND_NAME, overloads);
    }

    fn open_form(self: &Arc<Self>, player: &Player, state: FormState) -> JoinHandle<()> {
        debug!(player = %player, state = ?state, "Opening form");
        let flow = FormFlow::new(self.clone(), player.clone());
        self.flows.start(player, flow.run(state))
    }
}

/// The plugin, enabled against a host
///
/// Cheap to clone; clones share all state.
///
/// # Lifecycle
///
/// 1. **Enable** - [`enable()`](Self::enable) with the host collaborators
/// 2. **Join** - [`on_player_join()`](Self::on_player_join) for every player that connects
/// 3. **Command** - [`on_command()`](Self::on_command) for `/inputpermission`
/// 4. **Quit** - [`on_player_quit()`](Self::on_player_quit) when a player leaves
///
/// Opening a form spawns a tokio task, so commands and
/// [`show_form()`](Self::show_form) must run inside a tokio runtime.
#[derive(Clone)]
pub struct InputPermissionPlugin {
    state: Arc<PluginState>,
}

impl std::fmt::Debug for InputPermissionPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputPermissionPlugin")
            .field("options", &self.state.options)
            .finish_non_exhaustive()
    }
}

impl InputPermissionPlugin {
    /// Load the default policy, apply it to the permission tree and save it
    ///
    /// # Errors
    ///
    /// - the configuration file cannot be read, parsed or written
    /// - the host has no everyone or operators group node
    pub fn enable(host: Host, options: PluginOptions) -> Result<Self, InputPermissionError> {
        let names = options.permission_names();
        let mut store = PolicyStore::load(&options.config_path)?;
        let reconciler = PolicyReconciler::new(host.permissions.clone(), names.clone());
        reconciler.apply_policy(store.policy())?;
        store.save()?;

        let rechecker = Rechecker::new(host.permissions.clone(), host.inputs.clone(), names.clone());
        info!(
            config = %options.config_path.display(),
            namespace = %options.namespace,
            "InputPermission enabled"
        );

        Ok(Self {
            state: Arc::new(PluginState {
                host,
                options,
                names,
                store: Mutex::new(store),
                reconciler,
                rechecker,
                flows: FlowRegistry::new(),
            }),
        })
    }

    /// Options the plugin was enabled with
    pub fn options(&self) -> &PluginOptions {
        &self.state.options
    }

    /// Permission strings in use
    pub fn names(&self) -> &PermissionNames {
        &self.state.names
    }

    /// Current default policy
    pub fn policy(&self) -> DefaultPolicy {
        self.state.policy()
    }

    /// Recheck a player that just joined and keep them rechecked
    ///
    /// Every later permission recalculation for the player rechecks their
    /// input permissions again and republishes their command overloads.
    pub fn on_player_join(&self, player: &Player) {
        self.state.refresh(player);

        let plugin: Weak<PluginState> = Arc::downgrade(&self.state);
        let callback: RecalculationCallback = Arc::new(move |player: &Player| {
            if let Some(state) = plugin.upgrade() {
                state.refresh(player);
            }
        });
        self.state
            .host
            .permissions
            .subscribe_recalculation(player, callback);
        debug!(player = %player, "Player joined");
    }

    /// Abort the form flow of a player that left
    pub fn on_player_quit(&self, player: &Player) {
        if self.state.flows.abort(player) {
            debug!(player = %player, "Aborted form flow on quit");
        }
    }

    /// Recheck a player's input permissions now
    pub fn recheck(&self, player: &Player) -> CategorySet {
        self.state.rechecker.recheck(player)
    }

    /// Handle `/inputpermission <args>`
    ///
    /// Arguments are checked in order: target online, sender permission,
    /// category, state. A missing target, category or state opens the
    /// matching form with what was valid so far; a missing permission is
    /// answered with a rejection and nothing is read or written.
    pub fn on_command<S: AsRef<str>>(&self, sender: &CommandSender, args: &[S]) -> CommandOutcome {
        let Some(player) = sender.as_player() else {
            return CommandOutcome::Ignored;
        };

        match CommandRequest::parse(args) {
            CommandRequest::Menu => self.form(player, FormState::Root),
            CommandRequest::Prefill {
                action,
                target,
                category,
            } => {
                let category = category.as_deref().and_then(PermissionCategory::from_name);
                self.form(player, FormState::pick(action, Selection::new(target, category)))
            }
            CommandRequest::Run {
                action,
                target,
                category,
                state,
            } => self.run(player, action, &target, &category, state.as_deref()),
        }
    }

    fn run(
        &self,
        player: &Player,
        action: Action,
        target_name: &str,
        category: &str,
        state: Option<&str>,
    ) -> CommandOutcome {
        let Some(target) = self.state.host.server.player_exact(target_name) else {
            return self.form(player, FormState::pick(action, Selection::default()));
        };
        if !self.state.authorized(player, &target, action) {
            return self.reply(player, Feedback::NoPermission);
        }

        let Some(category) = PermissionCategory::from_name(category) else {
            let selection = Selection::new(Some(target_name.to_string()), None);
            return self.form(player, FormState::pick(action, selection));
        };
        let state = match state.map(str::parse::<InputState>) {
            None => None,
            Some(Ok(state)) => Some(state),
            Some(Err(_)) => {
                let selection = Selection::new(Some(target_name.to_string()), Some(category));
                return self.form(player, FormState::pick(action, selection));
            }
        };

        let feedback = match (action, state) {
            (Action::Query, state) => self.state.query(&target, category, state),
            (Action::Set, Some(state)) => self.state.set(&target, category, state),
            (Action::Set, None) => {
                let selection = Selection::new(Some(target_name.to_string()), Some(category));
                return self.form(player, FormState::Set(selection));
            }
        };
        self.reply(player, feedback)
    }

    fn reply(&self, player: &Player, feedback: Feedback) -> CommandOutcome {
        self.state.tell(player, &feedback);
        CommandOutcome::Replied(feedback)
    }

    fn form(&self, player: &Player, state: FormState) -> CommandOutcome {
        CommandOutcome::FormOpened(self.show_form(player, state))
    }

    /// Start a form flow for the player at `state`
    ///
    /// Any flow the player already had is aborted.
    pub fn show_form(&self, player: &Player, state: FormState) -> JoinHandle<()> {
        self.state.open_form(player, state)
    }

    /// Read a category of the target's session
    ///
    /// With a state, the answer counts whether the target matches it.
    pub fn query(&self, target: &Player, category: PermissionCategory, state: Option<InputState>) -> Feedback {
        self.state.query(target, category, state)
    }

    /// Overwrite a category of the target's session
    ///
    /// This is a runtime override; the permission tree is untouched and the
    /// next recheck of the target replaces it.
    pub fn set(&self, target: &Player, category: PermissionCategory, state: InputState) -> Feedback {
        self.state.set(target, category, state)
    }

    /// Change one category's default, apply it and save
    ///
    /// Returns whether the default changed.
    pub fn update_default(
        &self,
        category: PermissionCategory,
        default: SymbolicDefault,
    ) -> Result<bool, InputPermissionError> {
        Ok(!self.state.update_defaults(&[(category, default)])?.is_empty())
    }

    /// Re-read the configuration file and apply it
    pub fn reload_defaults(&self) -> Result<(), InputPermissionError> {
        let policy = *self.state.store().reload()?;
        self.state.reconciler.apply_policy(&policy)?;
        self.state.store().save()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::PermissionEngine;
    use crate::permissions::PermissionGroup;
    use crate::testing::MemoryHost;
    use tempfile::TempDir;

    fn setup() -> (TempDir, MemoryHost, InputPermissionPlugin) {
        let dir = TempDir::new().unwrap();
        let memory = MemoryHost::new();
        let options = PluginOptions::builder()
            .config_path(dir.path().join("config.yml"))
            .build();
        let plugin = InputPermissionPlugin::enable(memory.host(), options).unwrap();
        (dir, memory, plugin)
    }

    fn sender(player: &Player) -> CommandSender {
        CommandSender::Player(player.clone())
    }

    #[tokio::test]
    async fn test_enable_writes_config() {
        let (dir, memory, _plugin) = setup();
        let written = std::fs::read_to_string(dir.path().join("config.yml")).unwrap();
        assert!(written.contains("move_right"));

        let alice = memory.connect("Alice");
        assert!(memory.permissions.has_permission(&alice, "inputpermission.permission.camera"));
    }

    #[tokio::test]
    async fn test_console_is_ignored() {
        let (_dir, _memory, plugin) = setup();
        let outcome = plugin.on_command(&CommandSender::Console, &["query", "Alice", "camera"]);
        assert!(matches!(outcome, CommandOutcome::Ignored));
    }

    #[tokio::test]
    async fn test_query_self() {
        let (_dir, memory, plugin) = setup();
        let alice = memory.connect("Alice");
        memory.permissions.grant(&alice, &plugin.names().query_self());
        plugin.on_player_join(&alice);

        let outcome = plugin.on_command(&sender(&alice), &["query", "alice", "JUMP", "enabled"]);
        match outcome {
            CommandOutcome::Replied(Feedback::Query { category, count, state }) => {
                assert_eq!(category, PermissionCategory::Jump);
                assert_eq!(count, 1);
                assert_eq!(state, InputState::Enabled);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_without_state_is_verbose() {
        let (_dir, memory, plugin) = setup();
        let alice = memory.connect("Alice");
        memory.permissions.grant(&alice, &plugin.names().query_self());
        memory.permissions.deny(&alice, "inputpermission.permission.sneak");
        plugin.on_player_join(&alice);

        let outcome = plugin.on_command(&sender(&alice), &["query", "Alice", "sneak"]);
        assert!(matches!(
            outcome,
            CommandOutcome::Replied(Feedback::QueryVerbose { enabled: 0, disabled: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_arguments_open_prefilled_form() {
        let (_dir, memory, plugin) = setup();
        let alice = memory.connect("Alice");
        memory.permissions.grant(&alice, &plugin.names().set_self());

        let CommandOutcome::FormOpened(handle) =
            plugin.on_command(&sender(&alice), &["set", "Alice", "move_left", "maybe"])
        else {
            panic!("expected a form");
        };
        handle.await.unwrap();

        let shown = memory.forms.shown_to(&alice);
        let crate::testing::ShownForm::Modal(form) = &shown[0] else {
            panic!("expected the set form");
        };
        assert_eq!(form.title, "Input Permission Set");
        assert!(matches!(
            &form.elements[2],
            crate::forms::ModalElement::Dropdown { default: Some(0), .. }
        ));
        assert!(matches!(
            &form.elements[3],
            crate::forms::ModalElement::Dropdown { default: Some(9), .. }
        ));
        // Closing the set form falls back to the root menu
        assert_eq!(memory.forms.titles(&alice), vec!["Input Permission Set", "Input Permission"]);
    }

    #[tokio::test]
    async fn test_offline_target_opens_empty_form() {
        let (_dir, memory, plugin) = setup();
        let alice = memory.connect("Alice");

        let CommandOutcome::FormOpened(handle) =
            plugin.on_command(&sender(&alice), &["query", "Nobody", "camera"])
        else {
            panic!("expected a form");
        };
        handle.await.unwrap();
        assert_eq!(memory.forms.titles(&alice)[0], "Input Permission Query");
    }

    #[tokio::test]
    async fn test_update_default_reconciles_and_saves() {
        let (dir, memory, plugin) = setup();
        let alice = memory.connect("Alice");
        plugin.on_player_join(&alice);

        assert!(plugin.update_default(PermissionCategory::Camera, SymbolicDefault::Op).unwrap());
        assert!(!plugin.update_default(PermissionCategory::Camera, SymbolicDefault::Op).unwrap());

        // The edge change fires recalculation, which rechecks Alice
        let session = memory.inputs.memory_session(&alice);
        assert!(!session.enabled().contains(PermissionCategory::Camera));

        let written = std::fs::read_to_string(dir.path().join("config.yml")).unwrap();
        assert!(written.contains("camera: op"));
    }

    #[tokio::test]
    async fn test_failed_update_can_be_retried() {
        let (dir, memory, plugin) = setup();
        let operators = PermissionGroup::Operators.node_name();
        let camera = "inputpermission.permission.camera";
        assert!(memory.permissions.remove_node(operators));

        let err = plugin
            .update_default(PermissionCategory::Camera, SymbolicDefault::Op)
            .unwrap_err();
        assert!(matches!(err, InputPermissionError::MissingPermissionNode { .. }));
        assert_eq!(plugin.policy().get(PermissionCategory::Camera), SymbolicDefault::True);
        assert_eq!(memory.permissions.edge(PermissionGroup::Everyone, camera), Some(true));

        memory.permissions.add_node(operators);
        assert!(plugin.update_default(PermissionCategory::Camera, SymbolicDefault::Op).unwrap());

        assert_eq!(plugin.policy().get(PermissionCategory::Camera), SymbolicDefault::Op);
        assert_eq!(memory.permissions.edge(PermissionGroup::Everyone, camera), None);
        assert_eq!(memory.permissions.edge(PermissionGroup::Operators, camera), Some(true));
        let written = std::fs::read_to_string(dir.path().join("config.yml")).unwrap();
        assert!(written.contains("camera: op"));
    }

    #[tokio::test]
    async fn test_reload_picks_up_file_changes() {
        let (dir, memory, plugin) = setup();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "default:\n  jump: \"false\"\n").unwrap();

        plugin.reload_defaults().unwrap();

        assert_eq!(plugin.policy().get(PermissionCategory::Jump), SymbolicDefault::False);
        let alice = memory.connect("Alice");
        assert!(!memory.permissions.has_permission(&alice, "inputpermission.permission.jump"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("move_left"));
    }

    #[tokio::test]
    async fn test_join_publishes_overloads_and_recalculation_refreshes() {
        let (_dir, memory, plugin) = setup();
        let alice = memory.connect("Alice");
        plugin.on_player_join(&alice);

        assert_eq!(memory.commands.overloads(&alice, COMMAND_NAME), Some(vec![]));
        assert_eq!(memory.permissions.subscriptions(&alice), 1);

        memory.permissions.grant(&alice, &plugin.names().set_other());
        assert_eq!(memory.commands.overloads(&alice, COMMAND_NAME).unwrap().len(), 1);
    }
}
