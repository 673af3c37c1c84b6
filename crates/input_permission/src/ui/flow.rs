//! Runs a player's form flow one state at a time.

use std::sync::Arc;
use tracing::{debug, error};

use crate::category::{InputState, PermissionCategory};
use crate::error::InputPermissionError;
use crate::forms::{ActionForm, ModalForm, ModalFormResponse};
use crate::host::Player;
use crate::messages::Feedback;
use crate::permissions::{Action, SymbolicDefault};
use crate::plugin::PluginState;
use crate::ui::{FormState, Selection};

const ROOT_TITLE: &str = "Input Permission";
const ROOT_BODY: &str = "Queries or sets the input permissions of players.";
const NO_BRANCHES: &str = "You do not have sufficient permissions :(";
const CONFIG_BUTTON: &str = "Plugin Config";

const QUERY_TITLE: &str = "Input Permission Query";
const QUERY_DESCRIPTION: &str = "Queries the status of the specified privilege of the target.";
const SET_TITLE: &str = "Input Permission Set";
const SET_DESCRIPTION: &str = "Modifies the status of the specified privilege of the target.";

const BACK_BUTTON: &str = "Back";

const ADMIN_TITLE: &str = "Plugin Config";
const ADMIN_LEGEND: &str = "- false : Permission is not granted by default\n\
- true : Permission is granted by default to everyone\n\
- op : Permission is granted by default only to operators\n\
- notop : Permission is granted by default to all players who are NOT operators";

// Query/set modal: label, divider, then these fields
const PLAYER_FIELD: usize = 2;
const PERMISSION_FIELD: usize = 3;
const STATE_FIELD: usize = 4;

// Admin modal: label, divider, header, legend, then one field per category
const ADMIN_FIELD_OFFSET: usize = 4;

/// A player's walk through the forms
pub(crate) struct FormFlow {
    plugin: Arc<PluginState>,
    player: Player,
}

impl FormFlow {
    pub(crate) fn new(plugin: Arc<PluginState>, player: Player) -> Self {
        Self { plugin, player }
    }

    /// Step from `state` until the flow exits
    ///
    /// A failing step is logged and ends the flow.
    pub(crate) async fn run(self, mut state: FormState) {
        while !state.is_exit() {
            match self.step(state).await {
                Ok(next) => state = next,
                Err(e) => {
                    error!(player = %self.player, error = %e, "Form flow failed");
                    return;
                }
            }
        }
        debug!(player = %self.player, "Form flow finished");
    }

    /// Show the form of `state` and map the answer to the next state
    pub(crate) async fn step(&self, state: FormState) -> Result<FormState, InputPermissionError> {
        match state {
            FormState::Root => self.root().await,
            FormState::Query(selection) => self.pick(Action::Query, selection).await,
            FormState::Set(selection) => self.pick(Action::Set, selection).await,
            FormState::QueryResult(feedback) => self.result(Action::Query, feedback).await,
            FormState::SetResult(feedback) => self.result(Action::Set, feedback).await,
            FormState::Admin => self.admin().await,
            FormState::Exit => Ok(FormState::Exit),
        }
    }

    async fn root(&self) -> Result<FormState, InputPermissionError> {
        let mut form = ActionForm::new(ROOT_TITLE).body(ROOT_BODY);
        let mut branches = Vec::new();

        if self.plugin.may_use(&self.player, Action::Query) {
            branches.push(FormState::Query(Selection::default()));
            form = form.button("query");
        }
        if self.plugin.may_use(&self.player, Action::Set) {
            branches.push(FormState::Set(Selection::default()));
            form = form.button("set");
        }
        if self.plugin.is_admin(&self.player) {
            branches.push(FormState::Admin);
            form = form.divider().button(CONFIG_BUTTON);
        }
        if branches.is_empty() {
            form = form.divider().label(NO_BRANCHES);
        }

        let response = self.plugin.host.forms.show_action(&self.player, form).await?;
        match response.selection {
            None => Ok(FormState::Exit),
            Some(i) => branches.get(i).cloned().ok_or_else(|| {
                InputPermissionError::form_response(format!("no branch behind button {i}"))
            }),
        }
    }

    async fn pick(&self, action: Action, selection: Selection) -> Result<FormState, InputPermissionError> {
        let (title, description) = match action {
            Action::Query => (QUERY_TITLE, QUERY_DESCRIPTION),
            Action::Set => (SET_TITLE, SET_DESCRIPTION),
        };

        let players: Vec<String> = self
            .plugin
            .host
            .server
            .online_players()
            .into_iter()
            .map(|p| p.name)
            .collect();
        let player_index = selection
            .target
            .as_deref()
            .and_then(|target| players.iter().position(|name| name.eq_ignore_ascii_case(target)));
        let categories = PermissionCategory::ALL
            .iter()
            .map(|c| c.label().to_string())
            .collect();

        let form = ModalForm::new(title)
            .label(description)
            .divider()
            .dropdown(
                "Player",
                players.clone(),
                player_index,
                Some("Specifies the owner of the permission."),
            )
            .dropdown(
                "Permission",
                categories,
                selection.category.map(PermissionCategory::index),
                Some("Specifies the authority for the operation."),
            )
            .toggle("State", true, Some("The status of the specified permission."));

        let response = self.plugin.host.forms.show_modal(&self.player, form).await?;
        if response.is_closed() {
            return Ok(FormState::Root);
        }

        let (target_name, category, state) = read_pick(&response, &players)?;
        let Some(target) = self.plugin.host.server.player_exact(target_name) else {
            debug!(player = %self.player, target = target_name, "Form target went offline");
            return Ok(FormState::Exit);
        };
        if !self.plugin.authorized(&self.player, &target, action) {
            self.plugin.tell(&self.player, &Feedback::NoPermission);
            return Ok(FormState::Exit);
        }

        Ok(match action {
            Action::Query => FormState::QueryResult(self.plugin.query(&target, category, Some(state))),
            Action::Set => FormState::SetResult(self.plugin.set(&target, category, state)),
        })
    }

    async fn result(&self, action: Action, feedback: Feedback) -> Result<FormState, InputPermissionError> {
        let title = match action {
            Action::Query => QUERY_TITLE,
            Action::Set => SET_TITLE,
        };
        let form = ActionForm::new(title)
            .body(feedback.to_string())
            .button(BACK_BUTTON);

        let response = self.plugin.host.forms.show_action(&self.player, form).await?;
        Ok(match response.selection {
            Some(0) => FormState::pick(action, Selection::default()),
            _ => FormState::Exit,
        })
    }

    async fn admin(&self) -> Result<FormState, InputPermissionError> {
        let policy = self.plugin.policy();
        let mut form = ModalForm::new(ADMIN_TITLE)
            .label("Default input permission for players")
            .divider()
            .header("Permissions:")
            .label(ADMIN_LEGEND);
        for (category, default) in policy.iter() {
            form = form.text_field(
                category.label(),
                default.as_str(),
                default.as_str(),
                Some(category.description()),
            );
        }
        form = form.submit_button("Save");

        let response = self.plugin.host.forms.show_modal(&self.player, form).await?;
        if response.is_closed() {
            return Ok(FormState::Root);
        }

        let mut changes = Vec::new();
        for category in PermissionCategory::ALL {
            let value = response.text(ADMIN_FIELD_OFFSET + category.index())?;
            match value.parse::<SymbolicDefault>() {
                Ok(default) => changes.push((category, default)),
                Err(_) => self.plugin.tell(
                    &self.player,
                    &Feedback::InvalidDefault {
                        category,
                        value: value.to_string(),
                    },
                ),
            }
        }

        let updated = self.plugin.update_defaults(&changes)?;
        let feedback = if updated.is_empty() {
            Feedback::NoChanges
        } else {
            Feedback::ConfigUpdated(updated)
        };
        self.plugin.tell(&self.player, &feedback);
        Ok(FormState::Exit)
    }
}

fn read_pick<'a>(
    response: &ModalFormResponse,
    players: &'a [String],
) -> Result<(&'a str, PermissionCategory, InputState), InputPermissionError> {
    let player_index = response.index(PLAYER_FIELD)?;
    let target = players.get(player_index).ok_or_else(|| {
        InputPermissionError::form_response(format!("no player at index {player_index}"))
    })?;

    let category_index = response.index(PERMISSION_FIELD)?;
    let category = PermissionCategory::from_index(category_index).ok_or_else(|| {
        InputPermissionError::form_response(format!("no category at index {category_index}"))
    })?;

    let state = InputState::from(response.toggle(STATE_FIELD)?);
    Ok((target, category, state))
}
