//! States of the per-player form flow.

use crate::category::PermissionCategory;
use crate::messages::Feedback;
use crate::permissions::Action;

/// Partial answer carried into a query or set form
///
/// Used to prefill the Player and Permission dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Name of the preselected player
    pub target: Option<String>,
    /// Preselected category
    pub category: Option<PermissionCategory>,
}

impl Selection {
    /// A selection with the given fields
    pub fn new(target: Option<String>, category: Option<PermissionCategory>) -> Self {
        Self { target, category }
    }
}

/// Where a player's form flow currently is
///
/// Each state shows one form; its answer decides the next state. The flow
/// ends on [`FormState::Exit`].
///
/// ```text
/// Root ──query──▶ Query ──submit──▶ QueryResult ──Back──▶ Query
///   │               └──close──▶ Root
///   ├──set────▶ Set ────submit──▶ SetResult ────Back──▶ Set
///   │               └──close──▶ Root
///   └──config─▶ Admin ──submit──▶ Exit
///                   └──close──▶ Root
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Menu of the branches the player may use
    Root,
    /// Query form
    Query(Selection),
    /// Outcome of a query, with a Back button
    QueryResult(Feedback),
    /// Set form
    Set(Selection),
    /// Outcome of a set, with a Back button
    SetResult(Feedback),
    /// Default-policy editor
    Admin,
    /// Flow finished
    Exit,
}

impl FormState {
    /// The query or set form for `action`
    pub fn pick(action: Action, selection: Selection) -> Self {
        match action {
            Action::Query => FormState::Query(selection),
            Action::Set => FormState::Set(selection),
        }
    }

    /// Whether the flow has finished
    pub fn is_exit(&self) -> bool {
        matches!(self, FormState::Exit)
    }
}
