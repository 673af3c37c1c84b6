//! Permission strings declared and consumed by the plugin.

use crate::category::PermissionCategory;

/// Permission strings derived from a namespace
///
/// # Examples
///
/// ```
/// use input_permission::permissions::PermissionNames;
/// use input_permission::PermissionCategory;
///
/// let names = PermissionNames::new("inputpermission");
/// assert_eq!(
///     names.category(PermissionCategory::Jump),
///     "inputpermission.permission.jump"
/// );
/// assert_eq!(names.set_other(), "inputpermission.command.set.other");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionNames {
    namespace: String,
}

impl PermissionNames {
    /// Create names under the given namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// The namespace all names share
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Permission granting an input category
    pub fn category(&self, category: PermissionCategory) -> String {
        format!("{}.permission.{}", self.namespace, category.name())
    }

    /// Querying your own input permissions
    pub fn query_self(&self) -> String {
        format!("{}.command.query.self", self.namespace)
    }

    /// Querying another player's input permissions
    pub fn query_other(&self) -> String {
        format!("{}.command.query.other", self.namespace)
    }

    /// Setting your own input permissions
    pub fn set_self(&self) -> String {
        format!("{}.command.set.self", self.namespace)
    }

    /// Setting another player's input permissions
    pub fn set_other(&self) -> String {
        format!("{}.command.set.other", self.namespace)
    }

    /// Editing the default policy through the config form
    pub fn admin(&self) -> String {
        format!("{}.command.admin", self.namespace)
    }

    /// Permission needed for `action`, depending on who the target is
    pub fn for_action(&self, action: Action, on_self: bool) -> String {
        match (action, on_self) {
            (Action::Query, true) => self.query_self(),
            (Action::Query, false) => self.query_other(),
            (Action::Set, true) => self.set_self(),
            (Action::Set, false) => self.set_other(),
        }
    }
}

/// Operation a sender performs on a target's input permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read a category's state
    Query,
    /// Overwrite a category's state
    Set,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_permissions() {
        let names = PermissionNames::new("inputpermission");
        assert_eq!(names.query_self(), "inputpermission.command.query.self");
        assert_eq!(names.query_other(), "inputpermission.command.query.other");
        assert_eq!(names.set_self(), "inputpermission.command.set.self");
        assert_eq!(names.set_other(), "inputpermission.command.set.other");
        assert_eq!(names.admin(), "inputpermission.command.admin");
    }

    #[test]
    fn test_for_action_picks_self_or_other() {
        let names = PermissionNames::new("ip");
        assert_eq!(names.for_action(Action::Query, true), "ip.command.query.self");
        assert_eq!(names.for_action(Action::Query, false), "ip.command.query.other");
        assert_eq!(names.for_action(Action::Set, true), "ip.command.set.self");
        assert_eq!(names.for_action(Action::Set, false), "ip.command.set.other");
    }

    #[test]
    fn test_category_permission_uses_snake_case_name() {
        let names = PermissionNames::new("inputpermission");
        assert_eq!(
            names.category(PermissionCategory::LateralMovement),
            "inputpermission.permission.lateral_movement"
        );
    }
}
