//! Per-player autocomplete overloads for the command.

use serde::{Deserialize, Serialize};

use crate::category::{InputState, PermissionCategory};
use crate::host::{PermissionEngine, Player};
use crate::permissions::PermissionNames;

/// A named list of literal values accepted by a parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEnum {
    /// Enum name as registered with the client
    pub name: String,
    /// Accepted values
    pub values: Vec<String>,
}

impl CommandEnum {
    /// Create an enum from its values
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Argument type of a parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParameterType {
    /// One of the values of an enum
    Enum(CommandEnum),
    /// A player selector
    Target,
}

/// One positional parameter of an overload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandParameter {
    /// Parameter name shown in the hint
    pub name: String,
    /// Accepted argument type
    #[serde(rename = "kind")]
    pub parameter_type: ParameterType,
    /// Whether the argument may be omitted
    pub optional: bool,
}

impl CommandParameter {
    /// An enum parameter
    pub fn enumeration(name: impl Into<String>, values: CommandEnum, optional: bool) -> Self {
        Self {
            name: name.into(),
            parameter_type: ParameterType::Enum(values),
            optional,
        }
    }

    /// A required player-selector parameter
    pub fn target(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter_type: ParameterType::Target,
            optional: false,
        }
    }
}

/// One usage line of the command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOverload {
    /// Whether further subcommands may follow
    pub chaining: bool,
    /// Positional parameters
    pub parameters: Vec<CommandParameter>,
}

fn overload(option: &str, enum_name: &str, state_optional: bool) -> CommandOverload {
    let categories = CommandEnum::new(
        "permission",
        PermissionCategory::ALL.iter().map(|c| c.name()),
    );
    let states = CommandEnum::new("state", InputState::ALL.iter().map(|s| s.as_str()));

    CommandOverload {
        chaining: false,
        parameters: vec![
            CommandParameter::enumeration("option", CommandEnum::new(enum_name, [option]), false),
            CommandParameter::target("targets"),
            CommandParameter::enumeration("permission", categories, false),
            CommandParameter::enumeration("state", states, state_optional),
        ],
    }
}

/// Overloads a player is shown for `/inputpermission`
///
/// The `query` line appears with query.self or query.other, the `set` line
/// with set.self or set.other. A player with neither gets no overloads and
/// sees the bare command only.
pub fn overloads_for(
    permissions: &dyn PermissionEngine,
    names: &PermissionNames,
    player: &Player,
) -> Vec<CommandOverload> {
    let holds = |permission: String| permissions.has_permission(player, &permission);

    let mut overloads = Vec::new();
    if holds(names.query_self()) || holds(names.query_other()) {
        overloads.push(overload("query", "Option_Query", true));
    }
    if holds(names.set_self()) || holds(names.set_other()) {
        overloads.push(overload("set", "Option_Set", false));
    }
    overloads
}
