//! The `/inputpermission` command
//!
//! - [`CommandRequest`] classifies the raw arguments
//! - [`overloads_for`] builds the autocomplete hints a player is allowed to see
//!
//! Running a request against the host lives in
//! [`InputPermissionPlugin::on_command`](crate::plugin::InputPermissionPlugin::on_command).

mod overloads;
mod parser;

pub use overloads::{overloads_for, CommandEnum, CommandOverload, CommandParameter, ParameterType};
pub use parser::CommandRequest;

/// Name the command is registered under
pub const COMMAND_NAME: &str = "inputpermission";
