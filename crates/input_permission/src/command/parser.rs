//! Text command argument parsing.

use crate::permissions::Action;

/// What a `/inputpermission` invocation asks for, before any lookup
///
/// Parsing is purely positional. Whether the target is online, whether the
/// sender may act on it and whether the category and state spell something
/// valid is decided afterwards, in that order, by the plugin.
///
/// # Examples
///
/// ```
/// use input_permission::command::CommandRequest;
/// use input_permission::permissions::Action;
///
/// assert_eq!(CommandRequest::parse(&[] as &[&str]), CommandRequest::Menu);
///
/// let request = CommandRequest::parse(&["set", "Alice", "camera", "disabled"]);
/// assert_eq!(
///     request,
///     CommandRequest::Run {
///         action: Action::Set,
///         target: "Alice".to_string(),
///         category: "camera".to_string(),
///         state: Some("disabled".to_string()),
///     }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRequest {
    /// No recognized subcommand; open the root form
    Menu,
    /// Too few arguments; open the action's form with whatever was given
    Prefill {
        /// Subcommand
        action: Action,
        /// Target name, if given
        target: Option<String>,
        /// Category name, if given
        category: Option<String>,
    },
    /// Enough arguments to run the action
    Run {
        /// Subcommand
        action: Action,
        /// Target name
        target: String,
        /// Category name, unvalidated
        category: String,
        /// Requested state, unvalidated; always present for `set`
        state: Option<String>,
    },
}

impl CommandRequest {
    /// Classify the raw arguments that followed the command name
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        let arg = |i: usize| args.get(i).map(|s| s.as_ref().to_string());

        let (action, required) = match args.first().map(AsRef::as_ref) {
            Some("query") => (Action::Query, 3),
            Some("set") => (Action::Set, 4),
            _ => return CommandRequest::Menu,
        };

        if args.len() < required {
            return CommandRequest::Prefill {
                action,
                target: arg(1),
                category: arg(2),
            };
        }

        CommandRequest::Run {
            action,
            target: arg(1).unwrap_or_default(),
            category: arg(2).unwrap_or_default(),
            state: arg(3),
        }
    }
}
