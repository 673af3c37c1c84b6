//! Form-driven user interface
//!
//! Each player walks an explicit state machine ([`FormState`]): every state
//! shows one form, and the answer picks the next state. Flows run as tokio
//! tasks tracked by a [`FlowRegistry`], so a player has at most one flow at
//! a time; starting another one, or quitting, aborts the current one.
//!
//! Faults inside a flow (transport errors, malformed answers, a missing
//! permission node while saving the config) are logged and end the flow.

mod flow;
mod registry;
mod state;

pub(crate) use flow::FormFlow;
pub use registry::FlowRegistry;
pub use state::{FormState, Selection};
