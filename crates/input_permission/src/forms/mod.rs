//! Server forms and their answers
//!
//! Two kinds of form are used by the plugin:
//!
//! - [`ActionForm`] - title, body and buttons; answered by a button index
//! - [`ModalForm`] - title and input fields; answered by one value per element
//!
//! Both serialize to the client's server-form JSON via `to_json()` and decode
//! the client's answer via `from_json()`. A `null` answer means the player
//! closed the form.
//!
//! Hosts that already pair forms with answers implement
//! [`FormEngine`](crate::host::FormEngine) directly. Hosts that can only send
//! a form packet and report the raw answer wrap that channel in a
//! [`FormDispatcher`], which tracks open forms in [`PendingForms`].

mod action;
mod dispatcher;
mod modal;
mod pending;

pub use action::{ActionElement, ActionForm, ActionFormResponse};
pub use dispatcher::{FormDispatcher, FormTransport};
pub use modal::{FormValue, ModalElement, ModalForm, ModalFormResponse};
pub use pending::PendingForms;
