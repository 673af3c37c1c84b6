//! Action forms: a body of text and a column of buttons.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::InputPermissionError;

/// One entry of an action form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionElement {
    /// A selectable button
    Button {
        /// Button caption
        text: String,
    },
    /// A horizontal rule
    Divider,
    /// Plain text between buttons
    Label {
        /// Label text
        text: String,
    },
}

/// A form with a title, a body and buttons
///
/// # Examples
///
/// ```
/// use input_permission::forms::ActionForm;
///
/// let form = ActionForm::new("Input Permission")
///     .body("Pick one")
///     .button("query")
///     .divider()
///     .button("Plugin Config");
///
/// assert_eq!(form.button_count(), 2);
/// assert_eq!(form.to_json()["type"], "form");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionForm {
    /// Window title
    pub title: String,
    /// Text above the buttons
    pub body: String,
    /// Buttons and decorations, top to bottom
    pub elements: Vec<ActionElement>,
}

impl ActionForm {
    /// Start a form with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the body text
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a button
    pub fn button(mut self, text: impl Into<String>) -> Self {
        self.elements.push(ActionElement::Button { text: text.into() });
        self
    }

    /// Append a divider
    pub fn divider(mut self) -> Self {
        self.elements.push(ActionElement::Divider);
        self
    }

    /// Append a label
    pub fn label(mut self, text: impl Into<String>) -> Self {
        self.elements.push(ActionElement::Label { text: text.into() });
        self
    }

    /// Captions of the buttons, in selection-index order
    pub fn buttons(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            ActionElement::Button { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Number of selectable buttons
    pub fn button_count(&self) -> usize {
        self.buttons().count()
    }

    /// Wire representation sent to the client
    pub fn to_json(&self) -> Value {
        json!({
            "type": "form",
            "title": self.title,
            "content": self.body,
            "elements": self.elements,
        })
    }
}

/// Answer to an [`ActionForm`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionFormResponse {
    /// Index of the chosen button, or `None` if the form was closed
    pub selection: Option<usize>,
}

impl ActionFormResponse {
    /// The player picked the button at `index`
    pub fn selected(index: usize) -> Self {
        Self {
            selection: Some(index),
        }
    }

    /// The player closed the form
    pub fn closed() -> Self {
        Self { selection: None }
    }

    /// Whether the form was closed without a choice
    pub fn is_closed(&self) -> bool {
        self.selection.is_none()
    }

    /// Decode the client's answer to `form`
    ///
    /// `null` means closed; otherwise the answer must be the index of an
    /// existing button.
    pub fn from_json(form: &ActionForm, raw: &Value) -> Result<Self, InputPermissionError> {
        match raw {
            Value::Null => Ok(Self::closed()),
            Value::Number(n) => {
                let index = n
                    .as_u64()
                    .and_then(|i| usize::try_from(i).ok())
                    .filter(|i| *i < form.button_count())
                    .ok_or_else(|| {
                        InputPermissionError::form_response(format!(
                            "button {n} does not exist (form has {})",
                            form.button_count()
                        ))
                    })?;
                Ok(Self::selected(index))
            }
            other => Err(InputPermissionError::form_response(format!(
                "expected button index, found {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ActionForm {
        ActionForm::new("Title")
            .body("Body")
            .button("a")
            .divider()
            .label("note")
            .button("b")
    }

    #[test]
    fn test_buttons_skip_decorations() {
        let form = sample();
        assert_eq!(form.buttons().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(form.button_count(), 2);
    }

    #[test]
    fn test_to_json_shape() {
        let json = sample().to_json();
        assert_eq!(json["type"], "form");
        assert_eq!(json["content"], "Body");
        assert_eq!(json["elements"][0], json!({ "type": "button", "text": "a" }));
        assert_eq!(json["elements"][1], json!({ "type": "divider" }));
        assert_eq!(json["elements"][2], json!({ "type": "label", "text": "note" }));
    }

    #[test]
    fn test_from_json_selection_and_close() {
        let form = sample();
        assert_eq!(
            ActionFormResponse::from_json(&form, &json!(1)).unwrap(),
            ActionFormResponse::selected(1)
        );
        assert!(ActionFormResponse::from_json(&form, &Value::Null).unwrap().is_closed());
    }

    #[test]
    fn test_from_json_rejects_out_of_range() {
        let form = sample();
        assert!(ActionFormResponse::from_json(&form, &json!(2)).is_err());
        assert!(ActionFormResponse::from_json(&form, &json!(-1)).is_err());
        assert!(ActionFormResponse::from_json(&form, &json!("0")).is_err());
    }
}
