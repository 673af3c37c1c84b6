//! Modal forms: a column of input fields with a submit button.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::InputPermissionError;

/// One entry of a modal form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModalElement {
    /// Plain text
    Label {
        /// Label text
        text: String,
    },
    /// A horizontal rule
    Divider,
    /// Bold section heading
    Header {
        /// Heading text
        text: String,
    },
    /// Pick one option from a list
    Dropdown {
        /// Field caption
        text: String,
        /// Options, answered by index
        options: Vec<String>,
        /// Preselected option
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<usize>,
        /// Hover text
        #[serde(skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
    },
    /// On/off switch
    Toggle {
        /// Field caption
        text: String,
        /// Initial state
        default: bool,
        /// Hover text
        #[serde(skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
    },
    /// Free text
    Input {
        /// Field caption
        text: String,
        /// Greyed-out hint shown while empty
        placeholder: String,
        /// Initial contents
        default: String,
        /// Hover text
        #[serde(skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
    },
}

/// A form with input fields
///
/// Answers carry one value per element, including decorations, so field
/// positions are stable indices into [`elements`](Self::elements).
///
/// # Examples
///
/// ```
/// use input_permission::forms::ModalForm;
///
/// let form = ModalForm::new("Input Permission Set")
///     .label("Modifies the status of the specified privilege of the target.")
///     .divider()
///     .toggle("State", true, None);
///
/// assert_eq!(form.elements.len(), 3);
/// assert_eq!(form.to_json()["type"], "custom_form");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalForm {
    /// Window title
    pub title: String,
    /// Fields and decorations, top to bottom
    pub elements: Vec<ModalElement>,
    /// Caption of the submit button, client default if `None`
    pub submit_button: Option<String>,
}

impl ModalForm {
    /// Start a form with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Append a label
    pub fn label(mut self, text: impl Into<String>) -> Self {
        self.elements.push(ModalElement::Label { text: text.into() });
        self
    }

    /// Append a divider
    pub fn divider(mut self) -> Self {
        self.elements.push(ModalElement::Divider);
        self
    }

    /// Append a header
    pub fn header(mut self, text: impl Into<String>) -> Self {
        self.elements.push(ModalElement::Header { text: text.into() });
        self
    }

    /// Append a dropdown
    pub fn dropdown(
        mut self,
        text: impl Into<String>,
        options: Vec<String>,
        default: Option<usize>,
        tooltip: Option<&str>,
    ) -> Self {
        self.elements.push(ModalElement::Dropdown {
            text: text.into(),
            options,
            default,
            tooltip: tooltip.map(str::to_string),
        });
        self
    }

    /// Append a toggle
    pub fn toggle(mut self, text: impl Into<String>, default: bool, tooltip: Option<&str>) -> Self {
        self.elements.push(ModalElement::Toggle {
            text: text.into(),
            default,
            tooltip: tooltip.map(str::to_string),
        });
        self
    }

    /// Append a text field
    pub fn text_field(
        mut self,
        text: impl Into<String>,
        placeholder: impl Into<String>,
        default: impl Into<String>,
        tooltip: Option<&str>,
    ) -> Self {
        self.elements.push(ModalElement::Input {
            text: text.into(),
            placeholder: placeholder.into(),
            default: default.into(),
            tooltip: tooltip.map(str::to_string),
        });
        self
    }

    /// Set the submit button caption
    pub fn submit_button(mut self, text: impl Into<String>) -> Self {
        self.submit_button = Some(text.into());
        self
    }

    /// Wire representation sent to the client
    pub fn to_json(&self) -> Value {
        let mut json = json!({
            "type": "custom_form",
            "title": self.title,
            "content": self.elements,
        });
        if let Some(submit) = &self.submit_button {
            json["submit"] = Value::String(submit.clone());
        }
        json
    }
}

/// Value of one modal element in an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    /// Decorations answer with `null`
    None,
    /// Toggle state
    Bool(bool),
    /// Dropdown index
    Index(usize),
    /// Text field contents
    Text(String),
}

/// Answer to a [`ModalForm`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalFormResponse {
    /// One value per element, or `None` if the form was closed
    pub values: Option<Vec<FormValue>>,
}

impl ModalFormResponse {
    /// The player submitted these values
    pub fn submitted(values: Vec<FormValue>) -> Self {
        Self {
            values: Some(values),
        }
    }

    /// The player closed the form
    pub fn closed() -> Self {
        Self { values: None }
    }

    /// Whether the form was closed without submitting
    pub fn is_closed(&self) -> bool {
        self.values.is_none()
    }

    fn value(&self, index: usize) -> Result<&FormValue, InputPermissionError> {
        self.values
            .as_ref()
            .and_then(|values| values.get(index))
            .ok_or_else(|| InputPermissionError::form_response(format!("no value at position {index}")))
    }

    /// Dropdown answer at `index`
    pub fn index(&self, index: usize) -> Result<usize, InputPermissionError> {
        match self.value(index)? {
            FormValue::Index(i) => Ok(*i),
            other => Err(InputPermissionError::form_response(format!(
                "expected dropdown index at position {index}, found {other:?}"
            ))),
        }
    }

    /// Toggle answer at `index`
    pub fn toggle(&self, index: usize) -> Result<bool, InputPermissionError> {
        match self.value(index)? {
            FormValue::Bool(b) => Ok(*b),
            other => Err(InputPermissionError::form_response(format!(
                "expected toggle at position {index}, found {other:?}"
            ))),
        }
    }

    /// Text field answer at `index`
    pub fn text(&self, index: usize) -> Result<&str, InputPermissionError> {
        match self.value(index)? {
            FormValue::Text(s) => Ok(s),
            other => Err(InputPermissionError::form_response(format!(
                "expected text at position {index}, found {other:?}"
            ))),
        }
    }

    /// Decode the client's answer to `form`
    ///
    /// `null` means closed; otherwise the answer must be an array with one
    /// entry per element of the form.
    pub fn from_json(form: &ModalForm, raw: &Value) -> Result<Self, InputPermissionError> {
        match raw {
            Value::Null => Ok(Self::closed()),
            Value::Array(items) if items.len() == form.elements.len() => {
                let values = items
                    .iter()
                    .map(|item| serde_json::from_value(item.clone()))
                    .collect::<Result<Vec<FormValue>, _>>()?;
                Ok(Self::submitted(values))
            }
            Value::Array(items) => Err(InputPermissionError::form_response(format!(
                "expected {} values, found {}",
                form.elements.len(),
                items.len()
            ))),
            other => Err(InputPermissionError::form_response(format!(
                "expected value array, found {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModalForm {
        ModalForm::new("Title")
            .label("hello")
            .dropdown("Player", vec!["Alice".into(), "Bob".into()], Some(1), Some("who"))
            .toggle("State", true, None)
            .text_field("Camera", "true", "true", None)
            .submit_button("Save")
    }

    #[test]
    fn test_to_json_shape() {
        let json = sample().to_json();
        assert_eq!(json["type"], "custom_form");
        assert_eq!(json["submit"], "Save");
        assert_eq!(json["content"][0], json!({ "type": "label", "text": "hello" }));
        assert_eq!(
            json["content"][1],
            json!({ "type": "dropdown", "text": "Player", "options": ["Alice", "Bob"], "default": 1, "tooltip": "who" })
        );
        assert_eq!(json["content"][2], json!({ "type": "toggle", "text": "State", "default": true }));
    }

    #[test]
    fn test_from_json_decodes_values() {
        let form = sample();
        let response =
            ModalFormResponse::from_json(&form, &json!([null, 0, false, "op"])).unwrap();

        assert_eq!(response.index(1).unwrap(), 0);
        assert!(!response.toggle(2).unwrap());
        assert_eq!(response.text(3).unwrap(), "op");
    }

    #[test]
    fn test_from_json_null_is_closed() {
        assert!(ModalFormResponse::from_json(&sample(), &Value::Null).unwrap().is_closed());
    }

    #[test]
    fn test_from_json_rejects_wrong_length() {
        let err = ModalFormResponse::from_json(&sample(), &json!([null, 0])).unwrap_err();
        assert!(err.to_string().contains("expected 4 values"));
    }

    #[test]
    fn test_accessors_reject_wrong_kind() {
        let response = ModalFormResponse::submitted(vec![FormValue::None, FormValue::Bool(true)]);
        assert!(response.index(0).is_err());
        assert!(response.text(1).is_err());
        assert!(response.toggle(5).is_err());
        assert!(ModalFormResponse::closed().toggle(0).is_err());
    }
}
