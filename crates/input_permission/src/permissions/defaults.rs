//! Symbolic permission defaults and the per-category default policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::category::PermissionCategory;
use crate::error::InputPermissionError;

/// Who is granted a permission when nothing more specific applies
///
/// Parsing accepts the same spellings as the host's permission parser,
/// case-insensitively:
///
/// | Input | Result |
/// |---|---|
/// | `true` | `True` |
/// | `false` | `False` |
/// | `op`, `isop`, `operator`, `isoperator`, `admin`, `isadmin` | `Op` |
/// | `!op`, `notop`, `!operator`, `notoperator`, `!admin`, `notadmin` | `NotOp` |
///
/// # Examples
///
/// ```
/// use input_permission::SymbolicDefault;
///
/// assert_eq!("IsOp".parse::<SymbolicDefault>().unwrap(), SymbolicDefault::Op);
/// assert_eq!("!admin".parse::<SymbolicDefault>().unwrap(), SymbolicDefault::NotOp);
/// assert_eq!(SymbolicDefault::NotOp.as_str(), "notop");
/// assert!("maybe".parse::<SymbolicDefault>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolicDefault {
    /// Granted to everyone
    #[default]
    True,
    /// Granted to operators only
    Op,
    /// Granted to everyone who is not an operator
    NotOp,
    /// Granted to nobody
    False,
}

impl SymbolicDefault {
    /// Every default, in table order
    pub const ALL: [SymbolicDefault; 4] = [
        SymbolicDefault::True,
        SymbolicDefault::Op,
        SymbolicDefault::NotOp,
        SymbolicDefault::False,
    ];

    /// Canonical spelling written to the configuration file
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolicDefault::True => "true",
            SymbolicDefault::Op => "op",
            SymbolicDefault::NotOp => "notop",
            SymbolicDefault::False => "false",
        }
    }

    /// Interpret a YAML scalar from the configuration file
    ///
    /// Booleans map to `True`/`False`, strings go through [`FromStr`].
    /// Any other shape is rejected.
    pub fn from_yaml(value: &serde_yaml::Value) -> Result<Self, InputPermissionError> {
        match value {
            serde_yaml::Value::Bool(true) => Ok(SymbolicDefault::True),
            serde_yaml::Value::Bool(false) => Ok(SymbolicDefault::False),
            serde_yaml::Value::String(s) => s.parse(),
            other => Err(InputPermissionError::InvalidDefault {
                value: describe_yaml(other),
            }),
        }
    }
}

/// Render a YAML value for a warning message
pub(crate) fn describe_yaml(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}

impl fmt::Display for SymbolicDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymbolicDefault {
    type Err = InputPermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "true" => Ok(SymbolicDefault::True),
            "false" => Ok(SymbolicDefault::False),
            "op" | "isop" | "operator" | "isoperator" | "admin" | "isadmin" => {
                Ok(SymbolicDefault::Op)
            }
            "!op" | "notop" | "!operator" | "notoperator" | "!admin" | "notadmin" => {
                Ok(SymbolicDefault::NotOp)
            }
            _ => Err(InputPermissionError::InvalidDefault {
                value: s.to_string(),
            }),
        }
    }
}

/// A symbolic default for every category
///
/// Always total: categories that were never set hold [`SymbolicDefault::True`].
///
/// # Examples
///
/// ```
/// use input_permission::{DefaultPolicy, PermissionCategory, SymbolicDefault};
///
/// let mut policy = DefaultPolicy::default();
/// assert_eq!(policy.get(PermissionCategory::Mount), SymbolicDefault::True);
///
/// assert!(policy.set(PermissionCategory::Mount, SymbolicDefault::NotOp));
/// assert!(!policy.set(PermissionCategory::Mount, SymbolicDefault::NotOp));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DefaultPolicy {
    entries: [SymbolicDefault; PermissionCategory::ALL.len()],
}

impl DefaultPolicy {
    /// Default for a category
    pub fn get(&self, category: PermissionCategory) -> SymbolicDefault {
        self.entries[category.index()]
    }

    /// Change a category's default, returning whether it differed
    pub fn set(&mut self, category: PermissionCategory, default: SymbolicDefault) -> bool {
        let slot = &mut self.entries[category.index()];
        let changed = *slot != default;
        *slot = default;
        changed
    }

    /// Entries in canonical category order
    pub fn iter(&self) -> impl Iterator<Item = (PermissionCategory, SymbolicDefault)> + '_ {
        PermissionCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        for alias in ["op", "isop", "operator", "isoperator", "admin", "isadmin", "OP"] {
            assert_eq!(alias.parse::<SymbolicDefault>().unwrap(), SymbolicDefault::Op, "{alias}");
        }
        for alias in ["!op", "notop", "!operator", "notoperator", "!admin", "notadmin", "NotOp"] {
            assert_eq!(
                alias.parse::<SymbolicDefault>().unwrap(),
                SymbolicDefault::NotOp,
                "{alias}"
            );
        }
        assert_eq!("TRUE".parse::<SymbolicDefault>().unwrap(), SymbolicDefault::True);
        assert_eq!("false".parse::<SymbolicDefault>().unwrap(), SymbolicDefault::False);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "everyone".parse::<SymbolicDefault>().unwrap_err();
        assert!(matches!(err, InputPermissionError::InvalidDefault { value } if value == "everyone"));
        assert!("".parse::<SymbolicDefault>().is_err());
    }

    #[test]
    fn test_canonical_strings_parse_back() {
        for default in SymbolicDefault::ALL {
            assert_eq!(default.as_str().parse::<SymbolicDefault>().unwrap(), default);
        }
    }

    #[test]
    fn test_from_yaml_accepts_booleans() {
        assert_eq!(
            SymbolicDefault::from_yaml(&serde_yaml::Value::Bool(true)).unwrap(),
            SymbolicDefault::True
        );
        assert_eq!(
            SymbolicDefault::from_yaml(&serde_yaml::Value::Bool(false)).unwrap(),
            SymbolicDefault::False
        );
        assert_eq!(
            SymbolicDefault::from_yaml(&serde_yaml::Value::String("notop".into())).unwrap(),
            SymbolicDefault::NotOp
        );
    }

    #[test]
    fn test_from_yaml_rejects_other_shapes() {
        let value: serde_yaml::Value = serde_yaml::from_str("3").unwrap();
        let err = SymbolicDefault::from_yaml(&value).unwrap_err();
        assert!(matches!(err, InputPermissionError::InvalidDefault { value } if value == "3"));
    }

    #[test]
    fn test_policy_defaults_to_true() {
        let policy = DefaultPolicy::default();
        assert!(policy.iter().all(|(_, d)| d == SymbolicDefault::True));
        assert_eq!(policy.iter().count(), 11);
    }
}
