//! Persisted default policy
//!
//! The configuration file is a YAML document with a `default` section that
//! maps each category name to a symbolic default:
//!
//! ```yaml
//! default:
//!   camera: "true"
//!   movement: "true"
//!   mount: notop
//!   jump: op
//! ```
//!
//! Loading is forgiving: unknown keys are dropped, unparseable values fall
//! back to `true` and missing categories are filled in with `true`, each with
//! a warning. Whatever had to be repaired marks the store dirty, so the next
//! [`save`](PolicyStore::save) writes the normalised document back. Other
//! top-level keys of the document are kept as they are.
//!
//! # Example
//!
//! ```no_run
//! use input_permission::config::PolicyStore;
//! use input_permission::{PermissionCategory, SymbolicDefault};
//!
//! # fn main() -> Result<(), input_permission::error::InputPermissionError> {
//! let mut store = PolicyStore::load("plugin_data/InputPermission/config.yml")?;
//! store.update(PermissionCategory::Jump, SymbolicDefault::Op);
//! store.save()?;
//! # Ok(())
//! # }
//! ```

use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::category::{CategorySet, PermissionCategory};
use crate::error::InputPermissionError;
use crate::permissions::{describe_yaml, DefaultPolicy, SymbolicDefault};

/// Key of the section holding the per-category defaults
pub const DEFAULT_SECTION: &str = "default";

/// Default policy backed by a YAML file, with dirty tracking
#[derive(Debug, Clone)]
pub struct PolicyStore {
    path: PathBuf,
    document: Mapping,
    policy: DefaultPolicy,
    dirty: bool,
}

impl PolicyStore {
    /// Read the policy from `path`
    ///
    /// A missing file is not an error; it yields an all-`true` policy that
    /// is dirty, so the following [`save`](Self::save) creates the file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, InputPermissionError> {
        let mut store = Self {
            path: path.into(),
            document: Mapping::new(),
            policy: DefaultPolicy::default(),
            dirty: false,
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-read the file, discarding unsaved changes
    pub fn reload(&mut self) -> Result<&DefaultPolicy, InputPermissionError> {
        let document = read_document(&self.path)?;
        let (policy, repaired) = normalize(&document);
        self.document = document;
        self.policy = policy;
        self.dirty = repaired;
        Ok(&self.policy)
    }

    /// Current policy
    pub fn policy(&self) -> &DefaultPolicy {
        &self.policy
    }

    /// Current default of one category
    pub fn get(&self, category: PermissionCategory) -> SymbolicDefault {
        self.policy.get(category)
    }

    /// Change one category's default, returning whether it changed
    pub fn update(&mut self, category: PermissionCategory, default: SymbolicDefault) -> bool {
        let changed = self.policy.set(category, default);
        self.dirty |= changed;
        changed
    }

    /// Whether there are changes that have not been written yet
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the document if anything changed since the last load or save
    ///
    /// Returns whether the file was written.
    pub fn save(&mut self) -> Result<bool, InputPermissionError> {
        if !self.dirty {
            return Ok(false);
        }

        let mut defaults = Mapping::new();
        for (category, default) in self.policy.iter() {
            defaults.insert(
                Value::String(category.name().to_string()),
                Value::String(default.as_str().to_string()),
            );
        }
        self.document
            .insert(Value::String(DEFAULT_SECTION.to_string()), Value::Mapping(defaults));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(&self.document)?)?;
        self.dirty = false;
        info!(path = %self.path.display(), "Saved default input permissions");
        Ok(true)
    }
}

fn read_document(path: &Path) -> Result<Mapping, InputPermissionError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Mapping::new()),
        Err(e) => return Err(e.into()),
    };
    match serde_yaml::from_str::<Value>(&contents)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => {
            warn!(path = %path.display(), found = ?other, "Configuration is not a mapping, starting over");
            Ok(Mapping::new())
        }
    }
}

/// Build a total policy from the `default` section
///
/// The flag is `true` when the section had to be repaired in any way.
fn normalize(document: &Mapping) -> (DefaultPolicy, bool) {
    let mut policy = DefaultPolicy::default();
    let mut seen = CategorySet::empty();
    let mut repaired = false;

    match document.get(DEFAULT_SECTION) {
        Some(Value::Mapping(section)) if !section.is_empty() => {
            for (key, value) in section {
                let key = describe_yaml(key);
                let Some(category) = PermissionCategory::ALL
                    .into_iter()
                    .find(|category| category.name() == key)
                else {
                    warn!("\"{key}\" is not a valid permission");
                    repaired = true;
                    continue;
                };

                let default = match SymbolicDefault::from_yaml(value) {
                    Ok(default) => {
                        repaired |= value.as_str() != Some(default.as_str());
                        default
                    }
                    Err(_) => {
                        warn!("{key} has invalid default \"{}\"", describe_yaml(value));
                        repaired = true;
                        SymbolicDefault::True
                    }
                };
                policy.set(category, default);
                seen.insert(category);
            }
        }
        _ => {
            info!("No default permissions found, creating new config...");
            repaired = true;
        }
    }

    if seen.len() != PermissionCategory::ALL.len() {
        repaired = true;
    }
    (policy, repaired)
}
