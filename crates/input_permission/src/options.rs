//! Configuration options and builder for the plugin
//!
//! [`PluginOptions`] holds the settings that are fixed when the plugin is
//! constructed: where the default-policy file lives, which namespace the
//! permission strings use, and how long a form may wait for its answer.
//! The per-category defaults themselves live in the configuration file and
//! are handled by [`PolicyStore`](crate::config::PolicyStore).
//!
//! # Example
//!
//! ```
//! use input_permission::options::PluginOptions;
//! use std::time::Duration;
//!
//! let options = PluginOptions::builder()
//!     .config_path("plugin_data/InputPermission/config.yml")
//!     .form_timeout(Duration::from_secs(60))
//!     .build();
//!
//! assert_eq!(options.namespace, "inputpermission");
//! assert_eq!(options.permission_names().admin(), "inputpermission.command.admin");
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::permissions::PermissionNames;

/// Namespace prefixed to every permission string
pub const DEFAULT_NAMESPACE: &str = "inputpermission";

/// File name of the default-policy configuration
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// How long a form waits for an answer before it counts as closed
pub const DEFAULT_FORM_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings for an [`InputPermissionPlugin`](crate::plugin::InputPermissionPlugin)
#[derive(Debug, Clone)]
pub struct PluginOptions {
    /// Path of the YAML file holding the `default` section
    pub config_path: PathBuf,
    /// Namespace of the permission strings (`<namespace>.permission.<category>`)
    pub namespace: String,
    /// Deadline for a form response when forms go through a
    /// [`FormDispatcher`](crate::forms::FormDispatcher)
    pub form_timeout: Duration,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            namespace: DEFAULT_NAMESPACE.to_string(),
            form_timeout: DEFAULT_FORM_TIMEOUT,
        }
    }
}

impl PluginOptions {
    /// Create a new options builder
    pub fn builder() -> PluginOptionsBuilder {
        PluginOptionsBuilder::default()
    }

    /// Permission strings derived from the configured namespace
    pub fn permission_names(&self) -> PermissionNames {
        PermissionNames::new(&self.namespace)
    }
}

/// Builder for [`PluginOptions`]
///
/// Unset fields keep the values of [`PluginOptions::default`].
#[derive(Debug, Default)]
pub struct PluginOptionsBuilder {
    config_path: Option<PathBuf>,
    namespace: Option<String>,
    form_timeout: Option<Duration>,
}

impl PluginOptionsBuilder {
    /// Set the configuration file path
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Set the permission namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the form response deadline
    pub fn form_timeout(mut self, timeout: Duration) -> Self {
        self.form_timeout = Some(timeout);
        self
    }

    /// Build the options
    pub fn build(self) -> PluginOptions {
        let defaults = PluginOptions::default();
        PluginOptions {
            config_path: self.config_path.unwrap_or(defaults.config_path),
            namespace: self.namespace.unwrap_or(defaults.namespace),
            form_timeout: self.form_timeout.unwrap_or(defaults.form_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let options = PluginOptions::builder().build();
        assert_eq!(options.config_path, PathBuf::from("config.yml"));
        assert_eq!(options.namespace, "inputpermission");
        assert_eq!(options.form_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_builder_overrides() {
        let options = PluginOptions::builder()
            .config_path("/tmp/ip.yml")
            .namespace("ip")
            .form_timeout(Duration::from_secs(5))
            .build();

        assert_eq!(options.config_path, PathBuf::from("/tmp/ip.yml"));
        assert_eq!(options.form_timeout, Duration::from_secs(5));
        assert_eq!(options.permission_names().query_self(), "ip.command.query.self");
    }
}
