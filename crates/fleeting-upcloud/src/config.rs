use serde::Deserialize;
use upcloud_api::Credentials;

pub const DEFAULT_PLAN: &str = "1xCPU-2GB";
pub const DEFAULT_NAME_PREFIX: &str = "fleeting";
pub const DEFAULT_MAX_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("either token or both username and password are required")]
    MissingAuth,

    #[error("zone is required")]
    MissingZone,

    #[error("template is required")]
    MissingTemplate,

    #[error("name is required")]
    MissingName,
}

/// Identity, sizing and auth for one instance group.
///
/// Populated from the autoscaler's `plugin_config`. Every field is optional
/// during deserialization; [`GroupConfig::validate`] reports what is missing
/// and fills in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Personal access token (`ucat_...`). Takes precedence over username/password.
    pub token: String,
    pub username: String,
    pub password: String,

    pub zone: String,
    /// UUID of the storage template cloned for every server.
    pub template: String,
    /// Unique group name, used as the group label value.
    pub name: String,

    pub plan: String,
    /// Disk size in GB; 0 inherits the template size.
    pub storage_size: u32,
    /// `maxiops` or `standard`; empty inherits the template tier.
    pub storage_tier: String,
    pub name_prefix: String,
    pub max_size: usize,
    /// Route connections over the private network instead of the public one.
    pub use_private_network: bool,
    /// URL or inline script passed to the server on first boot.
    pub user_data: String,
}

impl GroupConfig {
    /// Check required fields, then apply defaults to the optional ones.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.credentials()?;

        if self.zone.is_empty() {
            return Err(ConfigError::MissingZone);
        }
        if self.template.is_empty() {
            return Err(ConfigError::MissingTemplate);
        }
        if self.name.is_empty() {
            return Err(ConfigError::MissingName);
        }

        if self.plan.is_empty() {
            self.plan = DEFAULT_PLAN.to_string();
        }
        if self.name_prefix.is_empty() {
            self.name_prefix = DEFAULT_NAME_PREFIX.to_string();
        }
        if self.max_size == 0 {
            self.max_size = DEFAULT_MAX_SIZE;
        }

        Ok(())
    }

    /// Resolve the auth mode: a token, otherwise username and password.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        if !self.token.is_empty() {
            return Ok(Credentials::Token(self.token.clone()));
        }
        if !self.username.is_empty() && !self.password.is_empty() {
            return Ok(Credentials::Basic {
                username: self.username.clone(),
                password: self.password.clone(),
            });
        }
        Err(ConfigError::MissingAuth)
    }
}
