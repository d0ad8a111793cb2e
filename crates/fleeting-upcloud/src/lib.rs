//! UpCloud instance group for the GitLab fleeting autoscaler.
//!
//! [`InstanceGroup`] creates, observes and removes the servers of one labelled
//! group on behalf of an external autoscaling driver. All provider access goes
//! through the [`UpcloudService`] trait so the controller can run against the
//! real API or a test double.

pub mod config;
pub mod group;
pub mod ssh;
pub mod state;
pub mod types;
pub mod upcloud;
pub mod version;

#[cfg(test)]
mod testing;

use async_trait::async_trait;
use upcloud_api::{Account, CreateServerRequest, Server, ServerDetails, StopType};

pub use config::{ConfigError, GroupConfig};
pub use group::{GROUP_LABEL_KEY, InstanceGroup};
pub use ssh::KeyError;
pub use state::{State, map_server_state};
pub use types::{ConnectInfo, ConnectorConfig, Protocol, ProviderInfo, Settings};
pub use upcloud_api::Credentials;
pub use version::{VERSION, VersionInfo};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("parsing SSH private key from connector config: {0}")]
    Key(#[from] KeyError),

    #[error("opening UpCloud session: {0}")]
    Session(#[source] upcloud_api::Error),

    #[error("authenticating with UpCloud API: {0}")]
    Auth(#[source] upcloud_api::Error),

    #[error("{context}: {source}")]
    Provider {
        context: String,
        source: upcloud_api::Error,
    },

    #[error("server {0} is in error state")]
    Unhealthy(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn provider(context: impl Into<String>, source: upcloud_api::Error) -> Self {
        Self::Provider {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The slice of the UpCloud API an instance group needs.
///
/// [`upcloud_api::UpcloudClient`] is the production implementation; every
/// method maps onto one API call except `wait_for_server_state`, which blocks
/// until the server reaches the requested state.
#[async_trait]
pub trait UpcloudService: Send + Sync + 'static {
    /// Fetch the authenticated account. Used to verify credentials.
    async fn get_account(&self) -> upcloud_api::Result<Account>;

    /// List servers carrying the label `key=value`.
    async fn list_servers_by_label(&self, key: &str, value: &str) -> upcloud_api::Result<Vec<Server>>;

    async fn create_server(&self, req: &CreateServerRequest) -> upcloud_api::Result<ServerDetails>;

    async fn stop_server(&self, uuid: &str, stop_type: StopType) -> upcloud_api::Result<ServerDetails>;

    /// Block until the server reports `desired`.
    async fn wait_for_server_state(&self, uuid: &str, desired: &str) -> upcloud_api::Result<ServerDetails>;

    /// Delete a server and every storage device attached to it.
    async fn delete_server_and_storages(&self, uuid: &str) -> upcloud_api::Result<()>;

    async fn get_server_details(&self, uuid: &str) -> upcloud_api::Result<ServerDetails>;
}
