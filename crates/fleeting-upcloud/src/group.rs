use std::future::Future;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use rand::Rng;
use tracing::{debug, error, info, warn};
use upcloud_api::{
    CreateServerInterface, CreateServerInterfaceSlice, CreateServerNetworking, CreateServerRequest,
    CreateServerStorageDevice, CreateServerStorageDeviceSlice, Credentials, IpAddressAccess, IpAddressFamily,
    Label, LabelSlice, LoginUser, NetworkType, SERVER_STATE_ERROR, SERVER_STATE_STOPPED, SshKeySlice,
    StopType, StorageDeviceAction, UpcloudClient,
};

use crate::config::GroupConfig;
use crate::state::{State, map_server_state};
use crate::types::{ConnectInfo, Protocol, ProviderInfo, Settings};
use crate::version::VERSION;
use crate::{Error, Result, UpcloudService, ssh};

/// Label key tagging every server that belongs to a group.
pub const GROUP_LABEL_KEY: &str = "fleeting-group";

const HOSTNAME_SUFFIX_LEN: usize = 8;
const HOSTNAME_SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

const DEFAULT_OS: &str = "linux";
const DEFAULT_ARCH: &str = "amd64";

/// One labelled group of UpCloud servers managed for the autoscaler.
///
/// Holds no instance state of its own: every call re-reads the group from the
/// provider. Configuration, connector settings and the provider session are
/// fixed at [`InstanceGroup::init`].
pub struct InstanceGroup<S = UpcloudClient> {
    config: GroupConfig,
    settings: Settings,
    svc: S,
    /// `authorized_keys` line injected into new servers, if a key was configured.
    public_key: Option<String>,
}

impl InstanceGroup<UpcloudClient> {
    /// Initialize against the real UpCloud API.
    pub async fn init(config: GroupConfig, settings: Settings) -> Result<(Self, ProviderInfo)> {
        Self::init_with(config, settings, |credentials| UpcloudClient::new(credentials.clone())).await
    }
}

impl<S: UpcloudService> InstanceGroup<S> {
    /// Validate config, derive the SSH public key, open a provider session
    /// through `connect` and verify the credentials.
    pub async fn init_with<F>(mut config: GroupConfig, settings: Settings, connect: F) -> Result<(Self, ProviderInfo)>
    where
        F: FnOnce(&Credentials) -> upcloud_api::Result<S>,
    {
        config.validate()?;

        let public_key = if settings.connector.key.is_empty() {
            warn!("no SSH key configured in connector config; instances will be created without SSH key injection");
            None
        } else {
            Some(ssh::authorized_key(&settings.connector.key)?)
        };

        let credentials = config.credentials()?;
        let svc = connect(&credentials).map_err(Error::Session)?;

        svc.get_account().await.map_err(Error::Auth)?;

        info!(zone = %config.zone, group = %config.name, plan = %config.plan, "initialized");

        let info = ProviderInfo {
            id: format!("upcloud/{}/{}", config.zone, config.name),
            max_size: config.max_size,
            version: VERSION.version.to_string(),
            build_info: VERSION.build_info(),
        };

        let group = Self {
            config,
            settings,
            svc,
            public_key,
        };

        Ok((group, info))
    }

    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Report every server in the group, in listing order, with its mapped state.
    pub async fn update<F>(&self, mut observe: F) -> Result<()>
    where
        F: FnMut(&str, State),
    {
        let servers = self
            .svc
            .list_servers_by_label(GROUP_LABEL_KEY, &self.config.name)
            .await
            .map_err(|e| Error::provider("listing group servers", e))?;

        for server in &servers {
            observe(&server.uuid, map_server_state(&server.state));
        }

        Ok(())
    }

    /// Create up to `n` servers one after another and return how many were
    /// created. Failed attempts are logged and skipped; the autoscaler asks
    /// again for the shortfall on a later cycle.
    pub async fn increase(&self, n: usize) -> usize {
        let mut succeeded = 0;

        for _ in 0..n {
            let hostname = format!("{}-{}", self.config.name_prefix, random_suffix(HOSTNAME_SUFFIX_LEN));
            let req = self.create_request(&hostname);

            match self.svc.create_server(&req).await {
                Ok(_) => {
                    info!(hostname = %hostname, "created server");
                    succeeded += 1;
                }
                Err(e) => {
                    error!(hostname = %hostname, error = %e, "failed to create server");
                }
            }
        }

        succeeded
    }

    fn create_request(&self, hostname: &str) -> CreateServerRequest {
        let mut interfaces = vec![CreateServerInterface::ipv4(NetworkType::Public)];
        if self.config.use_private_network {
            interfaces.push(CreateServerInterface::ipv4(NetworkType::Private));
        }

        let login_user = self.public_key.as_ref().map(|key| LoginUser {
            username: self.settings.connector.username.clone(),
            create_password: false,
            ssh_keys: SshKeySlice {
                ssh_key: vec![key.clone()],
            },
        });

        CreateServerRequest {
            zone: self.config.zone.clone(),
            title: format!("fleeting-plugin-upcloud - {hostname}"),
            hostname: hostname.to_string(),
            plan: self.config.plan.clone(),
            metadata: true,
            labels: LabelSlice {
                label: vec![Label {
                    key: GROUP_LABEL_KEY.to_string(),
                    value: self.config.name.clone(),
                }],
            },
            storage_devices: CreateServerStorageDeviceSlice {
                storage_device: vec![CreateServerStorageDevice {
                    action: StorageDeviceAction::Clone,
                    storage: self.config.template.clone(),
                    title: "disk1".to_string(),
                    size: (self.config.storage_size > 0).then_some(self.config.storage_size),
                    tier: (!self.config.storage_tier.is_empty()).then(|| self.config.storage_tier.clone()),
                }],
            },
            networking: CreateServerNetworking {
                interfaces: CreateServerInterfaceSlice { interface: interfaces },
            },
            login_user,
            user_data: (!self.config.user_data.is_empty()).then(|| self.config.user_data.clone()),
        }
    }

    /// Stop and delete the given servers concurrently.
    ///
    /// Returns the ids that were fully removed, in completion order, and the
    /// first error encountered. One id failing never stops the others.
    pub async fn decrease(&self, ids: &[String]) -> (Vec<String>, Option<Error>) {
        self.decrease_until(ids, std::future::pending()).await
    }

    /// Like [`decrease`](Self::decrease), but gives up once `cancelled`
    /// resolves. Removals still in flight are dropped; outcomes recorded before
    /// that point are returned, with [`Error::Cancelled`] as the first error if
    /// none had occurred yet.
    pub async fn decrease_until<C>(&self, ids: &[String], cancelled: C) -> (Vec<String>, Option<Error>)
    where
        C: Future<Output = ()>,
    {
        let mut succeeded = Vec::with_capacity(ids.len());
        let mut first_err = None;

        if ids.is_empty() {
            return (succeeded, first_err);
        }

        let mut removals: FuturesUnordered<_> = ids
            .iter()
            .map(|id| async move { (id, self.stop_and_delete(id).await) })
            .collect();

        tokio::pin!(cancelled);

        loop {
            tokio::select! {
                biased;

                next = removals.next() => match next {
                    Some((id, Ok(()))) => succeeded.push(id.clone()),
                    Some((id, Err(e))) => {
                        error!(uuid = %id, error = %e, "failed to remove instance");
                        if first_err.is_none() {
                            first_err = Some(e);
                        }
                    }
                    None => break,
                },
                () = &mut cancelled => {
                    warn!(pending = removals.len(), "instance removal cancelled");
                    if first_err.is_none() {
                        first_err = Some(Error::Cancelled);
                    }
                    break;
                }
            }
        }

        (succeeded, first_err)
    }

    /// Hard-stop a server, wait for it to stop, then delete it with its storages.
    async fn stop_and_delete(&self, uuid: &str) -> Result<()> {
        self.svc
            .stop_server(uuid, StopType::Hard)
            .await
            .map_err(|e| Error::provider(format!("stopping server {uuid}"), e))?;

        self.svc
            .wait_for_server_state(uuid, SERVER_STATE_STOPPED)
            .await
            .map_err(|e| Error::provider(format!("waiting for server {uuid} to stop"), e))?;

        self.svc
            .delete_server_and_storages(uuid)
            .await
            .map_err(|e| Error::provider(format!("deleting server {uuid}"), e))?;

        info!(uuid, "removed instance");
        Ok(())
    }

    /// Connection details for one instance, layered over the connector defaults.
    pub async fn connect_info(&self, id: &str) -> Result<ConnectInfo> {
        let details = self
            .svc
            .get_server_details(id)
            .await
            .map_err(|e| Error::provider(format!("getting server details for {id}"), e))?;

        let mut info = ConnectInfo {
            id: id.to_string(),
            connector: self.settings.connector.clone(),
            ..Default::default()
        };

        if info.connector.os.is_empty() {
            info.connector.os = DEFAULT_OS.to_string();
        }
        if info.connector.arch.is_empty() {
            info.connector.arch = DEFAULT_ARCH.to_string();
        }
        if info.connector.protocol.is_none() {
            info.connector.protocol = Some(Protocol::Ssh);
        }

        for ip in details
            .ip_addresses
            .iter()
            .filter(|ip| ip.family == IpAddressFamily::IPv4)
        {
            match ip.access {
                IpAddressAccess::Public => info.external_addr = ip.address.clone(),
                IpAddressAccess::Private => info.internal_addr = ip.address.clone(),
                IpAddressAccess::Utility => {}
            }
        }

        if self.config.use_private_network && !info.internal_addr.is_empty() {
            info.external_addr = info.internal_addr.clone();
        }

        Ok(info)
    }

    /// Fails only when the provider reports the server in its error state.
    /// An unreachable API counts as healthy so a blip does not trigger
    /// replacements.
    pub async fn heartbeat(&self, id: &str) -> Result<()> {
        match self.svc.get_server_details(id).await {
            Ok(details) if details.server.state == SERVER_STATE_ERROR => Err(Error::Unhealthy(id.to_string())),
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(uuid = id, error = %e, "heartbeat API error (treating as healthy)");
                Ok(())
            }
        }
    }

    pub async fn shutdown(&self) {
        debug!(group = %self.config.name, "shutdown");
    }
}

/// Random lowercase alphanumeric string of length `len`.
fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| HOSTNAME_SUFFIX_CHARS[rng.random_range(0..HOSTNAME_SUFFIX_CHARS.len())] as char)
        .collect()
}
