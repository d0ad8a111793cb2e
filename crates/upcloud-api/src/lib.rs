//! Typed Rust client for the UpCloud API (v1.3).
//!
//! Covers the subset needed for managing fleeting instance groups:
//! account lookup, servers (list by label, create, get, stop, delete with
//! storages) and a polling wait for a server state.

mod types;

use std::time::Duration;

use tracing::debug;

pub use reqwest::StatusCode;
pub use types::*;

const BASE_URL: &str = "https://api.upcloud.com/1.3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const STOP_TIMEOUT_SECS: u32 = 60;
const WAIT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default upper bound for [`UpcloudClient::wait_for_server_state`].
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("upcloud api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upcloud api {endpoint} returned {status}: {body}")]
    Api {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("timed out waiting for server {uuid} to reach state {state}")]
    Timeout { uuid: String, state: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// How requests authenticate against the API.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Personal access token (`ucat_...`), sent as a bearer token.
    Token(String),
    /// API sub-account, sent as HTTP basic auth.
    Basic { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(..)"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Client for the UpCloud REST API.
#[derive(Clone)]
pub struct UpcloudClient {
    credentials: Credentials,
    base_url: String,
    http: reqwest::Client,
}

impl UpcloudClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            credentials,
            base_url: BASE_URL.to_string(),
            http,
        })
    }

    /// Point the client at a different API root (e.g. a local test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Credentials::Token(token) => req.bearer_auth(token),
            Credentials::Basic { username, password } => req.basic_auth(username, Some(password)),
        }
    }

    async fn check(resp: reqwest::Response, endpoint: &'static str) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api { endpoint, status, body });
        }
        Ok(resp)
    }

    /// Like `check` but also treats 404 as success (for delete idempotency).
    async fn check_allow_404(resp: reqwest::Response, endpoint: &'static str) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api { endpoint, status, body });
        }
        Ok(resp)
    }

    // ── Account ──────────────────────────────────────────────────────

    pub async fn get_account(&self) -> Result<Account> {
        let resp = self
            .authorize(self.http.get(self.url("/account")))
            .send()
            .await?;

        let envelope: AccountEnvelope = Self::check(resp, "get account").await?.json().await?;
        Ok(envelope.account)
    }

    // ── Servers ──────────────────────────────────────────────────────

    /// List servers carrying the label `key=value`.
    pub async fn list_servers_by_label(&self, key: &str, value: &str) -> Result<Vec<Server>> {
        let resp = self
            .authorize(self.http.get(self.url("/server")))
            .query(&[("label", label_filter(key, value))])
            .send()
            .await?;

        let envelope: ServersEnvelope = Self::check(resp, "list servers").await?.json().await?;
        Ok(envelope.servers.server)
    }

    pub async fn create_server(&self, req: &CreateServerRequest) -> Result<ServerDetails> {
        let resp = self
            .authorize(self.http.post(self.url("/server")))
            .json(&CreateServerEnvelope { server: req })
            .send()
            .await?;

        let envelope: ServerDetailsEnvelope = Self::check(resp, "create server").await?.json().await?;
        Ok(envelope.server)
    }

    pub async fn get_server_details(&self, uuid: &str) -> Result<ServerDetails> {
        let resp = self
            .authorize(self.http.get(self.url(&format!("/server/{uuid}"))))
            .send()
            .await?;

        let envelope: ServerDetailsEnvelope = Self::check(resp, "get server").await?.json().await?;
        Ok(envelope.server)
    }

    pub async fn stop_server(&self, uuid: &str, stop_type: StopType) -> Result<ServerDetails> {
        let body = StopServerEnvelope {
            stop_server: StopServer {
                stop_type,
                timeout: STOP_TIMEOUT_SECS.to_string(),
            },
        };

        let resp = self
            .authorize(self.http.post(self.url(&format!("/server/{uuid}/stop"))))
            .json(&body)
            .send()
            .await?;

        let envelope: ServerDetailsEnvelope = Self::check(resp, "stop server").await?.json().await?;
        Ok(envelope.server)
    }

    /// Delete a server together with every storage device attached to it.
    pub async fn delete_server_and_storages(&self, uuid: &str) -> Result<()> {
        let resp = self
            .authorize(self.http.delete(self.url(&format!("/server/{uuid}"))))
            .query(&[("storages", "1")])
            .send()
            .await?;

        Self::check_allow_404(resp, "delete server").await?;
        Ok(())
    }

    /// Poll the server until it reports `desired` or `timeout` elapses.
    pub async fn wait_for_server_state(
        &self,
        uuid: &str,
        desired: &str,
        timeout: Duration,
    ) -> Result<ServerDetails> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let details = self.get_server_details(uuid).await?;
            if details.server.state == desired {
                return Ok(details);
            }

            debug!(uuid, state = %details.server.state, desired, "waiting for server state");

            if tokio::time::Instant::now() + WAIT_POLL_INTERVAL > deadline {
                return Err(Error::Timeout {
                    uuid: uuid.to_string(),
                    state: desired.to_string(),
                });
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }
}

fn label_filter(key: &str, value: &str) -> String {
    format!("{key}={value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn label_filter_joins_key_and_value() {
        assert_eq!(label_filter("fleeting-group", "ci"), "fleeting-group=ci");
    }

    #[test]
    fn debug_hides_secrets() {
        let token = format!("{:?}", Credentials::Token("ucat_secret".into()));
        assert!(!token.contains("ucat_secret"));

        let basic = format!(
            "{:?}",
            Credentials::Basic {
                username: "api-user".into(),
                password: "hunter2".into(),
            }
        );
        assert!(basic.contains("api-user"));
        assert!(!basic.contains("hunter2"));
    }

    #[test]
    fn create_server_request_wire_shape() {
        let req = CreateServerRequest {
            zone: "fi-hel1".into(),
            title: "fleeting-plugin-upcloud - fleeting-abc".into(),
            hostname: "fleeting-abc".into(),
            plan: "1xCPU-2GB".into(),
            metadata: true,
            labels: LabelSlice {
                label: vec![Label {
                    key: "fleeting-group".into(),
                    value: "ci".into(),
                }],
            },
            storage_devices: CreateServerStorageDeviceSlice {
                storage_device: vec![CreateServerStorageDevice {
                    action: StorageDeviceAction::Clone,
                    storage: "template-uuid".into(),
                    title: "disk1".into(),
                    size: None,
                    tier: Some("maxiops".into()),
                }],
            },
            networking: CreateServerNetworking {
                interfaces: CreateServerInterfaceSlice {
                    interface: vec![CreateServerInterface::ipv4(NetworkType::Public)],
                },
            },
            login_user: Some(LoginUser {
                username: "runner".into(),
                create_password: false,
                ssh_keys: SshKeySlice {
                    ssh_key: vec!["ssh-ed25519 AAAA".into()],
                },
            }),
            user_data: None,
        };

        let value = serde_json::to_value(CreateServerEnvelope { server: &req }).unwrap();
        let server = &value["server"];

        assert_eq!(server["metadata"], "yes");
        assert_eq!(server["labels"]["label"][0]["value"], "ci");
        assert_eq!(server["storage_devices"]["storage_device"][0]["action"], "clone");
        assert!(server["storage_devices"]["storage_device"][0].get("size").is_none());
        assert_eq!(
            server["networking"]["interfaces"]["interface"][0],
            json!({"ip_addresses": {"ip_address": [{"family": "IPv4"}]}, "type": "public"})
        );
        assert_eq!(server["login_user"]["create_password"], "no");
        assert_eq!(server["login_user"]["ssh_keys"]["ssh_key"][0], "ssh-ed25519 AAAA");
        assert!(server.get("user_data").is_none());
    }

    #[test]
    fn stop_server_wire_shape() {
        let body = StopServerEnvelope {
            stop_server: StopServer {
                stop_type: StopType::Hard,
                timeout: "60".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"stop_server": {"stop_type": "hard", "timeout": "60"}})
        );
    }

    #[test]
    fn parses_server_list() {
        let body = json!({
            "servers": {
                "server": [
                    {"uuid": "uuid-1", "hostname": "fleeting-a", "state": "started", "zone": "fi-hel1",
                     "labels": {"label": [{"key": "fleeting-group", "value": "ci"}]}},
                    {"uuid": "uuid-2", "hostname": "fleeting-b", "state": "maintenance", "zone": "fi-hel1"}
                ]
            }
        });

        let envelope: ServersEnvelope = serde_json::from_value(body).unwrap();
        let servers = envelope.servers.server;
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].uuid, "uuid-1");
        assert_eq!(servers[0].labels.label[0].key, "fleeting-group");
        assert_eq!(servers[1].state, SERVER_STATE_MAINTENANCE);
        assert!(servers[1].labels.label.is_empty());
    }

    #[test]
    fn parses_empty_server_list() {
        let envelope: ServersEnvelope = serde_json::from_value(json!({"servers": {}})).unwrap();
        assert!(envelope.servers.server.is_empty());
    }

    #[test]
    fn parses_server_details_with_addresses() {
        let body = json!({
            "server": {
                "uuid": "uuid-1",
                "state": "started",
                "plan": "1xCPU-2GB",
                "ip_addresses": {
                    "ip_address": [
                        {"access": "private", "address": "10.0.0.5", "family": "IPv4"},
                        {"access": "public", "address": "1.2.3.4", "family": "IPv4"},
                        {"access": "public", "address": "2a04::1", "family": "IPv6"}
                    ]
                }
            }
        });

        let envelope: ServerDetailsEnvelope = serde_json::from_value(body).unwrap();
        let details = envelope.server;
        assert_eq!(details.server.uuid, "uuid-1");
        assert_eq!(details.server.state, SERVER_STATE_STARTED);
        assert_eq!(details.ip_addresses.len(), 3);
        assert_eq!(details.ip_addresses[0].access, IpAddressAccess::Private);
        assert_eq!(details.ip_addresses[2].family, IpAddressFamily::IPv6);
    }

    #[test]
    fn parses_account() {
        let body = json!({"account": {"username": "api-user", "credits": 1000.0}});
        let envelope: AccountEnvelope = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.account.username, "api-user");
    }
}
