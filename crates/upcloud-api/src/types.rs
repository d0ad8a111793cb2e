use serde::{Deserialize, Serialize};

pub const SERVER_STATE_STARTED: &str = "started";
pub const SERVER_STATE_STOPPED: &str = "stopped";
pub const SERVER_STATE_ERROR: &str = "error";
pub const SERVER_STATE_MAINTENANCE: &str = "maintenance";

// ── Account ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Account {
    pub username: String,
    #[serde(default)]
    pub credits: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountEnvelope {
    pub account: Account,
}

// ── Labels ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSlice {
    #[serde(default)]
    pub label: Vec<Label>,
}

// ── IP addresses ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpAddressFamily {
    #[serde(rename = "IPv4")]
    IPv4,
    #[serde(rename = "IPv6")]
    IPv6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpAddressAccess {
    Public,
    Private,
    Utility,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IpAddress {
    pub access: IpAddressAccess,
    pub address: String,
    pub family: IpAddressFamily,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct IpAddressSlice {
    #[serde(default)]
    pub ip_address: Vec<IpAddress>,
}

// ── Servers ──────────────────────────────────────────────────────────

/// Summary returned by the server listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Server {
    pub uuid: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub plan: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub labels: LabelSlice,
}

/// Full server view returned by create, stop and get endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawServerDetails")]
pub struct ServerDetails {
    pub server: Server,
    pub ip_addresses: Vec<IpAddress>,
}

#[derive(Deserialize)]
struct RawServerDetails {
    #[serde(flatten)]
    server: Server,
    #[serde(default)]
    ip_addresses: IpAddressSlice,
}

impl From<RawServerDetails> for ServerDetails {
    fn from(raw: RawServerDetails) -> Self {
        Self {
            server: raw.server,
            ip_addresses: raw.ip_addresses.ip_address,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerDetailsEnvelope {
    pub server: ServerDetails,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServersEnvelope {
    pub servers: ServerSlice,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerSlice {
    #[serde(default)]
    pub server: Vec<Server>,
}

// ── Create server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateServerRequest {
    pub zone: String,
    pub title: String,
    pub hostname: String,
    pub plan: String,
    /// Serialized as `"yes"`/`"no"`.
    #[serde(serialize_with = "yes_no")]
    pub metadata: bool,
    pub labels: LabelSlice,
    pub storage_devices: CreateServerStorageDeviceSlice,
    pub networking: CreateServerNetworking,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_user: Option<LoginUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageDeviceAction {
    Clone,
    Create,
    Attach,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateServerStorageDevice {
    pub action: StorageDeviceAction,
    pub storage: String,
    pub title: String,
    /// GB; `None` inherits the source storage size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// `None` inherits the source storage tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateServerStorageDeviceSlice {
    pub storage_device: Vec<CreateServerStorageDevice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Public,
    Private,
    Utility,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateServerIpAddress {
    pub family: IpAddressFamily,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateServerIpAddressSlice {
    pub ip_address: Vec<CreateServerIpAddress>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateServerInterface {
    pub ip_addresses: CreateServerIpAddressSlice,
    #[serde(rename = "type")]
    pub network_type: NetworkType,
}

impl CreateServerInterface {
    /// Interface with a single IPv4 address of the given network type.
    pub fn ipv4(network_type: NetworkType) -> Self {
        Self {
            ip_addresses: CreateServerIpAddressSlice {
                ip_address: vec![CreateServerIpAddress {
                    family: IpAddressFamily::IPv4,
                }],
            },
            network_type,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateServerInterfaceSlice {
    pub interface: Vec<CreateServerInterface>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateServerNetworking {
    pub interfaces: CreateServerInterfaceSlice,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginUser {
    pub username: String,
    #[serde(serialize_with = "yes_no")]
    pub create_password: bool,
    pub ssh_keys: SshKeySlice,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SshKeySlice {
    pub ssh_key: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateServerEnvelope<'a> {
    pub server: &'a CreateServerRequest,
}

// ── Stop server ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StopType {
    Soft,
    Hard,
}

#[derive(Debug, Serialize)]
pub(crate) struct StopServer {
    pub stop_type: StopType,
    /// Seconds, sent as a string.
    pub timeout: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StopServerEnvelope {
    pub stop_server: StopServer,
}

fn yes_no<S: serde::Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "yes" } else { "no" })
}
