/// Protocol the autoscaler uses to reach an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Ssh,
    Winrm,
}

/// Connector defaults supplied by the autoscaler. Empty strings and `None`
/// mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub os: String,
    pub arch: String,
    pub protocol: Option<Protocol>,
    pub protocol_port: Option<u16>,
    pub username: String,
    pub password: String,
    /// Private key bytes (OpenSSH format).
    pub key: Vec<u8>,
    pub use_static_credentials: bool,
}

/// Settings handed to the instance group at initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub connector: ConnectorConfig,
}

/// How to reach one instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectInfo {
    pub id: String,
    pub connector: ConnectorConfig,
    pub external_addr: String,
    pub internal_addr: String,
}

/// Group metadata returned from initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    /// `upcloud/{zone}/{name}`.
    pub id: String,
    pub max_size: usize,
    pub version: String,
    pub build_info: String,
}
