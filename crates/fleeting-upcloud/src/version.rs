/// Build metadata reported to the autoscaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub revision: &'static str,
    pub reference: &'static str,
    pub built_at: &'static str,
}

impl VersionInfo {
    /// `{name}@{revision} built {built_at}`.
    pub fn build_info(&self) -> String {
        format!("{}@{} built {}", self.name, self.revision, self.built_at)
    }
}

/// Revision and build date are injected at compile time via
/// `FLEETING_UPCLOUD_REVISION` and `FLEETING_UPCLOUD_BUILT_AT`.
pub const VERSION: VersionInfo = VersionInfo {
    name: "fleeting-plugin-upcloud",
    version: env!("CARGO_PKG_VERSION"),
    revision: match option_env!("FLEETING_UPCLOUD_REVISION") {
        Some(revision) => revision,
        None => "unknown",
    },
    reference: "gitlab.com/kirbo/fleeting-plugin-upcloud",
    built_at: match option_env!("FLEETING_UPCLOUD_BUILT_AT") {
        Some(built_at) => built_at,
        None => "unknown",
    },
};
