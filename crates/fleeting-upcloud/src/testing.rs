//! Closure-driven `UpcloudService` double for controller tests.

use std::sync::Mutex;

use async_trait::async_trait;
use upcloud_api::{
    Account, CreateServerRequest, IpAddress, IpAddressAccess, IpAddressFamily, Server, ServerDetails,
    StatusCode, StopType,
};

use crate::UpcloudService;

type ApiResult<T> = upcloud_api::Result<T>;

/// Every method panics unless a test overrides it, so unexpected provider
/// calls fail loudly.
pub(crate) struct MockService {
    pub get_account: Box<dyn Fn() -> ApiResult<Account> + Send + Sync>,
    pub list_servers_by_label: Box<dyn Fn(&str, &str) -> ApiResult<Vec<Server>> + Send + Sync>,
    pub create_server: Box<dyn Fn(&CreateServerRequest) -> ApiResult<ServerDetails> + Send + Sync>,
    pub stop_server: Box<dyn Fn(&str, StopType) -> ApiResult<ServerDetails> + Send + Sync>,
    pub wait_for_server_state: Box<dyn Fn(&str, &str) -> ApiResult<ServerDetails> + Send + Sync>,
    pub delete_server_and_storages: Box<dyn Fn(&str) -> ApiResult<()> + Send + Sync>,
    pub get_server_details: Box<dyn Fn(&str) -> ApiResult<ServerDetails> + Send + Sync>,
    calls: Mutex<Vec<&'static str>>,
    created: Mutex<Vec<CreateServerRequest>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            get_account: Box::new(|| panic!("unexpected call to get_account")),
            list_servers_by_label: Box::new(|_, _| panic!("unexpected call to list_servers_by_label")),
            create_server: Box::new(|_| panic!("unexpected call to create_server")),
            stop_server: Box::new(|_, _| panic!("unexpected call to stop_server")),
            wait_for_server_state: Box::new(|_, _| panic!("unexpected call to wait_for_server_state")),
            delete_server_and_storages: Box::new(|_| panic!("unexpected call to delete_server_and_storages")),
            get_server_details: Box::new(|_| panic!("unexpected call to get_server_details")),
            calls: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Stop, wait and delete all succeed.
    pub fn with_removals() -> Self {
        let mut svc = Self::new();
        svc.stop_server = Box::new(|_, _| Ok(ServerDetails::default()));
        svc.wait_for_server_state = Box::new(|_, _| Ok(ServerDetails::default()));
        svc.delete_server_and_storages = Box::new(|_| Ok(()));
        svc
    }

    /// Number of calls made to `method`.
    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|m| **m == method).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every create request received, in order.
    pub fn created(&self) -> Vec<CreateServerRequest> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str) {
        self.calls.lock().unwrap().push(method);
    }
}

#[async_trait]
impl UpcloudService for MockService {
    async fn get_account(&self) -> ApiResult<Account> {
        self.record("get_account");
        (self.get_account)()
    }

    async fn list_servers_by_label(&self, key: &str, value: &str) -> ApiResult<Vec<Server>> {
        self.record("list_servers_by_label");
        (self.list_servers_by_label)(key, value)
    }

    async fn create_server(&self, req: &CreateServerRequest) -> ApiResult<ServerDetails> {
        self.record("create_server");
        self.created.lock().unwrap().push(req.clone());
        (self.create_server)(req)
    }

    async fn stop_server(&self, uuid: &str, stop_type: StopType) -> ApiResult<ServerDetails> {
        self.record("stop_server");
        (self.stop_server)(uuid, stop_type)
    }

    async fn wait_for_server_state(&self, uuid: &str, desired: &str) -> ApiResult<ServerDetails> {
        self.record("wait_for_server_state");
        (self.wait_for_server_state)(uuid, desired)
    }

    async fn delete_server_and_storages(&self, uuid: &str) -> ApiResult<()> {
        self.record("delete_server_and_storages");
        (self.delete_server_and_storages)(uuid)
    }

    async fn get_server_details(&self, uuid: &str) -> ApiResult<ServerDetails> {
        self.record("get_server_details");
        (self.get_server_details)(uuid)
    }
}

pub(crate) fn api_error(body: &str) -> upcloud_api::Error {
    upcloud_api::Error::Api {
        endpoint: "mock",
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: body.to_string(),
    }
}

pub(crate) fn server(uuid: &str, state: &str) -> Server {
    Server {
        uuid: uuid.to_string(),
        state: state.to_string(),
        ..Default::default()
    }
}

pub(crate) fn details_in_state(state: &str) -> ServerDetails {
    ServerDetails {
        server: server("uuid-1", state),
        ip_addresses: Vec::new(),
    }
}

pub(crate) fn ipv4(access: IpAddressAccess, address: &str) -> IpAddress {
    IpAddress {
        access,
        address: address.to_string(),
        family: IpAddressFamily::IPv4,
    }
}

pub(crate) fn details_with_addresses(addresses: Vec<IpAddress>) -> ServerDetails {
    ServerDetails {
        server: server("uuid-1", "started"),
        ip_addresses: addresses,
    }
}
