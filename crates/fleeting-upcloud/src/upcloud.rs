use async_trait::async_trait;
use upcloud_api::{
    Account, CreateServerRequest, DEFAULT_WAIT_TIMEOUT, Server, ServerDetails, StopType, UpcloudClient,
};

use crate::UpcloudService;

/// Production binding: delegates every call to `upcloud_api::UpcloudClient`.
#[async_trait]
impl UpcloudService for UpcloudClient {
    async fn get_account(&self) -> upcloud_api::Result<Account> {
        UpcloudClient::get_account(self).await
    }

    async fn list_servers_by_label(&self, key: &str, value: &str) -> upcloud_api::Result<Vec<Server>> {
        UpcloudClient::list_servers_by_label(self, key, value).await
    }

    async fn create_server(&self, req: &CreateServerRequest) -> upcloud_api::Result<ServerDetails> {
        UpcloudClient::create_server(self, req).await
    }

    async fn stop_server(&self, uuid: &str, stop_type: StopType) -> upcloud_api::Result<ServerDetails> {
        UpcloudClient::stop_server(self, uuid, stop_type).await
    }

    async fn wait_for_server_state(&self, uuid: &str, desired: &str) -> upcloud_api::Result<ServerDetails> {
        UpcloudClient::wait_for_server_state(self, uuid, desired, DEFAULT_WAIT_TIMEOUT).await
    }

    async fn delete_server_and_storages(&self, uuid: &str) -> upcloud_api::Result<()> {
        UpcloudClient::delete_server_and_storages(self, uuid).await
    }

    async fn get_server_details(&self, uuid: &str) -> upcloud_api::Result<ServerDetails> {
        UpcloudClient::get_server_details(self, uuid).await
    }
}
