//! File registry contract operations.
//!
//! Files are tracked by id and content hash; the content itself lives
//! off-chain.

use std::sync::Arc;

use crate::blockchain::SigningIdentity;
use crate::interaction::{expect_string, RoleClient};
use crate::provider::{ContractRole, DispatchResult, ProviderAdapter, ProviderFactory};

#[derive(Clone)]
pub struct FileManagementInteraction {
    client: RoleClient,
}

impl FileManagementInteraction {
    pub fn new(factory: &ProviderFactory, variant: &str) -> DispatchResult<Self> {
        Ok(Self::with_adapter(factory.create(variant)?))
    }

    pub fn with_adapter(adapter: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            client: RoleClient::new(adapter, ContractRole::FileManagement),
        }
    }

    pub async fn save_file(
        &self,
        identity: &SigningIdentity,
        file_id: &str,
        content_hash: &str,
        owner_id: &str,
    ) -> DispatchResult<bool> {
        self.client
            .send(
                identity,
                "saveFile",
                &[("fileId", file_id), ("contentHash", content_hash), ("ownerId", owner_id)],
            )
            .await
    }

    pub async fn share_file(
        &self,
        identity: &SigningIdentity,
        file_id: &str,
        recipient_id: &str,
    ) -> DispatchResult<bool> {
        self.client
            .send(identity, "shareFile", &[("fileId", file_id), ("recipientId", recipient_id)])
            .await
    }

    /// Content hash stored for `file_id`.
    pub async fn get_file(&self, identity: &SigningIdentity, file_id: &str) -> DispatchResult<String> {
        let value = self.client.call(identity, "getFile", &[("fileId", file_id)]).await?;
        expect_string("getFile", value)
    }
}
