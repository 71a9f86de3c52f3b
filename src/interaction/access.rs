//! Access-control contract operations.

use std::sync::Arc;

use crate::blockchain::SigningIdentity;
use crate::interaction::{expect_bool, RoleClient};
use crate::provider::{ContractRole, DispatchResult, ProviderAdapter, ProviderFactory};

#[derive(Clone)]
pub struct AccessInteraction {
    client: RoleClient,
}

impl AccessInteraction {
    pub fn new(factory: &ProviderFactory, variant: &str) -> DispatchResult<Self> {
        Ok(Self::with_adapter(factory.create(variant)?))
    }

    pub fn with_adapter(adapter: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            client: RoleClient::new(adapter, ContractRole::Access),
        }
    }

    pub async fn grant_access(
        &self,
        identity: &SigningIdentity,
        resource_id: &str,
        grantee_id: &str,
    ) -> DispatchResult<bool> {
        self.client
            .send(identity, "grantAccess", &[("resourceId", resource_id), ("granteeId", grantee_id)])
            .await
    }

    pub async fn revoke_access(
        &self,
        identity: &SigningIdentity,
        resource_id: &str,
        grantee_id: &str,
    ) -> DispatchResult<bool> {
        self.client
            .send(identity, "revokeAccess", &[("resourceId", resource_id), ("granteeId", grantee_id)])
            .await
    }

    pub async fn check_access(
        &self,
        identity: &SigningIdentity,
        resource_id: &str,
        grantee_id: &str,
    ) -> DispatchResult<bool> {
        let value = self
            .client
            .call(identity, "checkAccess", &[("resourceId", resource_id), ("granteeId", grantee_id)])
            .await?;
        expect_bool("checkAccess", value)
    }
}
