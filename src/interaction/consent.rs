//! Consent contract operations.

use std::sync::Arc;

use crate::blockchain::SigningIdentity;
use crate::interaction::{expect_bool, RoleClient};
use crate::provider::{ContractRole, DispatchResult, ProviderAdapter, ProviderFactory};

#[derive(Clone)]
pub struct ConsentInteraction {
    client: RoleClient,
}

impl ConsentInteraction {
    /// Bind to a fresh adapter of `variant` from `factory`.
    pub fn new(factory: &ProviderFactory, variant: &str) -> DispatchResult<Self> {
        Ok(Self::with_adapter(factory.create(variant)?))
    }

    pub fn with_adapter(adapter: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            client: RoleClient::new(adapter, ContractRole::Consent),
        }
    }

    /// Record that `owner_id` lets `consumer_id` use `consent_id`.
    pub async fn give_consent(
        &self,
        identity: &SigningIdentity,
        consent_id: &str,
        owner_id: &str,
        consumer_id: &str,
    ) -> DispatchResult<bool> {
        self.client
            .send(
                identity,
                "giveConsent",
                &[("consentId", consent_id), ("ownerId", owner_id), ("consumerId", consumer_id)],
            )
            .await
    }

    pub async fn revoke_consent(&self, identity: &SigningIdentity, consent_id: &str) -> DispatchResult<bool> {
        self.client
            .send(identity, "revokeConsent", &[("consentId", consent_id)])
            .await
    }

    pub async fn has_consent(
        &self,
        identity: &SigningIdentity,
        consent_id: &str,
        consumer_id: &str,
    ) -> DispatchResult<bool> {
        let value = self
            .client
            .call(identity, "hasConsent", &[("consentId", consent_id), ("consumerId", consumer_id)])
            .await?;
        expect_bool("hasConsent", value)
    }
}
