use async_trait::async_trait;
use std::fmt::Debug;

use super::{Credential, CredentialType};
use crate::domain::DomainError;

/// Trait for credential sources
#[async_trait]
pub trait CredentialProvider: Send + Sync + Debug {
    /// Resolve a credential, failing with `MissingCredential` when absent
    async fn get_credential(&self, credential_type: &CredentialType) -> Result<Credential, DomainError>;

    /// Check if a credential is currently resolvable
    async fn supports(&self, credential_type: &CredentialType) -> bool {
        self.get_credential(credential_type).await.is_ok()
    }

    /// Get provider name for logging/debugging
    fn provider_name(&self) -> &'static str;
}
