use async_trait::async_trait;
use std::collections::HashMap;
use std::env;

use crate::domain::credentials::{Credential, CredentialProvider, CredentialType};
use crate::domain::DomainError;

/// Credential provider that reads from environment variables
#[derive(Debug)]
pub struct EnvCredentialProvider {
    mappings: HashMap<CredentialType, String>,
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    pub fn with_mapping(mut self, credential_type: CredentialType, var: impl Into<String>) -> Self {
        self.mappings.insert(credential_type, var.into());
        self
    }

    pub fn with_defaults(self) -> Self {
        self.with_mapping(CredentialType::Groq, "GROQ_API_KEY")
            .with_mapping(CredentialType::OpenAi, "OPENAI_API_KEY")
            .with_mapping(CredentialType::Qdrant, "QDRANT_API_KEY")
            .with_mapping(CredentialType::Gemini, "GOOGLE_API_KEY")
    }

    /// Environment variable consulted for a credential type
    pub fn variable_for(&self, credential_type: &CredentialType) -> Option<String> {
        match credential_type {
            CredentialType::Custom(var) => Some(var.clone()),
            other => self.mappings.get(other).cloned(),
        }
    }

    fn read_credential(&self, credential_type: &CredentialType) -> Result<Credential, DomainError> {
        let var = self.variable_for(credential_type).ok_or_else(|| {
            DomainError::configuration(format!(
                "No environment mapping configured for credential type: {}",
                credential_type
            ))
        })?;

        match env::var(&var) {
            Ok(value) if !value.trim().is_empty() => {
                Ok(Credential::new(credential_type.clone(), value.trim()))
            }
            _ => Err(DomainError::missing_credential(var)),
        }
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new().with_defaults()
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn get_credential(
        &self,
        credential_type: &CredentialType,
    ) -> Result<Credential, DomainError> {
        self.read_credential(credential_type)
    }

    fn provider_name(&self) -> &'static str {
        "env"
    }
}
