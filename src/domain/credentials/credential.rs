use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External service a credential belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    Groq,
    OpenAi,
    Qdrant,
    Gemini,
    /// Arbitrary environment variable named in configuration
    Custom(String),
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Groq => write!(f, "groq"),
            Self::OpenAi => write!(f, "openai"),
            Self::Qdrant => write!(f, "qdrant"),
            Self::Gemini => write!(f, "gemini"),
            Self::Custom(name) => write!(f, "custom:{}", name),
        }
    }
}

/// Secret resolved for an external service
#[derive(Clone)]
pub struct Credential {
    credential_type: CredentialType,
    api_key: String,
    fetched_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(credential_type: CredentialType, api_key: impl Into<String>) -> Self {
        Self {
            credential_type,
            api_key: api_key.into(),
            fetched_at: Utc::now(),
        }
    }

    pub fn credential_type(&self) -> &CredentialType {
        &self.credential_type
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("credential_type", &self.credential_type)
            .field("api_key", &"***")
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}
