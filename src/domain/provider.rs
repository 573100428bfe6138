use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Maps a host catalog provider onto the gateway's service code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDirectoryEntry {
    pub id: Uuid,
    pub source_provider_id: Uuid,
    pub provider_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderDirectoryEntry {
    pub fn new(source_provider_id: Uuid, provider_code: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            source_provider_id,
            provider_code: provider_code.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
