use crate::selector::OrchestrationResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Stored form of one completed orchestration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationRecord {
    pub request_id: String,
    pub recorded_at: DateTime<Utc>,
    pub result: OrchestrationResult,
}

/// Sink for orchestration results. Failures are logged by the caller and otherwise ignored.
#[async_trait]
pub trait OrchestrationRecorder: Send + Sync {
    async fn record(&self, record: OrchestrationRecord) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    records: Mutex<Vec<OrchestrationRecord>>,
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<OrchestrationRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl OrchestrationRecorder for InMemoryRecorder {
    async fn record(&self, record: OrchestrationRecord) -> anyhow::Result<()> {
        self.records.lock().push(record);
        Ok(())
    }
}
