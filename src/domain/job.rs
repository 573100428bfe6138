//! Units of work scheduled through the job queue.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a claimed job may stay `running` before its key is freed.
pub const DEFAULT_JOB_LEASE: Duration = Duration::from_secs(15 * 60);

/// `last_error` of a job whose worker never reported back.
pub const LEASE_EXPIRED_ERROR: &str = "lease expired before the job finished";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    CreateMobileMoneyTransaction { processing_item_id: Uuid },
    SendTransaction { transaction_id: Uuid },
    FetchTransactionUpdate { transaction_id: Uuid },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::CreateMobileMoneyTransaction { .. } => "create_mobile_money_transaction",
            Job::SendTransaction { .. } => "send_transaction",
            Job::FetchTransactionUpdate { .. } => "fetch_transaction_update",
        }
    }

    /// At most one job per key may be queued or running at a time.
    pub fn dedup_key(&self) -> String {
        let id = match self {
            Job::CreateMobileMoneyTransaction { processing_item_id } => processing_item_id,
            Job::SendTransaction { transaction_id } => transaction_id,
            Job::FetchTransactionUpdate { transaction_id } => transaction_id,
        };
        format!("{}:{}", self.kind(), id)
    }
}

/// A job claimed from the queue.
#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub id: Uuid,
    pub job: Job,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_key_is_namespaced_by_kind() {
        let id = Uuid::new_v4();
        let send = Job::SendTransaction { transaction_id: id };
        let fetch = Job::FetchTransactionUpdate { transaction_id: id };
        assert_ne!(send.dedup_key(), fetch.dedup_key());
        assert_eq!(send.dedup_key(), format!("send_transaction:{id}"));
    }

    #[test]
    fn test_job_payload_round_trip() {
        let job = Job::CreateMobileMoneyTransaction {
            processing_item_id: Uuid::new_v4(),
        };
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["kind"], "create_mobile_money_transaction");
        assert_eq!(serde_json::from_value::<Job>(value).unwrap(), job);
    }
}
