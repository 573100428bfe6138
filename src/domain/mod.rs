pub mod codes;
pub mod job;
pub mod provider;
pub mod state;
pub mod transaction;
pub mod translator;
pub mod upstream;

pub use codes::{AuthCode, PaymentStatusCode};
pub use job::{Job, QueuedJob, DEFAULT_JOB_LEASE, LEASE_EXPIRED_ERROR};
pub use provider::ProviderDirectoryEntry;
pub use state::{ProcessingItemState, TransactionState};
pub use transaction::{NewTransaction, TransactionChange, TransactionRecord};
