pub mod memory;
pub mod postgres_job_queue;
pub mod postgres_provider_directory;
pub mod postgres_transaction_repository;

pub use memory::{InMemoryJobQueue, InMemoryProviderDirectory, InMemoryTransactionRepository};
pub use postgres_job_queue::PostgresJobQueue;
pub use postgres_provider_directory::PostgresProviderDirectory;
pub use postgres_transaction_repository::PostgresTransactionRepository;
