pub mod dispatcher;
pub mod jobs;
pub mod worker;

pub use dispatcher::{dispatch_fetch_updates, run_fetch_update_scheduler, DispatchReport};
pub use jobs::{JobError, JobRunner};
pub use worker::Worker;
