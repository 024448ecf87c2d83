//! Application layer - Services built on the ports.

pub mod dispatcher;
pub mod query;
pub mod store;
pub mod worker;

pub use dispatcher::{JobDispatcher, JobSubmitter};
pub use query::ProgressQuery;
pub use store::ProgressStore;
pub use worker::JobWorker;
