pub mod notify;
pub mod pipeline;
pub mod scheduling;
pub mod server;
pub mod sources;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
