pub mod config;
pub mod console;
pub mod driver;
pub mod kernel;
pub mod services;
pub mod timecode;

// Re-export specific items for convenient access
pub use driver::{Driver, Session};
pub use kernel::reactor::Reactor;
pub use kernel::store::SegmentStore;
pub use services::api::SyncClient;
