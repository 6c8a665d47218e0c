pub mod client;
pub mod error;
pub mod transport;

pub use client::*;
pub use error::SyncError;
pub use transport::*;
