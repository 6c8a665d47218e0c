pub mod binder;
pub mod context;
pub mod event;
pub mod media;
pub mod page;
pub mod reactor;
pub mod segment;
pub mod store;
