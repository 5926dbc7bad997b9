//! Actor system for live updates.
//!
//! ```text
//! FsActor ──► StoreActor ──► Delivery hub ──► WsActor ──► browsers
//! (notify)    (reload)       (fan-out)        (push)
//! ```
//!
//! - `messages` - message types between actors
//! - `fs` - directory watcher with debouncing
//! - `store` - applies reloads and publishes change events
//! - `ws` - WebSocket clients
//! - `coordinator` - wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod store;
pub mod ws;

pub use coordinator::Coordinator;
