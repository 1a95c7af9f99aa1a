//! In-memory alert storage
//!
//! The [`AlertStore`] is the single authoritative owner of active alerts.
//! It lives only in process memory: every alert is lost on restart.
//!
//! ## Design
//!
//! - **Owned, not ambient**: the store is constructed explicitly and shared via `Arc`
//! - **Single writer**: `create` and `remove` serialize on one write lock, which also
//!   guards the id sequence counter
//! - **Concurrent reads**: `get` and `list` take a read lock and clone a snapshot
//!
//! ## Usage
//!
//! ```no_run
//! use durga_guardian::{Location, storage::AlertStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = AlertStore::new();
//!     let alert = store.create("u1", Some(Location::new(12.9, 77.6))).await?;
//!     store.remove(&alert.alert_id).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;

pub use error::{AlertError, AlertResult};
pub use memory::AlertStore;
