//! # Session Lifecycle
//!
//! Owns the connected-session glue around the collector: starting the service,
//! learning its root folder and collector handle, and shutting it down.
//!
//! ## The InventorySession Pattern
//!
//! ```rust,ignore
//! let session = InventorySession::start(inventory, &config).await?;
//! let objects = session.list_inventory().await?;
//! session.shutdown().await?;
//! ```
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop the client** - closes the sender side of the request channel
//! 2. **Service detects closure** - `receiver.recv()` returns `None`
//! 3. **Await completion** - the collector task logs its open cursors and exits
//!
//! Clones of the client handed out elsewhere keep the service alive until they
//! are dropped too.

pub mod session;

pub use session::*;
