//! Approximate-time synchronization of timestamped messages from multiple
//! independently-arriving streams.
//!
//! Each input stream delivers messages in timestamp order, but streams are
//! not aligned with each other. The [`Synchronizer`] buffers a bounded
//! number of messages per stream and, after every delivery, tries to form
//! one [`Tuple`] whose member timestamps all lie within a configured
//! tolerance. The [`Watchdog`] audits the arrival and emission counters on
//! a fixed period and flags streams whose arrival rate no longer supports
//! successful matching.
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//! use syzygy_core::{SyncConfig, Synchronizer, WithTimestamp};
//!
//! // Define your message type
//! #[derive(Clone)]
//! struct MyMessage(Duration);
//!
//! impl WithTimestamp for MyMessage {
//!     fn timestamp(&self) -> Duration {
//!         self.0
//!     }
//! }
//!
//! # fn main() -> eyre::Result<()> {
//! let config = SyncConfig {
//!     tolerance: Duration::from_millis(10),
//!     capacity: 5,
//! };
//! let mut sync = Synchronizer::new(["X", "Y"], &config)?;
//!
//! // Each delivery triggers a matching pass.
//! assert!(sync.push(&"X", MyMessage(Duration::from_millis(100))).is_none());
//! let tuple = sync
//!     .push(&"Y", MyMessage(Duration::from_millis(103)))
//!     .expect("timestamps within tolerance");
//!
//! assert_eq!(tuple.pivot(), Duration::from_millis(103));
//! assert_eq!(tuple.spread(), Duration::from_millis(3));
//! # Ok(())
//! # }
//! ```

pub mod buffer;
mod config;
pub mod inbox;
mod sync;
mod types;
pub mod watchdog;

pub use config::SyncConfig;
pub use inbox::{Inbox, SourceSender};
pub use sync::Synchronizer;
pub use types::*;
pub use watchdog::{HealthReport, StreamHealth, Watchdog, WatchdogConfig};
