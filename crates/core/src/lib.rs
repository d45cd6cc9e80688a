//! Helmet compliance monitoring over a tracked person/helmet detection feed.
//!
//! [`compliance`] holds the per-identity state machine; the other modules
//! connect it to a detection feed, a notification channel and alert
//! snapshots.

pub mod compliance;
pub mod detection;
pub mod notification;
pub mod pipeline;
pub mod shared;
pub mod snapshot;
