//! Core domain logic for voice channel presence.
//!
//! This crate turns relay notifications into presence intervals:
//! - Notification: parsing join/leave/move text into presence events
//! - Reconstruction: pairing events into per-user connected intervals
//! - Filtering: dropping intervals below a minimum duration

pub mod event;
mod filter;
pub mod notification;
mod pipeline;
mod reconstruct;
pub mod types;

pub use event::{PresenceEvent, PresenceInterval, PresenceKind};
pub use filter::{DEFAULT_MIN_DURATION, filter_by_min_duration};
pub use notification::{Notification, classify};
pub use pipeline::{NotificationRecord, PipelineConfig, presence_report};
pub use reconstruct::{ReconstructConfig, reconstruct, reconstruct_with};
pub use types::{UserId, Window, WindowError};
