//! State management module.
//!
//! Contains the sales channel registry (shared runtime state).

mod channels;

pub use channels::{ChannelSnapshot, ChannelStatus, SalesChannelRegistry, normalize_host};
