//! PacketScore Match-Action Handlers
//!
//! This crate provides:
//! - `set_x_factor` - normalizes a packet's score by its `factor.x` attribute
//! - `split` - buckets a packet into the white/grey/black tier and picks its egress
//! - `TierCounters` - the shared per-tier flow counters the classifier increments
//! - `Metadata` - the named field accessors the host pipeline must provide
//!
//! Handlers are stateless per call. The only shared state is the counters
//! handle, which the host creates once and injects into every `ScorePlugin`.

pub mod classifier;
pub mod counters;
pub mod metadata;
pub mod plugin;
pub mod quantifier;
pub mod verdict;

pub use classifier::classify;
pub use counters::{CounterSnapshot, TierCounters};
pub use metadata::{MatchData, Metadata, PacketMetadata};
pub use plugin::ScorePlugin;
pub use quantifier::quantify;
pub use verdict::{Tier, Verdict, EGRESS_GREY, EGRESS_WHITE};
