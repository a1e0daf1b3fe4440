//! Arbor Time Library
//!
//! Expiry in the registry is a plain comparison between a stored timestamp
//! and "now". This crate supplies "now" behind the [`Clock`] trait so that the
//! registry can run against wall-clock time in production and against a
//! hand-driven clock in tests and replays.
//!
//! All timestamps are whole seconds since UNIX_EPOCH.

pub mod clock;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
