//! Fix trigger policy and session bookkeeping

pub mod policy;
pub mod session;

pub use policy::{FixOutcome, FixTriggerPolicy};
pub use session::SessionTracker;
