//! # fanin: exactly-once fan-in joins
//!
//! Wait for a known number of independent asynchronous sub-operations and hand
//! their results to one continuation, exactly once, after the last of them
//! reports.
//!
//! ## Core Types
//!
//! - **[`JoinCounter`]**: thread-safe handle that counts completions and fires
//!   the continuation
//! - **[`JoinState`]**: the lock-free state machine underneath, driven one
//!   [`Completion`] at a time
//! - **[`ResultSet`]**: the ordered result slots, or the empty sentinel
//! - **[`Step`]**: `Pending(remaining)` or `Complete(..)`, returned for every
//!   recorded completion
//!
//! ## Key Features
//!
//! - **Exactly once**: the continuation runs on the completion that brings the
//!   count to zero, never earlier and never twice
//! - **Ordered**: results are placed by item index, not by completion order
//! - **Strict**: duplicate slots, late completions and bad arguments are
//!   reported as [`JoinError`]s without touching the join
//! - **Cancellable**: [`JoinCounter::cancel`] drops the continuation of a join
//!   that will never finish
//!
//! ## Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use fanin::*;
//!
//! let out = Arc::new(Mutex::new(Vec::new()));
//! let sink = out.clone();
//! let counter = JoinCounter::create(4, move |results: ResultSet<&'static str>| {
//!     sink.lock().unwrap().extend(results.into_values());
//! })
//! .unwrap();
//!
//! for (index, value) in [(3, "v3"), (1, "v1"), (0, "v0"), (2, "v2")] {
//!     counter.record_completion(Some(index), Some(value)).unwrap();
//! }
//! assert_eq!(*out.lock().unwrap(), vec!["v0", "v1", "v2", "v3"]);
//! ```
//!
//! ## Common Functions
//!
//! - [`JoinCounter::create(total, f)`](JoinCounter::create) - One slot per sub-operation
//! - [`JoinCounter::builder(total)`](JoinCounter::builder) - Slots, label, continuation or channel
//! - [`fan_out(items, companions, start, f)`](fan_out) - Primary plus companion operations per item
//! - [`channel(total, slots)`](channel()) - Await the results instead of passing a continuation

mod builder;
mod counter;
mod error;
mod fan;
mod receiver;
mod result;
mod state;
mod step;
mod token;

pub mod prelude;

pub use builder::JoinBuilder;
pub use counter::{CancelHandle, Continuation, JoinCounter};
pub use error::JoinError;
pub use fan::fan_out;
pub use receiver::{channel, JoinReceiver};
pub use result::ResultSet;
pub use state::{Completion, JoinState, Phase};
pub use step::Step;
pub use token::{CompletionToken, SlotToken};
