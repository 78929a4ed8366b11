//! Configuration for join counters.
//!
//! [`JoinBuilder`] collects the shape of a join (total sub-operations, result
//! slots) and its diagnostic label, then produces either a callback-driven
//! [`JoinCounter`] or an awaitable [`JoinReceiver`]. Validation happens when
//! the join is built.
//!
//! ```rust
//! use fanin::{JoinCounter, ResultSet};
//!
//! // Three reactions, each fetched as a bitmap (slotted) and a gif (not slotted).
//! let counter = JoinCounter::builder(6)
//!     .slots(3)
//!     .label("reaction-thumbnails")
//!     .on_complete(|thumbnails: ResultSet<Vec<u8>>| drop(thumbnails))
//!     .unwrap();
//! assert_eq!(counter.label(), "reaction-thumbnails");
//! assert_eq!(counter.remaining(), 6);
//! ```

use std::marker::PhantomData;

use crate::{
    counter::{JoinCounter, DEFAULT_LABEL},
    error::JoinError,
    receiver::{self, JoinReceiver},
    result::ResultSet,
};

/// Builder for [`JoinCounter`].
#[derive(Debug, Clone)]
pub struct JoinBuilder<T> {
    total: usize,
    slots: Option<usize>,
    label: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> JoinBuilder<T> {
    /// Starts a join over `total` sub-operations. By default every
    /// sub-operation owns a slot.
    pub fn new(total: usize) -> Self {
        JoinBuilder {
            total,
            slots: None,
            label: DEFAULT_LABEL.to_owned(),
            _marker: PhantomData,
        }
    }

    /// Number of logical items with a result slot.
    pub fn slots(mut self, slots: usize) -> Self {
        self.slots = Some(slots);
        self
    }

    /// Label attached to every log event of this join.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Total sub-operations configured so far.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Result slots configured so far.
    pub fn slot_count(&self) -> usize {
        self.slots.unwrap_or(self.total)
    }

    /// Builds the counter, delivering results to `on_complete`.
    pub fn on_complete<F>(self, on_complete: F) -> Result<JoinCounter<T>, JoinError>
    where
        F: FnOnce(ResultSet<T>) + Send + 'static,
    {
        let slots = self.slot_count();
        JoinCounter::open(self.label, self.total, slots, Box::new(on_complete))
    }

    /// Builds the counter together with a future resolving to its results.
    pub fn into_channel(self) -> Result<(JoinCounter<T>, JoinReceiver<T>), JoinError> {
        let (forward, rx) = receiver::pair();
        let counter = self.on_complete(forward)?;
        Ok((counter, rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let builder = JoinBuilder::<u8>::new(4);
        assert_eq!(builder.total(), 4);
        assert_eq!(builder.slot_count(), 4);

        let counter = builder.on_complete(|_| {}).unwrap();
        assert_eq!(counter.label(), "join");
        assert_eq!(counter.expected(), 4);
    }

    #[test]
    fn test_too_many_slots() {
        let err = JoinBuilder::<u8>::new(1).slots(2).on_complete(|_| {}).unwrap_err();
        assert!(matches!(err, JoinError::InvalidArgument { .. }));
    }
}
