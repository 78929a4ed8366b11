//! Thread-safe join counter driving a continuation.
//!
//! [`JoinCounter`] wraps a [`JoinState`] behind a mutex and owns the
//! continuation that receives the [`ResultSet`]. Handles are cheap to clone and
//! may be moved into the callbacks of the sub-operations being joined; any of
//! them, on any thread, may report a completion. The decrement-and-check runs
//! inside one critical section, so the continuation fires exactly once.
//!
//! The continuation runs on the call stack of whichever
//! [`record_completion`](JoinCounter::record_completion) brought the count to
//! zero, after the lock has been released. It must not block.
//!
//! # Examples
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use fanin::JoinCounter;
//!
//! let seen = Arc::new(Mutex::new(None));
//! let sink = seen.clone();
//! let counter = JoinCounter::create(2, move |results| {
//!     *sink.lock().unwrap() = Some(results.into_values());
//! })
//! .unwrap();
//!
//! counter.record_completion(Some(1), Some("second")).unwrap();
//! assert!(seen.lock().unwrap().is_none());
//! counter.record_completion(Some(0), Some("first")).unwrap();
//! assert_eq!(*seen.lock().unwrap(), Some(vec!["first", "second"]));
//! ```

use std::{
    fmt,
    sync::{Arc, Weak},
};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    builder::JoinBuilder,
    error::JoinError,
    result::ResultSet,
    state::{Completion, JoinState, Phase},
    step::Step,
    token::{CompletionToken, SlotToken},
};

/// Continuation invoked with the joined results.
pub type Continuation<T> = Box<dyn FnOnce(ResultSet<T>) + Send + 'static>;

pub(crate) const DEFAULT_LABEL: &str = "join";

struct Inner<T> {
    state: JoinState<T>,
    on_complete: Option<Continuation<T>>,
}

struct Shared<T> {
    label: String,
    inner: Mutex<Inner<T>>,
}

/// Handle to an exactly-once fan-in join.
///
/// See the [module documentation](self) for the threading contract.
pub struct JoinCounter<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for JoinCounter<T> {
    fn clone(&self) -> Self {
        JoinCounter {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for JoinCounter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("JoinCounter")
            .field("label", &self.shared.label)
            .field("expected", &inner.state.expected())
            .field("remaining", &inner.state.remaining())
            .field("phase", &inner.state.phase())
            .finish()
    }
}

impl<T: Send + 'static> JoinCounter<T> {
    /// Creates a counter for `total` sub-operations, each owning one result
    /// slot.
    ///
    /// `total` is signed so counts computed by callers can be passed through
    /// unchecked; a negative value fails with [`JoinError::InvalidArgument`]
    /// and `on_complete` is dropped without being called. With `total == 0`
    /// the continuation runs before this returns, with
    /// [`ResultSet::Empty`].
    pub fn create<F>(total: isize, on_complete: F) -> Result<Self, JoinError>
    where
        F: FnOnce(ResultSet<T>) + Send + 'static,
    {
        let total = usize::try_from(total).map_err(|_| {
            warn!(total, "rejecting join with negative total");
            JoinError::invalid(format!("total must not be negative, got {total}"))
        })?;
        Self::new(total, total, on_complete)
    }

    /// Creates a counter for `total` sub-operations of which the first
    /// `slots` logical items carry a result slot.
    pub fn new<F>(total: usize, slots: usize, on_complete: F) -> Result<Self, JoinError>
    where
        F: FnOnce(ResultSet<T>) + Send + 'static,
    {
        Self::open(DEFAULT_LABEL.to_owned(), total, slots, Box::new(on_complete))
    }

    /// Starts configuring a counter for `total` sub-operations.
    pub fn builder(total: usize) -> JoinBuilder<T> {
        JoinBuilder::new(total)
    }

    pub(crate) fn open(
        label: String,
        total: usize,
        slots: usize,
        on_complete: Continuation<T>,
    ) -> Result<Self, JoinError> {
        let mut state = JoinState::new(total, slots).map_err(|err| {
            warn!(label = %label, total, slots, %err, "rejecting join");
            err
        })?;

        let mut on_complete = Some(on_complete);
        if let Step::Complete(empty) = state.start() {
            debug!(label = %label, "nothing to join, completing immediately");
            if let Some(continuation) = on_complete.take() {
                continuation(empty);
            }
        } else {
            debug!(label = %label, total, slots, "join started");
        }

        Ok(JoinCounter {
            shared: Arc::new(Shared {
                label,
                inner: Mutex::new(Inner { state, on_complete }),
            }),
        })
    }

    /// Reports that one sub-operation finished.
    ///
    /// With both `index` and `value`, the value is stored in that slot. With
    /// `index` alone the slot is marked reported but left unset. With
    /// neither, the completion only counts toward the total.
    ///
    /// Returns `Pending(remaining)` or, on the call that fired the
    /// continuation, `Complete(())`.
    pub fn record_completion(
        &self,
        index: Option<usize>,
        value: Option<T>,
    ) -> Result<Step<usize, ()>, JoinError> {
        let completion = Completion::from_parts(index, value).map_err(|err| {
            warn!(label = %self.shared.label, %err, "rejecting completion");
            err
        })?;
        self.record(completion)
    }

    /// Typed form of [`record_completion`](Self::record_completion).
    pub fn record(&self, completion: Completion<T>) -> Result<Step<usize, ()>, JoinError> {
        let label = &self.shared.label;
        let index = completion.index();

        let (continuation, results) = {
            let mut inner = self.shared.inner.lock();
            match inner.state.record(completion) {
                Ok(Step::Pending(remaining)) => {
                    trace!(label = %label, ?index, remaining, "completion recorded");
                    return Ok(Step::Pending(remaining));
                }
                Ok(Step::Complete(results)) => (inner.on_complete.take(), results),
                Err(err) => {
                    warn!(label = %label, ?index, %err, "rejecting completion");
                    return Err(err);
                }
            }
        };

        debug!(label = %label, slots = results.len(), "join complete");
        if let Some(continuation) = continuation {
            continuation(results);
        }
        Ok(Step::Complete(()))
    }

    /// Hands out a one-shot token for the sub-operation that fills slot
    /// `index`.
    pub fn slot_token(&self, index: usize) -> Result<SlotToken<T>, JoinError> {
        let inner = self.shared.inner.lock();
        if inner.state.phase().is_terminal() {
            return Err(JoinError::CounterAlreadyComplete);
        }
        if index >= inner.state.slot_count() {
            return Err(JoinError::invalid(format!("slot index {index} is out of range")));
        }
        if inner.state.is_reported(index) {
            return Err(JoinError::DuplicateCompletion { index });
        }
        drop(inner);
        Ok(SlotToken::new(self.clone(), index))
    }

    /// Hands out a one-shot token for a sub-operation without a result slot.
    pub fn token(&self) -> CompletionToken<T> {
        CompletionToken::new(self.clone())
    }

    /// Cancels a pending join.
    ///
    /// The continuation is dropped without being called and later
    /// completions fail with [`JoinError::CounterAlreadyComplete`]. Returns
    /// `false` if the join had already finished.
    pub fn cancel(&self) -> bool {
        let dropped = {
            let mut inner = self.shared.inner.lock();
            if !inner.state.cancel() {
                return false;
            }
            inner.on_complete.take()
        };
        debug!(label = %self.shared.label, "join cancelled");
        drop(dropped);
        true
    }

    /// Weak handle that can cancel the join without keeping it alive.
    pub fn cancel_handle(&self) -> CancelHandle<T> {
        CancelHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl<T> JoinCounter<T> {
    /// Diagnostic label used in log events.
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Number of sub-operations the join was created for.
    pub fn expected(&self) -> usize {
        self.shared.inner.lock().state.expected()
    }

    /// Sub-operations that have not reported yet.
    pub fn remaining(&self) -> usize {
        self.shared.inner.lock().state.remaining()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.shared.inner.lock().state.phase()
    }

    /// Returns `true` once no further completions are accepted, whether the
    /// join completed or was cancelled.
    pub fn is_complete(&self) -> bool {
        self.phase().is_terminal()
    }
}

/// Cancels a join from a place that should not own it.
pub struct CancelHandle<T> {
    shared: Weak<Shared<T>>,
}

impl<T> Clone for CancelHandle<T> {
    fn clone(&self) -> Self {
        CancelHandle {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> CancelHandle<T> {
    /// Cancels the join if it is still alive and pending.
    pub fn cancel(&self) -> bool {
        match self.shared.upgrade() {
            Some(shared) => JoinCounter { shared }.cancel(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting<T: Send + 'static>(
        calls: &Arc<AtomicUsize>,
        out: &Arc<Mutex<Option<ResultSet<T>>>>,
    ) -> impl FnOnce(ResultSet<T>) + Send + 'static {
        let calls = calls.clone();
        let out = out.clone();
        move |results: ResultSet<T>| {
            calls.fetch_add(1, Ordering::SeqCst);
            *out.lock() = Some(results);
        }
    }

    #[test]
    fn test_zero_total_fires_during_create() {
        let calls = Arc::new(AtomicUsize::new(0));
        let out = Arc::new(Mutex::new(None));
        let counter = JoinCounter::<u32>::create(0, counting(&calls, &out)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*out.lock(), Some(ResultSet::Empty));
        assert!(counter.is_complete());
        assert_eq!(
            counter.record_completion(None, None),
            Err(JoinError::CounterAlreadyComplete)
        );
    }

    #[test]
    fn test_negative_total_never_fires() {
        let calls = Arc::new(AtomicUsize::new(0));
        let out = Arc::new(Mutex::new(None));
        let err = JoinCounter::<u32>::create(-1, counting(&calls, &out)).unwrap_err();

        assert!(matches!(err, JoinError::InvalidArgument { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reverse_order_scenario() {
        let calls = Arc::new(AtomicUsize::new(0));
        let out = Arc::new(Mutex::new(None));
        let counter = JoinCounter::create(6, counting(&calls, &out)).unwrap();

        let values = ["a", "b", "c", "d", "e", "f"];
        for index in (1..6).rev() {
            let step = counter.record_completion(Some(index), Some(values[index])).unwrap();
            assert_eq!(step, Step::Pending(index));
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        }
        assert_eq!(
            counter.record_completion(Some(0), Some("a")).unwrap(),
            Step::Complete(())
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let results = out.lock().take().unwrap();
        assert_eq!(results.into_complete(), Some(values.to_vec()));
    }

    #[test]
    fn test_duplicate_does_not_retrigger() {
        let calls = Arc::new(AtomicUsize::new(0));
        let out = Arc::new(Mutex::new(None));
        let counter = JoinCounter::create(2, counting(&calls, &out)).unwrap();

        counter.record_completion(Some(0), Some(1)).unwrap();
        assert_eq!(
            counter.record_completion(Some(0), Some(2)),
            Err(JoinError::DuplicateCompletion { index: 0 })
        );
        assert_eq!(counter.remaining(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        counter.record_completion(Some(1), Some(3)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            counter.record_completion(Some(1), Some(4)),
            Err(JoinError::CounterAlreadyComplete)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_value_without_index_is_rejected() {
        let counter = JoinCounter::new(1, 0, |_: ResultSet<u8>| {}).unwrap();
        let err = counter.record_completion(None, Some(1)).unwrap_err();
        assert!(matches!(err, JoinError::InvalidArgument { .. }));
        assert_eq!(counter.remaining(), 1);
    }

    #[test]
    fn test_cancel_drops_continuation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let out = Arc::new(Mutex::new(None));
        let counter = JoinCounter::create(2, counting(&calls, &out)).unwrap();
        let handle = counter.cancel_handle();

        counter.record_completion(Some(0), Some('x')).unwrap();
        assert!(handle.cancel());
        assert!(!counter.cancel());
        assert_eq!(counter.phase(), Phase::Cancelled);
        assert_eq!(
            counter.record_completion(Some(1), Some('y')),
            Err(JoinError::CounterAlreadyComplete)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_handle_outlived_counter() {
        let counter = JoinCounter::create(1, |_: ResultSet<u8>| {}).unwrap();
        let handle = counter.cancel_handle();
        drop(counter);
        assert!(!handle.cancel());
    }

    #[test]
    fn test_continuation_may_touch_counter() {
        let slot: Arc<Mutex<Option<JoinCounter<u8>>>> = Arc::new(Mutex::new(None));
        let observed = Arc::new(Mutex::new(None));
        let (slot2, observed2) = (slot.clone(), observed.clone());

        let counter = JoinCounter::create(1, move |_| {
            let counter = slot2.lock().take().unwrap();
            *observed2.lock() = Some(counter.record_completion(None, None));
        })
        .unwrap();
        *slot.lock() = Some(counter.clone());

        counter.record_completion(Some(0), Some(7)).unwrap();
        assert_eq!(
            *observed.lock(),
            Some(Err(JoinError::CounterAlreadyComplete))
        );
    }
}
