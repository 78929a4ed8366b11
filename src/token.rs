//! One-shot completion handles for sub-operations.
//!
//! Instead of threading a counter plus an index through every callback, a
//! caller can hand each sub-operation its own token. A [`SlotToken`] reports
//! into one result slot, a [`CompletionToken`] only counts. Both are consumed
//! when they report, so a sub-operation cannot report twice through them.
//!
//! A token dropped without reporting, for example because the callback that
//! owned it was discarded, reports on drop with no value and logs a warning.
//! The join then still completes, with the slot left unset.

use tracing::warn;

use crate::{counter::JoinCounter, error::JoinError, state::Completion, step::Step};

/// Reports the completion of the sub-operation that owns slot `index`.
#[must_use = "a dropped token reports its slot as empty"]
pub struct SlotToken<T: Send + 'static> {
    counter: Option<JoinCounter<T>>,
    index: usize,
}

impl<T: Send + 'static> SlotToken<T> {
    pub(crate) fn new(counter: JoinCounter<T>, index: usize) -> Self {
        SlotToken {
            counter: Some(counter),
            index,
        }
    }

    /// Slot this token reports into.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Stores `value` in the slot and counts the completion.
    pub fn complete(self, value: T) -> Result<Step<usize, ()>, JoinError> {
        self.report(Some(value))
    }

    /// Counts the completion, leaving the slot unset.
    pub fn fail(self) -> Result<Step<usize, ()>, JoinError> {
        self.report(None)
    }

    /// Reports `value` as produced, `None` meaning nothing was produced.
    pub fn report(mut self, value: Option<T>) -> Result<Step<usize, ()>, JoinError> {
        match self.counter.take() {
            Some(counter) => counter.record(Completion::Slot {
                index: self.index,
                value,
            }),
            None => Err(JoinError::CounterAlreadyComplete),
        }
    }
}

impl<T: Send + 'static> Drop for SlotToken<T> {
    fn drop(&mut self) {
        if let Some(counter) = self.counter.take() {
            warn!(
                label = counter.label(),
                index = self.index,
                "slot token dropped without reporting"
            );
            let _ = counter.record(Completion::empty_slot(self.index));
        }
    }
}

/// Reports the completion of a sub-operation without a result slot.
#[must_use = "a dropped token reports its completion immediately"]
pub struct CompletionToken<T: Send + 'static> {
    counter: Option<JoinCounter<T>>,
}

impl<T: Send + 'static> CompletionToken<T> {
    pub(crate) fn new(counter: JoinCounter<T>) -> Self {
        CompletionToken {
            counter: Some(counter),
        }
    }

    /// Counts the completion.
    pub fn complete(mut self) -> Result<Step<usize, ()>, JoinError> {
        match self.counter.take() {
            Some(counter) => counter.record(Completion::Untracked),
            None => Err(JoinError::CounterAlreadyComplete),
        }
    }
}

impl<T: Send + 'static> Drop for CompletionToken<T> {
    fn drop(&mut self) {
        if let Some(counter) = self.counter.take() {
            warn!(label = counter.label(), "completion token dropped without reporting");
            let _ = counter.record(Completion::Untracked);
        }
    }
}
