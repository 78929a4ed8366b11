//! The join state machine, free of locking and callbacks.
//!
//! [`JoinState`] is the record behind every [`JoinCounter`](crate::JoinCounter):
//! it knows how many sub-operations are still outstanding and holds the result
//! slots. It is driven one [`Completion`] at a time and answers with a
//! [`Step`]: `Pending(remaining)` while the join waits, `Complete(results)` on
//! the completion that brought `remaining` to zero. It never invokes anything
//! itself, so it can be embedded in any driver.
//!
//! # Examples
//!
//! ```
//! use fanin::{Completion, JoinState, ResultSet, Step};
//!
//! // Two items, each with a primary and a companion operation.
//! let mut state = JoinState::new(4, 2).unwrap();
//! assert_eq!(state.start(), Step::Pending(4));
//!
//! assert_eq!(state.record(Completion::slot(1, "b")).unwrap(), Step::Pending(3));
//! assert_eq!(state.record(Completion::Untracked).unwrap(), Step::Pending(2));
//! assert_eq!(state.record(Completion::slot(0, "a")).unwrap(), Step::Pending(1));
//!
//! let done = state.record(Completion::Untracked).unwrap();
//! assert_eq!(done, Step::Complete(ResultSet::Slots(vec![Some("a"), Some("b")])));
//! ```

use std::mem;

use crate::{error::JoinError, result::ResultSet, step::Step};

/// Lifecycle of a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for sub-operations to report.
    Pending,
    /// Every sub-operation reported and the results were handed out.
    Complete,
    /// Cancelled before completion; the results were discarded.
    Cancelled,
}

impl Phase {
    /// Returns `true` once the join can no longer accept completions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Phase::Pending)
    }
}

/// One sub-operation reporting that it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    /// The sub-operation owns result slot `index`. `value` is `None` when it
    /// finished without producing anything.
    Slot {
        /// Logical item position
        index: usize,
        /// Produced value, if any
        value: Option<T>,
    },
    /// The sub-operation only counts toward the total.
    Untracked,
}

impl<T> Completion<T> {
    /// A slotted completion carrying a value.
    pub fn slot(index: usize, value: T) -> Self {
        Completion::Slot {
            index,
            value: Some(value),
        }
    }

    /// A slotted completion that produced nothing.
    pub fn empty_slot(index: usize) -> Self {
        Completion::Slot { index, value: None }
    }

    /// Builds a completion from the loose `(index, value)` pair used by
    /// callback-style callers.
    ///
    /// A value without an index has nowhere to go and is rejected.
    pub fn from_parts(index: Option<usize>, value: Option<T>) -> Result<Self, JoinError> {
        match (index, value) {
            (Some(index), value) => Ok(Completion::Slot { index, value }),
            (None, None) => Ok(Completion::Untracked),
            (None, Some(_)) => Err(JoinError::invalid(
                "a completion value was supplied without a slot index",
            )),
        }
    }

    /// Slot index this completion targets, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            Completion::Slot { index, .. } => Some(*index),
            Completion::Untracked => None,
        }
    }
}

/// Counting and slot bookkeeping for one fan-in join.
///
/// A state is created when the fan-out begins and is finished for good once
/// it completes or is cancelled; it is never reset.
#[derive(Debug)]
pub struct JoinState<T> {
    expected: usize,
    remaining: usize,
    slots: Vec<Option<T>>,
    reported: Vec<bool>,
    phase: Phase,
}

impl<T> JoinState<T> {
    /// Creates a state expecting `expected` completions, `slots` of which
    /// carry a result slot.
    ///
    /// Fails with [`JoinError::InvalidArgument`] if there are more slots than
    /// sub-operations, since every slot is filled by one of them.
    pub fn new(expected: usize, slots: usize) -> Result<Self, JoinError> {
        if slots > expected {
            return Err(JoinError::invalid(format!(
                "{slots} result slots cannot be filled by {expected} sub-operations"
            )));
        }

        Ok(JoinState {
            expected,
            remaining: expected,
            slots: (0..slots).map(|_| None).collect(),
            reported: vec![false; slots],
            phase: Phase::Pending,
        })
    }

    /// Resolves a join that has nothing to wait for.
    ///
    /// With zero expected completions this finishes the state and returns
    /// `Complete(ResultSet::Empty)`. Otherwise, or when called again, it only
    /// reports the remaining count.
    pub fn start(&mut self) -> Step<usize, ResultSet<T>> {
        if self.phase == Phase::Pending && self.remaining == 0 {
            self.phase = Phase::Complete;
            return Step::Complete(ResultSet::Empty);
        }
        Step::Pending(self.remaining)
    }

    /// Records one sub-operation's completion.
    ///
    /// Returns `Pending(remaining)` while other sub-operations are
    /// outstanding and `Complete(results)` exactly once, on the completion
    /// that brings the count to zero. On error nothing is changed.
    pub fn record(
        &mut self,
        completion: Completion<T>,
    ) -> Result<Step<usize, ResultSet<T>>, JoinError> {
        if self.phase.is_terminal() || self.remaining == 0 {
            return Err(JoinError::CounterAlreadyComplete);
        }

        if let Completion::Slot { index, value } = completion {
            match self.reported.get(index) {
                None => {
                    return Err(JoinError::invalid(format!(
                        "slot index {index} is out of range for {} slots",
                        self.slots.len()
                    )));
                }
                Some(true) => return Err(JoinError::DuplicateCompletion { index }),
                Some(false) => {
                    self.reported[index] = true;
                    self.slots[index] = value;
                }
            }
        }

        self.remaining -= 1;
        if self.remaining > 0 {
            return Ok(Step::Pending(self.remaining));
        }

        self.phase = Phase::Complete;
        self.reported.clear();
        Ok(Step::Complete(ResultSet::Slots(mem::take(&mut self.slots))))
    }

    /// Cancels a pending join, dropping whatever was collected.
    ///
    /// Returns `false` if the join had already finished.
    pub fn cancel(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = Phase::Cancelled;
        self.slots.clear();
        self.reported.clear();
        true
    }

    /// Number of completions the join was created for.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Completions still outstanding.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Number of result slots. Drops to zero once the results are handed out.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` if slot `index` has already been reported.
    pub fn is_reported(&self, index: usize) -> bool {
        self.reported.get(index).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_expected_completes_on_start() {
        let mut state: JoinState<u8> = JoinState::new(0, 0).unwrap();
        assert_eq!(state.start(), Step::Complete(ResultSet::Empty));
        assert_eq!(state.phase(), Phase::Complete);
        // A second start does not complete again.
        assert_eq!(state.start(), Step::Pending(0));
        assert_eq!(
            state.record(Completion::Untracked),
            Err(JoinError::CounterAlreadyComplete)
        );
    }

    #[test]
    fn test_more_slots_than_operations_is_rejected() {
        let err = JoinState::<u8>::new(1, 2).unwrap_err();
        assert!(matches!(err, JoinError::InvalidArgument { .. }));
    }

    #[test]
    fn test_completes_exactly_once() {
        let mut state = JoinState::new(3, 3).unwrap();
        assert_eq!(state.start(), Step::Pending(3));
        assert_eq!(state.record(Completion::slot(2, 'c')).unwrap(), Step::Pending(2));
        assert_eq!(state.record(Completion::slot(0, 'a')).unwrap(), Step::Pending(1));
        assert_eq!(
            state.record(Completion::slot(1, 'b')).unwrap(),
            Step::Complete(ResultSet::Slots(vec![Some('a'), Some('b'), Some('c')]))
        );
        assert_eq!(state.remaining(), 0);
        assert_eq!(
            state.record(Completion::slot(1, 'x')),
            Err(JoinError::CounterAlreadyComplete)
        );
    }

    #[test]
    fn test_duplicate_leaves_state_untouched() {
        let mut state = JoinState::new(2, 2).unwrap();
        state.record(Completion::slot(0, 1)).unwrap();
        assert_eq!(
            state.record(Completion::slot(0, 9)),
            Err(JoinError::DuplicateCompletion { index: 0 })
        );
        assert_eq!(state.remaining(), 1);
        assert_eq!(
            state.record(Completion::slot(1, 2)).unwrap(),
            Step::Complete(ResultSet::Slots(vec![Some(1), Some(2)]))
        );
    }

    #[test]
    fn test_empty_slot_still_guards_against_duplicates() {
        let mut state: JoinState<u8> = JoinState::new(2, 1).unwrap();
        state.record(Completion::empty_slot(0)).unwrap();
        assert!(state.is_reported(0));
        assert_eq!(
            state.record(Completion::slot(0, 5)),
            Err(JoinError::DuplicateCompletion { index: 0 })
        );
        assert_eq!(
            state.record(Completion::Untracked).unwrap(),
            Step::Complete(ResultSet::Slots(vec![None]))
        );
    }

    #[test]
    fn test_out_of_range_index() {
        let mut state = JoinState::new(2, 1).unwrap();
        let err = state.record(Completion::slot(1, ())).unwrap_err();
        assert!(matches!(err, JoinError::InvalidArgument { .. }));
        assert_eq!(state.remaining(), 2);
    }

    #[test]
    fn test_cancel() {
        let mut state = JoinState::new(2, 2).unwrap();
        state.record(Completion::slot(0, "kept?")).unwrap();
        assert!(state.cancel());
        assert!(!state.cancel());
        assert_eq!(state.phase(), Phase::Cancelled);
        assert_eq!(
            state.record(Completion::slot(1, "late")),
            Err(JoinError::CounterAlreadyComplete)
        );
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(
            Completion::from_parts(Some(1), Some("v")).unwrap(),
            Completion::slot(1, "v")
        );
        assert_eq!(
            Completion::<&str>::from_parts(Some(1), None).unwrap(),
            Completion::empty_slot(1)
        );
        assert_eq!(
            Completion::<&str>::from_parts(None, None).unwrap(),
            Completion::Untracked
        );
        assert!(Completion::from_parts(None, Some("orphan")).is_err());
    }
}
