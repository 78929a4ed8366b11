/// Outcome of feeding one completion into a join.
///
/// `Step` is what [`JoinState::record`](crate::JoinState::record) and
/// [`JoinCounter::record_completion`](crate::JoinCounter::record_completion) hand
/// back: either the join is still waiting on more sub-operations, or the
/// completion just recorded was the last one.
///
/// # Examples
///
/// ```rust
/// use fanin::Step;
///
/// let waiting: Step<usize, &str> = Step::Pending(2);
/// assert_eq!(waiting.pending_value(), Some(2));
///
/// let done: Step<usize, &str> = Step::Complete("joined");
/// assert!(done.is_complete());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step<P, D> {
    /// The join is still waiting; carries progress information, usually the
    /// number of sub-operations that have not reported yet.
    Pending(P),
    /// The join finished on this step.
    Complete(D),
}

impl<P, D> Step<P, D> {
    /// Returns `true` if the step is `Pending`.
    #[inline]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Step::Pending(_))
    }

    /// Returns `true` if the step is `Complete`.
    ///
    /// ```rust
    /// use fanin::Step;
    ///
    /// let x: Step<usize, ()> = Step::Complete(());
    /// assert!(x.is_complete());
    /// assert!(!Step::<usize, ()>::Pending(1).is_complete());
    /// ```
    #[inline]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Step::Complete(_))
    }

    /// Converts into `Option<P>`, discarding a complete value.
    #[inline]
    pub fn pending_value(self) -> Option<P> {
        match self {
            Step::Pending(p) => Some(p),
            Step::Complete(_) => None,
        }
    }

    /// Converts into `Option<D>`, discarding a pending value.
    #[inline]
    pub fn complete_value(self) -> Option<D> {
        match self {
            Step::Pending(_) => None,
            Step::Complete(d) => Some(d),
        }
    }

    /// Maps the pending value, leaving a complete step untouched.
    #[inline]
    pub fn map_pending<P2, F>(self, f: F) -> Step<P2, D>
    where
        F: FnOnce(P) -> P2,
    {
        match self {
            Step::Pending(p) => Step::Pending(f(p)),
            Step::Complete(d) => Step::Complete(d),
        }
    }

    /// Maps the complete value, leaving a pending step untouched.
    ///
    /// ```rust
    /// use fanin::Step;
    ///
    /// let x: Step<usize, Vec<u8>> = Step::Complete(vec![1, 2]);
    /// assert_eq!(x.map_complete(|v| v.len()), Step::Complete(2));
    /// ```
    #[inline]
    pub fn map_complete<D2, F>(self, f: F) -> Step<P, D2>
    where
        F: FnOnce(D) -> D2,
    {
        match self {
            Step::Pending(p) => Step::Pending(p),
            Step::Complete(d) => Step::Complete(f(d)),
        }
    }

    /// Converts from `&Step<P, D>` to `Step<&P, &D>`.
    #[inline]
    pub const fn as_ref(&self) -> Step<&P, &D> {
        match self {
            Step::Pending(p) => Step::Pending(p),
            Step::Complete(d) => Step::Complete(d),
        }
    }

    /// Returns the pending value.
    ///
    /// # Panics
    ///
    /// Panics if the step is `Complete`.
    #[inline]
    pub fn unwrap_pending(self) -> P {
        match self {
            Step::Pending(p) => p,
            Step::Complete(_) => panic!("called `Step::unwrap_pending()` on a `Complete` value"),
        }
    }

    /// Returns the complete value.
    ///
    /// # Panics
    ///
    /// Panics if the step is `Pending`.
    #[inline]
    pub fn unwrap_complete(self) -> D {
        match self {
            Step::Pending(_) => panic!("called `Step::unwrap_complete()` on a `Pending` value"),
            Step::Complete(d) => d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pending_and_is_complete() {
        let p: Step<usize, &str> = Step::Pending(3);
        let d: Step<usize, &str> = Step::Complete("done");

        assert!(p.is_pending());
        assert!(!p.is_complete());
        assert!(d.is_complete());
        assert!(!d.is_pending());
    }

    #[test]
    fn test_values() {
        let p: Step<usize, &str> = Step::Pending(3);
        let d: Step<usize, &str> = Step::Complete("done");

        assert_eq!(p.pending_value(), Some(3));
        assert_eq!(p.complete_value(), None);
        assert_eq!(d.pending_value(), None);
        assert_eq!(d.complete_value(), Some("done"));
    }

    #[test]
    fn test_maps() {
        let p: Step<usize, usize> = Step::Pending(3);
        let d: Step<usize, usize> = Step::Complete(10);

        assert_eq!(p.map_pending(|x| x + 1), Step::Pending(4));
        assert_eq!(p.map_complete(|x| x * 2), Step::Pending(3));
        assert_eq!(d.map_complete(|x| x * 2), Step::Complete(20));
        assert_eq!(d.as_ref(), Step::Complete(&10));
    }

    #[test]
    #[should_panic(expected = "called `Step::unwrap_complete()` on a `Pending` value")]
    fn test_unwrap_complete_panics() {
        let p: Step<usize, ()> = Step::Pending(1);
        p.unwrap_complete();
    }

    #[test]
    fn test_unwrap_pending() {
        let p: Step<usize, ()> = Step::Pending(1);
        assert_eq!(p.unwrap_pending(), 1);
    }
}
