//! Awaiting a join instead of passing a continuation.
//!
//! [`channel`] builds a [`JoinCounter`] whose continuation forwards the
//! results into a oneshot channel, and returns the receiving half as a
//! [`JoinReceiver`] future. The future resolves with
//! [`JoinError::Cancelled`] if the join is cancelled, or if every counter
//! handle is dropped while sub-operations are still outstanding.
//!
//! ```rust
//! use fanin::{channel, ResultSet};
//!
//! let (counter, receiver) = channel::<&str>(2, 1).unwrap();
//! counter.record_completion(None, None).unwrap();
//! counter.record_completion(Some(0), Some("bitmap")).unwrap();
//!
//! let results = futures::executor::block_on(receiver).unwrap();
//! assert_eq!(results, ResultSet::Slots(vec![Some("bitmap")]));
//! ```

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::channel::oneshot;

use crate::{builder::JoinBuilder, counter::JoinCounter, error::JoinError, result::ResultSet};

/// Creates a join over `total` sub-operations with `slots` result slots and
/// a future for its results.
pub fn channel<T: Send + 'static>(
    total: usize,
    slots: usize,
) -> Result<(JoinCounter<T>, JoinReceiver<T>), JoinError> {
    JoinBuilder::new(total).slots(slots).into_channel()
}

pub(crate) fn pair<T: Send + 'static>() -> (
    impl FnOnce(ResultSet<T>) + Send + 'static,
    JoinReceiver<T>,
) {
    let (tx, rx) = oneshot::channel();
    let forward = move |results: ResultSet<T>| {
        // The receiver may have been dropped; nobody is waiting then.
        let _ = tx.send(results);
    };
    (forward, JoinReceiver { rx })
}

/// Future resolving to the results of a join.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct JoinReceiver<T> {
    rx: oneshot::Receiver<ResultSet<T>>,
}

impl<T> JoinReceiver<T> {
    /// Takes the results if the join already completed.
    ///
    /// Returns `Ok(None)` while the join is pending.
    pub fn try_take(&mut self) -> Result<Option<ResultSet<T>>, JoinError> {
        self.rx.try_recv().map_err(|_| JoinError::Cancelled)
    }
}

impl<T> Future for JoinReceiver<T> {
    type Output = Result<ResultSet<T>, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.map_err(|_| JoinError::Cancelled))
    }
}
