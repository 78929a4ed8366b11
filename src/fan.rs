//! Fanning work out over a list of items and joining it back.
//!
//! [`fan_out`] covers the common shape of a join: for every item, start one
//! primary sub-operation whose result lands in the item's slot, plus a fixed
//! number of companion sub-operations that only need to finish (prefetching a
//! second asset for the same item, say). The continuation sees the primary
//! results in item order once every sub-operation of every item reported.
//!
//! An empty item list completes immediately with [`ResultSet::Empty`].
//!
//! # Examples
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use fanin::{fan_out, ResultSet};
//!
//! let urls = vec!["a.png", "b.png"];
//! let thumbnails = Arc::new(Mutex::new(None));
//! let sink = thumbnails.clone();
//!
//! fan_out(
//!     urls,
//!     1,
//!     |_index, url, bitmap, gifs| {
//!         // Pretend both fetches finish synchronously.
//!         bitmap.complete(url.len()).unwrap();
//!         for gif in gifs {
//!             gif.complete().unwrap();
//!         }
//!     },
//!     move |results: ResultSet<usize>| *sink.lock().unwrap() = Some(results),
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     *thumbnails.lock().unwrap(),
//!     Some(ResultSet::Slots(vec![Some(5), Some(5)]))
//! );
//! ```

use tracing::debug;

use crate::{
    builder::JoinBuilder,
    counter::JoinCounter,
    error::JoinError,
    result::ResultSet,
    token::{CompletionToken, SlotToken},
};

/// Starts one primary and `companions` companion sub-operations per item and
/// joins them into a single continuation.
///
/// `start` is called once per item, in order, with the item's index, the
/// item, the token for its result slot and its companion tokens. It may
/// report synchronously or move the tokens into asynchronous callbacks.
pub fn fan_out<I, T, S, F>(
    items: Vec<I>,
    companions: usize,
    mut start: S,
    on_complete: F,
) -> Result<JoinCounter<T>, JoinError>
where
    T: Send + 'static,
    S: FnMut(usize, I, SlotToken<T>, Vec<CompletionToken<T>>),
    F: FnOnce(ResultSet<T>) + Send + 'static,
{
    let per_item = companions
        .checked_add(1)
        .ok_or_else(|| JoinError::invalid("too many companion operations per item"))?;
    let total = items
        .len()
        .checked_mul(per_item)
        .ok_or_else(|| JoinError::invalid("fan-out size overflows"))?;

    let counter = JoinBuilder::new(total)
        .slots(items.len())
        .label("fan-out")
        .on_complete(on_complete)?;

    debug!(items = items.len(), per_item, "fanning out");
    for (index, item) in items.into_iter().enumerate() {
        let primary = SlotToken::new(counter.clone(), index);
        let companion_tokens = (0..companions).map(|_| counter.token()).collect();
        start(index, item, primary, companion_tokens);
    }

    Ok(counter)
}
