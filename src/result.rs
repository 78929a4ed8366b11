//! Aggregated results delivered to a join's continuation.
//!
//! A [`ResultSet`] is either the [`Empty`](ResultSet::Empty) sentinel, handed
//! out when a join was created for zero sub-operations, or the ordered slot
//! vector. Slots are indexed by logical item position, so the order never
//! depends on which sub-operation finished first. A slot is `None` when its
//! sub-operation reported without a value.
//!
//! # Examples
//!
//! ```
//! use fanin::ResultSet;
//!
//! let set = ResultSet::Slots(vec![Some("a"), None, Some("c")]);
//! assert_eq!(set.len(), 3);
//! assert_eq!(set.get(1), None);
//! assert_eq!(set.into_values(), vec!["a", "c"]);
//!
//! let empty: ResultSet<&str> = ResultSet::Empty;
//! assert!(empty.is_empty_sentinel());
//! ```

/// Result slots of a finished join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSet<T> {
    /// The join had nothing to wait for.
    Empty,
    /// One entry per logical item, in item order.
    Slots(Vec<Option<T>>),
}

impl<T> ResultSet<T> {
    /// Returns `true` for the empty-input sentinel.
    pub fn is_empty_sentinel(&self) -> bool {
        matches!(self, ResultSet::Empty)
    }

    /// Number of slots. The sentinel has none.
    pub fn len(&self) -> usize {
        match self {
            ResultSet::Empty => 0,
            ResultSet::Slots(slots) => slots.len(),
        }
    }

    /// Returns `true` if there are no slots, sentinel or not.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value stored at `index`, if that slot exists and was filled.
    pub fn get(&self, index: usize) -> Option<&T> {
        match self {
            ResultSet::Empty => None,
            ResultSet::Slots(slots) => slots.get(index).and_then(Option::as_ref),
        }
    }

    /// Iterates over the slots in item order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&T>> {
        let slots: &[Option<T>] = match self {
            ResultSet::Empty => &[],
            ResultSet::Slots(slots) => slots,
        };
        slots.iter().map(Option::as_ref)
    }

    /// Converts into the slot vector, mapping the sentinel to `None`.
    pub fn into_slots(self) -> Option<Vec<Option<T>>> {
        match self {
            ResultSet::Empty => None,
            ResultSet::Slots(slots) => Some(slots),
        }
    }

    /// Collects the filled slots in item order, skipping unset ones.
    pub fn into_values(self) -> Vec<T> {
        match self {
            ResultSet::Empty => Vec::new(),
            ResultSet::Slots(slots) => slots.into_iter().flatten().collect(),
        }
    }

    /// Returns every value if all slots were filled, `None` otherwise.
    ///
    /// The sentinel yields an empty vector.
    pub fn into_complete(self) -> Option<Vec<T>> {
        match self {
            ResultSet::Empty => Some(Vec::new()),
            ResultSet::Slots(slots) => slots.into_iter().collect(),
        }
    }

    /// Maps every filled slot through `f`, keeping positions.
    pub fn map<U, F>(self, mut f: F) -> ResultSet<U>
    where
        F: FnMut(T) -> U,
    {
        match self {
            ResultSet::Empty => ResultSet::Empty,
            ResultSet::Slots(slots) => {
                ResultSet::Slots(slots.into_iter().map(|slot| slot.map(&mut f)).collect())
            }
        }
    }
}
