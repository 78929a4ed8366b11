//! Commonly used imports
//!
//! Use `use fanin::prelude::*;` for quick access to the join types.

// Core types
pub use crate::{Completion, JoinCounter, JoinError, Phase, ResultSet, Step};

// Tokens handed to sub-operations
pub use crate::{CompletionToken, SlotToken};

// Constructors
pub use crate::{channel, fan_out};
