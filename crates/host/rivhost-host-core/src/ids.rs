//! Load generations.
//!
//! Every `select` bumps the generation; a completion whose ticket carries an
//! older generation is stale and must not touch the session.

use serde::{Deserialize, Serialize};

use crate::catalog::FileSource;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(pub u64);

/// Monotonic allocator for [`Generation`]s.
#[derive(Default, Debug)]
pub struct GenerationCounter {
    current: u64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn advance(&mut self) -> Generation {
        self.current = self.current.wrapping_add(1);
        Generation(self.current)
    }

    #[inline]
    pub fn current(&self) -> Generation {
        Generation(self.current)
    }

    #[inline]
    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.current
    }
}

/// Handle for one issued load attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadTicket {
    pub generation: Generation,
    pub source: FileSource,
}
