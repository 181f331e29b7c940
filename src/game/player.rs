//! Players

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Player(usize);

impl Player {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn id(&self) -> usize {
        self.0
    }

    /// Single-letter label used on the rendered board (`A`, `B`, ...)
    pub fn label(&self) -> char {
        (b'A' + (self.0 % 26) as u8) as char
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
