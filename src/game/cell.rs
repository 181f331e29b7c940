//! Board cells
//!
//! A cell holds a pallet: a stack of up to [`PALLET_HEIGHT_LIMIT`] pieces.
//! The piece on top decides who owns the cell.

use crate::game::{
    error::{GameError, Result},
    player::Player,
};
use serde::{Deserialize, Serialize};

pub const PALLET_HEIGHT_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) pallet: [Option<Player>; PALLET_HEIGHT_LIMIT],
}

impl Cell {
    pub fn new_empty() -> Self {
        Self {
            pallet: [None; PALLET_HEIGHT_LIMIT],
        }
    }

    pub fn new_occupied(player: Player) -> Self {
        Self {
            pallet: [Some(player), None, None],
        }
    }

    pub fn height(&self) -> usize {
        self.pallet.iter().filter(|x| x.is_some()).count()
    }

    pub fn owner(&self) -> Option<Player> {
        if self.is_empty() {
            None
        } else {
            self.pallet[self.height() - 1]
        }
    }

    /// Pieces from bottom to top
    pub fn pieces(&self) -> impl Iterator<Item = Player> + '_ {
        self.pallet.iter().flatten().copied()
    }

    pub fn is_same_owner(&self, other: &Cell) -> bool {
        match (self.owner(), other.owner()) {
            (Some(me), Some(them)) => me == them,
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn is_full(&self) -> bool {
        self.height() == PALLET_HEIGHT_LIMIT
    }

    pub fn stack(&self, player: Player) -> Result<Self> {
        let height = self.height();
        if height == PALLET_HEIGHT_LIMIT {
            return Err(GameError::ReachedPalletHeightLimit);
        }
        if self.owner() == Some(player) {
            return Err(GameError::AlreadyOccupied(player));
        }

        let mut pallet = self.pallet;
        pallet[height] = Some(player);
        Ok(Self { pallet })
    }

    pub fn unstack(&self) -> Result<Self> {
        if self.is_empty() {
            return Err(GameError::CellIsEmpty);
        }

        let mut pallet = self.pallet;
        pallet[self.height() - 1] = None;
        Ok(Self { pallet })
    }
}
