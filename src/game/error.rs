//! Game rule violations

use crate::game::player::Player;
use thiserror::Error;

/// Reasons a move or a board operation is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("already at the top row")]
    ReachedTop,

    #[error("already at the bottom row")]
    ReachedBottom,

    #[error("already at the right edge")]
    ReachedRightEdge,

    #[error("already at the left edge")]
    ReachedLeftEdge,

    #[error("pallet is stacked to its height limit")]
    ReachedPalletHeightLimit,

    #[error("cell is empty")]
    CellIsEmpty,

    #[error("cell is already topped by player {0}")]
    AlreadyOccupied(Player),

    #[error("cell is not owned by player {0}")]
    NotOwnedBy(Player),

    #[error("illegal destination")]
    IllegalDestination,

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    #[error("invalid move '{0}': expected <position>:<direction>")]
    InvalidAction(String),

    #[error("cell not found")]
    CellNotFound,

    #[error("a piece cannot be moved onto its own cell")]
    SamePositionCannotBeMigrated,

    #[error("game is over")]
    GameIsOver,
}

pub type Result<T> = std::result::Result<T, GameError>;
