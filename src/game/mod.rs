//! Game engine
//!
//! Two players start on opposite edges of a 5x6 board. On each turn the
//! current player moves the top piece of one of their cells a single step in
//! any of eight directions, stacking it onto an empty or opponent-topped cell
//! that still has room. A player wins when they hold a cell on the far edge
//! and the piece they just moved has no opponent next to it.

pub mod battle;
pub mod board;
pub mod cell;
pub mod error;
pub mod game;
pub mod player;
pub mod position;

pub use battle::Battle;
pub use board::{Board, CellMap, Direction, MovingRange};
pub use cell::{Cell, PALLET_HEIGHT_LIMIT};
pub use error::{GameError, Result};
pub use game::{Action, Game, Phase};
pub use player::Player;
pub use position::{Column, Position, Row};
