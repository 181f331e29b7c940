//! Turn handling and the win condition

use crate::game::{
    board::{Board, CellMap, Direction},
    error::{GameError, Result},
    player::Player,
    position::{Position, Row},
};
use std::str::FromStr;

/// Whose turn it is, together with the cells that player may move
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phase {
    pub player: Player,
    pub cell_map: CellMap,
}

/// A single move: the top piece of `from` goes one step in `direction`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub from: Position,
    pub direction: Direction,
}

impl Action {
    pub fn new(from: Position, direction: Direction) -> Self {
        Self { from, direction }
    }

    pub fn destination(&self) -> Result<Position> {
        self.direction.destination(&self.from)
    }
}

/// Parses `<position>:<direction>`, e.g. `a1:down`
impl FromStr for Action {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let (from, direction) = s
            .split_once(':')
            .ok_or_else(|| GameError::InvalidAction(s.to_string()))?;
        Ok(Self::new(from.parse()?, direction.parse()?))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    player_a: Player,
    player_b: Player,
    pub board: Board,
    current_phase: Phase,
    winner: Option<Player>,
}

impl Game {
    pub fn new() -> Self {
        let (player_a, player_b) = (Player::new(0), Player::new(1));
        let board = Board::new(&player_a, &player_b);
        let current_phase = Phase {
            player: player_a,
            cell_map: board.territory(&player_a),
        };
        Self {
            player_a,
            player_b,
            board,
            current_phase,
            winner: None,
        }
    }

    pub fn players(&self) -> (Player, Player) {
        (self.player_a, self.player_b)
    }

    pub fn current_player(&self) -> Player {
        self.current_phase.player
    }

    pub fn current_phase(&self) -> &Phase {
        &self.current_phase
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Row the given player has to reach
    pub fn goal_side(&self, player: &Player) -> Row {
        if player == &self.player_a {
            Row::Bottom
        } else {
            Row::Top
        }
    }

    /// Play `action` for the current player and hand the turn over
    pub fn accept(&self, action: &Action) -> Result<Self> {
        if self.is_over() {
            return Err(GameError::GameIsOver);
        }

        let mover = self.current_phase.player;
        if !self.current_phase.cell_map.contains_key(&action.from) {
            return Err(GameError::NotOwnedBy(mover));
        }

        let board = self.refresh_board(&action.from, &action.direction)?;
        let destination = action.destination()?;
        let winner = if board.is_reached_edge(&mover, &self.goal_side(&mover))
            && board.is_isolated(&destination)
        {
            Some(mover)
        } else {
            None
        };

        let next_player = self.next_player();
        let next_phase = Phase {
            player: next_player,
            cell_map: board.territory(&next_player),
        };
        Ok(Self {
            player_a: self.player_a,
            player_b: self.player_b,
            board,
            current_phase: next_phase,
            winner,
        })
    }

    fn next_player(&self) -> Player {
        if self.current_phase.player == self.player_a {
            self.player_b
        } else {
            self.player_a
        }
    }

    fn refresh_board(&self, position: &Position, direction: &Direction) -> Result<Board> {
        let moving_range = self.board.moving_range_of(position)?;
        let destination = moving_range.indicate(direction)?;
        self.board.migrate(position, &destination)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
