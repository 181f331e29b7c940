//! The board and the moves allowed on it

use crate::game::{
    cell::Cell,
    error::{GameError, Result},
    player::Player,
    position::{Column, Position, Row},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub type CellMap = HashMap<Position, Cell>;

/// The eight directions a piece can move in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Up,
    Down,
    Right,
    Left,
    UpRight,
    DownRight,
    UpLeft,
    DownLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Right,
        Direction::Left,
        Direction::UpRight,
        Direction::DownRight,
        Direction::UpLeft,
        Direction::DownLeft,
    ];

    /// The neighbouring position in this direction
    pub fn destination(&self, from: &Position) -> Result<Position> {
        match self {
            Direction::Up => from.above(),
            Direction::Down => from.below(),
            Direction::Right => from.to_right(),
            Direction::Left => from.to_left(),
            Direction::UpRight => from.upper_right(),
            Direction::DownRight => from.lower_right(),
            Direction::UpLeft => from.upper_left(),
            Direction::DownLeft => from.lower_left(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Right => "right",
            Direction::Left => "left",
            Direction::UpRight => "up-right",
            Direction::DownRight => "down-right",
            Direction::UpLeft => "up-left",
            Direction::DownLeft => "down-left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Direction::ALL
            .into_iter()
            .find(|direction| direction.name() == normalized)
            .ok_or_else(|| GameError::InvalidDirection(s.to_string()))
    }
}

/// Where the piece on a given cell may move to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovingRange {
    pub up: Option<Position>,
    pub down: Option<Position>,
    pub right: Option<Position>,
    pub left: Option<Position>,
    pub up_right: Option<Position>,
    pub down_right: Option<Position>,
    pub up_left: Option<Position>,
    pub down_left: Option<Position>,
}

impl MovingRange {
    fn new(pivot: &Position, field: &CellMap) -> Self {
        let reach = |direction: Direction| Self::destination(pivot, direction, field);
        Self {
            up: reach(Direction::Up),
            down: reach(Direction::Down),
            right: reach(Direction::Right),
            left: reach(Direction::Left),
            up_right: reach(Direction::UpRight),
            down_right: reach(Direction::DownRight),
            up_left: reach(Direction::UpLeft),
            down_left: reach(Direction::DownLeft),
        }
    }

    // A destination must exist, not already be topped by the mover, and have room left.
    fn destination(pivot: &Position, direction: Direction, field: &CellMap) -> Option<Position> {
        let from = field.get(pivot)?;
        let dest = direction.destination(pivot).ok()?;
        let to = field.get(&dest)?;
        if from.is_same_owner(to) || to.is_full() {
            None
        } else {
            Some(dest)
        }
    }

    pub fn indicate(&self, direction: &Direction) -> Result<Position> {
        let dest = match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Right => self.right,
            Direction::Left => self.left,
            Direction::UpRight => self.up_right,
            Direction::DownRight => self.down_right,
            Direction::UpLeft => self.up_left,
            Direction::DownLeft => self.down_left,
        };
        dest.ok_or(GameError::IllegalDestination)
    }

    /// Directions with a legal destination
    pub fn directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|direction| self.indicate(direction).is_ok())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.directions().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub cell_map: CellMap,
}

impl Board {
    /// Player A starts on the top row, player B on the bottom row
    pub fn new(player_a: &Player, player_b: &Player) -> Self {
        let mut cell_map = CellMap::new();
        cell_map.extend(Self::initial_occupied_cells(*player_a, Row::Top));
        for row in Row::MIDDLE {
            cell_map.extend(Self::initial_empty_cells(row));
        }
        cell_map.extend(Self::initial_occupied_cells(*player_b, Row::Bottom));
        Self { cell_map }
    }

    fn initial_occupied_cells(player: Player, side: Row) -> impl Iterator<Item = (Position, Cell)> {
        Column::ALL
            .into_iter()
            .map(move |column| (Position::new(column, side), Cell::new_occupied(player)))
    }

    fn initial_empty_cells(row: Row) -> impl Iterator<Item = (Position, Cell)> {
        Column::ALL
            .into_iter()
            .map(move |column| (Position::new(column, row), Cell::new_empty()))
    }

    pub fn cell(&self, position: &Position) -> Result<&Cell> {
        self.cell_map.get(position).ok_or(GameError::CellNotFound)
    }

    /// Cells currently topped by `player`
    pub fn territory(&self, player: &Player) -> CellMap {
        self.cell_map
            .iter()
            .filter(|(_, cell)| cell.owner() == Some(*player))
            .map(|(position, cell)| (*position, *cell))
            .collect()
    }

    pub fn moving_range_of(&self, position: &Position) -> Result<MovingRange> {
        let cell = self.cell(position)?;
        if cell.is_empty() {
            return Err(GameError::CellIsEmpty);
        }
        Ok(MovingRange::new(position, &self.cell_map))
    }

    /// Move the top piece of `from` onto `to`
    pub fn migrate(&self, from: &Position, to: &Position) -> Result<Self> {
        if from == to {
            return Err(GameError::SamePositionCannotBeMigrated);
        }

        let source = self.cell(from)?;
        let mover = source.owner().ok_or(GameError::CellIsEmpty)?;
        let stacked = self.cell(to)?.stack(mover)?;
        let unstacked = source.unstack()?;

        let mut cell_map = self.cell_map.clone();
        cell_map.insert(*from, unstacked);
        cell_map.insert(*to, stacked);
        Ok(Self { cell_map })
    }

    /// No neighbour is topped by anyone other than the owner of `position`
    pub fn is_isolated(&self, position: &Position) -> bool {
        let owner = self.cell_map.get(position).and_then(|cell| cell.owner());
        Direction::ALL
            .iter()
            .filter_map(|direction| direction.destination(position).ok())
            .filter_map(|neighbour| self.cell_map.get(&neighbour))
            .filter_map(|cell| cell.owner())
            .all(|neighbour_owner| Some(neighbour_owner) == owner)
    }

    /// `player` tops at least one cell on `row`
    pub fn is_reached_edge(&self, player: &Player, row: &Row) -> bool {
        Column::ALL.iter().any(|column| {
            self.cell_map
                .get(&Position::new(*column, *row))
                .and_then(|cell| cell.owner())
                == Some(*player)
        })
    }

    /// Text rendering, one line per row. Each cell shows its pallet bottom to
    /// top, padded with `.`.
    pub fn render(&self) -> String {
        let mut out = String::from("   ");
        for column in Column::ALL {
            out.push_str(&format!(" {:^3}", column.letter()));
        }
        out.push('\n');

        for row in Row::ALL {
            out.push_str(&format!("{:>2} ", row.number()));
            for column in Column::ALL {
                let cell = self
                    .cell_map
                    .get(&Position::new(column, row))
                    .copied()
                    .unwrap_or_default();
                let stack: String = cell
                    .pallet
                    .iter()
                    .map(|piece| piece.map(|p| p.label()).unwrap_or('.'))
                    .collect();
                out.push(' ');
                out.push_str(&stack);
            }
            out.push('\n');
        }
        out
    }
}
