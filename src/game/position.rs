//! Board coordinates
//!
//! The board is 5 columns wide and 6 rows tall. Positions are written in
//! board notation: a column letter `a`-`e` followed by a row number `1`-`6`,
//! where row `1` is the top edge.

use crate::game::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A horizontal line of the board, from top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Row {
    Top,
    MiddleFirst,
    MiddleSecond,
    MiddleThird,
    MiddleFourth,
    Bottom,
}

impl Row {
    pub const ALL: [Row; 6] = [
        Row::Top,
        Row::MiddleFirst,
        Row::MiddleSecond,
        Row::MiddleThird,
        Row::MiddleFourth,
        Row::Bottom,
    ];

    pub const MIDDLE: [Row; 4] = [
        Row::MiddleFirst,
        Row::MiddleSecond,
        Row::MiddleThird,
        Row::MiddleFourth,
    ];

    pub fn is_top(&self) -> bool {
        self == &Self::Top
    }

    pub fn is_bottom(&self) -> bool {
        self == &Self::Bottom
    }

    pub fn is_middle(&self) -> bool {
        !matches!(self, Self::Top | Self::Bottom)
    }

    pub fn up(&self) -> Result<Self> {
        match self {
            Self::Top => Err(GameError::ReachedTop),
            Self::MiddleFirst => Ok(Self::Top),
            Self::MiddleSecond => Ok(Self::MiddleFirst),
            Self::MiddleThird => Ok(Self::MiddleSecond),
            Self::MiddleFourth => Ok(Self::MiddleThird),
            Self::Bottom => Ok(Self::MiddleFourth),
        }
    }

    pub fn down(&self) -> Result<Self> {
        match self {
            Self::Top => Ok(Self::MiddleFirst),
            Self::MiddleFirst => Ok(Self::MiddleSecond),
            Self::MiddleSecond => Ok(Self::MiddleThird),
            Self::MiddleThird => Ok(Self::MiddleFourth),
            Self::MiddleFourth => Ok(Self::Bottom),
            Self::Bottom => Err(GameError::ReachedBottom),
        }
    }

    /// Row number in board notation (1 = top)
    pub fn number(&self) -> usize {
        Self::ALL.iter().position(|row| row == self).unwrap_or(0) + 1
    }
}

/// A vertical line of the board, from left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    LeftEdge,
    MiddleFirst,
    MiddleSecond,
    MiddleThird,
    RightEdge,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::LeftEdge,
        Column::MiddleFirst,
        Column::MiddleSecond,
        Column::MiddleThird,
        Column::RightEdge,
    ];

    pub fn is_left_edge(&self) -> bool {
        self == &Self::LeftEdge
    }

    pub fn is_right_edge(&self) -> bool {
        self == &Self::RightEdge
    }

    pub fn is_middle(&self) -> bool {
        !matches!(self, Self::LeftEdge | Self::RightEdge)
    }

    pub fn right(&self) -> Result<Self> {
        match self {
            Self::LeftEdge => Ok(Self::MiddleFirst),
            Self::MiddleFirst => Ok(Self::MiddleSecond),
            Self::MiddleSecond => Ok(Self::MiddleThird),
            Self::MiddleThird => Ok(Self::RightEdge),
            Self::RightEdge => Err(GameError::ReachedRightEdge),
        }
    }

    pub fn left(&self) -> Result<Self> {
        match self {
            Self::LeftEdge => Err(GameError::ReachedLeftEdge),
            Self::MiddleFirst => Ok(Self::LeftEdge),
            Self::MiddleSecond => Ok(Self::MiddleFirst),
            Self::MiddleThird => Ok(Self::MiddleSecond),
            Self::RightEdge => Ok(Self::MiddleThird),
        }
    }

    /// Column letter in board notation
    pub fn letter(&self) -> char {
        match self {
            Self::LeftEdge => 'a',
            Self::MiddleFirst => 'b',
            Self::MiddleSecond => 'c',
            Self::MiddleThird => 'd',
            Self::RightEdge => 'e',
        }
    }
}

/// A square on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: Column,
    pub y: Row,
}

impl Position {
    pub fn new(x: Column, y: Row) -> Self {
        Self { x, y }
    }

    pub fn above(&self) -> Result<Self> {
        Ok(Self::new(self.x, self.y.up()?))
    }

    pub fn below(&self) -> Result<Self> {
        Ok(Self::new(self.x, self.y.down()?))
    }

    pub fn to_right(&self) -> Result<Self> {
        Ok(Self::new(self.x.right()?, self.y))
    }

    pub fn to_left(&self) -> Result<Self> {
        Ok(Self::new(self.x.left()?, self.y))
    }

    pub fn upper_right(&self) -> Result<Self> {
        self.above()?.to_right()
    }

    pub fn lower_right(&self) -> Result<Self> {
        self.below()?.to_right()
    }

    pub fn upper_left(&self) -> Result<Self> {
        self.above()?.to_left()
    }

    pub fn lower_left(&self) -> Result<Self> {
        self.below()?.to_left()
    }

    pub fn is_corner(&self) -> bool {
        (self.x.is_left_edge() || self.x.is_right_edge()) && !self.y.is_middle()
    }

    /// Every position on the board, row by row from the top
    pub fn all() -> impl Iterator<Item = Position> {
        Row::ALL
            .into_iter()
            .flat_map(|row| Column::ALL.into_iter().map(move |column| Position::new(column, row)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.x.letter(), self.y.number())
    }
}

impl FromStr for Position {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        let (Some(letter), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(GameError::InvalidPosition(s.to_string()));
        };

        let column = Column::ALL
            .into_iter()
            .find(|column| column.letter() == letter.to_ascii_lowercase())
            .ok_or_else(|| GameError::InvalidPosition(s.to_string()))?;
        let row = digit
            .to_digit(10)
            .and_then(|n| Row::ALL.get((n as usize).checked_sub(1)?).copied())
            .ok_or_else(|| GameError::InvalidPosition(s.to_string()))?;

        Ok(Position::new(column, row))
    }
}
