//! Move tokens
//!
//! Converts a route of adjacent cells into one directional token per step.

use serde::{Deserialize, Serialize};
use std::fmt;
use whisker_common::{Error, NodeId, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Nothing,
    North,
    East,
    South,
    West,
}

impl Move {
    /// Cell reached by playing this move from `node`, or `None` when it leaves the grid.
    ///
    /// Walls are not checked here; the maze decides whether the step is legal.
    pub fn apply(self, node: NodeId, width: u32, height: u32) -> Option<NodeId> {
        let (row, col) = (node / width, node % width);
        let (row, col) = match self {
            Move::Nothing => (row, col),
            Move::North => (row.checked_sub(1)?, col),
            Move::South => (row + 1, col),
            Move::East => (row, col + 1),
            Move::West => (row, col.checked_sub(1)?),
        };
        (row < height && col < width).then_some(row * width + col)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Nothing => "nothing",
            Move::North => "north",
            Move::East => "east",
            Move::South => "south",
            Move::West => "west",
        };
        f.write_str(name)
    }
}

/// Token moving from `from` to `to` in a maze of the given width.
///
/// The cells must be equal or 4-adjacent; anything else is rejected.
pub fn locations_to_action(from: NodeId, to: NodeId, width: u32) -> Result<Move> {
    if width == 0 {
        return Err(Error::InvalidInput("maze width must be positive".to_string()));
    }
    let (from_row, from_col) = (from / width, from % width);
    let (to_row, to_col) = (to / width, to % width);

    let action = match (
        i64::from(to_row) - i64::from(from_row),
        i64::from(to_col) - i64::from(from_col),
    ) {
        (0, 0) => Move::Nothing,
        (-1, 0) => Move::North,
        (1, 0) => Move::South,
        (0, 1) => Move::East,
        (0, -1) => Move::West,
        _ => {
            return Err(Error::InvalidInput(format!(
                "cells {from} and {to} are not adjacent"
            )))
        }
    };
    Ok(action)
}

/// One token per consecutive pair of `route`
pub fn locations_to_actions(route: &[NodeId], width: u32) -> Result<Vec<Move>> {
    route
        .windows(2)
        .map(|pair| locations_to_action(pair[0], pair[1], width))
        .collect()
}
