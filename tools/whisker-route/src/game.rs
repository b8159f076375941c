//! Minimal game host
//!
//! Plays an agent's moves on a maze the way the game engine does: one call to
//! `turn()` per free tick, mud holding the player for as many ticks as the
//! edge weight, cheese eaten on arrival.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use serde::Serialize;
use whisker_common::{Error, NodeId, Result, Weight};

use crate::actions::Move;
use crate::agent::{GameSetup, TspAgent};
use crate::dijkstra::ShortestPathOracle;
use crate::graph::Maze;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GameStats {
    pub turns: usize,
    pub cheese_eaten: usize,
    pub cheese_total: usize,
    pub final_location: NodeId,
    /// Moves into a wall or off the grid; the player stays put
    pub illegal_moves: usize,
}

impl GameStats {
    pub fn all_eaten(&self) -> bool {
        self.cheese_eaten == self.cheese_total
    }
}

/// Run `agent` on `setup` until every cheese is eaten or `max_turns` ticks pass.
///
/// The agent must already be preprocessed. Agent errors abort the game.
pub fn simulate<O: ShortestPathOracle>(
    setup: &GameSetup,
    agent: &mut TspAgent<O>,
    max_turns: usize,
) -> Result<GameStats> {
    let maze = &setup.maze;
    let mut remaining: FxHashSet<NodeId> = setup.cheese.iter().copied().collect();
    let cheese_total = remaining.len();
    let mut location = setup.player_location;
    remaining.remove(&location);

    let mut stats = GameStats {
        cheese_total,
        cheese_eaten: cheese_total - remaining.len(),
        ..GameStats::default()
    };
    // destination and ticks still to spend in the mud
    let mut crossing: Option<(NodeId, Weight)> = None;

    while !remaining.is_empty() && stats.turns < max_turns {
        stats.turns += 1;

        if let Some((target, left)) = crossing.take() {
            if left > 1 {
                crossing = Some((target, left - 1));
                continue;
            }
            location = target;
        } else {
            let action = agent.turn()?;
            if action == Move::Nothing {
                continue;
            }
            let step = action
                .apply(location, maze.width(), maze.height())
                .and_then(|target| maze.weight(location, target).map(|weight| (target, weight)));
            match step {
                Some((target, 1)) => location = target,
                Some((target, weight)) => {
                    crossing = Some((target, weight - 1));
                    continue;
                }
                None => {
                    stats.illegal_moves += 1;
                    tracing::warn!(turn = stats.turns, location, %action, "illegal move");
                    continue;
                }
            }
        }

        if remaining.remove(&location) {
            stats.cheese_eaten += 1;
            tracing::debug!(turn = stats.turns, location, "cheese eaten");
        }
    }

    stats.final_location = location;
    tracing::info!(
        turns = stats.turns,
        eaten = stats.cheese_eaten,
        total = stats.cheese_total,
        illegal = stats.illegal_moves,
        "game over"
    );
    Ok(stats)
}

/// Parameters of a randomly generated game on a wall-free grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomGame {
    pub width: u32,
    pub height: u32,
    pub cheese: usize,
    /// Probability that a passage is muddy
    pub mud_density: f64,
    /// Heaviest mud; muddy passages weigh between 2 and this
    pub max_mud: Weight,
    pub seed: u64,
}

impl RandomGame {
    pub fn new(width: u32, height: u32, cheese: usize, seed: u64) -> Self {
        RandomGame {
            width,
            height,
            cheese,
            mud_density: 0.0,
            max_mud: 1,
            seed,
        }
    }

    pub fn with_mud(mut self, density: f64, max_mud: Weight) -> Self {
        self.mud_density = density;
        self.max_mud = max_mud;
        self
    }

    /// Build the maze, start the player in the middle cell and scatter the cheese.
    ///
    /// The same parameters always produce the same game.
    pub fn generate(&self) -> Result<GameSetup> {
        if !(0.0..=1.0).contains(&self.mud_density) {
            return Err(Error::InvalidInput(format!(
                "mud density must be within [0, 1], got {}",
                self.mud_density
            )));
        }
        if self.mud_density > 0.0 && self.max_mud < 2 {
            return Err(Error::InvalidInput(
                "muddy mazes need max_mud of at least 2".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut maze = Maze::new(self.width, self.height)?;
        for row in 0..self.height {
            for col in 0..self.width {
                let cell = maze.cell(row, col);
                if col + 1 < self.width {
                    let weight = self.passage_weight(&mut rng);
                    maze.connect(cell, cell + 1, weight)?;
                }
                if row + 1 < self.height {
                    let weight = self.passage_weight(&mut rng);
                    maze.connect(cell, cell + self.width, weight)?;
                }
            }
        }

        let player_location = maze.cell(self.height / 2, self.width / 2);
        let free_cells = maze.node_count() - 1;
        if self.cheese > free_cells {
            return Err(Error::InvalidInput(format!(
                "cannot place {} cheese on {free_cells} free cells",
                self.cheese
            )));
        }
        // sample among every cell but the player's, then shift past it
        let cheese = rand::seq::index::sample(&mut rng, free_cells, self.cheese)
            .iter()
            .map(|index| {
                let cell = index as NodeId;
                if cell >= player_location {
                    cell + 1
                } else {
                    cell
                }
            })
            .collect();

        Ok(GameSetup {
            maze,
            player_location,
            cheese,
        })
    }

    fn passage_weight(&self, rng: &mut StdRng) -> Weight {
        if self.mud_density > 0.0 && rng.random_bool(self.mud_density) {
            rng.random_range(2..=self.max_mud)
        } else {
            1
        }
    }
}
