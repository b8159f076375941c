//! Cheese-collecting agent
//!
//! Follows the host's two-phase contract: [`TspAgent::preprocess`] runs once
//! at game start and plans the whole route, then [`TspAgent::turn`] is called
//! once per tick and hands out the planned moves in order.
//!
//! Planning pipeline: maze + points of interest -> metagraph -> exact TSP ->
//! expanded cell route -> move tokens.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::time::Instant;
use whisker_common::{Error, NodeId, Result, Weight};

use crate::actions::{locations_to_actions, Move};
use crate::config::PlannerConfig;
use crate::dijkstra::{Dijkstra, ShortestPathOracle};
use crate::expand::expand_route;
use crate::game::GameStats;
use crate::graph::{Maze, MazeDescription};
use crate::metagraph::build_metagraph;
use crate::tsp::{solve_tsp, SearchStats, SearchStrategy};

/// Everything the host supplies at game start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSetup {
    pub maze: Maze,
    pub player_location: NodeId,
    pub cheese: Vec<NodeId>,
}

/// JSON form of [`GameSetup`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDescription {
    pub maze: MazeDescription,
    pub player_location: NodeId,
    pub cheese: Vec<NodeId>,
}

impl GameSetup {
    pub fn from_description(description: &GameDescription) -> Result<Self> {
        Ok(GameSetup {
            maze: Maze::from_description(&description.maze)?,
            player_location: description.player_location,
            cheese: description.cheese.clone(),
        })
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = std::io::BufReader::new(std::fs::File::open(path)?);
        let description: GameDescription = serde_json::from_reader(reader)?;
        Self::from_description(&description)
    }

    /// Start followed by each distinct cheese cell not under the player
    pub fn points_of_interest(&self) -> Vec<NodeId> {
        let mut seen = FxHashSet::default();
        seen.insert(self.player_location);
        let mut points = vec![self.player_location];
        points.extend(self.cheese.iter().copied().filter(|&c| seen.insert(c)));
        points
    }
}

/// Result of preprocessing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Start followed by the cheese, as fed to the metagraph
    pub points: Vec<NodeId>,
    /// Visiting order over `points`
    pub order: Vec<usize>,
    /// Total route cost, mud included
    pub length: Weight,
    /// Every cell walked through, start and last cheese included
    pub route: Vec<NodeId>,
    pub actions: Vec<Move>,
    pub stats: SearchStats,
}

/// Plan a route through every cheese of `setup`.
pub fn plan_route<O>(setup: &GameSetup, oracle: &O, strategy: SearchStrategy) -> Result<Plan>
where
    O: ShortestPathOracle + ?Sized,
{
    if !setup.maze.contains(setup.player_location) {
        return Err(Error::UnknownNode(setup.player_location));
    }
    let points = setup.points_of_interest();
    let (metagraph, routing_tables) = build_metagraph(&setup.maze, &points, oracle)?;
    let solution = solve_tsp(&metagraph, 0, strategy)?;
    let route = expand_route(&solution.order, &points, &routing_tables)?;
    let actions = locations_to_actions(&route, setup.maze.width())?;

    Ok(Plan {
        points,
        order: solution.order,
        length: solution.length,
        route,
        actions,
        stats: solution.stats,
    })
}

/// Agent state persisted between host calls. Each agent owns its plan.
#[derive(Debug)]
pub struct TspAgent<O = Dijkstra> {
    config: PlannerConfig,
    oracle: O,
    actions: Option<VecDeque<Move>>,
    turns_played: usize,
}

impl TspAgent<Dijkstra> {
    pub fn new(config: PlannerConfig) -> Self {
        TspAgent::with_oracle(config, Dijkstra)
    }
}

impl<O: ShortestPathOracle> TspAgent<O> {
    pub fn with_oracle(config: PlannerConfig, oracle: O) -> Self {
        TspAgent {
            config,
            oracle,
            actions: None,
            turns_played: 0,
        }
    }

    /// Plan the full route and queue its moves. Replaces any previous plan;
    /// on failure the agent is left unprepared.
    pub fn preprocess(&mut self, setup: &GameSetup) -> Result<Plan> {
        self.actions = None;
        self.turns_played = 0;

        let started = Instant::now();
        let plan = plan_route(setup, &self.oracle, self.config.strategy)?;
        let elapsed_ms = started.elapsed().as_millis();

        tracing::info!(
            cheese = plan.points.len() - 1,
            length = plan.length,
            moves = plan.actions.len(),
            elapsed_ms,
            "preprocessing complete"
        );
        if let Some(budget) = self.config.preprocessing_budget_ms {
            if elapsed_ms > u128::from(budget) {
                tracing::warn!(elapsed_ms, budget, "preprocessing exceeded its time budget");
            }
        }

        self.actions = Some(plan.actions.iter().copied().collect());
        Ok(plan)
    }

    /// Next planned move.
    ///
    /// Running out of moves means planning produced fewer moves than the game
    /// needs; this is reported as [`Error::ActionQueueExhausted`] and must not
    /// be papered over with a default move.
    pub fn turn(&mut self) -> Result<Move> {
        let actions = self.actions.as_mut().ok_or(Error::NotPrepared)?;
        self.turns_played += 1;
        actions.pop_front().ok_or(Error::ActionQueueExhausted {
            turn: self.turns_played,
        })
    }

    /// End-of-game hook: log the outcome and drop the plan.
    ///
    /// Returns the number of planned moves that were never played.
    pub fn postprocess(&mut self, stats: &GameStats) -> usize {
        let unplayed = self.remaining();
        if stats.all_eaten() && unplayed == 0 {
            tracing::info!(turns = stats.turns, eaten = stats.cheese_eaten, "all cheese collected");
        } else {
            tracing::warn!(
                turns = stats.turns,
                eaten = stats.cheese_eaten,
                total = stats.cheese_total,
                illegal = stats.illegal_moves,
                unplayed,
                "game ended off plan"
            );
        }
        self.actions = None;
        self.turns_played = 0;
        unplayed
    }

    /// Moves still queued; 0 before preprocessing
    pub fn remaining(&self) -> usize {
        self.actions.as_ref().map_or(0, VecDeque::len)
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }
}
