//! whisker-route: exact cheese-collection planning for grid mazes

pub mod actions;
pub mod agent;
pub mod cli;
pub mod config;
pub mod dijkstra;
pub mod expand;
pub mod game;
pub mod graph;
pub mod logging;
pub mod metagraph;
pub mod tsp;

pub use actions::{locations_to_action, locations_to_actions, Move};
pub use agent::{plan_route, GameDescription, GameSetup, Plan, TspAgent};
pub use config::{LogFormat, PlannerConfig};
pub use dijkstra::{Dijkstra, RoutingTable, ShortestPathOracle, Traversal};
pub use expand::expand_route;
pub use game::{simulate, GameStats, RandomGame};
pub use graph::{Maze, MazeDescription};
pub use metagraph::{build_metagraph, Metagraph, RoutingTables};
pub use tsp::{solve_tsp, SearchStats, SearchStrategy, TspSolution};
pub use whisker_common::{Error, NodeId, Result, Weight};
