//! Single-source shortest paths
//!
//! [`ShortestPathOracle`] is the seam between the planner and the path
//! primitive. [`Dijkstra`] is the default implementation: a label-setting
//! search over a `priority_queue::PriorityQueue` keyed by node.

use priority_queue::PriorityQueue;
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use whisker_common::{Error, NodeId, Result, Weight};

use crate::graph::Maze;

/// Predecessor tree rooted at one origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    source: NodeId,
    predecessors: FxHashMap<NodeId, Option<NodeId>>,
}

impl RoutingTable {
    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn reaches(&self, node: NodeId) -> bool {
        self.predecessors.contains_key(&node)
    }

    /// Node preceding `node` on its shortest path; `None` for the origin and unreached nodes
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.predecessors.get(&node).copied().flatten()
    }

    /// Shortest node sequence from the origin to `target`, both ends included
    pub fn route_to(&self, target: NodeId) -> Result<Vec<NodeId>> {
        if !self.reaches(target) {
            return Err(Error::Unreachable {
                from: self.source,
                to: target,
            });
        }
        let mut route = vec![target];
        let mut current = target;
        while let Some(previous) = self.predecessor(current) {
            route.push(previous);
            current = previous;
        }
        route.reverse();
        Ok(route)
    }
}

/// Result of one oracle run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal {
    pub distances: FxHashMap<NodeId, Weight>,
    pub routing: RoutingTable,
}

impl Traversal {
    pub fn distance_to(&self, target: NodeId) -> Result<Weight> {
        self.distances
            .get(&target)
            .copied()
            .ok_or(Error::Unreachable {
                from: self.routing.source,
                to: target,
            })
    }
}

pub trait ShortestPathOracle {
    /// Distances and routing table from `source` to every reachable node
    fn traverse(&self, maze: &Maze, source: NodeId) -> Result<Traversal>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Dijkstra;

impl ShortestPathOracle for Dijkstra {
    fn traverse(&self, maze: &Maze, source: NodeId) -> Result<Traversal> {
        if !maze.contains(source) {
            return Err(Error::UnknownNode(source));
        }

        // Priority carries the node id so equal distances settle lowest id first;
        // this keeps the predecessor tree identical across runs.
        let mut queue: PriorityQueue<NodeId, Reverse<(Weight, NodeId)>> = PriorityQueue::new();
        let mut tentative: FxHashMap<NodeId, Weight> = FxHashMap::default();
        let mut distances: FxHashMap<NodeId, Weight> = FxHashMap::default();
        let mut predecessors: FxHashMap<NodeId, Option<NodeId>> = FxHashMap::default();

        queue.push(source, Reverse((0, source)));
        tentative.insert(source, 0);
        predecessors.insert(source, None);

        while let Some((node, Reverse((distance, _)))) = queue.pop() {
            distances.insert(node, distance);

            for (neighbor, weight) in maze.neighbors(node) {
                if distances.contains_key(&neighbor) {
                    continue;
                }
                let candidate = distance.saturating_add(weight);
                if tentative.get(&neighbor).map_or(true, |&known| candidate < known) {
                    tentative.insert(neighbor, candidate);
                    predecessors.insert(neighbor, Some(node));
                    queue.push_increase(neighbor, Reverse((candidate, neighbor)));
                }
            }
        }

        tracing::debug!(source, reached = distances.len(), "dijkstra traversal");

        Ok(Traversal {
            distances,
            routing: RoutingTable {
                source,
                predecessors,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_grid_distances() {
        let maze = Maze::open_grid(3, 3).unwrap();
        let traversal = Dijkstra.traverse(&maze, 0).unwrap();
        assert_eq!(traversal.distances.len(), 9);
        assert_eq!(traversal.distance_to(0).unwrap(), 0);
        assert_eq!(traversal.distance_to(4).unwrap(), 2);
        assert_eq!(traversal.distance_to(8).unwrap(), 4);
    }

    #[test]
    fn test_route_follows_edges() {
        let maze = Maze::open_grid(4, 3).unwrap();
        let traversal = Dijkstra.traverse(&maze, 0).unwrap();
        let route = traversal.routing.route_to(11).unwrap();
        assert_eq!(route.first(), Some(&0));
        assert_eq!(route.last(), Some(&11));
        assert_eq!(route.len(), 6);
        for pair in route.windows(2) {
            assert!(maze.weight(pair[0], pair[1]).is_some(), "{pair:?} not adjacent");
        }
        assert_eq!(traversal.routing.route_to(0).unwrap(), vec![0]);
    }

    #[test]
    fn test_mud_detour() {
        // 0 -(9)- 1
        // |       |
        // 2 --- 3
        let mut maze = Maze::new(2, 2).unwrap();
        maze.connect(0, 1, 9).unwrap();
        maze.connect(0, 2, 1).unwrap();
        maze.connect(2, 3, 1).unwrap();
        maze.connect(3, 1, 1).unwrap();

        let traversal = Dijkstra.traverse(&maze, 0).unwrap();
        assert_eq!(traversal.distance_to(1).unwrap(), 3);
        assert_eq!(traversal.routing.route_to(1).unwrap(), vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_unreachable_is_error() {
        let mut maze = Maze::new(3, 1).unwrap();
        maze.connect(0, 1, 1).unwrap();
        let traversal = Dijkstra.traverse(&maze, 0).unwrap();

        assert!(matches!(
            traversal.distance_to(2),
            Err(Error::Unreachable { from: 0, to: 2 })
        ));
        assert!(matches!(
            traversal.routing.route_to(2),
            Err(Error::Unreachable { from: 0, to: 2 })
        ));
        assert!(!traversal.routing.reaches(2));
    }

    #[test]
    fn test_unknown_source() {
        let maze = Maze::open_grid(2, 2).unwrap();
        assert!(matches!(
            Dijkstra.traverse(&maze, 9),
            Err(Error::UnknownNode(9))
        ));
    }

    #[test]
    fn test_directed_edges() {
        let mut maze = Maze::new(3, 1).unwrap();
        maze.add_edge(0, 1, 1).unwrap();
        maze.add_edge(1, 2, 1).unwrap();
        maze.add_edge(2, 0, 5).unwrap();

        let from_zero = Dijkstra.traverse(&maze, 0).unwrap();
        let from_two = Dijkstra.traverse(&maze, 2).unwrap();
        assert_eq!(from_zero.distance_to(2).unwrap(), 2);
        assert_eq!(from_two.distance_to(1).unwrap(), 6);
    }

    #[test]
    fn test_deterministic_tables() {
        let maze = Maze::open_grid(5, 5).unwrap();
        let first = Dijkstra.traverse(&maze, 12).unwrap();
        let second = Dijkstra.traverse(&maze, 12).unwrap();
        assert_eq!(first, second);
    }
}
