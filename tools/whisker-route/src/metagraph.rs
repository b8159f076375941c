//! Metagraph construction
//!
//! Reduces a maze and a list of points of interest to a complete graph over
//! the points, weighted by shortest-path distance. One oracle run per point
//! yields both a row of the weight matrix and the routing table later used to
//! expand the abstract visiting order back into maze cells.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use whisker_common::{Error, NodeId, Result, Weight};

use crate::dijkstra::{RoutingTable, ShortestPathOracle};
use crate::graph::Maze;

/// Complete weighted graph over indices `0..size`, stored as a flat row-major matrix.
///
/// `weight(i, j)` is directed; it equals `weight(j, i)` only when the maze is symmetric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metagraph {
    size: usize,
    weights: Vec<Weight>,
}

impl Metagraph {
    /// Build from explicit rows. The matrix must be square with a zero diagonal.
    pub fn from_rows(rows: &[Vec<Weight>]) -> Result<Self> {
        let size = rows.len();
        let mut weights = Vec::with_capacity(size * size);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(Error::InvalidInput(format!(
                    "metagraph row {i} has {} entries, expected {size}",
                    row.len()
                )));
            }
            if row[i] != 0 {
                return Err(Error::InvalidInput(format!(
                    "metagraph diagonal entry {i} is {}, expected 0",
                    row[i]
                )));
            }
            weights.extend_from_slice(row);
        }
        Ok(Metagraph { size, weights })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn weight(&self, from: usize, to: usize) -> Weight {
        self.weights[from * self.size + to]
    }

    pub fn row(&self, from: usize) -> &[Weight] {
        &self.weights[from * self.size..(from + 1) * self.size]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (i + 1..self.size).all(|j| self.weight(i, j) == self.weight(j, i)))
    }

    /// Sum of consecutive weights along `order`
    pub fn route_length(&self, order: &[usize]) -> Weight {
        order
            .windows(2)
            .map(|pair| self.weight(pair[0], pair[1]))
            .fold(0, Weight::saturating_add)
    }
}

/// Routing tables of every point of interest, keyed by the point's maze node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTables {
    tables: FxHashMap<NodeId, RoutingTable>,
}

impl RoutingTables {
    pub fn get(&self, origin: NodeId) -> Option<&RoutingTable> {
        self.tables.get(&origin)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn insert(&mut self, table: RoutingTable) {
        self.tables.insert(table.source(), table);
    }
}

/// Reduce `maze` to the metagraph over `points`.
///
/// Index `i` of the metagraph stands for `points[i]`; by convention `points[0]`
/// is the fixed start. Fails with [`Error::Unreachable`] if any point cannot
/// reach another, and with [`Error::InvalidInput`] on duplicate points.
pub fn build_metagraph<O>(
    maze: &Maze,
    points: &[NodeId],
    oracle: &O,
) -> Result<(Metagraph, RoutingTables)>
where
    O: ShortestPathOracle + ?Sized,
{
    let mut seen = FxHashSet::default();
    for &point in points {
        if !maze.contains(point) {
            return Err(Error::UnknownNode(point));
        }
        if !seen.insert(point) {
            return Err(Error::InvalidInput(format!(
                "point of interest {point} is listed twice"
            )));
        }
    }

    let size = points.len();
    let mut weights = vec![0; size * size];
    let mut routing_tables = RoutingTables::default();

    for (i, &origin) in points.iter().enumerate() {
        let traversal = oracle.traverse(maze, origin)?;
        for (j, &target) in points.iter().enumerate() {
            if i != j {
                weights[i * size + j] = traversal.distance_to(target)?;
            }
        }
        routing_tables.insert(traversal.routing);
    }

    let metagraph = Metagraph { size, weights };
    tracing::info!(
        points = size,
        symmetric = metagraph.is_symmetric(),
        "metagraph built"
    );

    Ok((metagraph, routing_tables))
}
