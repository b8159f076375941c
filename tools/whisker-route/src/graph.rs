//! Maze graph
//!
//! Cells are numbered `row * width + col`. Edges carry a positive traversal
//! cost: 1 for a free move, more for mud. The adjacency is sparse; a dense
//! matrix can be converted with [`Maze::from_matrix`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use whisker_common::{Error, NodeId, Result, Weight};

/// Sparse adjacency: node -> (neighbor -> weight)
pub type Adjacency = FxHashMap<NodeId, FxHashMap<NodeId, Weight>>;

/// On-disk maze representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeDescription {
    pub width: u32,
    pub height: u32,
    /// `(from, to, weight)`, mirrored unless `directed` is set
    pub edges: Vec<(NodeId, NodeId, Weight)>,
    #[serde(default)]
    pub directed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    width: u32,
    height: u32,
    adjacency: Adjacency,
}

impl Maze {
    /// A maze with every cell and no passages
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidInput(format!(
                "maze dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Maze {
            width,
            height,
            adjacency: FxHashMap::default(),
        })
    }

    /// A maze without walls or mud: every cell connects to its 4-neighbors with weight 1
    pub fn open_grid(width: u32, height: u32) -> Result<Self> {
        let mut maze = Maze::new(width, height)?;
        for row in 0..height {
            for col in 0..width {
                let cell = maze.cell(row, col);
                if col + 1 < width {
                    maze.connect(cell, cell + 1, 1)?;
                }
                if row + 1 < height {
                    maze.connect(cell, cell + width, 1)?;
                }
            }
        }
        Ok(maze)
    }

    pub fn from_adjacency(width: u32, height: u32, adjacency: Adjacency) -> Result<Self> {
        let mut maze = Maze::new(width, height)?;
        for (from, neighbors) in adjacency {
            for (to, weight) in neighbors {
                maze.add_edge(from, to, weight)?;
            }
        }
        Ok(maze)
    }

    /// Dense form: `rows[u][v]` is the weight of `u -> v`, 0 meaning no edge
    pub fn from_matrix(width: u32, height: u32, rows: &[Vec<Weight>]) -> Result<Self> {
        let mut maze = Maze::new(width, height)?;
        let n = maze.node_count();
        if rows.len() != n || rows.iter().any(|row| row.len() != n) {
            return Err(Error::InvalidInput(format!(
                "adjacency matrix must be {n}x{n} for a {width}x{height} maze"
            )));
        }
        for (from, row) in rows.iter().enumerate() {
            for (to, &weight) in row.iter().enumerate() {
                if weight > 0 {
                    maze.add_edge(from as NodeId, to as NodeId, weight)?;
                }
            }
        }
        Ok(maze)
    }

    pub fn from_description(description: &MazeDescription) -> Result<Self> {
        let mut maze = Maze::new(description.width, description.height)?;
        for &(from, to, weight) in &description.edges {
            if description.directed {
                maze.add_edge(from, to, weight)?;
            } else {
                maze.connect(from, to, weight)?;
            }
        }
        Ok(maze)
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let description: MazeDescription = serde_json::from_reader(reader)?;
        Maze::from_description(&description)
    }

    /// Every edge listed explicitly, sorted, with `directed` set
    pub fn to_description(&self) -> MazeDescription {
        let mut edges: Vec<_> = self
            .adjacency
            .iter()
            .flat_map(|(&from, neighbors)| neighbors.iter().map(move |(&to, &w)| (from, to, w)))
            .collect();
        edges.sort_unstable();
        MazeDescription {
            width: self.width,
            height: self.height,
            edges,
            directed: true,
        }
    }

    /// Add a one-way edge, replacing any previous weight
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: Weight) -> Result<()> {
        self.check(from)?;
        self.check(to)?;
        if from == to {
            return Err(Error::InvalidInput(format!("self-loop on node {from}")));
        }
        if weight == 0 {
            return Err(Error::InvalidInput(format!(
                "edge {from} -> {to} has zero weight"
            )));
        }
        self.adjacency.entry(from).or_default().insert(to, weight);
        Ok(())
    }

    /// Add a two-way edge
    pub fn connect(&mut self, a: NodeId, b: NodeId, weight: Weight) -> Result<()> {
        self.add_edge(a, b, weight)?;
        self.add_edge(b, a, weight)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn node_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|n| n.len()).sum()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        (node as usize) < self.node_count()
    }

    pub fn cell(&self, row: u32, col: u32) -> NodeId {
        row * self.width + col
    }

    /// `(row, col)` of a node
    pub fn location(&self, node: NodeId) -> (u32, u32) {
        (node / self.width, node % self.width)
    }

    pub fn weight(&self, from: NodeId, to: NodeId) -> Option<Weight> {
        self.adjacency.get(&from)?.get(&to).copied()
    }

    /// Outgoing edges of `node`, in no particular order
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, Weight)> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|neighbors| neighbors.iter().map(|(&to, &w)| (to, w)))
    }

    /// True when every edge has a reverse edge of the same weight
    pub fn is_symmetric(&self) -> bool {
        self.adjacency.iter().all(|(&from, neighbors)| {
            neighbors
                .iter()
                .all(|(&to, &w)| self.weight(to, from) == Some(w))
        })
    }

    fn check(&self, node: NodeId) -> Result<()> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(Error::UnknownNode(node))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_grid_edges() {
        let maze = Maze::open_grid(3, 3).unwrap();
        assert_eq!(maze.node_count(), 9);
        // 12 undirected passages in a 3x3 grid
        assert_eq!(maze.edge_count(), 24);
        assert_eq!(maze.weight(0, 1), Some(1));
        assert_eq!(maze.weight(0, 3), Some(1));
        assert_eq!(maze.weight(2, 3), None, "no wrap-around between rows");
        assert!(maze.is_symmetric());
    }

    #[test]
    fn test_cell_location_roundtrip() {
        let maze = Maze::new(5, 4).unwrap();
        assert_eq!(maze.cell(2, 3), 13);
        assert_eq!(maze.location(13), (2, 3));
    }

    #[test]
    fn test_rejects_bad_edges() {
        let mut maze = Maze::new(2, 2).unwrap();
        assert!(matches!(maze.add_edge(0, 4, 1), Err(Error::UnknownNode(4))));
        assert!(matches!(maze.add_edge(1, 1, 1), Err(Error::InvalidInput(_))));
        assert!(matches!(maze.add_edge(0, 1, 0), Err(Error::InvalidInput(_))));
        assert!(Maze::new(0, 3).is_err());
    }

    #[test]
    fn test_from_matrix_directed() {
        let rows = vec![
            vec![0, 2, 0, 0],
            vec![0, 0, 0, 5],
            vec![1, 0, 0, 0],
            vec![0, 5, 0, 0],
        ];
        let maze = Maze::from_matrix(2, 2, &rows).unwrap();
        assert_eq!(maze.weight(0, 1), Some(2));
        assert_eq!(maze.weight(1, 0), None);
        assert_eq!(maze.weight(1, 3), Some(5));
        assert!(!maze.is_symmetric());

        assert!(Maze::from_matrix(2, 2, &rows[..3]).is_err());
    }

    #[test]
    fn test_from_adjacency_matches_description() {
        let mut adjacency = Adjacency::default();
        adjacency.entry(0).or_default().insert(1, 3);
        adjacency.entry(1).or_default().insert(0, 3);
        let maze = Maze::from_adjacency(2, 1, adjacency).unwrap();

        let description = maze.to_description();
        assert_eq!(description.edges, vec![(0, 1, 3), (1, 0, 3)]);
        assert_eq!(Maze::from_description(&description).unwrap(), maze);
    }

    #[test]
    fn test_description_json() {
        let json = r#"{"width": 2, "height": 1, "edges": [[0, 1, 4]]}"#;
        let description: MazeDescription = serde_json::from_str(json).unwrap();
        assert!(!description.directed);
        let maze = Maze::from_description(&description).unwrap();
        assert_eq!(maze.weight(1, 0), Some(4));
    }

    #[test]
    fn test_neighbors() {
        let maze = Maze::open_grid(3, 3).unwrap();
        let mut neighbors: Vec<_> = maze.neighbors(4).map(|(n, _)| n).collect();
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![1, 3, 5, 7]);
        assert_eq!(maze.neighbors(0).count(), 2);
    }
}
