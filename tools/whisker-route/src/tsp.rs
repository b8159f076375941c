//! Exact open-path TSP over a metagraph
//!
//! Finds the permutation of all metagraph indices that starts at a fixed index
//! and minimizes the sum of consecutive weights. The tour does not return to
//! the start.
//!
//! The search is a depth-first enumeration of partial routes. Three strategies
//! share the same recursion:
//!
//! - `Exhaustive`: every permutation is completed and evaluated.
//! - `Backtracking`: a partial route is abandoned as soon as its length reaches
//!   the incumbent's.
//! - `SortedBacktracking`: as above, but successors are tried in ascending
//!   weight from the current node (ties by ascending index), so a short route
//!   is found early and more branches get cut.
//!
//! All strategies are exact. When several routes share the optimal length,
//! the first one completed in exploration order is returned; the successor
//! order above is therefore the tie-break rule.
//!
//! Complexity is factorial in the number of points; this is meant for tens of
//! points at most.

use serde::{Deserialize, Serialize};
use whisker_common::{Error, Result, Weight};

use crate::metagraph::Metagraph;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    Exhaustive,
    Backtracking,
    #[default]
    SortedBacktracking,
}

impl SearchStrategy {
    fn prunes(self) -> bool {
        !matches!(self, SearchStrategy::Exhaustive)
    }
}

/// Counters collected during one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Recursive calls, including the root
    pub calls: u64,
    /// Complete routes compared against the incumbent
    pub complete_routes: u64,
    /// Partial routes abandoned by the bound
    pub pruned: u64,
    /// Times the incumbent was replaced
    pub improvements: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TspSolution {
    /// Metagraph indices in visiting order, starting at the start index
    pub order: Vec<usize>,
    /// Sum of consecutive metagraph weights along `order`
    pub length: Weight,
    pub stats: SearchStats,
}

/// Best complete route found so far; `length == None` until the first one.
#[derive(Debug, Default)]
struct Incumbent {
    route: Vec<usize>,
    length: Option<Weight>,
}

impl Incumbent {
    /// True if a route of `length` cannot beat the incumbent
    fn dominates(&self, length: Weight) -> bool {
        self.length.is_some_and(|best| length >= best)
    }
}

/// State of one top-level search. Nothing here outlives [`solve_tsp`].
struct Search<'a> {
    metagraph: &'a Metagraph,
    successors: &'a [Vec<usize>],
    prune: bool,
    visited: Vec<bool>,
    route: Vec<usize>,
    incumbent: Incumbent,
    stats: SearchStats,
}

impl Search<'_> {
    fn explore(&mut self, current: usize, length: Weight) {
        self.stats.calls += 1;

        if self.prune && self.incumbent.dominates(length) {
            self.stats.pruned += 1;
            tracing::trace!(depth = self.route.len(), length, "pruned");
            return;
        }

        if self.route.len() == self.metagraph.size() {
            self.stats.complete_routes += 1;
            if !self.incumbent.dominates(length) {
                self.incumbent.route.clone_from(&self.route);
                self.incumbent.length = Some(length);
                self.stats.improvements += 1;
            }
            return;
        }

        let successors = self.successors;
        for &next in &successors[current] {
            if self.visited[next] {
                continue;
            }
            self.visited[next] = true;
            self.route.push(next);
            let step = self.metagraph.weight(current, next);
            self.explore(next, length.saturating_add(step));
            self.route.pop();
            self.visited[next] = false;
        }
    }
}

/// Successor lists for every node, computed once per search.
fn successor_lists(metagraph: &Metagraph, strategy: SearchStrategy) -> Vec<Vec<usize>> {
    (0..metagraph.size())
        .map(|from| {
            let mut successors: Vec<usize> = (0..metagraph.size()).filter(|&to| to != from).collect();
            if strategy == SearchStrategy::SortedBacktracking {
                let row = metagraph.row(from);
                // stable: equal weights keep ascending index order
                successors.sort_by_key(|&to| row[to]);
            }
            successors
        })
        .collect()
}

/// Solve the open-path TSP on `metagraph` starting from `start`.
///
/// An empty metagraph yields an empty route; a single node yields `[start]`
/// with length 0 without searching.
pub fn solve_tsp(metagraph: &Metagraph, start: usize, strategy: SearchStrategy) -> Result<TspSolution> {
    let size = metagraph.size();
    if size == 0 {
        return Ok(TspSolution {
            order: Vec::new(),
            length: 0,
            stats: SearchStats::default(),
        });
    }
    if start >= size {
        return Err(Error::InvalidInput(format!(
            "start index {start} outside metagraph of size {size}"
        )));
    }
    if size == 1 {
        return Ok(TspSolution {
            order: vec![start],
            length: 0,
            stats: SearchStats::default(),
        });
    }

    let successors = successor_lists(metagraph, strategy);
    let mut visited = vec![false; size];
    visited[start] = true;
    let mut route = Vec::with_capacity(size);
    route.push(start);

    let mut search = Search {
        metagraph,
        successors: &successors,
        prune: strategy.prunes(),
        visited,
        route,
        incumbent: Incumbent::default(),
        stats: SearchStats::default(),
    };
    search.explore(start, 0);

    let Search {
        incumbent, stats, ..
    } = search;
    // A complete graph always has at least one Hamiltonian path.
    let length = incumbent.length.ok_or_else(|| {
        Error::InvalidInput("search finished without a complete route".to_string())
    })?;

    tracing::info!(
        ?strategy,
        points = size,
        length,
        calls = stats.calls,
        complete_routes = stats.complete_routes,
        pruned = stats.pruned,
        improvements = stats.improvements,
        "tsp search complete"
    );

    Ok(TspSolution {
        order: incumbent.route,
        length,
        stats,
    })
}
