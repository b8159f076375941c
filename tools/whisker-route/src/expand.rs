//! Route expansion
//!
//! Turns a visiting order over metagraph indices back into a sequence of
//! adjacent maze cells, stitching the stored shortest paths end to end.

use whisker_common::{Error, NodeId, Result};

use crate::metagraph::RoutingTables;

/// Expand `order` (indices into `points`) into a full maze route.
///
/// Each leg contributes every node but its last, and the final point is
/// appended once, so junctions are not duplicated. A missing routing table
/// or path is reported as [`Error::InconsistentRouting`]: the tables come from
/// the same metagraph build, so this indicates a bug rather than bad input.
pub fn expand_route(order: &[usize], points: &[NodeId], tables: &RoutingTables) -> Result<Vec<NodeId>> {
    let point = |index: usize| -> Result<NodeId> {
        points.get(index).copied().ok_or_else(|| {
            Error::InvalidInput(format!(
                "route index {index} outside {} points of interest",
                points.len()
            ))
        })
    };

    let mut route = Vec::new();
    for pair in order.windows(2) {
        let source = point(pair[0])?;
        let target = point(pair[1])?;
        let leg = tables
            .get(source)
            .ok_or(Error::InconsistentRouting {
                from: source,
                to: target,
            })?
            .route_to(target)
            .map_err(|_| Error::InconsistentRouting {
                from: source,
                to: target,
            })?;
        route.extend_from_slice(&leg[..leg.len() - 1]);
    }
    if let Some(&last) = order.last() {
        route.push(point(last)?);
    }

    tracing::info!(legs = order.len().saturating_sub(1), cells = route.len(), "route expanded");
    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dijkstra::Dijkstra;
    use crate::graph::Maze;
    use crate::metagraph::build_metagraph;

    #[test]
    fn test_corner_to_corner() {
        let maze = Maze::open_grid(3, 3).unwrap();
        let points = [0, 8];
        let (_, tables) = build_metagraph(&maze, &points, &Dijkstra).unwrap();
        let route = expand_route(&[0, 1], &points, &tables).unwrap();
        assert_eq!(route.len(), 5);
        assert_eq!(route.first(), Some(&0));
        assert_eq!(route.last(), Some(&8));
    }

    #[test]
    fn test_junctions_not_duplicated() {
        let maze = Maze::open_grid(4, 4).unwrap();
        let points = [0, 3, 15, 12];
        let (metagraph, tables) = build_metagraph(&maze, &points, &Dijkstra).unwrap();
        let order = [0, 1, 2, 3];
        let route = expand_route(&order, &points, &tables).unwrap();

        // one cell per unit of length, plus the start
        assert_eq!(route.len() as u64, metagraph.route_length(&order) + 1);
        for pair in route.windows(2) {
            assert_ne!(pair[0], pair[1]);
            assert_eq!(maze.weight(pair[0], pair[1]), Some(1));
        }
        let positions: Vec<usize> = points
            .iter()
            .map(|p| route.iter().position(|n| n == p).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_trivial_orders() {
        let tables = RoutingTables::default();
        assert!(expand_route(&[], &[], &tables).unwrap().is_empty());
        assert_eq!(expand_route(&[0], &[7], &tables).unwrap(), vec![7]);
    }

    #[test]
    fn test_missing_table_is_inconsistency() {
        let maze = Maze::open_grid(2, 2).unwrap();
        let (_, tables) = build_metagraph(&maze, &[0, 3], &Dijkstra).unwrap();
        // point 1 was never an origin in the build
        let result = expand_route(&[0, 1], &[1, 3], &tables);
        assert!(matches!(
            result,
            Err(Error::InconsistentRouting { from: 1, to: 3 })
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let tables = RoutingTables::default();
        assert!(matches!(
            expand_route(&[0, 2], &[0, 1], &tables),
            Err(Error::InvalidInput(_))
        ));
    }
}
