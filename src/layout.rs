//! Hierarchical levels for drawing a project network as columns.
//!
//! A task sits one column to the right of its deepest predecessor. Levels are
//! a presentation aid only and play no part in the timing computation.

use crate::config::{LayoutConfig, PlannerConfig};
use crate::error::ScheduleResult;
use crate::graph::ProjectDag;
use crate::task::{DependencyEdge, Task, TaskId};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

pub fn compute_levels(
    tasks: &[Task],
    edges: &[DependencyEdge],
) -> ScheduleResult<BTreeMap<TaskId, usize>> {
    compute_levels_with(tasks, edges, &PlannerConfig::default())
}

pub fn compute_levels_with(
    tasks: &[Task],
    edges: &[DependencyEdge],
    config: &PlannerConfig,
) -> ScheduleResult<BTreeMap<TaskId, usize>> {
    let dag = ProjectDag::build(tasks, edges, config)?;
    let order = dag.topological_order()?;
    let levels = levels_in_order(&dag, &order);
    Ok(order
        .iter()
        .map(|&node_ix| (dag.task_id(node_ix), levels[node_ix.index()]))
        .collect())
}

/// Levels indexed by node index. `order` must be topological.
pub(crate) fn levels_in_order(dag: &ProjectDag, order: &[NodeIndex]) -> Vec<usize> {
    let mut levels = vec![0usize; dag.node_count()];
    for &node_ix in order {
        levels[node_ix.index()] = dag
            .predecessors(node_ix)
            .map(|pred_ix| levels[pred_ix.index()] + 1)
            .max()
            .unwrap_or(0);
    }
    levels
}

/// Column `x` from the level, row `y` from the task's rank (by id) within
/// its level.
pub fn layout_positions(
    levels: &BTreeMap<TaskId, usize>,
    layout: &LayoutConfig,
) -> BTreeMap<TaskId, Position> {
    let mut columns: BTreeMap<usize, Vec<TaskId>> = BTreeMap::new();
    for (&task_id, &level) in levels {
        columns.entry(level).or_default().push(task_id);
    }

    let mut positions = BTreeMap::new();
    for (level, mut ids) in columns {
        ids.sort_unstable();
        for (row, task_id) in ids.into_iter().enumerate() {
            positions.insert(
                task_id,
                Position {
                    x: level as f64 * layout.column_spacing,
                    y: row as f64 * layout.row_spacing,
                },
            );
        }
    }
    positions
}

/// Level number -> task ids in that column, sorted.
pub fn group_by_level(levels: &BTreeMap<TaskId, usize>) -> Vec<Vec<TaskId>> {
    let depth = levels.values().copied().max().map_or(0, |max| max + 1);
    let mut columns = vec![Vec::new(); depth];
    for (&task_id, &level) in levels {
        columns[level].push(task_id);
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_levels_and_ids() {
        let levels = BTreeMap::from([(1, 0), (2, 1), (3, 1), (4, 2)]);
        let layout = LayoutConfig {
            column_spacing: 100.0,
            row_spacing: 10.0,
        };
        let positions = layout_positions(&levels, &layout);
        assert_eq!(positions[&1], Position { x: 0.0, y: 0.0 });
        assert_eq!(positions[&3], Position { x: 100.0, y: 10.0 });
        assert_eq!(positions[&4], Position { x: 200.0, y: 0.0 });
    }

    #[test]
    fn group_by_level_of_empty_map() {
        assert!(group_by_level(&BTreeMap::new()).is_empty());
    }
}
