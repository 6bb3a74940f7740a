//! Critical path method over a task dependency network.
//!
//! Times are whole-day offsets from the project start: a task with
//! `earliest_start == 0` and duration 3 occupies days 0, 1 and 2 and has
//! `earliest_finish == 3`. Calendar dates are derived separately through
//! [`CriticalPathAnalysis::dated`].

use crate::calculations::{BackwardPass, ForwardPass};
use crate::calendar::{CalendarError, WorkCalendar};
use crate::config::PlannerConfig;
use crate::error::ScheduleResult;
use crate::graph::ProjectDag;
use crate::layout::{self, Position};
use crate::task::{DependencyEdge, Task, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    pub task_id: TaskId,
    pub duration: i64,
    pub earliest_start: i64,
    pub earliest_finish: i64,
    pub latest_start: i64,
    pub latest_finish: i64,
    /// Total float: how far the start can slip without moving the project end.
    pub slack: i64,
    /// How far the finish can slip without delaying any successor.
    pub free_float: i64,
    pub is_critical: bool,
    pub level: usize,
    pub position: Position,
}

/// A [`TaskNode`] projected onto working days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedTaskNode {
    pub task_id: TaskId,
    pub early_start: NaiveDate,
    pub early_finish: NaiveDate,
    pub late_start: NaiveDate,
    pub late_finish: NaiveDate,
    pub slack: i64,
    pub is_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CriticalPathAnalysis {
    nodes: BTreeMap<TaskId, TaskNode>,
    project_duration: i64,
    critical_path: Vec<TaskId>,
    driving_edges: Vec<DependencyEdge>,
}

pub fn compute_critical_path(
    tasks: &[Task],
    edges: &[DependencyEdge],
) -> ScheduleResult<CriticalPathAnalysis> {
    compute_critical_path_with(tasks, edges, &PlannerConfig::default())
}

pub fn compute_critical_path_with(
    tasks: &[Task],
    edges: &[DependencyEdge],
    config: &PlannerConfig,
) -> ScheduleResult<CriticalPathAnalysis> {
    if tasks.is_empty() {
        return Ok(CriticalPathAnalysis::default());
    }

    let dag = ProjectDag::build(tasks, edges, config)?;
    let order = dag.topological_order()?;

    let early = ForwardPass::new(&dag).execute(&order);
    let project_duration = early.values().map(|&(_, ef)| ef).max().unwrap_or(0);
    let late = BackwardPass::new(&dag).execute(&order, project_duration);

    let levels = layout::levels_in_order(&dag, &order);
    let level_map: BTreeMap<TaskId, usize> = order
        .iter()
        .map(|&node_ix| (dag.task_id(node_ix), levels[node_ix.index()]))
        .collect();
    let positions = layout::layout_positions(&level_map, &config.layout);

    let mut nodes = BTreeMap::new();
    for &node_ix in &order {
        let task_id = dag.task_id(node_ix);
        let (earliest_start, earliest_finish) = early[&task_id];
        let (latest_start, latest_finish) = late[&task_id];
        let slack = latest_start - earliest_start;
        let next_start = dag
            .successors(node_ix)
            .map(|succ_ix| early[&dag.task_id(succ_ix)].0)
            .min()
            .unwrap_or(project_duration);
        nodes.insert(
            task_id,
            TaskNode {
                task_id,
                duration: dag.duration(node_ix),
                earliest_start,
                earliest_finish,
                latest_start,
                latest_finish,
                slack,
                free_float: next_start - earliest_finish,
                is_critical: slack == 0,
                level: level_map[&task_id],
                position: positions.get(&task_id).copied().unwrap_or_default(),
            },
        );
    }

    let mut critical: Vec<(i64, TaskId)> = nodes
        .values()
        .filter(|node| node.is_critical)
        .map(|node| (node.earliest_start, node.task_id))
        .collect();
    critical.sort_unstable();
    let critical_path: Vec<TaskId> = critical.into_iter().map(|(_, id)| id).collect();

    let mut driving_edges: Vec<DependencyEdge> = dag
        .graph
        .edge_indices()
        .filter_map(|edge_ix| dag.graph.edge_endpoints(edge_ix))
        .map(|(u, v)| DependencyEdge::new(dag.task_id(u), dag.task_id(v)))
        .filter(|edge| {
            let pred = &nodes[&edge.predecessor];
            let succ = &nodes[&edge.successor];
            pred.is_critical && succ.is_critical && pred.earliest_finish == succ.earliest_start
        })
        .collect();
    driving_edges.sort_unstable();

    log::info!(
        "critical path computed: {} tasks, {} critical, {} days",
        nodes.len(),
        critical_path.len(),
        project_duration
    );

    Ok(CriticalPathAnalysis {
        nodes,
        project_duration,
        critical_path,
        driving_edges,
    })
}

impl CriticalPathAnalysis {
    pub fn nodes(&self) -> &BTreeMap<TaskId, TaskNode> {
        &self.nodes
    }

    pub fn into_nodes(self) -> BTreeMap<TaskId, TaskNode> {
        self.nodes
    }

    pub fn node(&self, task_id: TaskId) -> Option<&TaskNode> {
        self.nodes.get(&task_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Project end as a day offset: the largest earliest finish.
    pub fn project_duration(&self) -> i64 {
        self.project_duration
    }

    /// Every zero-slack task, ordered by earliest start then id.
    pub fn critical_path(&self) -> &[TaskId] {
        &self.critical_path
    }

    pub fn is_critical(&self, task_id: TaskId) -> bool {
        self.nodes.get(&task_id).is_some_and(|node| node.is_critical)
    }

    pub fn levels(&self) -> BTreeMap<TaskId, usize> {
        self.nodes
            .iter()
            .map(|(&task_id, node)| (task_id, node.level))
            .collect()
    }

    /// Critical tasks strung together along driving edges (the predecessor
    /// finishes exactly when the successor starts). Parallel zero-slack
    /// branches come back as separate chains.
    pub fn critical_chains(&self) -> Vec<Vec<TaskId>> {
        let mut outgoing: BTreeMap<TaskId, Vec<TaskId>> = BTreeMap::new();
        let mut has_incoming: BTreeSet<TaskId> = BTreeSet::new();
        for edge in &self.driving_edges {
            outgoing
                .entry(edge.predecessor)
                .or_default()
                .push(edge.successor);
            has_incoming.insert(edge.successor);
        }

        let mut chains = Vec::new();
        for &start in &self.critical_path {
            if has_incoming.contains(&start) {
                continue;
            }
            let mut stack = vec![vec![start]];
            while let Some(chain) = stack.pop() {
                let Some(&last) = chain.last() else {
                    continue;
                };
                match outgoing.get(&last) {
                    Some(next) if !next.is_empty() => {
                        for &succ in next.iter().rev() {
                            let mut extended = chain.clone();
                            extended.push(succ);
                            stack.push(extended);
                        }
                    }
                    _ => chains.push(chain),
                }
            }
        }
        chains.sort();
        chains
    }

    /// Map offsets onto the calendar: offset `k` is the `k`-th working day on
    /// or after `project_start`, and finishes land on the last working day a
    /// task occupies.
    pub fn dated(
        &self,
        calendar: &WorkCalendar,
        project_start: NaiveDate,
    ) -> Result<Vec<DatedTaskNode>, CalendarError> {
        let first_day = first_working_day(calendar, project_start)?;
        let day = |offset: i64| calendar.find_next_available(first_day, offset);
        self.nodes
            .values()
            .map(|node| {
                Ok(DatedTaskNode {
                    task_id: node.task_id,
                    early_start: day(node.earliest_start)?,
                    early_finish: day((node.earliest_finish - 1).max(node.earliest_start))?,
                    late_start: day(node.latest_start)?,
                    late_finish: day((node.latest_finish - 1).max(node.latest_start))?,
                    slack: node.slack,
                    is_critical: node.is_critical,
                })
            })
            .collect()
    }

    /// Last working day of the project, or `None` for an empty analysis.
    pub fn finish_date(
        &self,
        calendar: &WorkCalendar,
        project_start: NaiveDate,
    ) -> Result<Option<NaiveDate>, CalendarError> {
        if self.nodes.is_empty() {
            return Ok(None);
        }
        let first_day = first_working_day(calendar, project_start)?;
        calendar
            .find_next_available(first_day, (self.project_duration - 1).max(0))
            .map(Some)
    }
}

fn first_working_day(
    calendar: &WorkCalendar,
    project_start: NaiveDate,
) -> Result<NaiveDate, CalendarError> {
    calendar
        .first_available_on_or_after(project_start)
        .ok_or(CalendarError::DateOutOfRange {
            from: project_start,
            days: 0,
        })
}
