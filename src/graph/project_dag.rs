use crate::config::{EdgePolicy, PlannerConfig};
use crate::error::{ScheduleError, ScheduleResult};
use crate::task::{DependencyEdge, Task, TaskId};
use crate::task_validation;
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Dependency network of one project. Node weights are task ids, edges run
/// predecessor -> successor.
pub struct ProjectDag {
    pub graph: DiGraph<TaskId, ()>,
    pub id_to_index: HashMap<TaskId, NodeIndex>,
    durations: Vec<i64>,
}

impl ProjectDag {
    pub fn build(
        tasks: &[Task],
        edges: &[DependencyEdge],
        config: &PlannerConfig,
    ) -> ScheduleResult<Self> {
        let mut graph: DiGraph<TaskId, ()> = DiGraph::with_capacity(tasks.len(), edges.len());
        let mut id_to_index: HashMap<TaskId, NodeIndex> = HashMap::with_capacity(tasks.len());
        let mut durations: Vec<i64> = Vec::with_capacity(tasks.len());

        // Add nodes first
        for task in tasks {
            if id_to_index.contains_key(&task.id) {
                return Err(ScheduleError::DuplicateTask { task_id: task.id });
            }
            task_validation::validate_task(task)?;
            let duration = task.duration_days(&config.duration);
            if duration > config.duration.max_duration_days {
                return Err(ScheduleError::DurationTooLong {
                    task_id: task.id,
                    max_days: config.duration.max_duration_days,
                });
            }
            let node_ix = graph.add_node(task.id);
            id_to_index.insert(task.id, node_ix);
            durations.push(duration);
        }

        // Add edges: pred -> task
        for edge in edges {
            if edge.predecessor == edge.successor {
                return Err(ScheduleError::SelfDependency {
                    task_id: edge.predecessor,
                });
            }
            match (
                id_to_index.get(&edge.predecessor),
                id_to_index.get(&edge.successor),
            ) {
                (Some(&u), Some(&v)) => {
                    graph.update_edge(u, v, ());
                }
                (pred, _) => {
                    let missing = if pred.is_none() {
                        edge.predecessor
                    } else {
                        edge.successor
                    };
                    match config.edges {
                        EdgePolicy::Ignore => log::warn!(
                            "ignoring dependency {}->{}: unknown task {}",
                            edge.predecessor,
                            edge.successor,
                            missing
                        ),
                        EdgePolicy::Reject => {
                            return Err(ScheduleError::UnknownTask {
                                predecessor: edge.predecessor,
                                successor: edge.successor,
                                missing,
                            });
                        }
                    }
                }
            }
        }

        Ok(Self {
            graph,
            id_to_index,
            durations,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn task_id(&self, node_ix: NodeIndex) -> TaskId {
        self.graph[node_ix]
    }

    pub fn duration(&self, node_ix: NodeIndex) -> i64 {
        self.durations[node_ix.index()]
    }

    pub fn predecessors(&self, node_ix: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node_ix, Direction::Incoming)
    }

    pub fn successors(&self, node_ix: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node_ix, Direction::Outgoing)
    }

    /// Topological order of all nodes; fails on the first cycle found.
    pub fn topological_order(&self) -> ScheduleResult<Vec<NodeIndex>> {
        toposort(&self.graph, None).map_err(|cycle| ScheduleError::CyclicDependency {
            task_id: self.graph[cycle.node_id()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks(ids: &[TaskId]) -> Vec<Task> {
        ids.iter().map(|&id| Task::new(id, format!("T{id}"))).collect()
    }

    #[test]
    fn duplicate_edges_collapse() {
        let edges = vec![DependencyEdge::new(1, 2), DependencyEdge::new(1, 2)];
        let dag = ProjectDag::build(&tasks(&[1, 2]), &edges, &PlannerConfig::default()).unwrap();
        assert_eq!(dag.graph.edge_count(), 1);
    }

    #[test]
    fn unknown_edge_ignored_by_default() {
        let edges = vec![DependencyEdge::new(1, 99)];
        let dag = ProjectDag::build(&tasks(&[1]), &edges, &PlannerConfig::default()).unwrap();
        assert_eq!(dag.graph.edge_count(), 0);
    }

    #[test]
    fn unknown_edge_rejected_when_configured() {
        let mut config = PlannerConfig::default();
        config.edges = EdgePolicy::Reject;
        let edges = vec![DependencyEdge::new(99, 1)];
        let err = ProjectDag::build(&tasks(&[1]), &edges, &config)
            .err()
            .unwrap();
        assert_eq!(
            err,
            ScheduleError::UnknownTask {
                predecessor: 99,
                successor: 1,
                missing: 99
            }
        );
    }

    #[test]
    fn overlong_duration_is_rejected() {
        let tasks = vec![Task::new(1, "Forever").with_estimated_hours(1e300)];
        let err = ProjectDag::build(&tasks, &[], &PlannerConfig::default())
            .err()
            .unwrap();
        assert_eq!(
            err,
            ScheduleError::DurationTooLong {
                task_id: 1,
                max_days: 36_500
            }
        );
    }

    #[test]
    fn cycle_is_reported() {
        let edges = vec![
            DependencyEdge::new(1, 2),
            DependencyEdge::new(2, 3),
            DependencyEdge::new(3, 1),
        ];
        let dag = ProjectDag::build(&tasks(&[1, 2, 3]), &edges, &PlannerConfig::default()).unwrap();
        assert!(matches!(
            dag.topological_order(),
            Err(ScheduleError::CyclicDependency { .. })
        ));
    }
}
