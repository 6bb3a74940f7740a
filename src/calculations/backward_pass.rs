use crate::graph::ProjectDag;
use crate::task::TaskId;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// Latest start/finish as day offsets, anchored at the project end.
pub struct BackwardPass<'a> {
    dag: &'a ProjectDag,
}

impl<'a> BackwardPass<'a> {
    pub fn new(dag: &'a ProjectDag) -> Self {
        Self { dag }
    }

    /// `order` is the same topological order used by the forward pass; it is
    /// walked in reverse.
    pub fn execute(&self, order: &[NodeIndex], project_end: i64) -> HashMap<TaskId, (i64, i64)> {
        let mut late_starts: Vec<Option<i64>> = vec![None; self.dag.node_count()];
        let mut results = HashMap::with_capacity(order.len());

        for &node_ix in order.iter().rev() {
            // Sinks finish at the project end; everything else at its tightest successor
            let late_finish = self
                .dag
                .successors(node_ix)
                .filter_map(|succ_ix| late_starts[succ_ix.index()])
                .min()
                .unwrap_or(project_end);
            let late_start = late_finish - self.dag.duration(node_ix);
            late_starts[node_ix.index()] = Some(late_start);
            results.insert(self.dag.task_id(node_ix), (late_start, late_finish));
        }

        log::debug!(
            "backward pass covered {} tasks from day {}",
            results.len(),
            project_end
        );
        results
    }
}
