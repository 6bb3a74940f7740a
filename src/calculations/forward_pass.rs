use crate::graph::ProjectDag;
use crate::task::TaskId;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// Earliest start/finish as day offsets from project start (day 0).
pub struct ForwardPass<'a> {
    dag: &'a ProjectDag,
}

impl<'a> ForwardPass<'a> {
    pub fn new(dag: &'a ProjectDag) -> Self {
        Self { dag }
    }

    /// `order` must be a topological order of the dag.
    pub fn execute(&self, order: &[NodeIndex]) -> HashMap<TaskId, (i64, i64)> {
        let mut early_finishes: Vec<i64> = vec![0; self.dag.node_count()];
        let mut results = HashMap::with_capacity(order.len());

        for &node_ix in order {
            // Early start is max of all predecessor finishes
            let early_start = self
                .dag
                .predecessors(node_ix)
                .map(|pred_ix| early_finishes[pred_ix.index()])
                .max()
                .unwrap_or(0);
            let early_finish = early_start + self.dag.duration(node_ix);
            early_finishes[node_ix.index()] = early_finish;
            results.insert(self.dag.task_id(node_ix), (early_start, early_finish));
        }

        log::debug!("forward pass covered {} tasks", results.len());
        results
    }
}
