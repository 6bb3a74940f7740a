pub mod project_dag;

pub use project_dag::ProjectDag;
