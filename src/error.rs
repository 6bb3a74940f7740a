use crate::task::TaskId;
use crate::task_validation::TaskValidationError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("cyclic dependency detected at task {task_id}")]
    CyclicDependency { task_id: TaskId },
    #[error("task {task_id} depends on itself")]
    SelfDependency { task_id: TaskId },
    #[error("dependency {predecessor}->{successor} references unknown task {missing}")]
    UnknownTask {
        predecessor: TaskId,
        successor: TaskId,
        missing: TaskId,
    },
    #[error("duplicate task id {task_id}")]
    DuplicateTask { task_id: TaskId },
    #[error("task {task_id} duration exceeds the {max_days}-day limit")]
    DurationTooLong { task_id: TaskId, max_days: i64 },
    #[error("task {task_id} not found")]
    TaskNotFound { task_id: TaskId },
    #[error(transparent)]
    InvalidTask(#[from] TaskValidationError),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
