//! Deferred side effects that may only run after a successful flush.

use std::fmt;

use tracing::{error, info};
use uuid::Uuid;

use crate::application::tree::FlushReceipt;
use crate::error::{ForgeError, ForgeResult};

type Action = Box<dyn FnOnce() -> ForgeResult<()> + Send>;

/// A labelled, run-once action.
pub struct DeferredTask {
    label: String,
    action: Action,
}

impl DeferredTask {
    pub fn new(
        label: impl Into<String>,
        action: impl FnOnce() -> ForgeResult<()> + Send + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            action: Box::new(action),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for DeferredTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredTask")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A task that returned an error. Never fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskError {
    pub label: String,
    pub error: ForgeError,
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.error)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskReport {
    pub completed: Vec<String>,
    pub failed: Vec<TaskError>,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ordered queue of deferred tasks, bound to the tree session that queued them.
#[derive(Debug, Default)]
pub struct DeferredTasks {
    session: Uuid,
    tasks: Vec<DeferredTask>,
}

impl DeferredTasks {
    pub fn new(session: Uuid) -> Self {
        Self {
            session,
            tasks: Vec::new(),
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn push(&mut self, task: DeferredTask) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.tasks.iter().map(DeferredTask::label).collect()
    }

    /// Run every task in append order.
    ///
    /// The receipt is the only way in: tasks cannot run against a tree that
    /// was never flushed. A failing task is recorded and the rest still run.
    /// A receipt from another session runs nothing and fails every task.
    pub fn run(self, receipt: &FlushReceipt) -> TaskReport {
        let mut report = TaskReport::default();

        if receipt.session() != self.session {
            error!(
                expected = %self.session,
                received = %receipt.session(),
                tasks = self.tasks.len(),
                "Flush receipt is from another session; deferred tasks skipped"
            );
            let message = format!(
                "flush receipt for session {} does not match session {}",
                receipt.session(),
                self.session
            );
            report.failed = self
                .tasks
                .into_iter()
                .map(|task| TaskError {
                    label: task.label,
                    error: ForgeError::Internal {
                        message: message.clone(),
                    },
                })
                .collect();
            return report;
        }

        for task in self.tasks {
            info!(task = %task.label, session = %receipt.session(), "Running deferred task");
            match (task.action)() {
                Ok(()) => report.completed.push(task.label),
                Err(e) => {
                    error!(task = %task.label, error = %e, "Deferred task failed");
                    report.failed.push(TaskError {
                        label: task.label,
                        error: e,
                    });
                }
            }
        }

        report
    }
}

impl Extend<DeferredTask> for DeferredTasks {
    fn extend<I: IntoIterator<Item = DeferredTask>>(&mut self, iter: I) {
        self.tasks.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::application::testing::StubStorage;
    use crate::application::tree::VirtualTree;

    fn tree() -> VirtualTree {
        VirtualTree::new(Arc::new(StubStorage::default()))
    }

    #[test]
    fn tasks_run_in_order_and_failures_do_not_stop_the_queue() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let tree = tree();
        let mut tasks = DeferredTasks::new(tree.session());

        for label in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            tasks.push(DeferredTask::new(label, move || {
                seen.lock().unwrap().push(label);
                if label == "second" {
                    return Err(ForgeError::Internal {
                        message: "boom".into(),
                    });
                }
                Ok(())
            }));
        }

        assert_eq!(tasks.labels(), vec!["first", "second", "third"]);
        let report = tasks.run(&tree.flush().unwrap());

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(report.completed, vec!["first", "third"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].label, "second");
        assert!(!report.is_success());
    }

    #[test]
    fn empty_queue_is_a_successful_noop() {
        let tree = tree();
        let report = DeferredTasks::new(tree.session()).run(&tree.flush().unwrap());
        assert!(report.is_success());
        assert!(report.completed.is_empty());
    }

    #[test]
    fn receipt_from_another_session_runs_nothing() {
        let ran = Arc::new(Mutex::new(false));
        let queued_by = tree();
        let mut tasks = DeferredTasks::new(queued_by.session());
        let flag = Arc::clone(&ran);
        tasks.push(DeferredTask::new("install", move || {
            *flag.lock().unwrap() = true;
            Ok(())
        }));

        let report = tasks.run(&tree().flush().unwrap());

        assert!(!*ran.lock().unwrap());
        assert!(report.completed.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].label, "install");
        assert!(report.failed[0].error.to_string().contains("does not match"));
        queued_by.discard();
    }
}
