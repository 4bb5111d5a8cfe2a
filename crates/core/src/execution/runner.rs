//! Task graph runner
//!
//! This module provides the execution logic that takes a resolved order and invokes
//! task actions, either one at a time or on a bounded pool of blocking workers.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::{Id, JoinSet};
use tracing::{error, info, warn};

use crate::execution::dependencies::resolve_execution_order;
use crate::results::{ExecutionReport, TaskOutcome, TaskState};
use crate::task::{TaskAction, TaskGraph};
use crate::types::GraphError;

/// Configuration for the task runner
#[derive(Debug, Clone)]
pub struct TaskRunnerConfig {
    /// Maximum number of actions running at once. `0` and `1` both mean sequential.
    pub workers: usize,
}

impl Default for TaskRunnerConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

/// Per-run task states, shared with worker threads
#[derive(Debug, Clone, Default)]
struct ExecutionRecord {
    states: Arc<Mutex<HashMap<String, TaskState>>>,
}

impl ExecutionRecord {
    fn new(order: &[String]) -> Self {
        let states = order
            .iter()
            .map(|name| (name.clone(), TaskState::Pending))
            .collect();
        Self {
            states: Arc::new(Mutex::new(states)),
        }
    }

    fn set(&self, name: &str, state: TaskState) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.insert(name.to_string(), state);
    }

    fn snapshot(&self) -> HashMap<String, TaskState> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Invoke an action, turning a panic into an ordinary failure
fn invoke(action: &TaskAction) -> anyhow::Result<()> {
    panic::catch_unwind(AssertUnwindSafe(|| action()))
        .unwrap_or_else(|_| Err(anyhow::anyhow!("task action panicked")))
}

/// Run the requested tasks and their dependencies one at a time, in
/// dependency order.
///
/// Nothing runs if resolution fails. The first failing action stops the run;
/// tasks that already finished are not undone.
pub fn run<S: AsRef<str>>(
    graph: &TaskGraph,
    requested: &[S],
) -> Result<ExecutionReport, GraphError> {
    let order = resolve_execution_order(graph, requested)?;
    execute_sequential(graph, &order)
}

/// Runner over a borrowed task graph
pub struct TaskRunner<'a> {
    graph: &'a TaskGraph,
    config: TaskRunnerConfig,
}

impl<'a> TaskRunner<'a> {
    pub fn new(graph: &'a TaskGraph) -> Self {
        Self::with_config(graph, TaskRunnerConfig::default())
    }

    pub fn with_config(graph: &'a TaskGraph, config: TaskRunnerConfig) -> Self {
        Self { graph, config }
    }

    /// Resolve and run the requested tasks.
    ///
    /// With more than one worker, a task starts as soon as all of its
    /// dependencies have completed. After a failure no new task is started,
    /// but tasks already running are allowed to finish. The first failure
    /// observed is the one returned.
    pub async fn run<S: AsRef<str>>(
        &self,
        requested: &[S],
    ) -> Result<ExecutionReport, GraphError> {
        let order = resolve_execution_order(self.graph, requested)?;

        if self.config.workers <= 1 {
            execute_sequential(self.graph, &order)
        } else {
            self.execute_parallel(&order).await
        }
    }

    async fn execute_parallel(&self, order: &[String]) -> Result<ExecutionReport, GraphError> {
        let workers = self.config.workers;
        let record = ExecutionRecord::new(order);

        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut remaining: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for name in order {
            let deps: HashSet<&str> = self
                .graph
                .get(name)
                .map(|task| task.dependencies().iter().map(String::as_str).collect())
                .unwrap_or_default();
            remaining.insert(name.as_str(), deps.len());
            for dep in deps {
                dependents.entry(dep).or_default().push(name.as_str());
            }
        }

        // Ready tasks keyed by topological position, so the earliest starts first
        let mut ready: BTreeMap<usize, &str> = remaining
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&name, _)| (position[name], name))
            .collect();

        let mut workers_set: JoinSet<(String, Duration, anyhow::Result<()>)> = JoinSet::new();
        let mut running: HashMap<Id, String> = HashMap::new();
        let mut completed = Vec::new();
        let mut failure: Option<GraphError> = None;

        loop {
            while failure.is_none() && workers_set.len() < workers {
                let Some((_, name)) = ready.pop_first() else {
                    break;
                };
                let Some(task) = self.graph.get(name) else {
                    continue;
                };

                let action = task.action();
                let record = record.clone();
                let name = name.to_string();
                let worker_name = name.clone();
                let handle = workers_set.spawn_blocking(move || {
                    record.set(&worker_name, TaskState::Running);
                    info!(task = %worker_name, "starting task");
                    let started = Instant::now();
                    let result = invoke(&action);
                    (worker_name, started.elapsed(), result)
                });
                running.insert(handle.id(), name);
            }

            let Some(joined) = workers_set.join_next_with_id().await else {
                break;
            };

            let joined = match joined {
                Ok((id, outcome)) => {
                    running.remove(&id);
                    Ok(outcome)
                }
                Err(join_error) => {
                    let name = running
                        .remove(&join_error.id())
                        .unwrap_or_else(|| String::from("<unknown>"));
                    Err((name, join_error))
                }
            };

            match joined {
                Ok((name, duration, Ok(()))) => {
                    record.set(&name, TaskState::Done);
                    info!(task = %name, elapsed_ms = duration.as_millis() as u64, "task finished");

                    if let Some(next) = dependents.get(name.as_str()) {
                        for &dependent in next {
                            if let Some(count) = remaining.get_mut(dependent) {
                                *count -= 1;
                                if *count == 0 {
                                    ready.insert(position[dependent], dependent);
                                }
                            }
                        }
                    }
                    completed.push(TaskOutcome { name, duration });
                }
                Ok((name, _, Err(cause))) => {
                    record.set(&name, TaskState::Failed);
                    if failure.is_none() {
                        error!(task = %name, error = %cause, "task failed, no further tasks will start");
                        failure = Some(GraphError::TaskExecution {
                            task: name,
                            error: cause,
                        });
                    } else {
                        warn!(task = %name, error = %cause, "task failed after an earlier failure");
                    }
                }
                Err((name, join_error)) => {
                    record.set(&name, TaskState::Failed);
                    error!(task = %name, error = %join_error, "worker did not complete");
                    if failure.is_none() {
                        failure = Some(GraphError::TaskExecution {
                            task: name,
                            error: join_error.into(),
                        });
                    }
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }

        Ok(ExecutionReport {
            completed,
            states: record.snapshot(),
        })
    }
}

fn execute_sequential(graph: &TaskGraph, order: &[String]) -> Result<ExecutionReport, GraphError> {
    let record = ExecutionRecord::new(order);
    let mut completed = Vec::with_capacity(order.len());

    for name in order {
        let Some(task) = graph.get(name) else {
            return Err(GraphError::UnknownTask {
                name: name.clone(),
                referenced_by: None,
            });
        };

        record.set(name, TaskState::Running);
        info!(task = %name, "starting task");
        let started = Instant::now();

        if let Err(cause) = invoke(&task.action()) {
            record.set(name, TaskState::Failed);
            error!(task = %name, error = %cause, "task failed, no further tasks will start");
            return Err(GraphError::TaskExecution {
                task: name.clone(),
                error: cause,
            });
        }

        let duration = started.elapsed();
        record.set(name, TaskState::Done);
        info!(task = %name, elapsed_ms = duration.as_millis() as u64, "task finished");
        completed.push(TaskOutcome {
            name: name.clone(),
            duration,
        });
    }

    Ok(ExecutionReport {
        completed,
        states: record.snapshot(),
    })
}
