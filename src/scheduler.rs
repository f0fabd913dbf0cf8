//! Background execution of recipe phases.
//!
//! The scheduler runs each object's sync phase on the blocking pool and, only
//! once it succeeded, its async phase as a continuation of the same task. That
//! continuation is the sole ordering guarantee: phases of different objects
//! interleave freely, bounded by a shared permit pool.

use crate::recipe::{Job, Phase, Recipe, RecipeRunner};
use anyhow::{Context, Result};
use mediacook_common::ObjectHash;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot, Semaphore};
use tokio::task::JoinHandle;

const EVENT_CAPACITY: usize = 256;

/// Phase lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PhaseEvent {
    SyncStarted { hash: ObjectHash, recipe: Recipe },
    SyncCompleted { hash: ObjectHash, recipe: Recipe },
    AsyncStarted { hash: ObjectHash, recipe: Recipe },
    AsyncCompleted { hash: ObjectHash, recipe: Recipe },
    PhaseFailed {
        hash: ObjectHash,
        recipe: Recipe,
        phase: Phase,
        error: String,
    },
}

impl PhaseEvent {
    fn started(phase: Phase, job: &Job) -> Self {
        let (hash, recipe) = (job.object.hash.clone(), job.recipe);
        match phase {
            Phase::Sync => Self::SyncStarted { hash, recipe },
            Phase::Async => Self::AsyncStarted { hash, recipe },
        }
    }

    fn completed(phase: Phase, job: &Job) -> Self {
        let (hash, recipe) = (job.object.hash.clone(), job.recipe);
        match phase {
            Phase::Sync => Self::SyncCompleted { hash, recipe },
            Phase::Async => Self::AsyncCompleted { hash, recipe },
        }
    }

    /// The object this event is about.
    pub fn hash(&self) -> &ObjectHash {
        match self {
            Self::SyncStarted { hash, .. }
            | Self::SyncCompleted { hash, .. }
            | Self::AsyncStarted { hash, .. }
            | Self::AsyncCompleted { hash, .. }
            | Self::PhaseFailed { hash, .. } => hash,
        }
    }
}

/// How a phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseStatus {
    Completed { elapsed: Duration },
    Failed(String),
    /// Not run: the recipe has no async phase, sync failed, or the job was
    /// submitted sync-only.
    Skipped,
}

impl PhaseStatus {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Final state of a submitted job.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub hash: ObjectHash,
    pub recipe: Recipe,
    pub sync: PhaseStatus,
    pub async_phase: PhaseStatus,
}

impl JobOutcome {
    /// Neither phase failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.sync.is_failed() && !self.async_phase.is_failed()
    }
}

/// Handle to a submitted job.
pub struct JobHandle {
    hash: ObjectHash,
    sync: Option<oneshot::Receiver<PhaseStatus>>,
    task: JoinHandle<JobOutcome>,
}

impl JobHandle {
    pub fn hash(&self) -> &ObjectHash {
        &self.hash
    }

    /// Wait until the sync phase finished. The async phase may still be
    /// running afterwards.
    pub async fn wait_sync(&mut self) -> PhaseStatus {
        match self.sync.take() {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| PhaseStatus::Failed("job task ended unexpectedly".into())),
            None => PhaseStatus::Skipped,
        }
    }

    /// Wait for both phases.
    pub async fn wait(self) -> Result<JobOutcome> {
        self.task
            .await
            .with_context(|| format!("Job task for {} panicked", self.hash))
    }
}

/// Runs jobs in the background with sync-before-async ordering per object.
#[derive(Clone)]
pub struct PhaseScheduler {
    runner: Arc<RecipeRunner>,
    permits: Arc<Semaphore>,
    events: broadcast::Sender<PhaseEvent>,
    budget_warning: bool,
}

impl PhaseScheduler {
    /// `max_concurrent` bounds how many phases run at once across all
    /// objects; zero is treated as one.
    pub fn new(runner: RecipeRunner, max_concurrent: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            runner: Arc::new(runner),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            events,
            budget_warning: true,
        }
    }

    /// Whether to log a warning when a sync phase outlives its budget.
    pub fn with_budget_warning(mut self, enabled: bool) -> Self {
        self.budget_warning = enabled;
        self
    }

    /// Subscribe to phase events. Only events sent after subscribing are
    /// received.
    pub fn subscribe(&self) -> broadcast::Receiver<PhaseEvent> {
        self.events.subscribe()
    }

    /// Run both phases of `job` in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, job: Job) -> JobHandle {
        self.spawn(job, true)
    }

    /// Run only the sync phase of `job`.
    pub fn submit_sync_only(&self, job: Job) -> JobHandle {
        self.spawn(job, false)
    }

    fn spawn(&self, job: Job, with_async: bool) -> JobHandle {
        let hash = job.object.hash.clone();
        let (sync_tx, sync_rx) = oneshot::channel();
        let scheduler = self.clone();

        tracing::debug!("{}: submitted ({})", hash, job.recipe);

        let task = tokio::spawn(async move {
            let job = Arc::new(job);
            let sync = scheduler.run_phase(job.clone(), Phase::Sync).await;
            let _ = sync_tx.send(sync.clone());

            let async_phase = if sync.is_completed() && with_async && job.recipe.has_async_phase()
            {
                scheduler.run_phase(job.clone(), Phase::Async).await
            } else {
                PhaseStatus::Skipped
            };

            JobOutcome {
                hash: job.object.hash.clone(),
                recipe: job.recipe,
                sync,
                async_phase,
            }
        });

        JobHandle {
            hash,
            sync: Some(sync_rx),
            task,
        }
    }

    async fn run_phase(&self, job: Arc<Job>, phase: Phase) -> PhaseStatus {
        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return PhaseStatus::Failed("scheduler closed".to_string()),
        };

        self.emit(PhaseEvent::started(phase, &job));

        let runner = self.runner.clone();
        let blocking_job = job.clone();
        let mut task = tokio::task::spawn_blocking(move || runner.run_phase(&blocking_job, phase));

        let joined = if phase == Phase::Sync && self.budget_warning {
            let budget = job.recipe.time_budget();
            match tokio::time::timeout(budget, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!(
                        hash = %job.object.hash,
                        recipe = %job.recipe,
                        "sync phase exceeded its {}s budget, still running",
                        budget.as_secs()
                    );
                    task.await
                }
            }
        } else {
            task.await
        };

        let error = match joined {
            Ok(Ok(report)) => {
                self.emit(PhaseEvent::completed(phase, &job));
                return PhaseStatus::Completed {
                    elapsed: report.elapsed,
                };
            }
            Ok(Err(e)) => format!("{:#}", e),
            Err(e) => format!("{} phase task failed: {}", phase, e),
        };

        tracing::error!(hash = %job.object.hash, recipe = %job.recipe, "{}", error);
        self.emit(PhaseEvent::PhaseFailed {
            hash: job.object.hash.clone(),
            recipe: job.recipe,
            phase,
            error: error.clone(),
        });
        PhaseStatus::Failed(error)
    }

    fn emit(&self, event: PhaseEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
