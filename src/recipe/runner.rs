use super::{Phase, Recipe, Step};
use anyhow::{Context, Result};
use mediacook_av::{ProbedMetadata, ProcessInvoker, StreamClassifier, TemplateContext};
use mediacook_common::{MediaObject, StorageLayout};
use std::path::Path;
use std::time::{Duration, Instant};

/// Everything a recipe needs to process one object.
#[derive(Debug, Clone)]
pub struct Job {
    pub object: MediaObject,
    pub recipe: Recipe,
    /// Extension the original is stored under.
    pub extension: String,
    /// Stream metadata; only the video recipe reads it.
    pub probe: ProbedMetadata,
}

impl Job {
    pub fn new(object: MediaObject, recipe: Recipe, extension: impl Into<String>) -> Self {
        Self {
            object,
            recipe,
            extension: extension.into(),
            probe: ProbedMetadata::default(),
        }
    }

    pub fn with_probe(mut self, probe: ProbedMetadata) -> Self {
        self.probe = probe;
        self
    }
}

/// Summary of a finished phase.
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub phase: Phase,
    pub steps: usize,
    pub elapsed: Duration,
}

/// Executes recipe phases step by step, blocking the calling thread.
///
/// Steps run in declared order and the first failure aborts the rest of the
/// phase. Artifacts produced before the failure stay on disk.
#[derive(Debug, Clone)]
pub struct RecipeRunner {
    invoker: ProcessInvoker,
    layout: StorageLayout,
}

impl RecipeRunner {
    pub fn new(invoker: ProcessInvoker, layout: StorageLayout) -> Self {
        Self { invoker, layout }
    }

    /// Placeholder bindings for a job's invocations.
    pub fn context(&self, job: &Job) -> TemplateContext {
        TemplateContext::new().with_bindings(
            &job.object.input_path,
            &self.layout.stem(&job.object.hash),
            &job.extension,
        )
    }

    pub fn run_sync(&self, job: &Job) -> Result<PhaseReport> {
        self.run_phase(job, Phase::Sync)
    }

    /// Must only be called once [`RecipeRunner::run_sync`] succeeded for the
    /// same object; the in-place steps operate on the sync-phase copy.
    pub fn run_async(&self, job: &Job) -> Result<PhaseReport> {
        self.run_phase(job, Phase::Async)
    }

    pub fn run_phase(&self, job: &Job, phase: Phase) -> Result<PhaseReport> {
        let hash = &job.object.hash;
        let steps = job.recipe.steps(phase, &job.probe);
        let ctx = self.context(job);
        let start = Instant::now();

        tracing::info!(
            hash = %hash,
            recipe = %job.recipe,
            "{} phase started ({} steps)",
            phase,
            steps.len()
        );

        if phase == Phase::Sync {
            std::fs::create_dir_all(self.layout.root()).with_context(|| {
                format!("Failed to create storage root: {:?}", self.layout.root())
            })?;
        }

        for (i, step) in steps.iter().enumerate() {
            self.run_step(job, &ctx, step).with_context(|| {
                format!(
                    "{} phase of {} ({}) failed at step {} ({})",
                    phase,
                    hash,
                    job.recipe,
                    i + 1,
                    step_label(step)
                )
            })?;
        }

        let elapsed = start.elapsed();
        tracing::info!(
            hash = %hash,
            recipe = %job.recipe,
            "{} phase completed in {:.2?}",
            phase,
            elapsed
        );

        Ok(PhaseReport {
            phase,
            steps: steps.len(),
            elapsed,
        })
    }

    fn run_step(&self, job: &Job, ctx: &TemplateContext, step: &Step) -> Result<()> {
        let hash = &job.object.hash;
        match step {
            Step::CopyOriginal => {
                let target = self.layout.artifact(hash, &job.extension);
                copy_original(&job.object.input_path, &target)?;
            }
            Step::Run(invocation) => {
                self.invoker.run(invocation, ctx)?;
            }
            Step::ClassifyStreams => {
                StreamClassifier::new(&self.invoker, &self.layout).classify(hash, ctx, &job.probe)?;
            }
        }
        Ok(())
    }
}

fn copy_original(input: &Path, target: &Path) -> Result<()> {
    // Copying a file onto itself truncates it.
    if target.exists() && same_file(input, target)? {
        tracing::debug!("original already stored at {:?}", target);
        return Ok(());
    }
    std::fs::copy(input, target)
        .with_context(|| format!("Failed to copy {:?} to {:?}", input, target))?;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> Result<bool> {
    let a = a
        .canonicalize()
        .with_context(|| format!("Input file does not exist: {:?}", a))?;
    Ok(b.canonicalize()? == a)
}

fn step_label(step: &Step) -> String {
    match step {
        Step::CopyOriginal => "copy".to_string(),
        Step::Run(invocation) => invocation.tool().to_string(),
        Step::ClassifyStreams => "classify streams".to_string(),
    }
}
