//! Shared helpers for integration tests.

#![allow(dead_code)]

use mediacook::recipe::{Job, Recipe};
use mediacook_av::{CommandRunner, ProcessInvoker, RawOutput, ToolPaths};
use mediacook_common::{ContentKey, MediaObject, ObjectHash};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Runner standing in for the external tools.
///
/// Every argv is recorded. When the last argument is a path whose extension
/// has a configured size, a file of that size is written there, which is
/// enough for the rate calculator. Commands mentioning `fail_on` exit 1.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<Vec<String>>>,
    output_sizes: HashMap<String, u64>,
    fail_on: Option<String>,
    delay: Duration,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_size(mut self, extension: &str, size: u64) -> Self {
        self.output_sizes.insert(extension.to_string(), size);
        self
    }

    pub fn failing_on(mut self, suffix: &str) -> Self {
        self.fail_on = Some(suffix.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Recorded command lines, program first.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    /// Recorded command lines joined with spaces.
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(|argv| argv.join(" ")).collect()
    }
}

impl CommandRunner for FakeRunner {
    fn execute(&self, program: &Path, args: &[String]) -> std::io::Result<RawOutput> {
        let mut argv = vec![program.display().to_string()];
        argv.extend(args.iter().cloned());
        self.calls.lock().push(argv);

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        if let Some(ref suffix) = self.fail_on {
            if args.iter().any(|a| a.ends_with(suffix.as_str())) {
                return Ok(RawOutput {
                    exit_code: Some(1),
                    stdout: String::new(),
                    stderr: format!("Conversion failed writing {}", suffix),
                });
            }
        }

        if let Some(last) = args.last() {
            let path = Path::new(last);
            let size = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(|e| self.output_sizes.get(e));
            if let Some(size) = size {
                write_sized(path, *size);
            }
        }

        Ok(RawOutput {
            exit_code: Some(0),
            ..Default::default()
        })
    }
}

pub fn invoker(runner: &Arc<FakeRunner>) -> ProcessInvoker {
    ProcessInvoker::new(runner.clone(), ToolPaths::new())
}

/// Create (or truncate) a sparse file of the given size.
pub fn write_sized(path: &Path, size: u64) {
    let file = std::fs::File::create(path).unwrap();
    file.set_len(size).unwrap();
}

pub fn hash(value: &str) -> ObjectHash {
    ObjectHash::parse(value).unwrap()
}

pub fn job(input: &Path, hash: &ObjectHash, key: &str, recipe: Recipe, extension: &str) -> Job {
    let object = MediaObject::new(hash.clone(), ContentKey::new(key), input);
    Job::new(object, recipe, extension)
}
