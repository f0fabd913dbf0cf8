//! Running external tools from command templates.
//!
//! An [`Invocation`] is a tool plus a list of templated arguments and an exit
//! status policy. The [`ProcessInvoker`] resolves the arguments against a
//! [`TemplateContext`], hands the final argv to a [`CommandRunner`], and
//! applies the policy to the result. Swapping the runner is how tests observe
//! command tables without spawning processes.

use crate::template::TemplateContext;
use crate::tools::{Tool, ToolPaths};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

/// Raw result of a finished process.
#[derive(Debug, Clone, Default)]
pub struct RawOutput {
    /// Exit code, or `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl RawOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes a fully resolved command line, blocking until it exits.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`.
    ///
    /// Only failures to start or wait on the process are errors here; a
    /// non-zero exit is reported through [`RawOutput::exit_code`].
    fn execute(&self, program: &Path, args: &[String]) -> std::io::Result<RawOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn execute(&self, program: &Path, args: &[String]) -> std::io::Result<RawOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(RawOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// One templated external-process execution.
///
/// # Example
///
/// ```
/// use mediacook_av::{Invocation, TemplateContext, Tool};
/// use std::path::Path;
///
/// let poster = Invocation::new(Tool::Ffmpeg)
///     .args(["-y", "-i", "{input}", "-vframes", "1", "-map", "0:v:0", "{stem}.png"]);
///
/// let ctx = TemplateContext::new().with_bindings(Path::new("/in"), Path::new("/out/h"), "mkv");
/// assert_eq!(poster.render(&ctx).last().map(String::as_str), Some("/out/h.png"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    tool: Tool,
    args: Vec<String>,
    tolerates_nonzero_exit: bool,
}

impl Invocation {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            args: Vec::new(),
            tolerates_nonzero_exit: false,
        }
    }

    /// Append a single templated argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple templated arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Treat a non-zero exit as success.
    ///
    /// Needed for `ffmpeg -dump_attachment`, which exits non-zero because it
    /// has no conventional output file even when the dump succeeded.
    pub fn tolerate_nonzero_exit(mut self) -> Self {
        self.tolerates_nonzero_exit = true;
        self
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// The unresolved argument templates.
    #[must_use]
    pub fn arg_templates(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn tolerates_nonzero_exit(&self) -> bool {
        self.tolerates_nonzero_exit
    }

    /// Resolve the argument templates against a context.
    pub fn render(&self, ctx: &TemplateContext) -> Vec<String> {
        ctx.substitute_all(&self.args)
    }
}

/// Result of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationOutput {
    /// Captured stdout, split into lines.
    pub stdout_lines: Vec<String>,
    /// Process exit code (non-zero only for tolerant invocations).
    pub exit_code: Option<i32>,
}

/// Runs [`Invocation`]s through a [`CommandRunner`].
#[derive(Clone)]
pub struct ProcessInvoker {
    runner: Arc<dyn CommandRunner>,
    tools: ToolPaths,
}

impl std::fmt::Debug for ProcessInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessInvoker")
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

impl Default for ProcessInvoker {
    fn default() -> Self {
        Self::system(ToolPaths::default())
    }
}

impl ProcessInvoker {
    pub fn new(runner: Arc<dyn CommandRunner>, tools: ToolPaths) -> Self {
        Self { runner, tools }
    }

    /// An invoker that spawns real processes.
    pub fn system(tools: ToolPaths) -> Self {
        Self::new(Arc::new(SystemRunner), tools)
    }

    /// Resolved executable paths.
    #[must_use]
    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Run an invocation, blocking until the process exits.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if the executable cannot be spawned.
    /// - [`Error::ProcessFailed`] if the process exits non-zero and the
    ///   invocation does not tolerate it.
    pub fn run(&self, invocation: &Invocation, ctx: &TemplateContext) -> Result<InvocationOutput> {
        let tool = invocation.tool();
        let program: PathBuf = self.tools.program(tool);
        let args = invocation.render(ctx);

        tracing::debug!("exec: {} {}", program.display(), args.join(" "));

        let raw = self.runner.execute(&program, &args).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found(tool.name())
            } else {
                Error::Io(e)
            }
        })?;

        if !raw.success() {
            if !invocation.tolerates_nonzero_exit() {
                return Err(Error::process_failed(tool.name(), raw.exit_code, &raw.stderr));
            }
            tracing::warn!(
                tool = tool.name(),
                exit_code = ?raw.exit_code,
                "tolerated non-zero exit"
            );
        }

        Ok(InvocationOutput {
            stdout_lines: raw.stdout.lines().map(str::to_string).collect(),
            exit_code: raw.exit_code,
        })
    }
}
