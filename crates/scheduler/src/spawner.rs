//! Task creation, non-blocking reaping and forced termination.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use oss_core::{OssError, Result, WorkerLifetime, REGION_ENV};
use tracing::{debug, warn};

use crate::pcb::TaskId;

/// How the scheduler launches and tracks workers.
///
/// None of these calls may block waiting on a worker: `spawn` is
/// fire-and-forget and `try_reap` only reports exits already observable.
pub trait TaskSpawner {
    /// Start a worker that should run for `lifetime` of virtual time.
    fn spawn(&mut self, lifetime: WorkerLifetime) -> Result<TaskId>;

    /// Tasks that have terminated since the last call.
    fn try_reap(&mut self) -> Vec<TaskId>;

    /// Forcibly end a task. Unknown or already-reaped tasks are not an error.
    fn terminate(&mut self, task: TaskId) -> Result<()>;
}

/// Launches the `worker` executable as a child process per task.
pub struct ProcessSpawner {
    program: PathBuf,
    region: PathBuf,
    quiet: bool,
    children: Vec<Child>,
}

impl ProcessSpawner {
    /// `region` is exported to each child through [`REGION_ENV`].
    pub fn new(program: impl Into<PathBuf>, region: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            region: region.as_ref().to_path_buf(),
            quiet: false,
            children: Vec::new(),
        }
    }

    /// Discard worker stdout instead of inheriting it.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn live_children(&self) -> usize {
        self.children.len()
    }
}

impl TaskSpawner for ProcessSpawner {
    fn spawn(&mut self, lifetime: WorkerLifetime) -> Result<TaskId> {
        let stdout = if self.quiet {
            Stdio::null()
        } else {
            Stdio::inherit()
        };
        let child = Command::new(&self.program)
            .args(lifetime.to_args())
            .env(REGION_ENV, &self.region)
            .stdin(Stdio::null())
            .stdout(stdout)
            .spawn()
            .map_err(OssError::Spawn)?;

        let task = TaskId(child.id());
        debug!(task = %task, program = %self.program.display(), "spawned worker process");
        self.children.push(child);
        Ok(task)
    }

    fn try_reap(&mut self) -> Vec<TaskId> {
        let mut reaped = Vec::new();
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(task = child.id(), %status, "worker exited");
                reaped.push(TaskId(child.id()));
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(task = child.id(), error = %e, "lost track of worker, treating as exited");
                reaped.push(TaskId(child.id()));
                false
            }
        });
        reaped
    }

    fn terminate(&mut self, task: TaskId) -> Result<()> {
        let Some(pos) = self.children.iter().position(|c| c.id() == task.0) else {
            return Ok(());
        };
        let mut child = self.children.swap_remove(pos);
        child
            .kill()
            .map_err(|source| OssError::Terminate { task: task.0, source })?;
        // Collect the exit so the process does not linger as a zombie.
        child
            .wait()
            .map_err(|source| OssError::Terminate { task: task.0, source })?;
        debug!(task = %task, "terminated worker process");
        Ok(())
    }
}
