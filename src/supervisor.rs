//! Thread supervision for sensor loops and buzzer jobs.
//!
//! Every background thread the controller starts is spawned through a
//! [`TaskGroup`], so shutdown can see all of them.  Cancellation is
//! cooperative: the [`StopSignal`] asks loops to finish, and
//! [`TaskGroup::join_all`] waits a bounded time per task.  A task still
//! running after its bound is abandoned (detached), never killed.
//!
//! ```text
//!  shell ── trigger() ──▶ StopSignal ◀── is_set() ── sensor loops
//!    │
//!    └── join_all(timeout) ──▶ TaskGroup ──▶ JoinReport { joined, abandoned }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::error::{Error, Result};

/// How often `join_all` re-checks a task that has not finished yet.
const JOIN_POLL: Duration = Duration::from_millis(10);

// ───────────────────────────────────────────────────────────────
// StopSignal
// ───────────────────────────────────────────────────────────────

/// Shared write-once shutdown flag.
///
/// One writer (the shell), many readers (every sensor loop).  Once set it
/// is never cleared.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ───────────────────────────────────────────────────────────────
// TaskGroup
// ───────────────────────────────────────────────────────────────

struct Task {
    name: String,
    handle: JoinHandle<()>,
}

/// Outcome of [`TaskGroup::join_all`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JoinReport {
    /// Tasks that exited within their bound.
    pub joined: Vec<String>,
    /// Tasks left running after their bound elapsed.
    pub abandoned: Vec<String>,
}

impl JoinReport {
    pub fn is_clean(&self) -> bool {
        self.abandoned.is_empty()
    }
}

/// A named set of supervised threads.
pub struct TaskGroup {
    label: &'static str,
    tasks: Mutex<Vec<Task>>,
}

impl TaskGroup {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawn `f` on a named thread owned by this group.
    ///
    /// A panic inside `f` ends only that thread; it is reported when the
    /// group is joined and is never restarted.
    pub fn spawn(&self, name: impl Into<String>, f: impl FnOnce() + Send + 'static) -> Result<()> {
        let name = name.into();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(f)
            .map_err(|e| Error::Spawn {
                task: name.clone(),
                reason: e.to_string(),
            })?;
        info!("{}: spawned '{}'", self.label, name);
        self.lock().push(Task { name, handle });
        Ok(())
    }

    /// True while the named task's thread has not exited.
    pub fn is_running(&self, name: &str) -> bool {
        self.lock()
            .iter()
            .any(|t| t.name == name && !t.handle.is_finished())
    }

    /// Number of tasks not yet joined or abandoned.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Join tasks that have already exited, keeping the rest.
    pub fn reap(&self) {
        let finished: Vec<Task> = {
            let mut tasks = self.lock();
            let (done, live): (Vec<Task>, Vec<Task>) =
                tasks.drain(..).partition(|t| t.handle.is_finished());
            *tasks = live;
            done
        };
        for task in finished {
            Self::finish(self.label, task);
        }
    }

    /// Wait up to `timeout` for each task in turn, abandoning stragglers.
    ///
    /// The group is empty afterwards.
    pub fn join_all(&self, timeout: Duration) -> JoinReport {
        let tasks: Vec<Task> = self.lock().drain(..).collect();
        let mut report = JoinReport::default();

        for task in tasks {
            let deadline = Instant::now() + timeout;
            while !task.handle.is_finished() && Instant::now() < deadline {
                thread::sleep(JOIN_POLL);
            }

            if task.handle.is_finished() {
                report.joined.push(task.name.clone());
                Self::finish(self.label, task);
            } else {
                warn!(
                    "{}: '{}' still running after {:?}, abandoning",
                    self.label, task.name, timeout
                );
                report.abandoned.push(task.name);
                // Dropping the handle detaches the thread.
            }
        }
        report
    }

    fn finish(label: &str, task: Task) {
        if task.handle.join().is_err() {
            error!("{}: '{}' panicked", label, task.name);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
