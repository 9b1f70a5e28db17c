//! The task store: in-memory collection, id allocation, and persistence.
//!
//! `TaskManager` owns every task and the single backing file they live in.
//! Each successful mutation rewrites the whole file before returning. Writes
//! go to a temporary sibling that is renamed over the backing file, so an
//! interrupted save never leaves a half-written store behind.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, error, warn};

use crate::error::{RecordError, StoreError};
use crate::fields::{due_from_now, normalise_priority};
use crate::record;
use crate::task::Task;

/// A line that was present in the backing file but could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the backing file.
    pub line_number: usize,
    pub reason: RecordError,
}

/// Summary of the most recent load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedLine>,
}

fn system_clock() -> i64 {
    Utc::now().timestamp()
}

/// Owns the task collection and keeps the backing file in sync with it.
#[derive(Debug)]
pub struct TaskManager {
    tasks: Vec<Task>,
    next_id: u64,
    path: PathBuf,
    clock: fn() -> i64,
    load_report: LoadReport,
    load_failed: bool,
}

impl TaskManager {
    /// Bind to `path` and load whatever it holds.
    ///
    /// A load failure is logged and leaves the manager empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, system_clock)
    }

    /// Like [`TaskManager::open`] but reading "now" from `clock` (epoch seconds).
    pub fn with_clock(path: impl Into<PathBuf>, clock: fn() -> i64) -> Self {
        let mut manager = TaskManager {
            tasks: Vec::new(),
            next_id: 1,
            path: path.into(),
            clock,
            load_report: LoadReport::default(),
            load_failed: false,
        };
        if let Err(e) = manager.load() {
            warn!("{e}; starting with an empty task list, saves are disabled");
        }
        manager
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Id the next added task will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Result of the last successful [`TaskManager::load`].
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// All tasks in insertion order.
    pub fn list_all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id() == id)
    }

    /// Create a task due `hours_until_due` hours from now and return its id.
    ///
    /// The task stays in memory even when the save fails; the error only
    /// reports that this round was not persisted.
    pub fn add_task(
        &mut self,
        description: &str,
        category: &str,
        priority: i64,
        hours_until_due: i64,
    ) -> Result<u64, StoreError> {
        let id = self.next_id;
        let next = id.checked_add(1).ok_or(StoreError::IdsExhausted)?;
        let due = due_from_now((self.clock)(), hours_until_due);
        self.tasks.push(Task::new(
            id,
            description.to_string(),
            category.to_string(),
            normalise_priority(priority),
            due,
        ));
        self.next_id = next;
        debug!(id, "added task");
        self.save()?;
        Ok(id)
    }

    /// Replace every editable field of task `id`.
    ///
    /// The due date is recomputed from now. Returns `Ok(false)` without
    /// touching anything when no task has that id.
    pub fn edit_task(
        &mut self,
        id: u64,
        description: &str,
        category: &str,
        priority: i64,
        hours_until_due: i64,
    ) -> Result<bool, StoreError> {
        let due = due_from_now((self.clock)(), hours_until_due);
        self.update(id, |task| {
            task.set_description(description.to_string());
            task.set_category(category.to_string());
            task.set_priority(normalise_priority(priority));
            task.set_due_date(due);
        })
    }

    pub fn edit_description(&mut self, id: u64, description: &str) -> Result<bool, StoreError> {
        self.update(id, |task| task.set_description(description.to_string()))
    }

    pub fn edit_category(&mut self, id: u64, category: &str) -> Result<bool, StoreError> {
        self.update(id, |task| task.set_category(category.to_string()))
    }

    pub fn edit_priority(&mut self, id: u64, priority: i64) -> Result<bool, StoreError> {
        self.update(id, |task| task.set_priority(normalise_priority(priority)))
    }

    /// Move the due date to `hours_from_now` hours after the current time.
    pub fn edit_due_date(&mut self, id: u64, hours_from_now: i64) -> Result<bool, StoreError> {
        let due = due_from_now((self.clock)(), hours_from_now);
        self.update(id, |task| task.set_due_date(due))
    }

    pub fn mark_complete(&mut self, id: u64) -> Result<bool, StoreError> {
        self.update(id, |task| task.set_completed(true))
    }

    /// Remove task `id`. Its id is never handed out again by this manager.
    pub fn delete_task(&mut self, id: u64) -> Result<bool, StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id() != id);
        if self.tasks.len() == before {
            debug!(id, "delete skipped, no such task");
            return Ok(false);
        }
        debug!(id, "deleted task");
        self.save()?;
        Ok(true)
    }

    fn update<F>(&mut self, id: u64, apply: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut Task),
    {
        let Some(task) = self.get_mut(id) else {
            debug!(id, "update skipped, no such task");
            return Ok(false);
        };
        apply(task);
        debug!(id, "updated task");
        self.save()?;
        Ok(true)
    }

    /// Rewrite the backing file with every task, one line each.
    ///
    /// Lines are written to `<file>.tmp` and renamed into place. On failure
    /// the backing file and the in-memory tasks are left as they were. After
    /// a failed load the file is never overwritten.
    pub fn save(&self) -> Result<(), StoreError> {
        if self.load_failed {
            let err = StoreError::LoadFailed {
                path: self.path.clone(),
            };
            error!("{err}");
            return Err(err);
        }
        let tmp = tmp_path(&self.path);
        let result = self.write_to(&tmp).and_then(|()| {
            fs::rename(&tmp, &self.path).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
        });
        match &result {
            Ok(()) => debug!(path = %self.path.display(), count = self.tasks.len(), "saved tasks"),
            Err(e) => {
                error!("{e}");
                let _ = fs::remove_file(&tmp);
            }
        }
        result
    }

    fn write_to(&self, tmp: &Path) -> Result<(), StoreError> {
        let file = File::create(tmp).map_err(|source| StoreError::Open {
            path: tmp.to_path_buf(),
            source,
        })?;
        let write_err = |source| StoreError::Write {
            path: tmp.to_path_buf(),
            source,
        };
        let mut out = BufWriter::new(file);
        for task in &self.tasks {
            writeln!(out, "{}", record::encode(task)).map_err(write_err)?;
        }
        let file = out.into_inner().map_err(|e| write_err(e.into_error()))?;
        file.sync_all().map_err(write_err)?;
        Ok(())
    }

    /// Replace the in-memory tasks with the contents of the backing file.
    ///
    /// A missing file loads as empty. Blank lines are ignored; malformed
    /// lines (including invalid UTF-8) are skipped and listed in the
    /// returned report. The allocator moves past every loaded id and never
    /// moves backwards. On error nothing in memory changes and saving is
    /// disabled until a load succeeds.
    pub fn load(&mut self) -> Result<LoadReport, StoreError> {
        let result = self.read_file();
        self.load_failed = result.is_err();
        result
    }

    fn read_file(&mut self) -> Result<LoadReport, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no task file yet");
                self.tasks.clear();
                self.load_report = LoadReport::default();
                return Ok(LoadReport::default());
            }
            Err(source) => {
                return Err(StoreError::Open {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut tasks = Vec::new();
        let mut report = LoadReport::default();
        for (idx, bytes) in BufReader::new(file).split(b'\n').enumerate() {
            let mut bytes = bytes.map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            let decoded = String::from_utf8(bytes)
                .map_err(|_| RecordError::InvalidUtf8)
                .and_then(|line| {
                    if line.trim().is_empty() {
                        Ok(None)
                    } else {
                        record::decode(&line).map(Some)
                    }
                });
            match decoded {
                Ok(None) => {}
                Ok(Some(task)) => tasks.push(task),
                Err(reason) => {
                    warn!(line = idx + 1, "skipping malformed task line: {reason}");
                    report.skipped.push(SkippedLine {
                        line_number: idx + 1,
                        reason,
                    });
                }
            }
        }

        report.loaded = tasks.len();
        let after_max = tasks.iter().map(Task::id).max().map_or(1, |m| m.saturating_add(1));
        self.next_id = self.next_id.max(after_max);
        self.tasks = tasks;
        self.load_report = report.clone();
        debug!(
            path = %self.path.display(),
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "loaded tasks"
        );
        Ok(report)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
