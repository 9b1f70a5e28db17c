//! Command implementations for the CLI interface.
//!
//! Each handler turns already-parsed arguments into calls on the
//! [`TaskManager`] and prints the outcome. Storage failures are reported on
//! stderr and end the process with a non-zero status.

use std::fs;
use std::path::Path;

use chrono::Local;
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::error::StoreError;
use crate::fields::{is_out_of_range_priority, ListFormat};
use crate::manager::TaskManager;
use crate::task::Task;

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// What needs doing.
        description: String,
        /// Free-form category label.
        #[arg(long, short, default_value = "")]
        category: String,
        /// Priority 1-5; anything else means no priority.
        #[arg(long, short, default_value_t = 0, allow_negative_numbers = true)]
        priority: i64,
        /// Hours from now until the task is due.
        #[arg(long, default_value_t = 24, allow_negative_numbers = true)]
        due_in: i64,
    },

    /// Edit a task. With every option given, all fields are replaced at once.
    Edit {
        /// Task ID to edit.
        id: u64,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        priority: Option<i64>,
        /// New number of hours from now until due.
        #[arg(long, allow_negative_numbers = true)]
        due_in: Option<i64>,
    },

    /// Delete a task by ID.
    Delete {
        id: u64,
    },

    /// Mark a task complete.
    Complete {
        id: u64,
    },

    /// List tasks in the order they were added.
    List {
        /// Only show tasks that are not complete.
        #[arg(long)]
        pending: bool,
        /// Output format.
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },

    /// Show a single task.
    View {
        id: u64,
    },

    /// Copy the task file into a timestamped backup.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn exit_on_store_error<T>(result: Result<T, StoreError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Failed to save tasks: {e}");
            std::process::exit(1);
        }
    }
}

fn report_missing(found: bool, id: u64) -> bool {
    if !found {
        println!("No task with ID {id}; nothing changed.");
    }
    found
}

const NO_PRIORITY_NOTICE: &str = "Priority set to 'no priority'.";

fn warn_priority(priority: i64) {
    if is_out_of_range_priority(priority) {
        println!("{NO_PRIORITY_NOTICE}");
    }
}

/// Lines printed after an edit; the priority notice only applies to a task
/// that was actually changed.
fn edit_messages(found: bool, id: u64, priority: Option<i64>) -> Vec<String> {
    if !found {
        return vec![format!("No task with ID {id}; nothing changed.")];
    }
    let mut messages = Vec::new();
    if priority.is_some_and(is_out_of_range_priority) {
        messages.push(NO_PRIORITY_NOTICE.to_string());
    }
    messages.push(format!("Updated task {id}"));
    messages
}

/// Add a new task.
pub fn cmd_add(
    manager: &mut TaskManager,
    description: String,
    category: String,
    priority: i64,
    due_in: i64,
) {
    warn_priority(priority);
    let id = exit_on_store_error(manager.add_task(&description, &category, priority, due_in));
    println!("Added task {id}");
}

/// Edit one or more fields of a task.
pub fn cmd_edit(
    manager: &mut TaskManager,
    id: u64,
    desc: Option<String>,
    category: Option<String>,
    priority: Option<i64>,
    due_in: Option<i64>,
) {
    let found = match (desc, category, priority, due_in) {
        (None, None, None, None) => {
            eprintln!(
                "Nothing to edit: pass at least one of --desc, --category, --priority, --due-in"
            );
            std::process::exit(2);
        }
        (Some(d), Some(c), Some(p), Some(h)) => {
            exit_on_store_error(manager.edit_task(id, &d, &c, p, h))
        }
        (desc, category, priority, due_in) => {
            // Apply field by field; stop at the first miss since the id is the same.
            let mut found = true;
            if let Some(d) = desc {
                found = exit_on_store_error(manager.edit_description(id, &d));
            }
            if found {
                if let Some(c) = category {
                    found = exit_on_store_error(manager.edit_category(id, &c));
                }
            }
            if found {
                if let Some(p) = priority {
                    found = exit_on_store_error(manager.edit_priority(id, p));
                }
            }
            if found {
                if let Some(h) = due_in {
                    found = exit_on_store_error(manager.edit_due_date(id, h));
                }
            }
            found
        }
    };

    for line in edit_messages(found, id, priority) {
        println!("{line}");
    }
}

/// Delete a task.
pub fn cmd_delete(manager: &mut TaskManager, id: u64) {
    if report_missing(exit_on_store_error(manager.delete_task(id)), id) {
        println!("Deleted task {id}");
    }
}

/// Mark a task complete.
pub fn cmd_complete(manager: &mut TaskManager, id: u64) {
    if report_missing(exit_on_store_error(manager.mark_complete(id)), id) {
        println!("Marked task {id} complete");
    }
}

/// List tasks, optionally hiding completed ones.
pub fn cmd_list(manager: &TaskManager, pending: bool, format: ListFormat) {
    let tasks: Vec<&Task> = manager
        .list_all()
        .iter()
        .filter(|t| !pending || !t.is_completed())
        .collect();

    match format {
        ListFormat::Json => match serde_json::to_string_pretty(&tasks) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to encode tasks: {e}");
                std::process::exit(1);
            }
        },
        ListFormat::Table => {
            if tasks.is_empty() {
                println!("No tasks to display.");
            }
            for task in tasks {
                println!("{task}");
            }
        }
    }

    let skipped = &manager.load_report().skipped;
    if !skipped.is_empty() {
        eprintln!(
            "Warning: {} malformed line(s) in {} were skipped.",
            skipped.len(),
            manager.path().display()
        );
    }
}

/// Show a single task.
pub fn cmd_view(manager: &TaskManager, id: u64) {
    match manager.get(id) {
        Some(task) => println!("{task}"),
        None => println!("No task with ID {id}."),
    }
}

/// Create a timestamped copy of the task file in a sibling `backup/` directory.
pub fn create_backup(path: &Path) -> Result<String, std::io::Error> {
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Task file does not exist",
        ));
    }

    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let backup_dir = parent_dir.join("backup");
    fs::create_dir_all(&backup_dir)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("tasks.txt");
    let backup_path = backup_dir.join(format!("{timestamp}_{file_name}"));

    fs::copy(path, &backup_path)?;
    Ok(backup_path.to_string_lossy().to_string())
}

pub fn cmd_backup(path: &Path) {
    match create_backup(path) {
        Ok(backup_path) => println!("Backup created: {backup_path}"),
        Err(e) => {
            eprintln!("Failed to create backup: {e}");
            std::process::exit(1);
        }
    }
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
