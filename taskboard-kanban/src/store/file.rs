//! File-backed store: one JSON document per record.
//!
//! ```text
//! data_dir/
//! ├── tasks/
//! │   └── {id}.json          # Task state
//! ├── users/
//! │   └── {uid}.json         # User state (uid percent-encoded)
//! └── activity/
//!     └── current.jsonl      # Audit log, one entry per line, oldest first
//! ```
//!
//! Every write goes to a uniquely named temp file in the same directory and
//! is renamed into place, so readers never observe a half-written record.

use super::TaskStore;
use crate::error::{BoardError, Result};
use crate::types::{ColumnId, Task, TaskId, Uid, User};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use taskboard_operations::LogEntry;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub struct FileTaskStore {
    /// Path to the data directory
    root: PathBuf,
    /// Serializes user registration so two first-sightings cannot both insert
    users_lock: Mutex<()>,
    /// Serializes appends to the activity log
    activity_lock: Mutex<()>,
}

impl FileTaskStore {
    /// Create a store rooted at `root`; directories are created lazily
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            users_lock: Mutex::new(()),
            activity_lock: Mutex::new(()),
        }
    }

    /// Create a store and make sure its directory layout exists
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(root);
        store.ensure_directories().await?;
        tracing::info!(root = %store.root.display(), "opened file task store");
        Ok(store)
    }

    // =========================================================================
    // Path helpers
    // =========================================================================

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.root.join("tasks")
    }

    pub fn task_path(&self, id: &TaskId) -> PathBuf {
        self.tasks_dir().join(format!("{}.json", id))
    }

    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    pub fn user_path(&self, uid: &Uid) -> PathBuf {
        self.users_dir()
            .join(format!("{}.json", urlencoding::encode(uid.as_str())))
    }

    pub fn activity_dir(&self) -> PathBuf {
        self.root.join("activity")
    }

    pub fn activity_path(&self) -> PathBuf {
        self.activity_dir().join("current.jsonl")
    }

    // =========================================================================
    // Directory initialization
    // =========================================================================

    /// Check if all required directories exist
    pub fn directories_exist(&self) -> bool {
        self.root.exists()
            && self.tasks_dir().exists()
            && self.users_dir().exists()
            && self.activity_dir().exists()
    }

    /// Create the directory structure; idempotent
    pub async fn ensure_directories(&self) -> Result<()> {
        if !self.directories_exist() {
            fs::create_dir_all(self.tasks_dir()).await?;
            fs::create_dir_all(self.users_dir()).await?;
            fs::create_dir_all(self.activity_dir()).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Record I/O
    // =========================================================================

    async fn read_task_file(&self, id: &TaskId) -> Result<Option<Task>> {
        read_json(&self.task_path(id)).await
    }

    async fn write_task_file(&self, task: &Task) -> Result<()> {
        let content = serde_json::to_string_pretty(task)?;
        atomic_write(&self.task_path(&task.id), content.as_bytes()).await
    }

    /// List all task IDs by reading the tasks directory
    pub async fn list_task_ids(&self) -> Result<Vec<TaskId>> {
        let tasks_dir = self.tasks_dir();
        if !tasks_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&tasks_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(TaskId::from_string(stem));
                }
            }
        }

        Ok(ids)
    }

    /// Read every task on disk
    pub async fn read_all_tasks(&self) -> Result<Vec<Task>> {
        let ids = self.list_task_ids().await?;
        let mut tasks = Vec::with_capacity(ids.len());

        for id in ids {
            // A concurrent delete may remove the file between listing and reading
            if let Some(task) = self.read_task_file(&id).await? {
                tasks.push(task);
            }
        }

        Ok(tasks)
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn insert_task(&self, task: &Task) -> Result<()> {
        if self.task_path(&task.id).exists() {
            return Err(BoardError::store(format!("task {} already exists", task.id)));
        }
        self.write_task_file(task).await
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        self.read_task_file(id).await
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        if !self.task_path(&task.id).exists() {
            return Err(BoardError::TaskNotFound {
                id: task.id.to_string(),
            });
        }
        self.write_task_file(task).await
    }

    async fn set_position(&self, id: &TaskId, status: &ColumnId, rank: u32) -> Result<()> {
        let mut task = self
            .read_task_file(id)
            .await?
            .ok_or_else(|| BoardError::TaskNotFound { id: id.to_string() })?;
        task.status = status.clone();
        task.rank = rank;
        self.write_task_file(&task).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<bool> {
        match fs::remove_file(self.task_path(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn tasks_for_owner(&self, uid: &Uid) -> Result<Vec<Task>> {
        let mut tasks = self.read_all_tasks().await?;
        tasks.retain(|t| &t.uid == uid);
        Ok(tasks)
    }

    async fn insert_user_if_absent(&self, user: &User) -> Result<User> {
        let _guard = self.users_lock.lock().await;
        let path = self.user_path(&user.uid);
        if let Some(existing) = read_json::<User>(&path).await? {
            return Ok(existing);
        }
        let content = serde_json::to_string_pretty(user)?;
        atomic_write(&path, content.as_bytes()).await?;
        Ok(user.clone())
    }

    async fn get_user(&self, uid: &Uid) -> Result<Option<User>> {
        read_json(&self.user_path(uid)).await
    }

    async fn append_activity(&self, entry: &LogEntry) -> Result<()> {
        let _guard = self.activity_lock.lock().await;
        let path = self.activity_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        let path = self.activity_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        let mut entries: Vec<LogEntry> = content
            .lines()
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        // Reverse to get newest first
        entries.reverse();

        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }
}

/// Read a JSON document, treating a missing file as `None`
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Atomic write via temp file and rename
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    // Unique temp name so concurrent writers of one record never share it
    let temp_path = path.with_extension(format!("{}.tmp", ulid::Ulid::new()));
    fs::write(&temp_path, content).await?;

    // Rename (atomic on same filesystem)
    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    Ok(())
}
