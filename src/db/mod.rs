//! Plan persistence. Plans are stored as JSON blobs, either one file per
//! student or one SQLite row per student.

pub mod repository;

use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::AppError;
use crate::models::Plan;

#[async_trait]
pub trait PlanStore: Send + Sync {
    /// The student's saved plan, or a fresh empty plan if none was saved.
    async fn load(&self, student: &str) -> Result<Plan, AppError>;
    async fn save(&self, student: &str, plan: &Plan) -> Result<(), AppError>;
    async fn list(&self) -> Result<Vec<String>, AppError>;
    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, student: &str) -> Result<bool, AppError>;
}

/// Student names become file names made of `[A-Za-z0-9_-]` only.
pub fn sanitize_student_name(student: &str) -> String {
    student
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

pub struct FilePlanStore {
    dir: PathBuf,
}

impl FilePlanStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, student: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_student_name(student)))
    }
}

#[async_trait]
impl PlanStore for FilePlanStore {
    async fn load(&self, student: &str) -> Result<Plan, AppError> {
        match tokio::fs::read_to_string(self.path_for(student)).await {
            Ok(raw) => Plan::from_json(&raw),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Plan::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, student: &str, plan: &Plan) -> Result<(), AppError> {
        tokio::fs::write(self.path_for(student), plan.to_json()?).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, AppError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete(&self, student: &str) -> Result<bool, AppError> {
        match tokio::fs::remove_file(self.path_for(student)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct SqlitePlanStore {
    db: SqlitePool,
}

impl SqlitePlanStore {
    /// Opens (creating if needed) the database at `url` and applies migrations.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // An in-memory database only lives as long as its single connection.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Self::new(pool).await
    }

    pub async fn new(db: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations").run(&db).await?;
        Ok(Self { db })
    }
}

#[async_trait]
impl PlanStore for SqlitePlanStore {
    async fn load(&self, student: &str) -> Result<Plan, AppError> {
        Ok(repository::fetch_plan(&self.db, student)
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, student: &str, plan: &Plan) -> Result<(), AppError> {
        repository::upsert_plan(&self.db, student, plan).await
    }

    async fn list(&self) -> Result<Vec<String>, AppError> {
        repository::fetch_students(&self.db).await
    }

    async fn delete(&self, student: &str) -> Result<bool, AppError> {
        repository::delete_plan(&self.db, student).await
    }
}
