use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::error::AppError;
use crate::models::Plan;

pub async fn fetch_plan(db: &SqlitePool, student: &str) -> Result<Option<Plan>, AppError> {
    let row = sqlx::query("SELECT body FROM plans WHERE student = ?1")
        .bind(student)
        .fetch_optional(db)
        .await?;

    match row {
        Some(row) => {
            let body: String = row.try_get("body")?;
            Ok(Some(Plan::from_json(&body)?))
        }
        None => Ok(None),
    }
}

pub async fn upsert_plan(db: &SqlitePool, student: &str, plan: &Plan) -> Result<(), AppError> {
    let body = serde_json::to_string(plan)?;
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO plans (student, body, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(student) DO UPDATE SET
            body = excluded.body,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(student)
    .bind(body)
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn fetch_students(db: &SqlitePool) -> Result<Vec<String>, AppError> {
    let rows = sqlx::query("SELECT student FROM plans ORDER BY student")
        .fetch_all(db)
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String, _>("student").map_err(AppError::from))
        .collect()
}

pub async fn delete_plan(db: &SqlitePool, student: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM plans WHERE student = ?1")
        .bind(student)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
