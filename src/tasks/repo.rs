use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::{ApiError, ApiResult};

/// Task workflow state. Transitions are unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(ApiError::Validation(
                "Status must be one of pending, in-progress, completed".into(),
            )),
        }
    }
}

/// Task record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
}

impl Task {
    /// All tasks owned by `user_id`, newest first.
    pub async fn list_by_owner(db: &PgPool, user_id: i64) -> ApiResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, user_id, created_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// A row that exists under another owner is reported the same as a
    /// row that does not exist.
    pub async fn get_owned(db: &PgPool, id: i64, user_id: i64) -> ApiResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, user_id, created_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    /// Insert with server-assigned id, timestamp and the column default
    /// of 'pending' for status.
    pub async fn create(
        db: &PgPool,
        user_id: i64,
        title: &str,
        description: &str,
    ) -> ApiResult<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, status, user_id, created_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(task)
    }

    /// Ownership check and mutation observe the same owner-scoped row.
    /// Concurrent updates to the same task are last-writer-wins.
    pub async fn update_owned(
        db: &PgPool,
        id: i64,
        user_id: i64,
        title: &str,
        description: &str,
        status: TaskStatus,
    ) -> ApiResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $1, description = $2, status = $3
            WHERE id = $4 AND user_id = $5
            RETURNING id, title, description, status, user_id, created_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    /// Returns false when no row matched both id and owner.
    pub async fn delete_owned(db: &PgPool, id: i64, user_id: i64) -> ApiResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_every_wire_value() {
        assert_eq!("pending".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        assert_eq!(
            "in-progress".parse::<TaskStatus>().unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(
            "completed".parse::<TaskStatus>().unwrap(),
            TaskStatus::Completed
        );
    }

    #[test]
    fn status_rejects_unknown_values() {
        for bad in ["done", "Pending", "in_progress", ""] {
            let err = bad.parse::<TaskStatus>().unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn status_display_matches_wire_format() {
        assert_eq!(TaskStatus::InProgress.to_string(), "in-progress");
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_serializes_in_kebab_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, r#""in-progress""#);
    }

    #[test]
    fn task_serializes_with_snake_case_columns() {
        let task = Task {
            id: 1,
            title: "Buy milk".into(),
            description: String::new(),
            status: TaskStatus::Pending,
            user_id: 42,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains(r#""user_id":42"#));
        assert!(json.contains(r#""status":"pending""#));
        assert!(json.contains("created_at"));
    }
}
