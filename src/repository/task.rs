use sqlx::{Row, SqlitePool};

use crate::error::{AppError, AppResult};
use crate::model::task::{CreateTask, Priority, Task, TaskFilter, UpdateTask};
use crate::util::time::unix_timestamp;

const ADD_TASK: &str = r#"
INSERT INTO tasks (owner_id, title, description, priority, status, created_at)
VALUES (?, ?, ?, ?, ?, ?)
RETURNING id
"#;

const GET_TASK: &str = r#"
SELECT id, owner_id, title, description, priority, status, created_at
FROM tasks
WHERE owner_id = ? AND id = ?
"#;

const UPDATE_TASK: &str = r#"
UPDATE tasks
SET title = ?,
    description = ?,
    priority = ?,
    status = ?
WHERE owner_id = ? AND id = ?
"#;

#[derive(Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner_id: i64, req: &CreateTask) -> AppResult<Task> {
        let created_at = unix_timestamp();

        let task_id: i64 = sqlx::query_scalar(ADD_TASK)
            .bind(owner_id)
            .bind(&req.title)
            .bind(&req.description)
            .bind(req.priority.as_str())
            .bind(&req.status)
            .bind(created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(Task {
            id: task_id,
            owner_id,
            title: req.title.clone(),
            description: req.description.clone(),
            priority: req.priority,
            status: req.status.clone(),
            created_at,
        })
    }

    /// 查询永远带 owner_id，别人的任务等同于不存在
    pub async fn find_by_id(&self, owner_id: i64, id: i64) -> AppResult<Task> {
        let row = sqlx::query(GET_TASK)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        match row {
            Some(row) => Ok(row_to_task(&row)),
            None => Err(AppError::TaskNotFound { id }),
        }
    }

    pub async fn list(&self, owner_id: i64, filter: &TaskFilter) -> AppResult<Vec<Task>> {
        let mut sql = String::from(
            "SELECT id, owner_id, title, description, priority, status, created_at \
             FROM tasks WHERE owner_id = ?",
        );
        if filter.priority.is_some() {
            sql.push_str(" AND priority = ?");
        }
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY id ASC");

        let mut query = sqlx::query(&sql).bind(owner_id);
        if let Some(priority) = &filter.priority {
            query = query.bind(priority.as_str());
        }
        if let Some(status) = &filter.status {
            query = query.bind(status.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(rows.iter().map(row_to_task).collect())
    }

    pub async fn update(&self, owner_id: i64, req: &UpdateTask) -> AppResult<Task> {
        // 先读出当前行，缺失的字段保持原值
        let mut task = self.find_by_id(owner_id, req.id).await?;

        if let Some(title) = &req.title {
            task.title = title.clone();
        }
        if req.description.is_some() {
            task.description = req.description.clone();
        }
        if let Some(priority) = req.priority {
            task.priority = priority;
        }
        if let Some(status) = &req.status {
            task.status = status.clone();
        }

        sqlx::query(UPDATE_TASK)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.priority.as_str())
            .bind(&task.status)
            .bind(owner_id)
            .bind(task.id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(task)
    }

    pub async fn delete(&self, owner_id: i64, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE owner_id = ? AND id = ?")
            .bind(owner_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::TaskNotFound { id });
        }

        Ok(())
    }
}

fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> Task {
    let priority: String = row.get("priority");

    Task {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        description: row.try_get("description").ok(),
        // 库里出现未知优先级时按 low 处理，和写入路径一致
        priority: Priority::from_str(&priority),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::database::create_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn repo() -> (TaskRepository, SqlitePool) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        (TaskRepository::new(pool.clone()), pool)
    }

    #[tokio::test]
    async fn garbled_priority_in_row_decodes_as_low() {
        let (repo, pool) = repo().await;

        // 绕过写入路径直接塞一个未知优先级
        sqlx::query(
            "INSERT INTO tasks (owner_id, title, priority, status, created_at) \
             VALUES (1, 'legacy row', 'urgent!!', 'open', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let tasks = repo.list(1, &TaskFilter::default()).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].priority, Priority::Low);
    }

    #[tokio::test]
    async fn create_assigns_id_and_created_at() {
        let (repo, _pool) = repo().await;

        let req = CreateTask {
            title: "t".to_string(),
            description: Some("d".to_string()),
            priority: Priority::Medium,
            status: "open".to_string(),
        };
        let task = repo.create(7, &req).await.unwrap();

        assert!(task.id > 0);
        assert!(task.created_at > 0);
        assert_eq!(task.owner_id, 7);

        let fetched = repo.find_by_id(7, task.id).await.unwrap();
        assert_eq!(fetched.title, "t");
        assert_eq!(fetched.description.as_deref(), Some("d"));
        assert_eq!(fetched.created_at, task.created_at);
    }

    #[tokio::test]
    async fn find_is_scoped_to_owner() {
        let (repo, _pool) = repo().await;

        let req = CreateTask {
            title: "t".to_string(),
            description: None,
            priority: Priority::High,
            status: "open".to_string(),
        };
        let task = repo.create(1, &req).await.unwrap();

        let err = repo.find_by_id(2, task.id).await.unwrap_err();
        assert!(matches!(err, AppError::TaskNotFound { .. }));
    }
}
