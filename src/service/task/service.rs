use crate::error::AppResult;
use crate::model::task::{CreateTask, Task, TaskFilter, UpdateTask};
use crate::repository::task::TaskRepository;
use crate::service::task::{TaskCache, TaskScheduler};

/// 任务服务：数据库为准，调度索引和缓存跟着写路径维护。
/// 两个副作用之间没有事务，缓存写失败靠 TTL 或下一次写修复。
pub struct TaskService {
    scheduler: TaskScheduler,
    cache: TaskCache,
    repo: TaskRepository,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService")
            .field("scheduler", &"TaskScheduler")
            .field("cache", &"TaskCache")
            .field("repo", &"TaskRepository")
            .finish()
    }
}

impl TaskService {
    pub fn new(repo: TaskRepository, cache_capacity: u64) -> Self {
        Self {
            scheduler: TaskScheduler::new(),
            cache: TaskCache::new(cache_capacity),
            repo,
        }
    }

    #[cfg(test)]
    pub fn with_cache_backend(
        repo: TaskRepository,
        backend: std::sync::Arc<dyn crate::service::task::cache::CacheBackend>,
    ) -> Self {
        Self {
            scheduler: TaskScheduler::new(),
            cache: TaskCache::with_backend(backend),
            repo,
        }
    }

    /// 创建：先落库拿到 id，再入调度堆，最后预热缓存
    pub async fn create_task(&self, owner_id: i64, req: CreateTask) -> AppResult<Task> {
        let task = self.repo.create(owner_id, &req).await?;

        self.scheduler.add_task(&task);
        self.cache.insert(&task).await;

        tracing::info!("task #{} created for user {}", task.id, owner_id);
        Ok(task)
    }

    /// 读取：缓存命中直接返回快照，未命中回源数据库并回填
    pub async fn get_task(&self, owner_id: i64, id: i64) -> AppResult<Task> {
        if let Some(task) = self.cache.get(owner_id, id).await {
            return Ok(task);
        }

        let task = self.repo.find_by_id(owner_id, id).await?;
        self.cache.insert(&task).await;

        Ok(task)
    }

    pub async fn list_tasks(&self, owner_id: i64, filter: &TaskFilter) -> AppResult<Vec<Task>> {
        self.repo.list(owner_id, filter).await
    }

    /// 更新：落库之后整条覆盖缓存，TTL 重新计时
    pub async fn update_task(&self, owner_id: i64, req: UpdateTask) -> AppResult<Task> {
        let task = self.repo.update(owner_id, &req).await?;
        self.cache.insert(&task).await;

        Ok(task)
    }

    /// 删除：先清缓存再删库。顺序反过来会留下一个窗口，
    /// 并发读取可能在行删除前把快照重新填回缓存。
    pub async fn delete_task(&self, owner_id: i64, id: i64) -> AppResult<()> {
        self.cache.invalidate(owner_id, id).await;
        self.repo.delete(owner_id, id).await?;

        tracing::info!("task #{} deleted for user {}", id, owner_id);
        Ok(())
    }

    #[allow(dead_code)]
    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use crate::repository::database::create_schema;
    use crate::service::task::cache::{CacheError, MockCacheBackend};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use std::sync::Arc;

    // 内存库必须限制单连接，每个连接看到的都是独立的 :memory: 实例
    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    async fn service() -> (TaskService, SqlitePool) {
        let pool = memory_pool().await;
        let service = TaskService::new(TaskRepository::new(pool.clone()), 1000);
        (service, pool)
    }

    fn create_req(title: &str, priority: Priority) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: None,
            priority,
            status: "open".to_string(),
        }
    }

    #[tokio::test]
    async fn read_after_create_hits_cache_not_store() {
        let (service, pool) = service().await;
        let task = service.create_task(1, create_req("a", Priority::High)).await.unwrap();

        // 绕过服务直接删掉数据库行，读取仍然返回缓存快照，证明没有回源
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task.id)
            .execute(&pool)
            .await
            .unwrap();

        let cached = service.get_task(1, task.id).await.unwrap();
        assert_eq!(cached.title, "a");
        assert_eq!(cached.priority, Priority::High);
    }

    #[tokio::test]
    async fn read_miss_falls_through_and_repopulates() {
        let (service, _pool) = service().await;
        let task = service.create_task(1, create_req("a", Priority::Low)).await.unwrap();

        // 清掉缓存条目，模拟过期
        service.cache.invalidate(1, task.id).await;

        let fetched = service.get_task(1, task.id).await.unwrap();
        assert_eq!(fetched.id, task.id);

        // 回填生效：再次读取命中缓存
        assert!(service.cache.get(1, task.id).await.is_some());
    }

    #[tokio::test]
    async fn read_unknown_id_is_not_found() {
        let (service, _pool) = service().await;

        let err = service.get_task(1, 999).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::TaskNotFound { id: 999 }
        ));
    }

    #[tokio::test]
    async fn update_refreshes_cached_snapshot() {
        let (service, _pool) = service().await;
        let task = service.create_task(1, create_req("a", Priority::Low)).await.unwrap();

        // 先读一次确保缓存里有旧快照
        assert_eq!(service.get_task(1, task.id).await.unwrap().priority, Priority::Low);

        service
            .update_task(
                1,
                UpdateTask {
                    id: task.id,
                    title: None,
                    description: None,
                    priority: Some(Priority::High),
                    status: Some("done".to_string()),
                },
            )
            .await
            .unwrap();

        let fresh = service.get_task(1, task.id).await.unwrap();
        assert_eq!(fresh.priority, Priority::High);
        assert_eq!(fresh.status, "done");
    }

    #[tokio::test]
    async fn read_after_delete_is_not_found_within_ttl() {
        let (service, _pool) = service().await;
        let task = service.create_task(1, create_req("a", Priority::High)).await.unwrap();

        service.delete_task(1, task.id).await.unwrap();

        let err = service.get_task(1, task.id).await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::TaskNotFound { .. }));
    }

    #[tokio::test]
    async fn owners_cannot_see_each_others_tasks() {
        let (service, _pool) = service().await;
        let task = service.create_task(1, create_req("a", Priority::High)).await.unwrap();

        // 同一个任务 id，换一个 owner 就查不到，缓存键也不会串
        let err = service.get_task(2, task.id).await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::TaskNotFound { .. }));

        assert!(service.get_task(1, task.id).await.is_ok());
    }

    #[tokio::test]
    async fn scheduler_orders_created_tasks_by_urgency() {
        let (service, _pool) = service().await;
        let high = service.create_task(1, create_req("h", Priority::High)).await.unwrap();
        let low = service.create_task(1, create_req("l", Priority::Low)).await.unwrap();
        let medium = service.create_task(2, create_req("m", Priority::Medium)).await.unwrap();

        assert_eq!(service.scheduler().len(), 3);
        assert_eq!(service.scheduler().pop_next().unwrap().task_id, high.id);
        assert_eq!(service.scheduler().pop_next().unwrap().task_id, medium.id);
        assert_eq!(service.scheduler().pop_next().unwrap().task_id, low.id);
    }

    #[tokio::test]
    async fn list_filters_by_priority_and_status() {
        let (service, _pool) = service().await;
        service.create_task(1, create_req("a", Priority::High)).await.unwrap();
        let b = service.create_task(1, create_req("b", Priority::High)).await.unwrap();
        service.create_task(1, create_req("c", Priority::Low)).await.unwrap();
        service.create_task(2, create_req("d", Priority::High)).await.unwrap();

        service
            .update_task(
                1,
                UpdateTask {
                    id: b.id,
                    title: None,
                    description: None,
                    priority: None,
                    status: Some("done".to_string()),
                },
            )
            .await
            .unwrap();

        let all = service.list_tasks(1, &TaskFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let high = service
            .list_tasks(
                1,
                &TaskFilter {
                    priority: Some(Priority::High),
                    status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(high.len(), 2);

        let done = service
            .list_tasks(
                1,
                &TaskFilter {
                    priority: None,
                    status: Some("done".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, b.id);

        let high_done = service
            .list_tasks(
                1,
                &TaskFilter {
                    priority: Some(Priority::High),
                    status: Some("done".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(high_done.len(), 1);
        assert_eq!(high_done[0].id, b.id);
    }

    #[tokio::test]
    async fn update_or_delete_unknown_id_is_not_found() {
        let (service, _pool) = service().await;

        let err = service
            .update_task(
                1,
                UpdateTask {
                    id: 42,
                    title: None,
                    description: None,
                    priority: Some(Priority::High),
                    status: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::AppError::TaskNotFound { id: 42 }));

        let err = service.delete_task(1, 42).await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::TaskNotFound { id: 42 }));
    }

    #[tokio::test]
    async fn all_operations_survive_cache_outage() {
        let pool = memory_pool().await;

        let mut mock = MockCacheBackend::new();
        mock.expect_get()
            .returning(|_| Err(CacheError::Unavailable("down".into())));
        mock.expect_set()
            .returning(|_, _| Err(CacheError::Unavailable("down".into())));
        mock.expect_delete()
            .returning(|_| Err(CacheError::Unavailable("down".into())));

        let service =
            TaskService::with_cache_backend(TaskRepository::new(pool.clone()), Arc::new(mock));

        // 缓存全程不可用，读写路径必须照常工作
        let task = service.create_task(1, create_req("a", Priority::High)).await.unwrap();
        let fetched = service.get_task(1, task.id).await.unwrap();
        assert_eq!(fetched.id, task.id);

        service
            .update_task(
                1,
                UpdateTask {
                    id: task.id,
                    title: Some("b".to_string()),
                    description: None,
                    priority: None,
                    status: None,
                },
            )
            .await
            .unwrap();

        service.delete_task(1, task.id).await.unwrap();
        let err = service.get_task(1, task.id).await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::TaskNotFound { .. }));
    }
}
