use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::model::task::Task;

/// 缓存条目的固定存活时间
pub const TASK_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// 键值缓存后端。生产用 moka 进程内缓存，测试可以注入失败实现。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Task>, CacheError>;
    async fn set(&self, key: String, task: Task) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

pub struct MokaBackend {
    cache: Cache<String, Task>,
}

impl MokaBackend {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(TASK_CACHE_TTL)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl CacheBackend for MokaBackend {
    async fn get(&self, key: &str) -> Result<Option<Task>, CacheError> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: String, task: Task) -> Result<(), CacheError> {
        self.cache.insert(key, task).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

/// 单个任务查询前面的缓存层。
/// 键必须带 owner 前缀，这同时是权限边界：拿不到别人的缓存条目。
/// 缓存只是加速，后端故障一律降级到数据库，绝不把错误抛给调用方。
pub struct TaskCache {
    backend: Arc<dyn CacheBackend>,
}

impl TaskCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            backend: Arc::new(MokaBackend::new(max_capacity)),
        }
    }

    #[allow(dead_code)]
    pub fn with_backend(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    fn key(owner_id: i64, task_id: i64) -> String {
        format!("{}:{}", owner_id, task_id)
    }

    pub async fn get(&self, owner_id: i64, task_id: i64) -> Option<Task> {
        match self.backend.get(&Self::key(owner_id, task_id)).await {
            Ok(task) => task,
            Err(e) => {
                // 后端不可用按未命中处理
                tracing::warn!("task cache get failed: {}", e);
                None
            }
        }
    }

    pub async fn insert(&self, task: &Task) {
        let key = Self::key(task.owner_id, task.id);
        if let Err(e) = self.backend.set(key, task.clone()).await {
            tracing::warn!("task cache set failed: {}", e);
        }
    }

    pub async fn invalidate(&self, owner_id: i64, task_id: i64) {
        if let Err(e) = self.backend.delete(&Self::key(owner_id, task_id)).await {
            tracing::warn!("task cache delete failed: {}", e);
        }
    }
}
