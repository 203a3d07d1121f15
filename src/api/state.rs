use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::repository::task::TaskRepository;
use crate::repository::user::UserRepository;
use crate::service::auth::AuthService;
use crate::service::task::TaskService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub task_service: Arc<TaskService>,
    pub auth_service: Arc<AuthService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("task_service", &self.task_service)
            .field("auth_service", &self.auth_service)
            .finish()
    }
}

impl AppState {
    pub fn new(config: AppConfig, pool: SqlitePool) -> Self {
        let task_service = Arc::new(TaskService::new(
            TaskRepository::new(pool.clone()),
            config.cache.max_capacity,
        ));
        let auth_service = Arc::new(AuthService::new(
            UserRepository::new(pool),
            config.auth.session_ttl_secs,
        ));

        Self {
            config: Arc::new(config),
            task_service,
            auth_service,
        }
    }
}
