use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::model::user::{Credentials, RegisterUser, User};
use crate::repository::user::UserRepository;
use crate::service::auth::password;
use crate::util::time::unix_timestamp;

#[derive(Debug, Clone)]
struct Session {
    user_id: i64,
    expires_at: i64,
}

/// 注册、登录和会话令牌管理。
/// 令牌是 32 字节随机数的 base64，存在进程内的 DashMap 里，过期惰性清理。
pub struct AuthService {
    repo: UserRepository,
    sessions: Arc<DashMap<String, Session>>,
    rng: SystemRandom,
    token_ttl_secs: i64,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("sessions", &self.sessions.len())
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl AuthService {
    pub fn new(repo: UserRepository, token_ttl_secs: i64) -> Self {
        Self {
            repo,
            sessions: Arc::new(DashMap::new()),
            rng: SystemRandom::new(),
            token_ttl_secs,
        }
    }

    pub async fn register(&self, req: RegisterUser) -> AppResult<(User, String)> {
        req.validate()?;

        let password_hash = password::hash_password(&req.password)?;
        let user = self.repo.create(&req.username, &password_hash).await?;
        let token = self.issue_token(user.id)?;

        tracing::info!("user {} registered", user.username);
        Ok((user, token))
    }

    pub async fn login(&self, creds: Credentials) -> AppResult<(User, String)> {
        let user = self
            .repo
            .find_by_username(&creds.username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify_password(&creds.password, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue_token(user.id)?;
        Ok((user, token))
    }

    pub fn logout(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// 令牌换 user_id，过期条目顺手删掉
    pub fn authenticate(&self, token: &str) -> Option<i64> {
        let session = self.sessions.get(token)?;
        if session.expires_at <= unix_timestamp() {
            drop(session);
            self.sessions.remove(token);
            return None;
        }
        Some(session.user_id)
    }

    fn issue_token(&self, user_id: i64) -> AppResult<String> {
        let mut bytes = [0u8; 32];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Config(anyhow::anyhow!("failed to generate token")))?;

        let token = URL_SAFE_NO_PAD.encode(bytes);
        self.sessions.insert(
            token.clone(),
            Session {
                user_id,
                expires_at: unix_timestamp() + self.token_ttl_secs,
            },
        );

        Ok(token)
    }
}
