use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// 任务优先级，rank 越小越紧急
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    /// 优先级映射为数值：high=1, medium=2, low=3
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// 未知的优先级一律按 low 处理，不拒绝写入
    pub fn from_str(s: &str) -> Self {
        match s {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Priority::from_str(&s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: String,
    pub created_at: i64,  // unix 秒，创建后不再变化
}

fn default_status() -> String {
    "open".to_string()
}

#[derive(Debug, Validate, Deserialize)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_status")]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTask {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTask {
    pub task_id: i64,
}

/// 任务列表的过滤条件，priority 和 status 都是精确匹配，可以组合
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub priority: Option<Priority>,
    pub status: Option<String>,
}
