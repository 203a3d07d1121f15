use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::{Mutex, PoisonError};

use crate::model::task::Task;

/// 堆里只放任务的引用信息，不持有任务本身。
/// 数据库始终是事实来源，这个索引可以随时重建，不落盘。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub rank: u8,
    pub created_at: i64,
    pub task_id: i64,
    pub owner_id: i64,
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // rank 小的在前，同 rank 按创建时间，再按 id 保证全序
        (self.rank, self.created_at, self.task_id).cmp(&(
            other.rank,
            other.created_at,
            other.task_id,
        ))
    }
}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 进程级的任务优先级调度索引，最小堆。
/// 只在创建任务的路径上写入；不做去重，同一个任务重复入堆是接受的行为。
pub struct TaskScheduler {
    heap: Mutex<BinaryHeap<Reverse<ScheduledTask>>>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
        }
    }

    pub fn add_task(&self, task: &Task) {
        let entry = ScheduledTask {
            rank: task.priority.rank(),
            created_at: task.created_at,
            task_id: task.id,
            owner_id: task.owner_id,
        };

        self.heap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Reverse(entry));
    }

    /// 取出当前最紧急的任务
    #[allow(dead_code)]
    pub fn pop_next(&self) -> Option<ScheduledTask> {
        self.heap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .map(|Reverse(entry)| entry)
    }

    #[allow(dead_code)]
    pub fn peek_next(&self) -> Option<ScheduledTask> {
        self.heap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .peek()
            .map(|Reverse(entry)| entry.clone())
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.heap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}
