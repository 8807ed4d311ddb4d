//! 活动日志：有界、按插入顺序的动作记录
//!
//! 容量在构造时固定（默认 1000），满时淘汰最旧条目（FIFO）。
//! add / recent 共用一把 Mutex，可被并发请求同时调用；recent 按最新在前返回。

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_CAPACITY: usize = 1000;

/// 事件类别
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// 一次 act 生成的计划
    Plan,
    /// 计划步骤或直接调用触发的工具动作（含结果）
    Action,
}

/// 单条活动记录，创建后不可变
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryEvent {
    /// 插入序号，唯一的先后依据
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    pub kind: EventKind,
    pub payload: Value,
}

struct Inner {
    events: VecDeque<MemoryEvent>,
    next_seq: u64,
}

/// 有界活动日志；进程内、不持久化
pub struct MemoryLog {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl MemoryLog {
    /// capacity 为 0 时按 1 处理
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                events: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
                next_seq: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // 临界区内没有可能 panic 的逻辑，中毒时直接取回数据
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 追加一条事件，返回其插入序号；满时先淘汰最旧的一条
    pub fn add(&self, kind: EventKind, payload: Value) -> u64 {
        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        if inner.events.len() == self.capacity {
            inner.events.pop_front();
        }
        inner.events.push_back(MemoryEvent {
            seq,
            recorded_at: Utc::now(),
            kind,
            payload,
        });
        seq
    }

    /// 最近 min(n, len) 条，最新在前；n 为 0 返回空
    pub fn recent(&self, n: usize) -> Vec<MemoryEvent> {
        let inner = self.lock();
        inner.events.iter().rev().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
