//! 记忆层：进程内有界活动日志（不跨重启持久化）

pub mod activity;

pub use activity::{EventKind, MemoryEvent, MemoryLog, DEFAULT_CAPACITY};
