//! # Clinic Session
//!
//! 会话信封的本地持久化：
//! - 可替换的键值存储后端（内存、文件、不可用）
//! - 会话读写与安全降级
//! - 外部修改检测与变更通知

pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, UnavailableStorage};
pub use store::{ChangeOrigin, SessionChange, SessionEvent, SessionStore, DEFAULT_STORAGE_KEY};
