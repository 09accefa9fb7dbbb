//! 会话存储
//!
//! 在单个存储键下持久化会话信封。存储不可用或内容损坏时安全降级为 None。

use chrono::{DateTime, Utc};
use clinic_core::{Session, User};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::storage::{MemoryStorage, SessionStorage};

/// 默认存储键
pub const DEFAULT_STORAGE_KEY: &str = "auth";

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// 会话变更来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// 本进程写入
    Local,
    /// 其他进程写入同一存储（相当于其他标签页）
    External,
}

/// 会话变更内容
#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    SignedIn(Session),
    SignedOut,
}

/// 会话变更事件
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub change: SessionChange,
    pub origin: ChangeOrigin,
    pub at: DateTime<Utc>,
}

/// 会话存储，显式传递给所有组件
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    key: String,
    /// 最近一次观察到的原始值，用于检测外部修改
    last_seen: Arc<Mutex<Option<String>>>,
    changes: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// 使用默认键创建
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let store = Self {
            storage,
            key: key.into(),
            last_seen: Arc::new(Mutex::new(None)),
            changes,
        };
        let current = store.raw();
        store.remember(current);
        store
    }

    /// 内存会话存储
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// 读取会话信封
    pub fn get(&self) -> Option<Session> {
        let raw = self.raw()?;
        parse_envelope(&raw)
    }

    pub fn get_user(&self) -> Option<User> {
        self.get().map(|session| session.user)
    }

    pub fn get_token(&self) -> Option<String> {
        self.get()
            .map(|session| session.token)
            .filter(|token| !token.is_empty())
    }

    /// 保存会话信封
    pub fn save(&self, session: &Session) {
        let raw = match serde_json::to_string(session) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to serialize session: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set_item(&self.key, &raw) {
            warn!("Session storage unavailable, session not persisted: {}", e);
            return;
        }

        self.remember(Some(raw));
        info!(user_id = session.user.id, role = %session.user.role, "Session saved");
        self.emit(SessionChange::SignedIn(session.clone()), ChangeOrigin::Local);
    }

    /// 保存会话，None 等同于清除
    pub fn save_optional(&self, session: Option<&Session>) {
        match session {
            Some(session) => self.save(session),
            None => self.clear(),
        }
    }

    /// 清除会话
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(&self.key) {
            warn!("Session storage unavailable, nothing cleared: {}", e);
            return;
        }

        self.remember(None);
        info!("Session cleared");
        self.emit(SessionChange::SignedOut, ChangeOrigin::Local);
    }

    /// 订阅会话变更
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.changes.subscribe()
    }

    /// 重新读取存储，若被外部修改则发出变更事件
    pub fn refresh(&self) -> Option<SessionEvent> {
        let current = self.raw();
        {
            let mut last_seen = match self.last_seen.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if *last_seen == current {
                return None;
            }
            *last_seen = current.clone();
        }

        let change = match current.as_deref().and_then(parse_envelope) {
            Some(session) => SessionChange::SignedIn(session),
            None => SessionChange::SignedOut,
        };
        debug!("Detected external session change");
        Some(self.emit(change, ChangeOrigin::External))
    }

    /// 后台轮询存储变化
    pub fn spawn_watch(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                store.refresh();
            }
        })
    }

    fn raw(&self) -> Option<String> {
        match self.storage.get_item(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Session storage unavailable: {}", e);
                None
            }
        }
    }

    fn remember(&self, raw: Option<String>) {
        match self.last_seen.lock() {
            Ok(mut guard) => *guard = raw,
            Err(poisoned) => *poisoned.into_inner() = raw,
        }
    }

    fn emit(&self, change: SessionChange, origin: ChangeOrigin) -> SessionEvent {
        let event = SessionEvent {
            change,
            origin,
            at: Utc::now(),
        };
        // 没有订阅者时发送失败，忽略
        let _ = self.changes.send(event.clone());
        event
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("key", &self.key).finish()
    }
}

fn parse_envelope(raw: &str) -> Option<Session> {
    match serde_json::from_str::<Option<Session>>(raw) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to parse auth data: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, UnavailableStorage};

    fn sample_session() -> Session {
        Session::new(
            User {
                id: 7,
                name: "Siti Aminah".to_string(),
                email: "siti@clinic.id".to_string(),
                role: "patient".to_string(),
            },
            "token-123",
        )
    }

    #[test]
    fn test_session_round_trip() {
        let store = SessionStore::in_memory();
        assert!(store.get().is_none());

        let session = sample_session();
        store.save(&session);
        assert_eq!(store.get(), Some(session.clone()));
        assert_eq!(store.get_user(), Some(session.user.clone()));
        assert_eq!(store.get_token().as_deref(), Some("token-123"));

        store.clear();
        assert!(store.get().is_none());
        assert!(store.get_user().is_none());
        assert!(store.get_token().is_none());
    }

    #[test]
    fn test_save_optional_none_clears() {
        let store = SessionStore::in_memory();
        store.save(&sample_session());
        store.save_optional(None);
        assert!(store.get().is_none());
    }

    #[test]
    fn test_unavailable_storage_degrades_to_none() {
        let store = SessionStore::new(Arc::new(UnavailableStorage));
        store.save(&sample_session());
        assert!(store.get().is_none());
        assert!(store.get_token().is_none());
        store.clear();
        assert!(store.refresh().is_none());
    }

    #[test]
    fn test_corrupt_envelope_reads_as_none() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let store = SessionStore::new(storage.clone());
        assert!(store.get().is_none());

        storage.set_item(DEFAULT_STORAGE_KEY, "null").unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_empty_token_is_absent() {
        let store = SessionStore::in_memory();
        let mut session = sample_session();
        session.token.clear();
        store.save(&session);
        assert!(store.get_token().is_none());
    }

    #[tokio::test]
    async fn test_local_changes_are_published() {
        let store = SessionStore::in_memory();
        let mut rx = store.subscribe();

        store.save(&sample_session());
        store.clear();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.origin, ChangeOrigin::Local);
        assert!(matches!(first.change, SessionChange::SignedIn(_)));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.change, SessionChange::SignedOut);
    }

    #[tokio::test]
    async fn test_watch_publishes_external_changes() {
        let storage = Arc::new(MemoryStorage::new());
        let tab_a = SessionStore::new(storage.clone());
        let tab_b = SessionStore::new(storage);

        let mut rx = tab_b.subscribe();
        let watcher = tab_b.spawn_watch(Duration::from_millis(10));

        tab_a.save(&sample_session());
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.origin, ChangeOrigin::External);
        assert_eq!(event.change, SessionChange::SignedIn(sample_session()));

        tab_a.clear();
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.change, SessionChange::SignedOut);

        watcher.abort();
    }

    #[test]
    fn test_refresh_detects_external_writer() {
        let path = std::env::temp_dir()
            .join(format!("clinic-session-{}", uuid::Uuid::new_v4()))
            .join("local_storage.json");

        let tab_a = SessionStore::new(Arc::new(FileStorage::new(&path)));
        let tab_b = SessionStore::new(Arc::new(FileStorage::new(&path)));

        assert!(tab_b.refresh().is_none());

        tab_a.save(&sample_session());
        let event = tab_b.refresh().unwrap();
        assert_eq!(event.origin, ChangeOrigin::External);
        assert_eq!(event.change, SessionChange::SignedIn(sample_session()));
        assert!(tab_b.refresh().is_none());

        tab_a.clear();
        let event = tab_b.refresh().unwrap();
        assert_eq!(event.change, SessionChange::SignedOut);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
