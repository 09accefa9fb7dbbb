//! 视图角色

use clinic_core::{User, UserRole};
use clinic_session::SessionStore;
use serde::Serialize;
use std::fmt;

/// 决定渲染哪一套页面的角色
///
/// 由会话中用户的角色字符串精确匹配得到，其余情况（含未登录）一律为 `Guest`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViewRole {
    Admin,
    Doctor,
    Patient,
    Guest,
}

impl ViewRole {
    pub fn from_user(user: Option<&User>) -> Self {
        user.and_then(User::role)
            .map(ViewRole::from)
            .unwrap_or(ViewRole::Guest)
    }

    /// 读取当前会话的角色
    pub fn from_session(session: &SessionStore) -> Self {
        Self::from_user(session.get_user().as_ref())
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, ViewRole::Guest)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewRole::Admin => "Admin",
            ViewRole::Doctor => "Doctor",
            ViewRole::Patient => "Patient",
            ViewRole::Guest => "Guest",
        }
    }
}

impl From<UserRole> for ViewRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => ViewRole::Admin,
            UserRole::Doctor => ViewRole::Doctor,
            UserRole::Patient => ViewRole::Patient,
        }
    }
}

impl fmt::Display for ViewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::Session;

    fn user(role: &str) -> User {
        User {
            id: 1,
            name: "Rina".to_string(),
            email: "rina@clinic.id".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_exact_role_selection() {
        assert_eq!(ViewRole::from_user(Some(&user("admin"))), ViewRole::Admin);
        assert_eq!(ViewRole::from_user(Some(&user("doctor"))), ViewRole::Doctor);
        assert_eq!(ViewRole::from_user(Some(&user("patient"))), ViewRole::Patient);
    }

    #[test]
    fn test_everything_else_is_guest() {
        for role in ["Admin", "ADMIN", " admin", "nurse", ""] {
            assert_eq!(ViewRole::from_user(Some(&user(role))), ViewRole::Guest, "{role:?}");
        }
        assert_eq!(ViewRole::from_user(None), ViewRole::Guest);
    }

    #[test]
    fn test_from_session() {
        let store = SessionStore::in_memory();
        assert_eq!(ViewRole::from_session(&store), ViewRole::Guest);

        store.save(&Session::new(user("doctor"), "tok"));
        assert_eq!(ViewRole::from_session(&store), ViewRole::Doctor);

        store.clear();
        assert!(ViewRole::from_session(&store).is_guest());
    }
}
