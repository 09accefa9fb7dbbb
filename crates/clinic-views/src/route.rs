//! 路由与菜单

use crate::role::ViewRole;
use serde::Serialize;
use std::fmt;

/// 页面路由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Route {
    Landing,
    Login,
    Register,
    Dashboard,
    Doctors,
    Schedules,
    Bookings,
    Profile,
    Records,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Landing,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Doctors,
        Route::Schedules,
        Route::Bookings,
        Route::Profile,
        Route::Records,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Doctors => "/doctors",
            Route::Schedules => "/schedules",
            Route::Bookings => "/bookings",
            Route::Profile => "/profile",
            Route::Records => "/records",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };
        Route::ALL.iter().copied().find(|route| route.path() == path)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Landing => "Home",
            Route::Login => "Sign In",
            Route::Register => "Sign Up",
            Route::Dashboard => "Dashboard",
            Route::Doctors => "Doctors",
            Route::Schedules => "Schedules",
            Route::Bookings => "Bookings",
            Route::Profile => "Profile",
            Route::Records => "Records",
        }
    }

    /// 未登录也可访问
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Landing | Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// 访客访问受保护页面时跳转到登录页
pub fn guard(route: Route, role: ViewRole) -> Route {
    if role.is_guest() && !route.is_public() {
        Route::Login
    } else {
        route
    }
}

/// 侧边栏菜单项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub name: &'static str,
    pub route: Route,
}

impl MenuItem {
    const fn new(route: Route, name: &'static str) -> Self {
        Self { name, route }
    }
}

/// 按角色生成侧边栏
pub fn menu(role: ViewRole) -> Vec<MenuItem> {
    match role {
        ViewRole::Admin => vec![
            MenuItem::new(Route::Dashboard, "Dashboard"),
            MenuItem::new(Route::Doctors, "Doctors"),
            MenuItem::new(Route::Records, "Records"),
        ],
        ViewRole::Doctor => vec![
            MenuItem::new(Route::Dashboard, "Dashboard"),
            MenuItem::new(Route::Bookings, "Incoming Bookings"),
            MenuItem::new(Route::Schedules, "Schedules"),
            MenuItem::new(Route::Profile, "Profile"),
            MenuItem::new(Route::Records, "Records"),
        ],
        ViewRole::Patient => vec![
            MenuItem::new(Route::Dashboard, "Dashboard"),
            MenuItem::new(Route::Bookings, "Bookings"),
            MenuItem::new(Route::Profile, "Profile"),
            MenuItem::new(Route::Records, "Records"),
        ],
        ViewRole::Guest => vec![
            MenuItem::new(Route::Landing, "Home"),
            MenuItem::new(Route::Login, "Sign In"),
            MenuItem::new(Route::Register, "Sign Up"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_redirects_guests() {
        for route in Route::ALL {
            let target = guard(route, ViewRole::Guest);
            if route.is_public() {
                assert_eq!(target, route);
            } else {
                assert_eq!(target, Route::Login);
            }
        }
        assert_eq!(guard(Route::Doctors, ViewRole::Patient), Route::Doctors);
    }

    #[test]
    fn test_menu_per_role() {
        let routes = |role| menu(role).into_iter().map(|item| item.route).collect::<Vec<_>>();
        assert!(routes(ViewRole::Admin).contains(&Route::Doctors));
        assert!(!routes(ViewRole::Patient).contains(&Route::Doctors));
        assert!(routes(ViewRole::Doctor).contains(&Route::Schedules));
        assert!(routes(ViewRole::Guest).iter().all(Route::is_public));
    }

    #[test]
    fn test_paths() {
        assert_eq!(Route::from_path("/bookings/"), Some(Route::Bookings));
        assert_eq!(Route::from_path(""), Some(Route::Landing));
        assert_eq!(Route::from_path("/appointments"), None);
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }
}
