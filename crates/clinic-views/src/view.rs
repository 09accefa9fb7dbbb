//! 按路由打开页面

use crate::context::AppContext;
use crate::pages::{BookingsPage, DashboardPage, DoctorsPage, ProfilePage, SchedulesPage};
use crate::render;
use crate::role::ViewRole;
use crate::route::{guard, menu, Route};
use std::fmt;
use tracing::debug;

pub const RECORDS_RETIRED: &str =
    "The records page is no longer used. Please use the bookings menu to see the latest data.";

/// 已加载的页面
#[derive(Debug, Clone)]
pub enum View {
    Landing,
    Login,
    Register,
    Dashboard(DashboardPage),
    Doctors(DoctorsPage),
    Schedules(SchedulesPage),
    Bookings(BookingsPage),
    Profile(ProfilePage),
    Records,
}

impl View {
    pub fn route(&self) -> Route {
        match self {
            View::Landing => Route::Landing,
            View::Login => Route::Login,
            View::Register => Route::Register,
            View::Dashboard(_) => Route::Dashboard,
            View::Doctors(_) => Route::Doctors,
            View::Schedules(_) => Route::Schedules,
            View::Bookings(_) => Route::Bookings,
            View::Profile(_) => Route::Profile,
            View::Records => Route::Records,
        }
    }
}

/// 经过路由守卫后加载页面
pub async fn open(ctx: &AppContext, requested: Route) -> View {
    let role = ctx.role();
    let route = guard(requested, role);
    if route != requested {
        debug!("Route {} redirected to {} for {}", requested, route, role);
    }

    match route {
        Route::Landing => View::Landing,
        Route::Login => View::Login,
        Route::Register => View::Register,
        Route::Dashboard => View::Dashboard(DashboardPage::load(ctx).await),
        Route::Doctors => View::Doctors(DoctorsPage::load(ctx).await),
        Route::Schedules => View::Schedules(SchedulesPage::load(ctx).await),
        Route::Bookings => View::Bookings(BookingsPage::load(ctx).await),
        Route::Profile => View::Profile(ProfilePage::load(ctx).await),
        Route::Records => View::Records,
    }
}

/// 渲染侧边栏
pub fn render_menu(role: ViewRole, active: Route) -> String {
    menu(role)
        .iter()
        .map(|item| {
            let marker = if item.route == active { ">" } else { " " };
            format!("{} {}", marker, item.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Landing => {
                render::heading(f, "MedicFlow")?;
                writeln!(f, "Book a doctor in minutes.")?;
                writeln!(f, "Sign in or create an account to get started.")
            }
            View::Login => {
                render::heading(f, "Sign In")?;
                writeln!(f, "Sign in with your email and password.")
            }
            View::Register => {
                render::heading(f, "Sign Up")?;
                writeln!(f, "Create an account with your name, email and password.")
            }
            View::Dashboard(page) => fmt::Display::fmt(page, f),
            View::Doctors(page) => fmt::Display::fmt(page, f),
            View::Schedules(page) => fmt::Display::fmt(page, f),
            View::Bookings(page) => fmt::Display::fmt(page, f),
            View::Profile(page) => fmt::Display::fmt(page, f),
            View::Records => {
                render::heading(f, "Records")?;
                writeln!(f, "{}", RECORDS_RETIRED)
            }
        }
    }
}
