//! 仪表盘

use super::{Notice, Page};
use crate::context::AppContext;
use crate::render;
use crate::role::ViewRole;
use async_trait::async_trait;
use clinic_core::{Appointment, AppointmentStatus, Doctor};
use clinic_workflow::upcoming;
use std::fmt;

const LOAD_FAILED: &str = "Failed to load dashboard";

/// 患者仪表盘显示的近期预约数
pub const UPCOMING_LIMIT: usize = 5;

/// 按状态统计的预约数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub confirmed: usize,
    pub rejected: usize,
    pub completed: usize,
    pub other: usize,
}

impl StatusCounts {
    pub fn from_appointments(items: &[Appointment]) -> Self {
        items.iter().fold(Self::default(), |mut counts, item| {
            match item.status {
                AppointmentStatus::Pending => counts.pending += 1,
                AppointmentStatus::Confirmed => counts.confirmed += 1,
                AppointmentStatus::Rejected => counts.rejected += 1,
                AppointmentStatus::Completed => counts.completed += 1,
                AppointmentStatus::Unknown(_) => counts.other += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.pending + self.confirmed + self.rejected + self.completed + self.other
    }
}

/// 各角色的仪表盘内容
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    Admin {
        total_doctors: usize,
        active_doctors: usize,
    },
    Doctor {
        profile: Option<Doctor>,
        requests: StatusCounts,
        schedules: usize,
    },
    Patient {
        upcoming: Vec<Appointment>,
    },
    Guest,
}

/// 仪表盘页面
#[derive(Debug, Clone)]
pub struct DashboardPage {
    pub role: ViewRole,
    pub user_name: Option<String>,
    pub view: DashboardView,
    pub notice: Notice,
}

impl DashboardPage {
    pub async fn load(ctx: &AppContext) -> Self {
        let mut page = Self {
            role: ViewRole::Guest,
            user_name: None,
            view: DashboardView::Guest,
            notice: Notice::default(),
        };
        page.refresh(ctx).await;
        page
    }

    async fn build_view(&mut self, ctx: &AppContext) -> DashboardView {
        let api = ctx.api();
        match self.role {
            ViewRole::Admin => match api.admin_doctors.list().await {
                Ok(doctors) => DashboardView::Admin {
                    total_doctors: doctors.len(),
                    active_doctors: doctors.iter().filter(|d| d.is_active).count(),
                },
                Err(e) => {
                    self.notice.fail(&e, LOAD_FAILED);
                    DashboardView::Admin {
                        total_doctors: 0,
                        active_doctors: 0,
                    }
                }
            },
            ViewRole::Doctor => {
                let profile = match api.profile.get_mine().await {
                    Ok(profile) => profile,
                    Err(e) => {
                        self.notice.fail(&e, LOAD_FAILED);
                        None
                    }
                };
                let requests = match api.doctor_appointments.get_mine().await {
                    Ok(items) => StatusCounts::from_appointments(&items),
                    Err(e) => {
                        self.notice.fail(&e, LOAD_FAILED);
                        StatusCounts::default()
                    }
                };
                let schedules = match api.schedules.list().await {
                    Ok(items) => items.len(),
                    Err(e) => {
                        self.notice.fail(&e, LOAD_FAILED);
                        0
                    }
                };
                DashboardView::Doctor {
                    profile,
                    requests,
                    schedules,
                }
            }
            ViewRole::Patient => match api.patient.get_appointments().await {
                Ok(items) => DashboardView::Patient {
                    upcoming: upcoming(&items, ctx.now(), UPCOMING_LIMIT),
                },
                Err(e) => {
                    self.notice.fail(&e, LOAD_FAILED);
                    DashboardView::Patient { upcoming: Vec::new() }
                }
            },
            ViewRole::Guest => DashboardView::Guest,
        }
    }
}

#[async_trait]
impl Page for DashboardPage {
    async fn refresh(&mut self, ctx: &AppContext) {
        self.notice.clear();
        self.role = ctx.role();
        self.user_name = ctx.user().map(|u| u.name);
        self.view = self.build_view(ctx).await;
    }

    fn notice(&self) -> &Notice {
        &self.notice
    }
}

impl fmt::Display for DashboardPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::heading(f, "Dashboard Overview")?;
        if let Some(name) = &self.user_name {
            writeln!(f, "Welcome back, {}. Signed in as {}.", name, self.role)?;
        }
        render::notice(f, &self.notice)?;

        match &self.view {
            DashboardView::Admin {
                total_doctors,
                active_doctors,
            } => {
                writeln!(f, "Doctors registered: {}", total_doctors)?;
                writeln!(f, "Doctors active:     {}", active_doctors)?;
            }
            DashboardView::Doctor {
                profile,
                requests,
                schedules,
            } => {
                if let Some(profile) = profile {
                    writeln!(
                        f,
                        "{} - {}",
                        profile.display_name(),
                        profile.specialization_label()
                    )?;
                }
                writeln!(f, "Waiting requests:  {}", requests.pending)?;
                writeln!(f, "Approved:          {}", requests.confirmed)?;
                writeln!(f, "Rejected:          {}", requests.rejected)?;
                writeln!(f, "Done:              {}", requests.completed)?;
                writeln!(f, "Schedules:         {}", schedules)?;
            }
            DashboardView::Patient { upcoming } => {
                writeln!(f, "Upcoming appointments")?;
                if upcoming.is_empty() {
                    writeln!(f, "  No upcoming appointments.")?;
                }
                for item in upcoming {
                    writeln!(f, "  {}", render::appointment_row(item, &item.doctor_label(), &[]))?;
                }
            }
            DashboardView::Guest => {
                writeln!(f, "Book a doctor in minutes.")?;
                writeln!(f, "Sign in or create an account to manage your appointments.")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_for, spawn_backend};
    use axum::{routing::get, Json, Router};
    use serde_json::{json, Value};

    async fn doctors() -> Json<Value> {
        Json(json!({"data": [
            {"id": 1, "is_active": true, "user": {"name": "Dr. A"}},
            {"id": 2, "is_active": false, "user": {"name": "Dr. B"}},
            {"id": 3, "is_active": true, "user": {"name": "Dr. C"}}
        ]}))
    }

    async fn patient_appointments() -> Json<Value> {
        Json(json!({"data": [
            {"id": 1, "doctor_id": 3, "appointment_date": "2026-10-17", "start_time_slot": "09:00", "status": "Pending"},
            {"id": 2, "doctor_id": 3, "appointment_date": "2026-10-21", "start_time_slot": "09:00", "status": "Confirmed"},
            {"id": 3, "doctor_id": 3, "appointment_date": "2026-10-19", "start_time_slot": "09:00", "status": "Pending"},
            {"id": 4, "doctor_id": 3, "appointment_date": "2026-10-20", "start_time_slot": "09:00", "status": "Rejected"}
        ]}))
    }

    fn router() -> Router {
        Router::new()
            .route("/api/admin/doctors", get(doctors))
            .route("/api/patient/appointments", get(patient_appointments))
    }

    #[test]
    fn test_status_counts() {
        let items = vec![
            Appointment { status: AppointmentStatus::Pending, ..Default::default() },
            Appointment { status: AppointmentStatus::Pending, ..Default::default() },
            Appointment { status: AppointmentStatus::Completed, ..Default::default() },
            Appointment { status: AppointmentStatus::Unknown("Moved".to_string()), ..Default::default() },
        ];
        let counts = StatusCounts::from_appointments(&items);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.other, 1);
        assert_eq!(counts.total(), 4);
    }

    #[tokio::test]
    async fn test_admin_dashboard_counts_doctors() {
        let base_url = spawn_backend(router()).await;
        let ctx = context_for(&base_url, Some("admin"));

        let page = DashboardPage::load(&ctx).await;
        assert!(page.notice.is_ok());
        assert_eq!(
            page.view,
            DashboardView::Admin {
                total_doctors: 3,
                active_doctors: 2
            }
        );
    }

    #[tokio::test]
    async fn test_patient_dashboard_lists_upcoming() {
        let base_url = spawn_backend(router()).await;
        let ctx = context_for(&base_url, Some("patient"));

        let page = DashboardPage::load(&ctx).await;
        match &page.view {
            DashboardView::Patient { upcoming } => {
                let ids: Vec<i64> = upcoming.iter().map(|a| a.id).collect();
                assert_eq!(ids, vec![3, 2]);
            }
            other => panic!("unexpected view: {:?}", other),
        }
        assert!(page.to_string().contains("Upcoming appointments"));
    }

    #[tokio::test]
    async fn test_guest_dashboard_makes_no_requests() {
        let ctx = context_for("http://127.0.0.1:9/api", None);
        let page = DashboardPage::load(&ctx).await;
        assert_eq!(page.view, DashboardView::Guest);
        assert!(page.notice.is_ok());
    }

    #[tokio::test]
    async fn test_expired_credential_signs_out() {
        async fn expired() -> (axum::http::StatusCode, Json<Value>) {
            (
                axum::http::StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Token has expired"})),
            )
        }
        let app = Router::new().route("/api/patient/appointments", get(expired));
        let base_url = spawn_backend(app).await;
        let ctx = context_for(&base_url, Some("patient"));

        let page = DashboardPage::load(&ctx).await;
        assert_eq!(page.notice.error.as_deref(), Some("Token has expired"));
        assert!(ctx.session().get().is_none());
        assert_eq!(ctx.role(), ViewRole::Guest);
    }

    #[tokio::test]
    async fn test_failure_is_inline() {
        let base_url = spawn_backend(Router::new()).await;
        let ctx = context_for(&base_url, Some("admin"));
        let page = DashboardPage::load(&ctx).await;
        assert!(page.notice.error.is_some());
        assert!(page.to_string().contains("[error]"));
    }
}
