//! 预约页面
//!
//! 患者：搜索医生、填写预约、查看并取消历史预约。
//! 医生：审批收到的预约请求。

use super::{Notice, Page, Restricted};
use crate::context::AppContext;
use crate::render;
use crate::role::ViewRole;
use async_trait::async_trait;
use clinic_core::{Appointment, AppointmentStatus, Doctor};
use clinic_workflow::{
    sort_history, sort_requests, Actor, AppointmentAction, AppointmentStateMachine, BookingForm,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

const DOCTORS_FAILED: &str = "Failed to load doctors";
const HISTORY_FAILED: &str = "Failed to load booking history";
const BOOKING_FAILED: &str = "Failed to create booking";
const CANCEL_FAILED: &str = "Failed to cancel booking";
const REQUESTS_FAILED: &str = "Failed to load bookings";
const UPDATE_FAILED: &str = "Failed to update status";

pub const BOOKING_SENT: &str = "Your Appointment has been sent to the Doctor";
pub const BOOKING_CANCELED: &str = "Booking Canceled.";
pub const NOT_CANCELLABLE: &str = "Only waiting or approved bookings can be cancelled.";
pub const STATUS_UPDATED: &str = "Booking status updated.";

pub const BOOKINGS_RESTRICTED: Restricted = Restricted::new(
    "Patients and Doctors Only",
    "Bookings are available to patient and doctor accounts.",
);

/// 预约页面
#[derive(Debug, Clone)]
pub enum BookingsPage {
    Patient(PatientBookings),
    Doctor(DoctorBookings),
    Restricted(Restricted),
}

impl BookingsPage {
    pub async fn load(ctx: &AppContext) -> Self {
        match ctx.role() {
            ViewRole::Patient => {
                let mut page = PatientBookings::new(ctx);
                page.refresh(ctx).await;
                BookingsPage::Patient(page)
            }
            ViewRole::Doctor => {
                let mut page = DoctorBookings::default();
                page.refresh(ctx).await;
                BookingsPage::Doctor(page)
            }
            _ => BookingsPage::Restricted(BOOKINGS_RESTRICTED),
        }
    }
}

/// 患者预约
#[derive(Debug, Clone)]
pub struct PatientBookings {
    pub search_term: String,
    pub specialization_id: Option<i64>,
    pub doctors: Vec<Doctor>,
    pub selected: Option<Doctor>,
    pub form: BookingForm,
    pub history: Vec<Appointment>,
    pub notice: Notice,
    machine: Arc<AppointmentStateMachine>,
}

impl PatientBookings {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            search_term: String::new(),
            specialization_id: None,
            doctors: Vec::new(),
            selected: None,
            form: BookingForm::new(ctx.today()),
            history: Vec::new(),
            notice: Notice::default(),
            machine: Arc::new(AppointmentStateMachine::new()),
        }
    }

    /// 按名称与专科搜索医生
    pub async fn search(&mut self, ctx: &AppContext, term: &str, specialization_id: Option<i64>) {
        self.search_term = term.to_string();
        self.specialization_id = specialization_id;
        self.notice.error = None;
        self.fetch_doctors(ctx).await;
    }

    async fn fetch_doctors(&mut self, ctx: &AppContext) {
        match ctx
            .api()
            .patient
            .search_doctors(&self.search_term, self.specialization_id)
            .await
        {
            Ok(doctors) => self.doctors = doctors,
            Err(e) => self.notice.fail(&e, DOCTORS_FAILED),
        }
    }

    async fn fetch_history(&mut self, ctx: &AppContext) {
        match ctx.api().patient.get_appointments().await {
            Ok(mut items) => {
                sort_history(&mut items);
                self.history = items;
            }
            Err(e) => self.notice.fail(&e, HISTORY_FAILED),
        }
    }

    /// 从搜索结果中选择医生
    pub fn select_doctor(&mut self, doctor_id: i64) -> bool {
        match self.doctors.iter().find(|d| d.id == doctor_id) {
            Some(doctor) => {
                self.selected = Some(doctor.clone());
                self.form.select_doctor(doctor_id);
                self.notice.error = None;
                true
            }
            None => false,
        }
    }

    pub fn is_cancellable(&self, item: &Appointment) -> bool {
        self.machine.is_cancellable(&item.status)
    }

    /// 提交预约，成功后重置表单并刷新历史
    pub async fn submit(&mut self, ctx: &AppContext) -> bool {
        self.notice.clear();
        let request = match self.form.validate(ctx.now()) {
            Ok(request) => request,
            Err(e) => {
                self.notice.fail(&e, BOOKING_FAILED);
                return false;
            }
        };

        match ctx.api().patient.create_appointment(&request).await {
            Ok(_) => {
                info!(
                    "Booking sent to doctor {} for {} {}",
                    request.doctor_id, request.appointment_date, request.start_time_slot
                );
                self.form.reset(ctx.today());
                self.fetch_history(ctx).await;
                self.notice.message = Some(BOOKING_SENT.to_string());
                true
            }
            Err(e) => {
                self.notice.fail(&e, BOOKING_FAILED);
                false
            }
        }
    }

    /// 取消预约，仅限待处理或已批准的预约
    pub async fn cancel(&mut self, ctx: &AppContext, id: i64) -> bool {
        self.notice.clear();
        if let Some(item) = self.history.iter().find(|item| item.id == id) {
            if let Err(e) = self.machine.transition(&item.status, AppointmentAction::Cancel) {
                debug!("Cancel refused locally: {}", e);
                self.notice.error = Some(NOT_CANCELLABLE.to_string());
                return false;
            }
        }

        match ctx.api().patient.cancel_appointment(id).await {
            Ok(()) => {
                self.fetch_history(ctx).await;
                self.notice.message = Some(BOOKING_CANCELED.to_string());
                true
            }
            Err(e) => {
                self.notice.fail(&e, CANCEL_FAILED);
                false
            }
        }
    }
}

#[async_trait]
impl Page for PatientBookings {
    async fn refresh(&mut self, ctx: &AppContext) {
        self.notice.error = None;
        self.fetch_doctors(ctx).await;
        self.fetch_history(ctx).await;
    }

    fn notice(&self) -> &Notice {
        &self.notice
    }
}

/// 医生收到的预约请求
#[derive(Debug, Clone, Default)]
pub struct DoctorBookings {
    pub requests: Vec<Appointment>,
    pub notice: Notice,
    machine: Arc<AppointmentStateMachine>,
}

impl DoctorBookings {
    /// 该行可执行的操作，已拒绝或已完成的行没有操作
    pub fn actions_for(&self, item: &Appointment) -> Vec<AppointmentAction> {
        self.machine.available_actions(&item.status, Actor::Doctor)
    }

    /// 将预约更新为目标状态
    pub async fn respond(&mut self, ctx: &AppContext, id: i64, target: AppointmentStatus) -> bool {
        self.notice.clear();

        let action = match AppointmentAction::from_target(&target) {
            Some(action) => action,
            None => {
                self.notice.error = Some(format!("Cannot set a booking to {}", target));
                return false;
            }
        };

        if let Some(item) = self.requests.iter().find(|item| item.id == id) {
            if let Err(e) = self.machine.transition(&item.status, action) {
                debug!("Status change refused locally: {}", e);
                self.notice.error = Some(format!(
                    "A {} booking cannot be changed to {}.",
                    render::status_label(&item.status),
                    render::status_label(&target)
                ));
                return false;
            }
        }

        match ctx.api().doctor_appointments.update_status(id, &target).await {
            Ok(()) => {
                info!("Booking {} set to {}", id, target);
                self.fetch_requests(ctx).await;
                self.notice.message = Some(STATUS_UPDATED.to_string());
                true
            }
            Err(e) => {
                self.notice.fail(&e, UPDATE_FAILED);
                false
            }
        }
    }

    async fn fetch_requests(&mut self, ctx: &AppContext) {
        match ctx.api().doctor_appointments.get_mine().await {
            Ok(mut items) => {
                sort_requests(&mut items);
                self.requests = items;
            }
            Err(e) => self.notice.fail(&e, REQUESTS_FAILED),
        }
    }
}

#[async_trait]
impl Page for DoctorBookings {
    async fn refresh(&mut self, ctx: &AppContext) {
        self.notice.error = None;
        self.fetch_requests(ctx).await;
    }

    fn notice(&self) -> &Notice {
        &self.notice
    }
}

impl fmt::Display for BookingsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingsPage::Patient(page) => fmt::Display::fmt(page, f),
            BookingsPage::Doctor(page) => fmt::Display::fmt(page, f),
            BookingsPage::Restricted(page) => render::restricted(f, page),
        }
    }
}

impl fmt::Display for PatientBookings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::heading(f, "Book an Appointment")?;
        render::notice(f, &self.notice)?;

        writeln!(f, "Doctors")?;
        if self.doctors.is_empty() {
            writeln!(f, "  No doctors match your search.")?;
        }
        for doctor in &self.doctors {
            let marker = if self.form.doctor_id == Some(doctor.id) { "*" } else { " " };
            writeln!(f, " {}{}", marker, render::doctor_row(doctor))?;
        }

        writeln!(f)?;
        match &self.selected {
            Some(doctor) => writeln!(f, "Selected: {}", doctor.display_name())?,
            None => writeln!(f, "Selected: -")?,
        }
        writeln!(f, "Date: {}  Time: {}", self.form.appointment_date, self.form.start_time)?;

        writeln!(f)?;
        writeln!(f, "History")?;
        if self.history.is_empty() {
            writeln!(f, "  No bookings yet.")?;
        }
        for item in &self.history {
            let actions: &[&str] = if self.is_cancellable(item) {
                &["Cancel"]
            } else {
                &[]
            };
            writeln!(f, "  {}", render::appointment_row(item, &item.doctor_label(), actions))?;
        }
        Ok(())
    }
}

impl fmt::Display for DoctorBookings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::heading(f, "Incoming Bookings")?;
        render::notice(f, &self.notice)?;
        if self.requests.is_empty() {
            writeln!(f, "No booking requests yet.")?;
        }
        for item in &self.requests {
            let labels: Vec<&str> = self.actions_for(item).iter().map(|a| a.label()).collect();
            writeln!(f, "{}", render::appointment_row(item, &item.patient_label(), &labels))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_for, spawn_backend};
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        routing::{get, patch},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Backend {
        appointments: Arc<Mutex<Vec<Value>>>,
    }

    async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let all = vec![
            json!({"id": 3, "user": {"name": "Dr. Sarah"}, "specialization": {"id": 1, "name": "General"}}),
            json!({"id": 4, "user": {"name": "Dr. Joko"}, "specialization": {"id": 2, "name": "Neurology"}}),
        ];
        let term = params.get("q").cloned().unwrap_or_default().to_lowercase();
        let filtered: Vec<Value> = all
            .into_iter()
            .filter(|d| {
                d["user"]["name"]
                    .as_str()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(&term)
            })
            .collect();
        Json(json!({"data": filtered}))
    }

    async fn list(State(backend): State<Backend>) -> Json<Value> {
        Json(json!({"data": backend.appointments.lock().unwrap().clone()}))
    }

    async fn create(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
        let mut items = backend.appointments.lock().unwrap();
        let created = json!({
            "id": items.len() as i64 + 1,
            "doctor_id": body["doctor_id"],
            "patient_id": 5,
            "appointment_date": body["appointment_date"],
            "start_time_slot": body["start_time_slot"],
            "complaint": body["complaint"],
            "status": "Pending"
        });
        items.push(created.clone());
        Json(json!({"data": created}))
    }

    async fn cancel(State(backend): State<Backend>, Path(id): Path<i64>) -> Json<Value> {
        let mut items = backend.appointments.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|a| a["id"] == json!(id)) {
            item["status"] = json!("Rejected");
        }
        Json(json!({"message": "cancelled"}))
    }

    async fn update_status(
        State(backend): State<Backend>,
        Path(id): Path<i64>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let mut items = backend.appointments.lock().unwrap();
        match items.iter_mut().find(|a| a["id"] == json!(id)) {
            Some(item) => {
                item["status"] = body["status"].clone();
                (StatusCode::OK, Json(json!({"message": "updated"})))
            }
            None => (StatusCode::NOT_FOUND, Json(json!({"message": "appointment not found"}))),
        }
    }

    fn router(backend: Backend) -> Router {
        Router::new()
            .route("/api/patient/doctors/search", get(search))
            .route("/api/patient/appointments", get(list).post(create))
            .route("/api/patient/appointments/:id/cancel", patch(cancel))
            .route("/api/doctor/appointments", get(list))
            .route("/api/doctor/appointments/:id", patch(update_status))
            .with_state(backend)
    }

    fn seeded(items: Vec<Value>) -> Backend {
        Backend {
            appointments: Arc::new(Mutex::new(items)),
        }
    }

    #[tokio::test]
    async fn test_roles_without_bookings_are_restricted() {
        for role in [Some("admin"), None] {
            let ctx = context_for("http://127.0.0.1:9/api", role);
            assert!(matches!(
                BookingsPage::load(&ctx).await,
                BookingsPage::Restricted(_)
            ));
        }
    }

    #[tokio::test]
    async fn test_patient_search_and_book() {
        let backend = seeded(Vec::new());
        let base_url = spawn_backend(router(backend.clone())).await;
        let ctx = context_for(&base_url, Some("patient"));

        let mut page = match BookingsPage::load(&ctx).await {
            BookingsPage::Patient(page) => page,
            other => panic!("unexpected page: {}", other),
        };
        assert_eq!(page.doctors.len(), 2);
        assert_eq!(page.form.appointment_date, "2026-10-18");

        page.search(&ctx, "joko", None).await;
        assert_eq!(page.doctors.len(), 1);
        assert!(page.select_doctor(4));
        assert!(!page.select_doctor(3));

        page.form.set_appointment_date("2026-10-20", ctx.today());
        page.form.set_start_time("10:30");
        page.form.set_complaint("pusing");
        assert!(page.submit(&ctx).await);
        assert_eq!(page.notice.message.as_deref(), Some(BOOKING_SENT));
        assert_eq!(page.history.len(), 1);
        assert_eq!(page.history[0].start_time_slot, "10:30");
        assert_eq!(page.form.appointment_date, "2026-10-18");
        assert!(page.form.complaint.is_empty());
    }

    #[tokio::test]
    async fn test_patient_booking_in_past_never_reaches_backend() {
        let backend = seeded(Vec::new());
        let base_url = spawn_backend(router(backend.clone())).await;
        let ctx = context_for(&base_url, Some("patient"));
        let mut page = PatientBookings::new(&ctx);
        page.refresh(&ctx).await;
        assert!(page.select_doctor(3));
        page.form.set_start_time("08:00");

        assert!(!page.submit(&ctx).await);
        assert_eq!(
            page.notice.error.as_deref(),
            Some(clinic_workflow::booking::NOT_IN_FUTURE)
        );
        assert!(backend.appointments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_patient_cancel() {
        let backend = seeded(vec![
            json!({"id": 1, "doctor_id": 3, "appointment_date": "2026-10-25", "start_time_slot": "09:00", "status": "Confirmed"}),
            json!({"id": 2, "doctor_id": 3, "appointment_date": "2026-10-02", "start_time_slot": "09:00", "status": "Completed"}),
        ]);
        let base_url = spawn_backend(router(backend.clone())).await;
        let ctx = context_for(&base_url, Some("patient"));
        let mut page = PatientBookings::new(&ctx);
        page.refresh(&ctx).await;

        assert!(page.is_cancellable(&page.history[0]));
        assert!(!page.is_cancellable(&page.history[1]));

        assert!(!page.cancel(&ctx, 2).await);
        assert_eq!(page.notice.error.as_deref(), Some(NOT_CANCELLABLE));

        assert!(page.cancel(&ctx, 1).await);
        assert_eq!(page.notice.message.as_deref(), Some(BOOKING_CANCELED));
        assert_eq!(page.history[0].status, AppointmentStatus::Rejected);
        assert!(page.to_string().contains("Rejected"));
    }

    #[tokio::test]
    async fn test_doctor_respond() {
        let backend = seeded(vec![
            json!({"id": 1, "patient_id": 5, "appointment_date": "2026-10-25", "start_time_slot": "09:00", "status": "Pending", "patient": {"name": "Budi"}}),
            json!({"id": 2, "patient_id": 6, "appointment_date": "2026-10-20", "start_time_slot": "09:00", "status": "Completed"}),
        ]);
        let base_url = spawn_backend(router(backend.clone())).await;
        let ctx = context_for(&base_url, Some("doctor"));

        let mut page = match BookingsPage::load(&ctx).await {
            BookingsPage::Doctor(page) => page,
            other => panic!("unexpected page: {}", other),
        };
        assert_eq!(page.requests[0].id, 1);
        assert_eq!(page.actions_for(&page.requests[0]).len(), 3);
        assert!(page.actions_for(&page.requests[1]).is_empty());

        assert!(page.respond(&ctx, 1, AppointmentStatus::Confirmed).await);
        assert_eq!(page.notice.message.as_deref(), Some(STATUS_UPDATED));
        assert_eq!(page.requests[0].status, AppointmentStatus::Confirmed);
        assert_eq!(
            page.actions_for(&page.requests[0]),
            vec![AppointmentAction::Reject, AppointmentAction::Complete]
        );

        assert!(!page.respond(&ctx, 2, AppointmentStatus::Rejected).await);
        assert!(!page.respond(&ctx, 1, AppointmentStatus::Pending).await);
        assert!(page.to_string().contains("Budi"));
    }
}
