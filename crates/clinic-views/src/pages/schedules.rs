//! 医生排班

use super::{Notice, Page, Restricted};
use crate::context::AppContext;
use crate::render;
use crate::role::ViewRole;
use async_trait::async_trait;
use clinic_core::Schedule;
use clinic_workflow::ScheduleForm;
use std::fmt;
use tracing::info;

const LOAD_FAILED: &str = "Failed to load schedules";
const SAVE_FAILED: &str = "Failed to save schedule";
const DELETE_FAILED: &str = "Failed to delete schedule";

pub const DOCTOR_ONLY: Restricted = Restricted::new(
    "Doctor Only",
    "Only doctors can manage practice schedules.",
);

#[derive(Debug, Clone)]
pub enum SchedulesPage {
    Restricted(Restricted),
    Builder(ScheduleBuilder),
}

impl SchedulesPage {
    pub async fn load(ctx: &AppContext) -> Self {
        match ctx.role() {
            ViewRole::Doctor => {
                let mut builder = ScheduleBuilder::default();
                builder.refresh(ctx).await;
                SchedulesPage::Builder(builder)
            }
            _ => SchedulesPage::Restricted(DOCTOR_ONLY),
        }
    }
}

/// 排班列表与编辑表单
#[derive(Debug, Clone, Default)]
pub struct ScheduleBuilder {
    pub schedules: Vec<Schedule>,
    pub form: ScheduleForm,
    pub editing: Option<i64>,
    pub notice: Notice,
}

impl ScheduleBuilder {
    pub fn start_create(&mut self) {
        self.form = ScheduleForm::default();
        self.editing = None;
        self.notice.clear();
    }

    pub fn start_edit(&mut self, id: i64) -> bool {
        match self.schedules.iter().find(|s| s.id == id) {
            Some(schedule) => {
                self.form = ScheduleForm::from_schedule(schedule);
                self.editing = Some(id);
                self.notice.clear();
                true
            }
            None => false,
        }
    }

    pub async fn submit(&mut self, ctx: &AppContext) -> bool {
        self.notice.clear();
        let request = match self.form.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.notice.fail(&e, SAVE_FAILED);
                return false;
            }
        };

        let api = &ctx.api().schedules;
        let result = match self.editing {
            Some(id) => api.update(id, &request).await,
            None => api.create(&request).await,
        };

        match result {
            Ok(_) => {
                info!(
                    "Schedule saved: {} {}-{}",
                    request.work_day, request.start_time, request.end_time
                );
                self.start_create();
                self.refresh(ctx).await;
                if self.notice.is_ok() {
                    self.notice.succeed("Schedule saved.");
                }
                true
            }
            Err(e) => {
                self.notice.fail(&e, SAVE_FAILED);
                false
            }
        }
    }

    pub async fn delete(&mut self, ctx: &AppContext, id: i64) -> bool {
        self.notice.clear();
        match ctx.api().schedules.remove(id).await {
            Ok(()) => {
                self.refresh(ctx).await;
                if self.notice.is_ok() {
                    self.notice.succeed("Schedule deleted.");
                }
                true
            }
            Err(e) => {
                self.notice.fail(&e, DELETE_FAILED);
                false
            }
        }
    }
}

#[async_trait]
impl Page for ScheduleBuilder {
    async fn refresh(&mut self, ctx: &AppContext) {
        self.notice.error = None;
        match ctx.api().schedules.list().await {
            Ok(mut schedules) => {
                schedules.sort_by_key(|s| (s.work_day as u8, s.start_time.clone(), s.id));
                self.schedules = schedules;
            }
            Err(e) => self.notice.fail(&e, LOAD_FAILED),
        }
    }

    fn notice(&self) -> &Notice {
        &self.notice
    }
}

impl fmt::Display for SchedulesPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulesPage::Restricted(page) => render::restricted(f, page),
            SchedulesPage::Builder(builder) => fmt::Display::fmt(builder, f),
        }
    }
}

impl fmt::Display for ScheduleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::heading(f, "Practice Schedules")?;
        render::notice(f, &self.notice)?;
        if self.schedules.is_empty() {
            writeln!(f, "No schedules yet.")?;
        }
        for schedule in &self.schedules {
            writeln!(f, "{}", render::schedule_row(schedule))?;
        }
        Ok(())
    }
}
