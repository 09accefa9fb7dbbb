//! 医生目录（仅管理员）

use super::{Notice, Page, Restricted};
use crate::context::AppContext;
use crate::render;
use crate::role::ViewRole;
use async_trait::async_trait;
use clinic_core::Doctor;
use clinic_workflow::DoctorForm;
use std::fmt;
use tracing::info;

const LOAD_FAILED: &str = "Failed to load doctors";
const SAVE_FAILED: &str = "Failed to save doctor";
const DELETE_FAILED: &str = "Failed to delete doctor";

pub const ADMIN_ONLY: Restricted = Restricted::new(
    "Admin Only",
    "Only administrators can manage doctors. Please log in with an admin account.",
);

/// 医生目录页面
#[derive(Debug, Clone)]
pub enum DoctorsPage {
    Restricted(Restricted),
    Directory(DoctorDirectory),
}

impl DoctorsPage {
    pub async fn load(ctx: &AppContext) -> Self {
        match ctx.role() {
            ViewRole::Admin => {
                let mut directory = DoctorDirectory::default();
                directory.refresh(ctx).await;
                DoctorsPage::Directory(directory)
            }
            _ => DoctorsPage::Restricted(ADMIN_ONLY),
        }
    }
}

/// 管理员的医生列表与表单
#[derive(Debug, Clone, Default)]
pub struct DoctorDirectory {
    pub doctors: Vec<Doctor>,
    pub form: DoctorForm,
    /// 正在编辑的医生ID，`None` 表示新建
    pub editing: Option<i64>,
    pub notice: Notice,
}

impl DoctorDirectory {
    pub fn start_create(&mut self) {
        self.editing = None;
        self.form = DoctorForm::default();
        self.notice.clear();
    }

    /// 编辑列表中的医生，找不到时返回false
    pub fn start_edit(&mut self, id: i64) -> bool {
        match self.doctors.iter().find(|d| d.id == id) {
            Some(doctor) => {
                self.form = DoctorForm::from_doctor(doctor);
                self.editing = Some(id);
                self.notice.clear();
                true
            }
            None => false,
        }
    }

    /// 提交表单，成功后重置表单并刷新列表
    pub async fn submit(&mut self, ctx: &AppContext) -> bool {
        self.notice.clear();
        let request = match self.form.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.notice.fail(&e, SAVE_FAILED);
                return false;
            }
        };

        let api = &ctx.api().admin_doctors;
        let result = match self.editing {
            Some(id) => api.update(id, &request).await,
            None => api.create(&request).await,
        };

        match result {
            Ok(_) => {
                let message = if self.editing.is_some() {
                    "Doctor updated."
                } else {
                    "Doctor created."
                };
                info!("{} ({})", message, request.email);
                self.form = DoctorForm::default();
                self.editing = None;
                self.refresh(ctx).await;
                if self.notice.is_ok() {
                    self.notice.succeed(message);
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
        match ctx.api().admin_doctors.remove(id).await {
            Ok(()) => {
                if self.editing == Some(id) {
                    self.start_create();
                }
                self.refresh(ctx).await;
                if self.notice.is_ok() {
                    self.notice.succeed("Doctor deleted.");
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
impl Page for DoctorDirectory {
    async fn refresh(&mut self, ctx: &AppContext) {
        self.notice.error = None;
        match ctx.api().admin_doctors.list().await {
            Ok(doctors) => self.doctors = doctors,
            Err(e) => self.notice.fail(&e, LOAD_FAILED),
        }
    }

    fn notice(&self) -> &Notice {
        &self.notice
    }
}

impl fmt::Display for DoctorsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoctorsPage::Restricted(page) => render::restricted(f, page),
            DoctorsPage::Directory(directory) => fmt::Display::fmt(directory, f),
        }
    }
}

impl fmt::Display for DoctorDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::heading(f, "Doctors")?;
        render::notice(f, &self.notice)?;
        if self.doctors.is_empty() {
            writeln!(f, "No doctors registered yet.")?;
        }
        for doctor in &self.doctors {
            writeln!(f, "{}", render::doctor_row(doctor))?;
        }
        if let Some(id) = self.editing {
            writeln!(f, "Editing doctor #{}", id)?;
        }
        Ok(())
    }
}
