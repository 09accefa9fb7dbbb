//! 个人资料
//!
//! 医生可查看并更新自己的执业档案，其他已登录角色只显示账号信息。

use super::{Notice, Page, Restricted};
use crate::context::AppContext;
use crate::render;
use crate::role::ViewRole;
use async_trait::async_trait;
use clinic_core::{Doctor, User};
use clinic_workflow::DoctorForm;
use std::fmt;
use tracing::info;

const LOAD_FAILED: &str = "Failed to load profile";
const SAVE_FAILED: &str = "Failed to update profile";

pub const SIGNED_OUT: Restricted = Restricted::new("Signed Out", "Sign in to view your profile.");

#[derive(Debug, Clone)]
pub enum ProfilePage {
    Doctor(DoctorProfile),
    Account(AccountProfile),
    Restricted(Restricted),
}

impl ProfilePage {
    pub async fn load(ctx: &AppContext) -> Self {
        match (ctx.role(), ctx.user()) {
            (ViewRole::Doctor, _) => {
                let mut page = DoctorProfile::default();
                page.refresh(ctx).await;
                ProfilePage::Doctor(page)
            }
            (ViewRole::Guest, _) | (_, None) => ProfilePage::Restricted(SIGNED_OUT),
            (role, Some(user)) => ProfilePage::Account(AccountProfile { user, role }),
        }
    }
}

/// 账号信息
#[derive(Debug, Clone, PartialEq)]
pub struct AccountProfile {
    pub user: User,
    pub role: ViewRole,
}

/// 医生执业档案
#[derive(Debug, Clone, Default)]
pub struct DoctorProfile {
    pub profile: Option<Doctor>,
    pub form: DoctorForm,
    pub notice: Notice,
}

impl DoctorProfile {
    pub async fn update(&mut self, ctx: &AppContext) -> bool {
        self.notice.clear();
        let request = match self.form.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.notice.fail(&e, SAVE_FAILED);
                return false;
            }
        };

        match ctx.api().profile.update(&request).await {
            Ok(updated) => {
                info!("Doctor profile updated");
                match updated {
                    Some(profile) => self.apply(profile),
                    None => self.refresh(ctx).await,
                }
                if self.notice.is_ok() {
                    self.notice.succeed("Profile updated.");
                }
                true
            }
            Err(e) => {
                self.notice.fail(&e, SAVE_FAILED);
                false
            }
        }
    }

    fn apply(&mut self, profile: Doctor) {
        self.form = DoctorForm::from_doctor(&profile);
        self.profile = Some(profile);
    }
}

#[async_trait]
impl Page for DoctorProfile {
    async fn refresh(&mut self, ctx: &AppContext) {
        self.notice.error = None;
        match ctx.api().profile.get_mine().await {
            Ok(Some(profile)) => self.apply(profile),
            Ok(None) => self.profile = None,
            Err(e) => self.notice.fail(&e, LOAD_FAILED),
        }
    }

    fn notice(&self) -> &Notice {
        &self.notice
    }
}

impl fmt::Display for ProfilePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfilePage::Doctor(page) => fmt::Display::fmt(page, f),
            ProfilePage::Account(account) => {
                render::heading(f, "Account")?;
                writeln!(f, "Name:  {}", account.user.name)?;
                writeln!(f, "Email: {}", account.user.email)?;
                writeln!(f, "Role:  {}", account.role)
            }
            ProfilePage::Restricted(page) => render::restricted(f, page),
        }
    }
}

impl fmt::Display for DoctorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::heading(f, "Doctor Profile")?;
        render::notice(f, &self.notice)?;
        match &self.profile {
            Some(doctor) => {
                let email = doctor.user.as_ref().map(|u| u.email.as_str()).unwrap_or("-");
                writeln!(f, "Name:           {}", doctor.display_name())?;
                writeln!(f, "Email:          {}", email)?;
                writeln!(f, "Specialization: {}", doctor.specialization_label())?;
                writeln!(f, "Gender:         {}", doctor.gender)?;
                writeln!(f, "Address:        {}", doctor.address)?;
                writeln!(f, "License:        {}", doctor.license_number)
            }
            None => writeln!(f, "No practice profile yet."),
        }
    }
}
