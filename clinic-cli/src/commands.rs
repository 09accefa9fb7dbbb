//! 命令执行

use crate::cli::{Command, ConfigCommand, DoctorCommand, ProfileCommand, ScheduleCommand};
use anyhow::{anyhow, bail, Result};
use clinic_config::ClinicConfig;
use clinic_core::{AppointmentStatus, UserRole};
use clinic_session::{ChangeOrigin, SessionChange};
use clinic_views::pages::{
    BookingsPage, DashboardPage, DoctorDirectory, DoctorsPage, PatientBookings, ProfilePage,
    ScheduleBuilder, SchedulesPage,
};
use clinic_views::{open, render_menu, AppContext, Notice, Restricted, Route};
use clinic_workflow::{login_request, register_request};
use std::fmt::Display;
use tracing::info;

/// 输出页面，操作失败时以页面内联错误退出
fn finish(page: &impl Display, ok: bool, notice: &Notice) -> Result<()> {
    print!("{}", page);
    if ok {
        Ok(())
    } else {
        Err(anyhow!(notice
            .error
            .clone()
            .unwrap_or_else(|| "Request failed".to_string())))
    }
}

fn restricted(page: &Restricted) -> anyhow::Error {
    anyhow!("{}: {}", page.title, page.detail)
}

async fn admin_directory(ctx: &AppContext) -> Result<DoctorDirectory> {
    match DoctorsPage::load(ctx).await {
        DoctorsPage::Directory(directory) => Ok(directory),
        DoctorsPage::Restricted(page) => Err(restricted(&page)),
    }
}

async fn schedule_builder(ctx: &AppContext) -> Result<ScheduleBuilder> {
    match SchedulesPage::load(ctx).await {
        SchedulesPage::Builder(builder) => Ok(builder),
        SchedulesPage::Restricted(page) => Err(restricted(&page)),
    }
}

async fn patient_bookings(ctx: &AppContext) -> Result<PatientBookings> {
    match BookingsPage::load(ctx).await {
        BookingsPage::Patient(page) => Ok(page),
        BookingsPage::Doctor(_) => bail!("This action is only available to patients"),
        BookingsPage::Restricted(page) => Err(restricted(&page)),
    }
}

pub async fn run(command: Command, ctx: &AppContext, config: &ClinicConfig) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let request = login_request(&email, &password)?;
            let session = ctx.api().auth.login(&request).await?;
            println!("Signed in as {} ({})", session.user.name, session.user.role);
            println!("{}", render_menu(ctx.role(), Route::Dashboard));
            Ok(())
        }

        Command::Register {
            name,
            email,
            password,
            role,
        } => {
            let role = role.map(|r| r.parse::<UserRole>()).transpose()?;
            let request = register_request(&name, &email, &password, role)?;
            let registration = ctx.api().auth.register(&request).await?;
            match registration.session {
                Some(session) => println!("Signed in as {} ({})", session.user.name, session.user.role),
                None => println!(
                    "{}",
                    registration
                        .message
                        .unwrap_or_else(|| "Account created. Please sign in.".to_string())
                ),
            }
            Ok(())
        }

        Command::Logout => {
            ctx.api().auth.logout();
            println!("Signed out.");
            Ok(())
        }

        Command::Whoami => {
            match ctx.user() {
                Some(user) => println!("{} <{}> as {}", user.name, user.email, ctx.role()),
                None => println!("Not signed in ({})", ctx.role()),
            }
            println!("{}", render_menu(ctx.role(), Route::Dashboard));
            Ok(())
        }

        Command::Open { path } => {
            let route = Route::from_path(&path).ok_or_else(|| anyhow!("Unknown route: {}", path))?;
            let view = open(ctx, route).await;
            if view.route() != route {
                println!("Redirected to {}", view.route());
            }
            print!("{}", view);
            Ok(())
        }

        Command::Dashboard => {
            let page = DashboardPage::load(ctx).await;
            let ok = page.notice.is_ok();
            finish(&page, ok, &page.notice)
        }

        Command::Doctors { action } => run_doctors(action, ctx).await,

        Command::Search {
            query,
            specialization,
        } => {
            let mut page = patient_bookings(ctx).await?;
            page.search(ctx, query.as_deref().unwrap_or(""), specialization)
                .await;
            let ok = page.notice.is_ok();
            finish(&page, ok, &page.notice)
        }

        Command::Book {
            doctor_id,
            date,
            time,
            complaint,
        } => {
            let mut page = patient_bookings(ctx).await?;
            if !page.select_doctor(doctor_id) {
                bail!("Doctor #{} not found", doctor_id);
            }
            if let Some(date) = date {
                page.form.appointment_date = date.trim().to_string();
            }
            page.form.start_time = time.trim().to_string();
            page.form.set_complaint(&complaint);
            let ok = page.submit(ctx).await;
            finish(&page, ok, &page.notice)
        }

        Command::Bookings => {
            let page = BookingsPage::load(ctx).await;
            match &page {
                BookingsPage::Restricted(restricted_page) => Err(restricted(restricted_page)),
                BookingsPage::Patient(inner) => finish(&page, inner.notice.is_ok(), &inner.notice),
                BookingsPage::Doctor(inner) => finish(&page, inner.notice.is_ok(), &inner.notice),
            }
        }

        Command::Cancel { id } => {
            let mut page = patient_bookings(ctx).await?;
            let ok = page.cancel(ctx, id).await;
            finish(&page, ok, &page.notice)
        }

        Command::Respond { id, status } => {
            let target = AppointmentStatus::normalize(&status).ok_or_else(|| {
                anyhow!("Unknown status: {} (use approve, reject or complete)", status)
            })?;
            let mut page = match BookingsPage::load(ctx).await {
                BookingsPage::Doctor(page) => page,
                BookingsPage::Patient(_) => bail!("This action is only available to doctors"),
                BookingsPage::Restricted(page) => return Err(restricted(&page)),
            };
            let ok = page.respond(ctx, id, target).await;
            finish(&page, ok, &page.notice)
        }

        Command::Schedules { action } => run_schedules(action, ctx).await,

        Command::Profile { action } => run_profile(action, ctx).await,

        Command::Watch => watch(ctx, config).await,

        // 在加载配置前已处理
        Command::Config { .. } => Ok(()),
    }
}

async fn run_doctors(action: DoctorCommand, ctx: &AppContext) -> Result<()> {
    let mut directory = admin_directory(ctx).await?;
    let ok = match action {
        DoctorCommand::List => directory.notice.is_ok(),
        DoctorCommand::Add(fields) => {
            directory.start_create();
            fields.apply(&mut directory.form);
            directory.submit(ctx).await
        }
        DoctorCommand::Update { id, fields } => {
            if !directory.start_edit(id) {
                bail!("Doctor #{} not found", id);
            }
            fields.apply(&mut directory.form);
            directory.submit(ctx).await
        }
        DoctorCommand::Delete { id } => directory.delete(ctx, id).await,
    };
    finish(&directory, ok, &directory.notice)
}

async fn run_schedules(action: ScheduleCommand, ctx: &AppContext) -> Result<()> {
    let mut builder = schedule_builder(ctx).await?;
    let ok = match action {
        ScheduleCommand::List => builder.notice.is_ok(),
        ScheduleCommand::Add(fields) => {
            builder.start_create();
            fields.apply(&mut builder.form);
            builder.submit(ctx).await
        }
        ScheduleCommand::Update { id, fields } => {
            if !builder.start_edit(id) {
                bail!("Schedule #{} not found", id);
            }
            fields.apply(&mut builder.form);
            builder.submit(ctx).await
        }
        ScheduleCommand::Delete { id } => builder.delete(ctx, id).await,
    };
    finish(&builder, ok, &builder.notice)
}

async fn run_profile(action: ProfileCommand, ctx: &AppContext) -> Result<()> {
    let page = ProfilePage::load(ctx).await;
    match (action, page) {
        (_, ProfilePage::Restricted(page)) => Err(restricted(&page)),
        (ProfileCommand::Show, ProfilePage::Doctor(profile)) => {
            finish(&profile, profile.notice.is_ok(), &profile.notice)
        }
        (ProfileCommand::Show, page @ ProfilePage::Account(_)) => {
            print!("{}", page);
            Ok(())
        }
        (ProfileCommand::Update(fields), ProfilePage::Doctor(mut profile)) => {
            fields.apply(&mut profile.form);
            let ok = profile.update(ctx).await;
            finish(&profile, ok, &profile.notice)
        }
        (ProfileCommand::Update(_), ProfilePage::Account(_)) => {
            bail!("Only doctors have an editable practice profile")
        }
    }
}

/// 持续输出会话变化，Ctrl-C 退出
async fn watch(ctx: &AppContext, config: &ClinicConfig) -> Result<()> {
    let mut events = ctx.session().subscribe();
    let handle = ctx.session().spawn_watch(config.session.watch_interval());
    info!(
        "Watching session key '{}' every {:?}",
        ctx.session().key(),
        config.session.watch_interval()
    );
    println!("Signed in as: {}", ctx.role());

    loop {
        tokio::select! {
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };
                let origin = match event.origin {
                    ChangeOrigin::Local => "this process",
                    ChangeOrigin::External => "another process",
                };
                match event.change {
                    SessionChange::SignedIn(session) => println!(
                        "[{}] signed in as {} ({}) from {}",
                        event.at.format("%H:%M:%S"),
                        session.user.name,
                        session.user.role,
                        origin
                    ),
                    SessionChange::SignedOut => println!(
                        "[{}] signed out from {}",
                        event.at.format("%H:%M:%S"),
                        origin
                    ),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.abort();
    Ok(())
}

/// 写出默认配置文件
pub async fn init_config(action: ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Init { path, force } => {
            if !force && tokio::fs::try_exists(&path).await.unwrap_or(false) {
                bail!("{} already exists (use --force to overwrite)", path);
            }
            ClinicConfig::default().save(&path).await?;
            println!("Wrote default configuration to {}", path);
            Ok(())
        }
    }
}
