//! 命令行参数定义

use clap::{Args as ClapArgs, Parser, Subcommand};
use clinic_workflow::{DoctorForm, ScheduleForm};

/// 诊所客户端命令行
#[derive(Parser, Debug)]
#[command(name = "clinic")]
#[command(about = "Clinic appointment client: sign in, manage doctors, schedules and bookings")]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 登录并保存会话
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// 注册新账号
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// admin、doctor 或 patient，缺省由后端决定
        #[arg(short, long)]
        role: Option<String>,
    },
    /// 清除本地会话
    Logout,
    /// 显示当前角色与菜单
    Whoami,
    /// 打开任意路由，例如 /bookings
    Open { path: String },
    /// 仪表盘
    Dashboard,
    /// 医生目录（管理员）
    Doctors {
        #[command(subcommand)]
        action: DoctorCommand,
    },
    /// 搜索医生（患者）
    Search {
        query: Option<String>,
        #[arg(short, long)]
        specialization: Option<i64>,
    },
    /// 预约医生（患者）
    Book {
        doctor_id: i64,
        /// YYYY-MM-DD，缺省为今天
        #[arg(short, long)]
        date: Option<String>,
        /// HH:MM
        #[arg(short, long, default_value = "09:00")]
        time: String,
        #[arg(long, default_value = "")]
        complaint: String,
    },
    /// 预约列表，按角色显示历史或收到的请求
    Bookings,
    /// 取消预约（患者）
    Cancel { id: i64 },
    /// 更新预约状态（医生），接受 approve、reject、complete 等别名
    Respond { id: i64, status: String },
    /// 排班（医生）
    Schedules {
        #[command(subcommand)]
        action: ScheduleCommand,
    },
    /// 个人资料
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    /// 持续输出会话变化
    Watch,
    /// 配置文件
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum DoctorCommand {
    List,
    Add(DoctorFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: DoctorFields,
    },
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    List,
    Add(ScheduleFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: ScheduleFields,
    },
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    Update(DoctorFields),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 写出默认配置
    Init {
        #[arg(short, long, default_value = "clinic.toml")]
        path: String,
        #[arg(short, long)]
        force: bool,
    },
}

/// 医生表单字段，未给出的字段保持原值
#[derive(ClapArgs, Debug, Default)]
pub struct DoctorFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub specialization: Option<String>,
    /// male 或 female
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub license: Option<String>,
}

impl DoctorFields {
    pub fn apply(&self, form: &mut DoctorForm) {
        let fields = [
            (&self.name, &mut form.name),
            (&self.email, &mut form.email),
            (&self.specialization, &mut form.specialization_id),
            (&self.gender, &mut form.gender),
            (&self.address, &mut form.address),
            (&self.license, &mut form.license_number),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
    }
}

/// 排班表单字段，未给出的字段保持原值
#[derive(ClapArgs, Debug, Default)]
pub struct ScheduleFields {
    #[arg(long)]
    pub day: Option<String>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub quota: Option<String>,
}

impl ScheduleFields {
    pub fn apply(&self, form: &mut ScheduleForm) {
        let fields = [
            (&self.day, &mut form.work_day),
            (&self.start, &mut form.start_time),
            (&self.end, &mut form.end_time),
            (&self.quota, &mut form.patient_quota),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
    }
}
