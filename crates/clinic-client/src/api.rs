//! 后端接口分组
//!
//! 每组接口对应后端的一组REST路由，业务规则（配额、冲突检测）均在后端。

use clinic_core::{
    Appointment, AppointmentRequest, AppointmentStatus, AppointmentStatusUpdate, Doctor,
    DoctorRequest, LoginRequest, LoginResponse, RegisterRequest, Result, Schedule,
    ScheduleRequest, Session, User,
};
use reqwest::Method;
use serde_json::Value;
use tracing::info;

use crate::envelope::{data_or_none, ensure_array, message_of, unwrap_data};
use crate::http::{ApiClient, RequestOptions};

/// 认证接口
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

/// 注册结果
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    /// 后端同时签发令牌时才有会话
    pub session: Option<Session>,
    pub message: Option<String>,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 登录并保存会话
    pub async fn login(&self, request: &LoginRequest) -> Result<Session> {
        let payload = self.client.send_json(Method::POST, "/login", request).await?;
        let response: LoginResponse = serde_json::from_value(unwrap_data(payload))?;
        let session = Session::from(response);
        self.client.session().save(&session);
        info!(user_id = session.user.id, "Signed in");
        Ok(session)
    }

    /// 注册，若响应携带令牌则同时保存会话
    pub async fn register(&self, request: &RegisterRequest) -> Result<Registration> {
        let payload = self.client.send_json(Method::POST, "/register", request).await?;
        let message = message_of(&payload);
        let data = unwrap_data(payload);

        if data.get("token").and_then(Value::as_str).is_some() {
            let response: LoginResponse = serde_json::from_value(data)?;
            let session = Session::from(response);
            self.client.session().save(&session);
            return Ok(Registration {
                user: session.user.clone(),
                session: Some(session),
                message,
            });
        }

        let user = if data.is_object() {
            serde_json::from_value(data)?
        } else {
            User::default()
        };
        Ok(Registration {
            user,
            session: None,
            message,
        })
    }

    pub fn logout(&self) {
        self.client.session().clear();
    }
}

/// 医生个人档案接口
#[derive(Clone)]
pub struct DoctorProfileApi {
    client: ApiClient,
}

impl DoctorProfileApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_mine(&self) -> Result<Option<Doctor>> {
        data_or_none(self.client.get("/doctor/profile").await?)
    }

    pub async fn update(&self, request: &DoctorRequest) -> Result<Option<Doctor>> {
        data_or_none(
            self.client
                .send_json(Method::PUT, "/doctor/profile", request)
                .await?,
        )
    }
}

/// 患者接口
#[derive(Clone)]
pub struct PatientApi {
    client: ApiClient,
}

impl PatientApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 搜索医生，查询词为空时不带 `q` 参数
    pub async fn search_doctors(
        &self,
        query: &str,
        specialization_id: Option<i64>,
    ) -> Result<Vec<Doctor>> {
        let mut options = RequestOptions::new(Method::GET);
        let query = query.trim();
        if !query.is_empty() {
            options = options.query("q", query);
        }
        if let Some(id) = specialization_id {
            options = options.query("specialization_id", id.to_string());
        }
        let payload = self.client.request("/patient/doctors/search", options).await?;
        ensure_array(unwrap_data(payload))
    }

    pub async fn doctor_schedules(&self, doctor_id: i64) -> Result<Vec<Schedule>> {
        let payload = self
            .client
            .get(&format!("/patient/doctors/{}/schedules", doctor_id))
            .await?;
        ensure_array(unwrap_data(payload))
    }

    pub async fn get_appointments(&self) -> Result<Vec<Appointment>> {
        let payload = self.client.get("/patient/appointments").await?;
        ensure_array(unwrap_data(payload))
    }

    pub async fn get_appointment(&self, id: i64) -> Result<Option<Appointment>> {
        data_or_none(
            self.client
                .get(&format!("/patient/appointments/{}", id))
                .await?,
        )
    }

    pub async fn create_appointment(&self, request: &AppointmentRequest) -> Result<Option<Appointment>> {
        let payload = self
            .client
            .send_json(Method::POST, "/patient/appointments", request)
            .await?;
        // 创建接口的data形状不稳定，解析失败不视为预约失败
        Ok(data_or_none(payload).unwrap_or(None))
    }

    pub async fn cancel_appointment(&self, id: i64) -> Result<()> {
        self.client
            .send_empty(Method::PATCH, &format!("/patient/appointments/{}/cancel", id))
            .await?;
        Ok(())
    }
}

/// 医生预约审批接口
#[derive(Clone)]
pub struct DoctorAppointmentApi {
    client: ApiClient,
}

impl DoctorAppointmentApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_mine(&self) -> Result<Vec<Appointment>> {
        let payload = self.client.get("/doctor/appointments").await?;
        ensure_array(unwrap_data(payload))
    }

    pub async fn update_status(&self, id: i64, status: &AppointmentStatus) -> Result<()> {
        let body = AppointmentStatusUpdate {
            status: status.clone(),
        };
        self.client
            .send_json(Method::PATCH, &format!("/doctor/appointments/{}", id), &body)
            .await?;
        Ok(())
    }
}

/// 管理员医生目录接口
#[derive(Clone)]
pub struct AdminDoctorApi {
    client: ApiClient,
}

impl AdminDoctorApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Doctor>> {
        let payload = self.client.get("/admin/doctors").await?;
        ensure_array(unwrap_data(payload))
    }

    pub async fn create(&self, request: &DoctorRequest) -> Result<Option<Doctor>> {
        data_or_none(
            self.client
                .send_json(Method::POST, "/admin/doctors", request)
                .await?,
        )
    }

    pub async fn update(&self, id: i64, request: &DoctorRequest) -> Result<Option<Doctor>> {
        data_or_none(
            self.client
                .send_json(Method::PUT, &format!("/admin/doctors/{}", id), request)
                .await?,
        )
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.client
            .send_empty(Method::DELETE, &format!("/admin/doctors/{}", id))
            .await?;
        Ok(())
    }
}

/// 医生排班接口
#[derive(Clone)]
pub struct ScheduleApi {
    client: ApiClient,
}

impl ScheduleApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Schedule>> {
        let payload = self.client.get("/doctor/schedules").await?;
        ensure_array(unwrap_data(payload))
    }

    pub async fn create(&self, request: &ScheduleRequest) -> Result<Option<Schedule>> {
        data_or_none(
            self.client
                .send_json(Method::POST, "/doctor/schedules", request)
                .await?,
        )
    }

    pub async fn update(&self, id: i64, request: &ScheduleRequest) -> Result<Option<Schedule>> {
        data_or_none(
            self.client
                .send_json(Method::PUT, &format!("/doctor/schedules/{}", id), request)
                .await?,
        )
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.client
            .send_empty(Method::DELETE, &format!("/doctor/schedules/{}", id))
            .await?;
        Ok(())
    }
}

/// 全部接口分组
#[derive(Clone)]
pub struct ClinicApi {
    pub auth: AuthApi,
    pub profile: DoctorProfileApi,
    pub patient: PatientApi,
    pub doctor_appointments: DoctorAppointmentApi,
    pub admin_doctors: AdminDoctorApi,
    pub schedules: ScheduleApi,
    client: ApiClient,
}

impl ClinicApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            profile: DoctorProfileApi::new(client.clone()),
            patient: PatientApi::new(client.clone()),
            doctor_appointments: DoctorAppointmentApi::new(client.clone()),
            admin_doctors: AdminDoctorApi::new(client.clone()),
            schedules: ScheduleApi::new(client.clone()),
            client,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}
