//! 预约状态机
//!
//! 客户端镜像的预约生命周期，仅用于决定展示哪些操作，最终以后端为准。

use clinic_core::{AppointmentStatus, ClinicError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 操作发起方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    Doctor,
    Patient,
}

/// 预约操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentAction {
    Confirm,
    Reject,
    Complete,
    Cancel,
}

impl AppointmentAction {
    pub const ALL: [AppointmentAction; 4] = [
        AppointmentAction::Confirm,
        AppointmentAction::Reject,
        AppointmentAction::Complete,
        AppointmentAction::Cancel,
    ];

    pub fn actor(&self) -> Actor {
        match self {
            AppointmentAction::Cancel => Actor::Patient,
            _ => Actor::Doctor,
        }
    }

    /// 医生操作对应的目标状态
    pub fn from_target(status: &AppointmentStatus) -> Option<Self> {
        match status {
            AppointmentStatus::Confirmed => Some(AppointmentAction::Confirm),
            AppointmentStatus::Rejected => Some(AppointmentAction::Reject),
            AppointmentStatus::Completed => Some(AppointmentAction::Complete),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentAction::Confirm => "Approve",
            AppointmentAction::Reject => "Reject",
            AppointmentAction::Complete => "Done",
            AppointmentAction::Cancel => "Cancel",
        }
    }
}

/// 预约状态机
#[derive(Debug)]
pub struct AppointmentStateMachine {
    transitions: HashMap<(AppointmentStatus, AppointmentAction), AppointmentStatus>,
}

impl AppointmentStateMachine {
    pub fn new() -> Self {
        use AppointmentAction::*;
        use AppointmentStatus::*;

        let mut transitions = HashMap::new();

        // 医生审批
        transitions.insert((Pending, Confirm), Confirmed);
        transitions.insert((Pending, Reject), Rejected);
        transitions.insert((Pending, Complete), Completed);
        transitions.insert((Confirmed, Reject), Rejected);
        transitions.insert((Confirmed, Complete), Completed);

        // 患者取消，后端将其记为 Rejected
        transitions.insert((Pending, Cancel), Rejected);
        transitions.insert((Confirmed, Cancel), Rejected);

        Self { transitions }
    }

    pub fn can_perform(&self, from: &AppointmentStatus, action: AppointmentAction) -> bool {
        self.transitions.contains_key(&(from.clone(), action))
    }

    /// 执行状态转换
    pub fn transition(
        &self,
        from: &AppointmentStatus,
        action: AppointmentAction,
    ) -> Result<AppointmentStatus> {
        match self.transitions.get(&(from.clone(), action)) {
            Some(to) => Ok(to.clone()),
            None => Err(ClinicError::InvalidStateTransition {
                from: from.to_string(),
                action: format!("{:?}", action),
            }),
        }
    }

    /// 某一方在当前状态下可执行的操作，顺序固定
    pub fn available_actions(&self, current: &AppointmentStatus, actor: Actor) -> Vec<AppointmentAction> {
        AppointmentAction::ALL
            .iter()
            .copied()
            .filter(|action| action.actor() == actor && self.can_perform(current, *action))
            .collect()
    }

    pub fn is_cancellable(&self, status: &AppointmentStatus) -> bool {
        self.can_perform(status, AppointmentAction::Cancel)
    }

    /// 状态是否已终结（任何一方都无操作可做）
    pub fn is_terminal(&self, status: &AppointmentStatus) -> bool {
        AppointmentAction::ALL
            .iter()
            .all(|action| !self.can_perform(status, *action))
    }
}

impl Default for AppointmentStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctor_actions() {
        let sm = AppointmentStateMachine::new();

        assert_eq!(
            sm.available_actions(&AppointmentStatus::Pending, Actor::Doctor),
            vec![
                AppointmentAction::Confirm,
                AppointmentAction::Reject,
                AppointmentAction::Complete
            ]
        );
        assert_eq!(
            sm.available_actions(&AppointmentStatus::Confirmed, Actor::Doctor),
            vec![AppointmentAction::Reject, AppointmentAction::Complete]
        );
        assert!(sm
            .available_actions(&AppointmentStatus::Rejected, Actor::Doctor)
            .is_empty());
        assert!(sm
            .available_actions(&AppointmentStatus::Completed, Actor::Doctor)
            .is_empty());
    }

    #[test]
    fn test_patient_cancel() {
        let sm = AppointmentStateMachine::new();

        assert!(sm.is_cancellable(&AppointmentStatus::Pending));
        assert!(sm.is_cancellable(&AppointmentStatus::Confirmed));
        assert!(!sm.is_cancellable(&AppointmentStatus::Rejected));
        assert!(!sm.is_cancellable(&AppointmentStatus::Completed));
        assert_eq!(
            sm.transition(&AppointmentStatus::Confirmed, AppointmentAction::Cancel)
                .unwrap(),
            AppointmentStatus::Rejected
        );
    }

    #[test]
    fn test_invalid_transitions() {
        let sm = AppointmentStateMachine::new();

        assert!(sm
            .transition(&AppointmentStatus::Completed, AppointmentAction::Confirm)
            .is_err());
        assert!(sm
            .transition(
                &AppointmentStatus::Unknown("Archived".to_string()),
                AppointmentAction::Cancel
            )
            .is_err());
        assert!(sm.is_terminal(&AppointmentStatus::Rejected));
        assert!(sm.is_terminal(&AppointmentStatus::Unknown("Archived".to_string())));
        assert!(!sm.is_terminal(&AppointmentStatus::Pending));
    }

    #[test]
    fn test_action_from_target() {
        assert_eq!(
            AppointmentAction::from_target(&AppointmentStatus::Confirmed),
            Some(AppointmentAction::Confirm)
        );
        assert_eq!(AppointmentAction::from_target(&AppointmentStatus::Pending), None);
    }
}
