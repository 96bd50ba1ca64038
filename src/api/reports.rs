use crate::error::AppError;
use crate::models::report::{ClassDashboard, PeriodKey, ReportConfig, StudentDashboard};
use crate::models::user::{Principal, Role};

use super::{authorize, ApiResult, AppState};

const STAFF_ROLES: &[Role] = &[Role::Admin, Role::Coordenador, Role::Moderador];
const DASHBOARD_ROLES: &[Role] = &[
    Role::Admin,
    Role::Coordenador,
    Role::Moderador,
    Role::Aluno,
];

/// Students may read their own dashboard; staff may read any.
pub fn reports_student_dashboard(
    state: &AppState,
    principal: &Principal,
    student_id: &str,
    period: Option<PeriodKey>,
) -> ApiResult<StudentDashboard> {
    authorize(principal, DASHBOARD_ROLES)?;

    if principal.role == Role::Aluno {
        let student = state.students().get_student(student_id)?;
        if student.user_id.as_deref() != Some(principal.user_id.as_str()) {
            return Err(
                AppError::forbidden("aluno só pode consultar o próprio painel").into(),
            );
        }
    }

    let period = period.unwrap_or_default();
    Ok(state.reports().student_dashboard(student_id, period)?)
}

pub fn reports_class_dashboard(
    state: &AppState,
    principal: &Principal,
    turma_id: &str,
    month_ref: u32,
    year_ref: i32,
) -> ApiResult<ClassDashboard> {
    authorize(principal, STAFF_ROLES)?;
    Ok(state
        .reports()
        .class_dashboard(turma_id, month_ref, year_ref)?)
}

pub fn reports_config_get(state: &AppState, principal: &Principal) -> ApiResult<ReportConfig> {
    authorize(principal, STAFF_ROLES)?;
    Ok(state.settings().report_config()?)
}

pub fn reports_config_update(
    state: &AppState,
    principal: &Principal,
    config: ReportConfig,
) -> ApiResult<ReportConfig> {
    authorize(principal, &[Role::Admin])?;
    Ok(state.settings().update_report_config(config)?)
}
