use crate::models::assessment::{
    AssessmentAnswersInput, AssessmentCreateInput, AssessmentRecord,
};
use crate::models::report::PeriodKey;
use crate::models::user::{Principal, Role};

use super::{authorize, ApiResult, AppState};

const SUBMIT_ROLES: &[Role] = &[Role::Admin, Role::Coordenador, Role::Moderador];
const VIEW_ROLES: &[Role] = &[Role::Admin, Role::Coordenador, Role::Moderador];

pub fn assessments_create(
    state: &AppState,
    principal: &Principal,
    input: AssessmentCreateInput,
) -> ApiResult<AssessmentRecord> {
    authorize(principal, SUBMIT_ROLES)?;
    Ok(state.assessments().create_assessment(input)?)
}

pub fn assessments_record_answers(
    state: &AppState,
    principal: &Principal,
    id: &str,
    input: AssessmentAnswersInput,
) -> ApiResult<AssessmentRecord> {
    authorize(principal, SUBMIT_ROLES)?;
    Ok(state.assessments().record_answers(id, input.answers)?)
}

pub fn assessments_complete(
    state: &AppState,
    principal: &Principal,
    id: &str,
) -> ApiResult<AssessmentRecord> {
    authorize(principal, SUBMIT_ROLES)?;
    Ok(state.assessments().complete_assessment(id)?)
}

pub fn assessments_reopen(
    state: &AppState,
    principal: &Principal,
    id: &str,
) -> ApiResult<AssessmentRecord> {
    authorize(principal, SUBMIT_ROLES)?;
    Ok(state.assessments().reopen_assessment(id)?)
}

pub fn assessments_delete(state: &AppState, principal: &Principal, id: &str) -> ApiResult<()> {
    authorize(principal, SUBMIT_ROLES)?;
    Ok(state.assessments().delete_assessment(id)?)
}

pub fn assessments_get(
    state: &AppState,
    principal: &Principal,
    id: &str,
) -> ApiResult<AssessmentRecord> {
    authorize(principal, VIEW_ROLES)?;
    Ok(state.assessments().get_assessment(id)?)
}

pub fn assessments_list_by_student(
    state: &AppState,
    principal: &Principal,
    student_id: &str,
    period: Option<PeriodKey>,
) -> ApiResult<Vec<AssessmentRecord>> {
    authorize(principal, VIEW_ROLES)?;
    let period = period.unwrap_or_default();
    Ok(state.assessments().list_by_student(student_id, period)?)
}
