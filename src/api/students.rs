use serde::Serialize;

use crate::models::student::{StudentCreateInput, StudentRecord, StudentUpdateInput};
use crate::models::user::{Credential, Principal, Role};

use super::{authorize, ApiResult, AppState};

const MANAGE_ROLES: &[Role] = &[Role::Admin, Role::Coordenador];
const VIEW_ROLES: &[Role] = &[Role::Admin, Role::Coordenador, Role::Moderador];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentEnrollResponse {
    pub student: StudentRecord,
    pub credential: Credential,
}

pub fn students_create(
    state: &AppState,
    principal: &Principal,
    input: StudentCreateInput,
) -> ApiResult<StudentEnrollResponse> {
    authorize(principal, MANAGE_ROLES)?;
    let (student, credential) = state.students().create_student(input)?;
    Ok(StudentEnrollResponse {
        student,
        credential,
    })
}

pub fn students_update(
    state: &AppState,
    principal: &Principal,
    id: &str,
    input: StudentUpdateInput,
) -> ApiResult<StudentRecord> {
    authorize(principal, MANAGE_ROLES)?;
    Ok(state.students().update_student(id, input)?)
}

pub fn students_delete(state: &AppState, principal: &Principal, id: &str) -> ApiResult<()> {
    authorize(principal, MANAGE_ROLES)?;
    Ok(state.students().delete_student(id)?)
}

pub fn students_get(
    state: &AppState,
    principal: &Principal,
    id: &str,
) -> ApiResult<StudentRecord> {
    authorize(principal, VIEW_ROLES)?;
    Ok(state.students().get_student(id)?)
}

pub fn students_list(state: &AppState, principal: &Principal) -> ApiResult<Vec<StudentRecord>> {
    authorize(principal, VIEW_ROLES)?;
    Ok(state.students().list_students()?)
}

pub fn students_list_by_turma(
    state: &AppState,
    principal: &Principal,
    turma_id: &str,
) -> ApiResult<Vec<StudentRecord>> {
    authorize(principal, VIEW_ROLES)?;
    Ok(state.students().list_by_turma(turma_id)?)
}
