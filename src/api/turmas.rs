use crate::models::turma::{TurmaCreateInput, TurmaRecord, TurmaUpdateInput};
use crate::models::user::{Principal, Role};

use super::{authorize, ApiResult, AppState};

const MANAGE_ROLES: &[Role] = &[Role::Admin, Role::Coordenador];
const VIEW_ROLES: &[Role] = &[Role::Admin, Role::Coordenador, Role::Moderador];

pub fn turmas_create(
    state: &AppState,
    principal: &Principal,
    input: TurmaCreateInput,
) -> ApiResult<TurmaRecord> {
    authorize(principal, MANAGE_ROLES)?;
    Ok(state.turmas().create_turma(input)?)
}

pub fn turmas_update(
    state: &AppState,
    principal: &Principal,
    id: &str,
    input: TurmaUpdateInput,
) -> ApiResult<TurmaRecord> {
    authorize(principal, MANAGE_ROLES)?;
    Ok(state.turmas().update_turma(id, input)?)
}

pub fn turmas_delete(state: &AppState, principal: &Principal, id: &str) -> ApiResult<()> {
    authorize(principal, MANAGE_ROLES)?;
    Ok(state.turmas().delete_turma(id)?)
}

pub fn turmas_get(state: &AppState, principal: &Principal, id: &str) -> ApiResult<TurmaRecord> {
    authorize(principal, VIEW_ROLES)?;
    Ok(state.turmas().get_turma(id)?)
}

pub fn turmas_list(state: &AppState, principal: &Principal) -> ApiResult<Vec<TurmaRecord>> {
    authorize(principal, VIEW_ROLES)?;
    Ok(state.turmas().list_turmas()?)
}
