use crate::models::template::{TemplateCreateInput, TemplateRecord, TemplateUpdateInput};
use crate::models::user::{Principal, Role};

use super::{authorize, ApiResult, AppState};

const MANAGE_ROLES: &[Role] = &[Role::Admin, Role::Coordenador];
const VIEW_ROLES: &[Role] = &[Role::Admin, Role::Coordenador, Role::Moderador];

pub fn templates_create(
    state: &AppState,
    principal: &Principal,
    input: TemplateCreateInput,
) -> ApiResult<TemplateRecord> {
    authorize(principal, MANAGE_ROLES)?;
    Ok(state.templates().create_template(input)?)
}

pub fn templates_update(
    state: &AppState,
    principal: &Principal,
    id: &str,
    input: TemplateUpdateInput,
) -> ApiResult<TemplateRecord> {
    authorize(principal, MANAGE_ROLES)?;
    Ok(state.templates().update_template(id, input)?)
}

pub fn templates_delete(state: &AppState, principal: &Principal, id: &str) -> ApiResult<()> {
    authorize(principal, MANAGE_ROLES)?;
    Ok(state.templates().delete_template(id)?)
}

pub fn templates_get(
    state: &AppState,
    principal: &Principal,
    id: &str,
) -> ApiResult<TemplateRecord> {
    authorize(principal, VIEW_ROLES)?;
    Ok(state.templates().get_template(id)?)
}

pub fn templates_list(
    state: &AppState,
    principal: &Principal,
) -> ApiResult<Vec<TemplateRecord>> {
    authorize(principal, VIEW_ROLES)?;
    Ok(state.templates().list_templates()?)
}
