use serde::Serialize;

use crate::models::user::{Credential, Principal, Role, UserCreateInput, UserRecord};

use super::{authorize, ApiResult, AppState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateResponse {
    pub user: UserRecord,
    pub credential: Credential,
}

pub fn accounts_create(
    state: &AppState,
    principal: &Principal,
    input: UserCreateInput,
) -> ApiResult<UserCreateResponse> {
    authorize(principal, &[Role::Admin])?;
    let (user, credential) = state.accounts().create_user(input)?;
    Ok(UserCreateResponse { user, credential })
}

pub fn accounts_reset_password(
    state: &AppState,
    principal: &Principal,
    user_id: &str,
) -> ApiResult<Credential> {
    authorize(principal, &[Role::Admin, Role::Coordenador])?;
    Ok(state.accounts().reset_password(user_id)?)
}

pub fn accounts_get(
    state: &AppState,
    principal: &Principal,
    user_id: &str,
) -> ApiResult<UserRecord> {
    authorize(principal, &[Role::Admin, Role::Coordenador])?;
    Ok(state.accounts().get_user(user_id)?)
}

pub fn accounts_list(state: &AppState, principal: &Principal) -> ApiResult<Vec<UserRecord>> {
    authorize(principal, &[Role::Admin])?;
    Ok(state.accounts().list_users()?)
}

pub fn accounts_delete(state: &AppState, principal: &Principal, user_id: &str) -> ApiResult<()> {
    authorize(principal, &[Role::Admin])?;
    Ok(state.accounts().delete_user(user_id)?)
}

/// Pre-principal entry point for the authentication collaborator: no role
/// gate, returns `None` on unknown login or wrong password.
pub fn accounts_verify_login(
    state: &AppState,
    login: &str,
    password: &str,
) -> ApiResult<Option<Principal>> {
    Ok(state.accounts().verify_login(login, password)?)
}
