use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Coordenador,
    Moderador,
    Aluno,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Coordenador => "COORDENADOR",
            Role::Moderador => "MODERADOR",
            Role::Aluno => "ALUNO",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "COORDENADOR" => Some(Role::Coordenador),
            "MODERADOR" => Some(Role::Moderador),
            "ALUNO" => Some(Role::Aluno),
            _ => None,
        }
    }
}

/// Calling identity, resolved by the authentication collaborator before any
/// core function runs. Always passed explicitly, never read from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn has_any(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub full_name: String,
    pub login: String,
    pub role: Role,
    pub student_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Plaintext secret handed back exactly once at issuance; only the hash is
/// ever persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateInput {
    pub full_name: String,
    pub role: Option<Role>,
    #[serde(default)]
    pub student_id: Option<String>,
}
