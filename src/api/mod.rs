pub mod accounts;
pub mod assessments;
pub mod reports;
pub mod students;
pub mod templates;
pub mod turmas;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::error;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::user::{Principal, Role};
use crate::services::account_service::AccountService;
use crate::services::assessment_service::AssessmentService;
use crate::services::report_service::ReportService;
use crate::services::settings_service::SettingsService;
use crate::services::student_service::StudentService;
use crate::services::template_service::TemplateService;
use crate::services::turma_service::TurmaService;

#[derive(Clone)]
pub struct AppState {
    db_pool: DbPool,
    account_service: Arc<AccountService>,
    student_service: Arc<StudentService>,
    turma_service: Arc<TurmaService>,
    template_service: Arc<TemplateService>,
    assessment_service: Arc<AssessmentService>,
    settings_service: Arc<SettingsService>,
    report_service: Arc<ReportService>,
}

impl AppState {
    pub fn new(db_pool: DbPool) -> AppResult<Self> {
        let account_service = Arc::new(AccountService::new(db_pool.clone()));
        let student_service = Arc::new(StudentService::new(
            db_pool.clone(),
            Arc::clone(&account_service),
        ));
        let turma_service = Arc::new(TurmaService::new(db_pool.clone()));
        let template_service = Arc::new(TemplateService::new(db_pool.clone()));
        let settings_service = Arc::new(SettingsService::new(db_pool.clone()));
        let assessment_service = Arc::new(AssessmentService::new(
            db_pool.clone(),
            Arc::clone(&settings_service),
        ));
        let report_service = Arc::new(ReportService::new(
            db_pool.clone(),
            Arc::clone(&settings_service),
        ));

        Ok(Self {
            db_pool,
            account_service,
            student_service,
            turma_service,
            template_service,
            assessment_service,
            settings_service,
            report_service,
        })
    }

    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.account_service)
    }

    pub fn students(&self) -> Arc<StudentService> {
        Arc::clone(&self.student_service)
    }

    pub fn turmas(&self) -> Arc<TurmaService> {
        Arc::clone(&self.turma_service)
    }

    pub fn templates(&self) -> Arc<TemplateService> {
        Arc::clone(&self.template_service)
    }

    pub fn assessments(&self) -> Arc<AssessmentService> {
        Arc::clone(&self.assessment_service)
    }

    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings_service)
    }

    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.report_service)
    }

    pub fn db(&self) -> DbPool {
        self.db_pool.clone()
    }
}

/// The single capability check every entry point goes through. The principal
/// always arrives as an explicit parameter.
pub fn authorize(principal: &Principal, allowed: &[Role]) -> AppResult<()> {
    if principal.has_any(allowed) {
        return Ok(());
    }

    Err(AppError::forbidden(format!(
        "perfil {} não pode executar esta operação",
        principal.role.as_str()
    )))
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl ApiError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation {
                message, details, ..
            } => ApiError::new("VALIDATION_ERROR", message, details),
            AppError::NotFound => ApiError::new("NOT_FOUND", "registro não encontrado", None),
            AppError::Conflict { message } => ApiError::new("CONFLICT", message, None),
            AppError::Forbidden { message } => ApiError::new("FORBIDDEN", message, None),
            AppError::Exhaustion { message } => ApiError::new("EXHAUSTED", message, None),
            AppError::Database { message } => {
                error!(target: "app::api", %message, "database error in api call");
                ApiError::new("UNKNOWN", message, None)
            }
            AppError::Serialization(error) => {
                error!(target: "app::api", error = %error, "serialization error in api call");
                ApiError::new("UNKNOWN", "falha de serialização", None)
            }
            AppError::Io(error) => {
                error!(target: "app::api", error = %error, "io error in api call");
                ApiError::new("UNKNOWN", "falha de leitura ou escrita", None)
            }
            AppError::Other(message) => {
                error!(target: "app::api", %message, "unexpected error in api call");
                ApiError::new("UNKNOWN", message, None)
            }
        }
    }
}
