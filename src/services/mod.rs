pub mod account_service;
pub mod assessment_service;
pub mod report_service;
pub mod settings_service;
pub mod student_service;
pub mod template_service;
pub mod turma_service;
