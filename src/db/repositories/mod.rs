pub mod assessment_repository;
pub mod settings_repository;
pub mod student_repository;
pub mod template_repository;
pub mod turma_repository;
pub mod user_repository;
