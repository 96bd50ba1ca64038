pub mod assessment;
pub mod report;
pub mod student;
pub mod template;
pub mod turma;
pub mod user;
