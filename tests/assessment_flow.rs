use metis_app::api::assessments::{
    assessments_complete, assessments_create, assessments_record_answers, assessments_reopen,
};
use metis_app::api::students::students_create;
use metis_app::api::templates::templates_create;
use metis_app::api::turmas::turmas_create;
use metis_app::api::AppState;
use metis_app::db::DbPool;
use metis_app::models::assessment::{AssessmentAnswersInput, AssessmentCreateInput, ItemAnswer};
use metis_app::models::assessment::AssessmentStatus;
use metis_app::models::student::StudentCreateInput;
use metis_app::models::template::{CognitiveDomain, TemplateCreateInput, TemplateItemInput};
use metis_app::models::turma::TurmaCreateInput;
use metis_app::models::user::{Principal, Role};
use tempfile::tempdir;

fn setup_state() -> (AppState, tempfile::TempDir) {
    let dir = tempdir().expect("temp dir");
    let db_path = dir.path().join("metis.sqlite");
    let pool = DbPool::new(&db_path).expect("db pool");
    let state = AppState::new(pool).expect("app state");
    (state, dir)
}

fn admin() -> Principal {
    Principal::new("admin-1", Role::Admin)
}

fn moderador() -> Principal {
    Principal::new("moderador-1", Role::Moderador)
}

fn item(prompt: &str, domain: CognitiveDomain, max_score: f64) -> TemplateItemInput {
    TemplateItemInput {
        prompt: prompt.to_string(),
        domain: Some(domain),
        max_score: Some(max_score),
    }
}

#[test]
fn full_assessment_lifecycle_through_api() {
    let (state, _dir) = setup_state();
    let admin = admin();
    let moderador = moderador();

    let turma = turmas_create(
        &state,
        &admin,
        TurmaCreateInput {
            name: "5º Ano A".into(),
            school_year: Some(2026),
            moderator_id: None,
        },
    )
    .expect("create turma");

    let template = templates_create(
        &state,
        &admin,
        TemplateCreateInput {
            name: "Bateria Mensal".into(),
            description: None,
            items: vec![
                item("Leitura em voz alta", CognitiveDomain::Fluency, 10.0),
                item("Atenção sustentada", CognitiveDomain::Attention, 10.0),
            ],
        },
    )
    .expect("create template");

    let enrollment = students_create(
        &state,
        &admin,
        StudentCreateInput {
            full_name: "Ana Maria Silva".into(),
            birth_date: Some("2015-04-02".into()),
            turma_id: Some(turma.id.clone()),
        },
    )
    .expect("create student");
    assert!(enrollment.credential.login.ends_with("@metis"));

    let assessment = assessments_create(
        &state,
        &moderador,
        AssessmentCreateInput {
            student_id: enrollment.student.id.clone(),
            template_id: template.id.clone(),
            month_ref: Some(3),
            year_ref: Some(2026),
        },
    )
    .expect("create assessment");
    assert_eq!(assessment.status, AssessmentStatus::Draft);

    let duplicate = assessments_create(
        &state,
        &moderador,
        AssessmentCreateInput {
            student_id: enrollment.student.id.clone(),
            template_id: template.id.clone(),
            month_ref: Some(3),
            year_ref: Some(2026),
        },
    );
    assert_eq!(duplicate.unwrap_err().code, "CONFLICT");

    let scored = assessments_record_answers(
        &state,
        &moderador,
        &assessment.id,
        AssessmentAnswersInput {
            answers: vec![
                ItemAnswer {
                    item_id: template.items[0].id.clone(),
                    score: 7.0,
                },
                ItemAnswer {
                    item_id: template.items[1].id.clone(),
                    score: 8.0,
                },
            ],
        },
    )
    .expect("record answers");
    assert_eq!(scored.scores.fluency, 7.0);
    assert_eq!(scored.scores.attention, 8.0);
    assert_eq!(scored.total_score, 15.0);

    let completed = assessments_complete(&state, &moderador, &assessment.id).expect("complete");
    assert_eq!(completed.status, AssessmentStatus::Completed);

    let frozen = assessments_record_answers(
        &state,
        &moderador,
        &assessment.id,
        AssessmentAnswersInput {
            answers: vec![ItemAnswer {
                item_id: template.items[0].id.clone(),
                score: 1.0,
            }],
        },
    );
    assert_eq!(frozen.unwrap_err().code, "CONFLICT");

    let reopened = assessments_reopen(&state, &moderador, &assessment.id).expect("reopen");
    assert_eq!(reopened.status, AssessmentStatus::Draft);

    assessments_record_answers(
        &state,
        &moderador,
        &assessment.id,
        AssessmentAnswersInput {
            answers: vec![ItemAnswer {
                item_id: template.items[0].id.clone(),
                score: 1.0,
            }],
        },
    )
    .expect("editable after reopen");
}

#[test]
fn role_gates_reject_unprivileged_callers() {
    let (state, _dir) = setup_state();
    let aluno = Principal::new("aluno-1", Role::Aluno);
    let moderador = moderador();

    let student = students_create(
        &state,
        &aluno,
        StudentCreateInput {
            full_name: "Sem Permissão".into(),
            ..Default::default()
        },
    );
    assert_eq!(student.unwrap_err().code, "FORBIDDEN");

    let turma = turmas_create(
        &state,
        &moderador,
        TurmaCreateInput {
            name: "Turma do Moderador".into(),
            school_year: Some(2026),
            moderator_id: None,
        },
    );
    assert_eq!(turma.unwrap_err().code, "FORBIDDEN");

    let assessment = assessments_create(
        &state,
        &aluno,
        AssessmentCreateInput {
            student_id: "qualquer".into(),
            template_id: "qualquer".into(),
            month_ref: Some(1),
            year_ref: Some(2026),
        },
    );
    assert_eq!(assessment.unwrap_err().code, "FORBIDDEN");
}

#[test]
fn validation_errors_surface_with_their_code() {
    let (state, _dir) = setup_state();
    let admin = admin();
    let moderador = moderador();

    let template = templates_create(
        &state,
        &admin,
        TemplateCreateInput {
            name: "Bateria".into(),
            description: None,
            items: vec![item("Questão", CognitiveDomain::Culture, 10.0)],
        },
    )
    .expect("create template");

    let enrollment = students_create(
        &state,
        &admin,
        StudentCreateInput {
            full_name: "João Pedro".into(),
            ..Default::default()
        },
    )
    .expect("create student");

    let bad_month = assessments_create(
        &state,
        &moderador,
        AssessmentCreateInput {
            student_id: enrollment.student.id,
            template_id: template.id,
            month_ref: Some(13),
            year_ref: Some(2026),
        },
    );
    assert_eq!(bad_month.unwrap_err().code, "VALIDATION_ERROR");
}
