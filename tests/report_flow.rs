use std::sync::Arc;

use metis_app::db::DbPool;
use metis_app::models::assessment::{AssessmentCreateInput, ItemAnswer};
use metis_app::models::report::{PeriodKey, TrendClassification};
use metis_app::models::student::StudentCreateInput;
use metis_app::models::template::{CognitiveDomain, TemplateCreateInput, TemplateItemInput, TemplateRecord};
use metis_app::models::turma::TurmaCreateInput;
use metis_app::services::account_service::AccountService;
use metis_app::services::assessment_service::AssessmentService;
use metis_app::services::report_service::ReportService;
use metis_app::services::settings_service::SettingsService;
use metis_app::services::student_service::StudentService;
use metis_app::services::template_service::TemplateService;
use metis_app::services::turma_service::TurmaService;
use tempfile::tempdir;

struct Fixture {
    students: StudentService,
    turmas: TurmaService,
    templates: TemplateService,
    assessments: AssessmentService,
    reports: ReportService,
    _dir: tempfile::TempDir,
}

fn setup() -> Fixture {
    let dir = tempdir().expect("temp dir");
    let db_path = dir.path().join("reports.sqlite");
    let pool = DbPool::new(&db_path).expect("db pool");

    let accounts = Arc::new(AccountService::new(pool.clone()));
    let settings = Arc::new(SettingsService::new(pool.clone()));

    Fixture {
        students: StudentService::new(pool.clone(), accounts),
        turmas: TurmaService::new(pool.clone()),
        templates: TemplateService::new(pool.clone()),
        assessments: AssessmentService::new(pool.clone(), Arc::clone(&settings)),
        reports: ReportService::new(pool, settings),
        _dir: dir,
    }
}

fn full_battery(templates: &TemplateService) -> TemplateRecord {
    let items = [
        ("Leitura em voz alta", CognitiveDomain::Fluency),
        ("Referências culturais", CognitiveDomain::Culture),
        ("Interpretação de texto", CognitiveDomain::Interpretation),
        ("Atenção sustentada", CognitiveDomain::Attention),
        ("Autoavaliação", CognitiveDomain::SelfPerception),
    ]
    .into_iter()
    .map(|(prompt, domain)| TemplateItemInput {
        prompt: prompt.to_string(),
        domain: Some(domain),
        max_score: Some(10.0),
    })
    .collect();

    templates
        .create_template(TemplateCreateInput {
            name: "Bateria Completa".into(),
            description: None,
            items,
        })
        .expect("create template")
}

/// Scores every item of the battery with the same value and optionally
/// completes the assessment.
fn apply_assessment(
    fixture: &Fixture,
    template: &TemplateRecord,
    student_id: &str,
    month: u32,
    year: i32,
    item_score: f64,
    complete: bool,
) {
    let record = fixture
        .assessments
        .create_assessment(AssessmentCreateInput {
            student_id: student_id.to_string(),
            template_id: template.id.clone(),
            month_ref: Some(month),
            year_ref: Some(year),
        })
        .expect("create assessment");

    let answers = template
        .items
        .iter()
        .map(|item| ItemAnswer {
            item_id: item.id.clone(),
            score: item_score,
        })
        .collect();
    fixture
        .assessments
        .record_answers(&record.id, answers)
        .expect("record answers");

    if complete {
        fixture
            .assessments
            .complete_assessment(&record.id)
            .expect("complete");
    }
}

#[test]
fn student_dashboard_composes_evolution_radar_and_trends() {
    let fixture = setup();
    let template = full_battery(&fixture.templates);
    let (student, _) = fixture
        .students
        .create_student(StudentCreateInput {
            full_name: "Ana Maria Silva".into(),
            ..Default::default()
        })
        .expect("create student");

    // Three completed months with rising scores, one trailing draft.
    apply_assessment(&fixture, &template, &student.id, 4, 2026, 2.0, true);
    apply_assessment(&fixture, &template, &student.id, 5, 2026, 3.0, true);
    apply_assessment(&fixture, &template, &student.id, 6, 2026, 4.0, true);
    apply_assessment(&fixture, &template, &student.id, 7, 2026, 9.0, false);

    let dashboard = fixture
        .reports
        .student_dashboard(&student.id, PeriodKey::All)
        .expect("dashboard");

    let labels: Vec<&str> = dashboard
        .evolution
        .iter()
        .map(|point| point.period_label.as_str())
        .collect();
    assert_eq!(labels, vec!["04/2026", "05/2026", "06/2026"]);
    assert_eq!(dashboard.evolution[0].total_score, 10.0);
    assert_eq!(dashboard.evolution[2].total_score, 20.0);

    // Radar reflects the latest completed month, not the open draft.
    assert_eq!(dashboard.radar.len(), 5);
    assert!(dashboard.radar.iter().all(|entry| entry.value == 4.0));

    assert_eq!(dashboard.trends.len(), 6);
    let total = &dashboard.trends[0];
    assert_eq!(total.metric, "total");
    assert_eq!(total.current_value, 20.0);
    assert_eq!(total.baseline_value, 10.0);
    assert_eq!(total.classification, TrendClassification::Melhora);
}

#[test]
fn unknown_student_yields_shaped_but_empty_dashboard() {
    let fixture = setup();

    let dashboard = fixture
        .reports
        .student_dashboard("aluno-fantasma", PeriodKey::All)
        .expect("dashboard");

    assert!(dashboard.evolution.is_empty());
    assert!(dashboard.radar.is_empty());
    assert!(dashboard.trends.is_empty());
}

#[test]
fn class_dashboard_reports_coverage_and_means() {
    let fixture = setup();
    let template = full_battery(&fixture.templates);

    let turma = fixture
        .turmas
        .create_turma(TurmaCreateInput {
            name: "5º Ano A".into(),
            school_year: Some(2026),
            moderator_id: None,
        })
        .expect("create turma");

    let mut student_ids = Vec::new();
    for name in ["Ana Maria", "Bruno Costa", "Carla Dias"] {
        let (student, _) = fixture
            .students
            .create_student(StudentCreateInput {
                full_name: name.into(),
                turma_id: Some(turma.id.clone()),
                ..Default::default()
            })
            .expect("create student");
        student_ids.push(student.id);
    }

    apply_assessment(&fixture, &template, &student_ids[0], 6, 2026, 4.0, true);
    apply_assessment(&fixture, &template, &student_ids[1], 6, 2026, 3.0, true);
    // Third student stays in draft: counted as missing.
    apply_assessment(&fixture, &template, &student_ids[2], 6, 2026, 9.0, false);

    let dashboard = fixture
        .reports
        .class_dashboard(&turma.id, 6, 2026)
        .expect("class dashboard");

    assert_eq!(dashboard.statistics.completed_count, 2);
    assert_eq!(dashboard.statistics.missing_count, 1);
    assert_eq!(dashboard.statistics.mean, 17.5);
    assert_eq!(dashboard.statistics.median, 17.5);

    assert_eq!(dashboard.domain_means.len(), 5);
    assert!(dashboard.domain_means.iter().all(|entry| entry.value == 3.5));
}

#[test]
fn empty_turma_statistics_are_zeroed() {
    let fixture = setup();
    let turma = fixture
        .turmas
        .create_turma(TurmaCreateInput {
            name: "Turma Nova".into(),
            school_year: Some(2026),
            moderator_id: None,
        })
        .expect("create turma");

    let dashboard = fixture
        .reports
        .class_dashboard(&turma.id, 2, 2026)
        .expect("class dashboard");

    assert_eq!(dashboard.statistics.mean, 0.0);
    assert_eq!(dashboard.statistics.median, 0.0);
    assert_eq!(dashboard.statistics.completed_count, 0);
    assert_eq!(dashboard.statistics.missing_count, 0);
}
