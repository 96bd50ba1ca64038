use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::debug;

use crate::db::repositories::assessment_repository::AssessmentRepository;
use crate::db::repositories::student_repository::StudentRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::assessment::{AssessmentRecord, AssessmentStatus};
use crate::models::report::{
    ClassDashboard, ClassStatistics, EvolutionPoint, PeriodKey, RadarEntry, ReportConfig,
    StudentDashboard, TrendClassification, TrendPoint,
};
use crate::models::template::CognitiveDomain;
use crate::services::settings_service::SettingsService;

#[derive(Clone)]
pub struct ReportService {
    db: DbPool,
    settings: Arc<SettingsService>,
}

impl ReportService {
    pub fn new(db: DbPool, settings: Arc<SettingsService>) -> Self {
        Self { db, settings }
    }

    /// Evolution series, radar snapshot and trend cards for one student,
    /// scoped by the relative period. An unknown student or an empty scope
    /// yields the shaped-but-empty dashboard: "no history yet" is not a fault.
    pub fn student_dashboard(
        &self,
        student_id: &str,
        period: PeriodKey,
    ) -> AppResult<StudentDashboard> {
        let config = self.settings.report_config()?;
        let today = Utc::now().date_naive();
        let boundary =
            resolve_start_boundary(period, today).map(|date| (date.year(), date.month()));

        let rows = self.db.with_connection(|conn| {
            AssessmentRepository::list_by_student(conn, student_id, boundary)
        })?;
        let records = rows
            .into_iter()
            .map(|row| row.into_record())
            .collect::<AppResult<Vec<_>>>()?;

        debug!(
            target: "app::report",
            %student_id,
            period = period.as_str(),
            records = records.len(),
            "student dashboard computed"
        );

        Ok(StudentDashboard {
            student_id: student_id.to_string(),
            period,
            evolution: build_evolution(&records),
            radar: build_radar(&records),
            trends: build_trend_points(&records, &config),
            generated_at: Utc::now().to_rfc3339(),
        })
    }

    /// Mean/median/coverage statistics for a turma in one month, plus the
    /// per-domain class means for the same scope.
    pub fn class_dashboard(
        &self,
        turma_id: &str,
        month_ref: u32,
        year_ref: i32,
    ) -> AppResult<ClassDashboard> {
        if !(1..=12).contains(&month_ref) {
            return Err(AppError::validation(
                "mês de referência deve estar entre 1 e 12",
            ));
        }

        let roster_size = self
            .db
            .with_connection(|conn| StudentRepository::count_by_turma(conn, turma_id))?;

        let rows = self.db.with_connection(|conn| {
            AssessmentRepository::list_by_turma_period(conn, turma_id, month_ref, year_ref)
        })?;
        let records = rows
            .into_iter()
            .map(|row| row.into_record())
            .collect::<AppResult<Vec<_>>>()?;

        let completed: Vec<&AssessmentRecord> = records
            .iter()
            .filter(|record| record.status == AssessmentStatus::Completed)
            .collect();

        let totals: Vec<f64> = completed.iter().map(|record| record.total_score).collect();
        let statistics = class_statistics(&totals, roster_size);

        let domain_means = CognitiveDomain::ALL
            .into_iter()
            .map(|domain| {
                let values: Vec<f64> = completed
                    .iter()
                    .map(|record| record.scores.get(domain))
                    .collect();
                RadarEntry {
                    domain,
                    label: domain.label().to_string(),
                    value: mean(&values),
                }
            })
            .collect();

        debug!(
            target: "app::report",
            %turma_id,
            period = %format!("{month_ref:02}/{year_ref}"),
            roster = roster_size,
            completed = totals.len(),
            "class dashboard computed"
        );

        Ok(ClassDashboard {
            turma_id: turma_id.to_string(),
            month_ref,
            year_ref,
            statistics,
            domain_means,
            generated_at: Utc::now().to_rfc3339(),
        })
    }
}

/// Lower boundary of a relative period: the first day of the month that lies
/// `{1,3,6,12}` calendar months before today's month. `all` has no boundary.
pub fn resolve_start_boundary(period: PeriodKey, today: NaiveDate) -> Option<NaiveDate> {
    let months_back = period.months()? as i32;
    let total_months = today.year() * 12 + today.month0() as i32 - months_back;
    let year = total_months.div_euclid(12);
    let month0 = total_months.rem_euclid(12) as u32;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

/// Calendar-ordering predicate over the discrete `(year_ref, month_ref)` key:
/// year strictly greater, or same year and month on or after the boundary
/// month. Without a boundary every record matches.
pub fn in_period(boundary: Option<NaiveDate>, year_ref: i32, month_ref: u32) -> bool {
    match boundary {
        None => true,
        Some(start) => {
            year_ref > start.year() || (year_ref == start.year() && month_ref >= start.month())
        }
    }
}

/// One entry per completed assessment, ascending by `(year_ref, month_ref)`.
pub fn build_evolution(records: &[AssessmentRecord]) -> Vec<EvolutionPoint> {
    completed_sorted(records)
        .into_iter()
        .map(|record| EvolutionPoint {
            period_label: period_label(record.month_ref, record.year_ref),
            total_score: record.total_score,
            scores: record.scores,
        })
        .collect()
}

/// Five domain values taken from the most recent completed assessment only;
/// empty when the student has no completed history.
pub fn build_radar(records: &[AssessmentRecord]) -> Vec<RadarEntry> {
    let completed = completed_sorted(records);
    let Some(latest) = completed.last() else {
        return Vec::new();
    };

    CognitiveDomain::ALL
        .into_iter()
        .map(|domain| RadarEntry {
            domain,
            label: domain.label().to_string(),
            value: latest.scores.get(domain),
        })
        .collect()
}

/// The six summary cards, in fixed order: Total first, then the five domains.
/// Empty history yields an empty list.
pub fn build_trend_points(records: &[AssessmentRecord], config: &ReportConfig) -> Vec<TrendPoint> {
    let completed = completed_sorted(records);
    if completed.is_empty() {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(1 + CognitiveDomain::ALL.len());

    let totals: Vec<f64> = completed.iter().map(|record| record.total_score).collect();
    points.push(trend_point("total", "Total", &totals, config));

    for domain in CognitiveDomain::ALL {
        let series: Vec<f64> = completed
            .iter()
            .map(|record| record.scores.get(domain))
            .collect();
        points.push(trend_point(
            domain.as_str(),
            domain.label(),
            &series,
            config,
        ));
    }

    points
}

/// Mean, median and coverage over a class's total scores. Empty input yields
/// zeroed statistics, never a division by zero.
pub fn class_statistics(scores: &[f64], roster_size: usize) -> ClassStatistics {
    let completed_count = scores.len();
    let missing_count = roster_size.saturating_sub(completed_count);

    if scores.is_empty() {
        return ClassStatistics {
            mean: 0.0,
            median: 0.0,
            completed_count,
            missing_count,
        };
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    ClassStatistics {
        mean: mean(&sorted),
        median: median_of_sorted(&sorted),
        completed_count,
        missing_count,
    }
}

fn completed_sorted(records: &[AssessmentRecord]) -> Vec<&AssessmentRecord> {
    let mut completed: Vec<&AssessmentRecord> = records
        .iter()
        .filter(|record| record.status == AssessmentStatus::Completed)
        .collect();
    completed.sort_by_key(|record| record.period_key());
    completed
}

fn trend_point(metric: &str, label: &str, series: &[f64], config: &ReportConfig) -> TrendPoint {
    let Some(&current) = series.last() else {
        return TrendPoint {
            metric: metric.to_string(),
            label: label.to_string(),
            current_value: 0.0,
            baseline_value: 0.0,
            delta: 0.0,
            classification: TrendClassification::Estavel,
        };
    };

    // Baseline sits `baseline_window` periods before the last; shorter
    // histories fall back to the earliest score.
    let baseline = if series.len() > config.baseline_window {
        series[series.len() - 1 - config.baseline_window]
    } else {
        series[0]
    };

    let delta = current - baseline;

    TrendPoint {
        metric: metric.to_string(),
        label: label.to_string(),
        current_value: current,
        baseline_value: baseline,
        delta,
        classification: classify(delta, config.trend_threshold),
    }
}

fn classify(delta: f64, threshold: f64) -> TrendClassification {
    if delta > threshold {
        TrendClassification::Melhora
    } else if delta < -threshold {
        TrendClassification::Queda
    } else {
        TrendClassification::Estavel
    }
}

fn period_label(month_ref: u32, year_ref: i32) -> String {
    format!("{month_ref:02}/{year_ref}")
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
