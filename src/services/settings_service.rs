use crate::db::repositories::settings_repository::SettingsRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::report::ReportConfig;
use tracing::{debug, info};

const KEY_REPORT_CONFIG: &str = "report_config";

#[derive(Clone)]
pub struct SettingsService {
    db: DbPool,
}

impl SettingsService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Stored analytics parameters; defaults apply until someone tunes them.
    pub fn report_config(&self) -> AppResult<ReportConfig> {
        let row = self
            .db
            .with_connection(|conn| SettingsRepository::get(conn, KEY_REPORT_CONFIG))?;

        match row {
            Some(row) => {
                let config: ReportConfig = serde_json::from_str(&row.value)?;
                debug!(target: "app::settings", "report config loaded");
                Ok(config)
            }
            None => Ok(ReportConfig::default()),
        }
    }

    pub fn update_report_config(&self, config: ReportConfig) -> AppResult<ReportConfig> {
        validate_report_config(&config)?;

        let value = serde_json::to_string(&config)?;
        self.db
            .with_connection(|conn| SettingsRepository::upsert(conn, KEY_REPORT_CONFIG, &value))?;
        info!(
            target: "app::settings",
            trend_threshold = config.trend_threshold,
            baseline_window = config.baseline_window,
            "report config updated"
        );
        Ok(config)
    }
}

fn validate_report_config(config: &ReportConfig) -> AppResult<()> {
    if !config.trend_threshold.is_finite() || config.trend_threshold < 0.0 {
        return Err(AppError::validation(
            "limiar de tendência deve ser um número não negativo",
        ));
    }

    if config.baseline_window == 0 {
        return Err(AppError::validation(
            "janela de referência deve ser de pelo menos 1 período",
        ));
    }

    if !config.domain_max_score.is_finite() || config.domain_max_score <= 0.0 {
        return Err(AppError::validation(
            "pontuação máxima por domínio deve ser maior que zero",
        ));
    }

    Ok(())
}
