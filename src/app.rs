//! Application context: configuration, the JSON store and the engine wired
//! together behind a clock.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use recurra_config::{Config, ConfigManager};
use recurra_core::{
    Clock, CreatedRule, DeleteReport, EngineSettings, PauseReport, RecurrenceService, ResumeOutcome,
    ScheduledEntry,
};
use recurra_domain::{
    ConflictResolution, DeleteMode, NewRecurrenceRule, Page, RecurrenceRule, RuleFilter,
    TransactionInstance,
};
use recurra_storage_json::{JsonStore, StorePaths};

use crate::{clock::SystemClock, errors::AppError};

/// Engine knobs derived from user configuration.
pub fn engine_settings(config: &Config) -> EngineSettings {
    EngineSettings {
        projection_years: config.projection_years,
    }
}

/// One opened application home. Each operation reads the clock once and
/// hands that instant to the engine.
pub struct App<C: Clock = SystemClock> {
    home: PathBuf,
    config: Config,
    config_manager: ConfigManager,
    service: RecurrenceService<JsonStore>,
    clock: C,
}

impl App<SystemClock> {
    pub fn open(home: &Path) -> Result<Self, AppError> {
        Self::open_with_clock(home, SystemClock)
    }
}

impl<C: Clock> App<C> {
    pub fn open_with_clock(home: &Path, clock: C) -> Result<Self, AppError> {
        let config_manager = ConfigManager::with_home(home)?;
        let config = config_manager.load()?;
        let data_dir = config.resolve_data_dir(home);
        let store =
            JsonStore::with_retention(StorePaths::in_dir(&data_dir), config.backup_retention)?;
        let service = RecurrenceService::with_settings(store, engine_settings(&config));
        debug!("opened recurra home at {}", home.display());
        Ok(Self {
            home: home.to_path_buf(),
            config,
            config_manager,
            service,
            clock,
        })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    pub fn service(&self) -> &RecurrenceService<JsonStore> {
        &self.service
    }

    pub fn create(&self, draft: NewRecurrenceRule) -> Result<CreatedRule, AppError> {
        Ok(self.service.create(draft, self.clock.now())?)
    }

    pub fn pause(&self, rule_id: Uuid) -> Result<PauseReport, AppError> {
        Ok(self.service.pause(rule_id, self.clock.now())?)
    }

    pub fn resume(
        &self,
        rule_id: Uuid,
        resolution: Option<ConflictResolution>,
    ) -> Result<ResumeOutcome, AppError> {
        Ok(self.service.resume(rule_id, resolution, self.clock.now())?)
    }

    pub fn delete(&self, rule_id: Uuid, mode: DeleteMode) -> Result<DeleteReport, AppError> {
        Ok(self.service.delete(rule_id, mode, self.clock.now())?)
    }

    pub fn rule(&self, rule_id: Uuid) -> Result<RecurrenceRule, AppError> {
        Ok(self.service.get_rule(rule_id)?)
    }

    pub fn rules(
        &self,
        owner_id: Uuid,
        filter: &RuleFilter,
    ) -> Result<Page<RecurrenceRule>, AppError> {
        Ok(self.service.list_rules(owner_id, filter)?)
    }

    pub fn instances(&self, rule_id: Uuid) -> Result<Vec<TransactionInstance>, AppError> {
        Ok(self.service.instances_for_rule(rule_id)?)
    }

    pub fn project(
        &self,
        draft: NewRecurrenceRule,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ScheduledEntry>, AppError> {
        if to < from {
            return Err(AppError::input(format!("projection end {to} is before start {from}")));
        }
        Ok(self.service.preview(draft, from, to, self.clock.now())?)
    }
}
