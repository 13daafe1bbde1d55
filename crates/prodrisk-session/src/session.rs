use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use chrono::{Duration, Local, NaiveDateTime};
use prodrisk_api::Engine;
use prodrisk_core::{format_api_time, ProdriskError, ProdriskResult, Value};
use prodrisk_model::{AttributeProxy, ModelBuilder, ObjectProxy};
use tracing::{error, info};

use crate::config::SessionConfig;
use crate::logging;

const SETTING_TYPE: &str = "setting";

/// `session_<YYYY-MM-DD-HH-MM-SS>`.
pub fn session_id_at(time: NaiveDateTime) -> String {
    format!("session_{}", time.format("%Y-%m-%d-%H-%M-%S"))
}

/// `nPriceLevels` → `n_price_levels`.
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut snake = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let previous = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if previous.is_lowercase() || previous.is_ascii_digit() || next_is_lower {
                snake.push('_');
            }
        }
        snake.extend(c.to_lowercase());
    }
    snake
}

/// Optimization period set on the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizationPeriod {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub n_weeks: u32,
}

/// One engine instance with its model, settings and run control.
pub struct ProdriskSession<E: Engine + 'static> {
    engine: Rc<E>,
    config: SessionConfig,
    session_id: String,
    model: ModelBuilder,
    setting: Rc<ObjectProxy>,
    /// snake_case name → engine attribute name.
    settings: BTreeMap<String, String>,
    n_scenarios: usize,
    keep_working_directory: bool,
    period: Option<OptimizationPeriod>,
}

impl<E: Engine + 'static> ProdriskSession<E> {
    /// Start a session.
    ///
    /// `factory` receives the session id and the silent flag and creates the
    /// engine. The license environment is exported before it is called.
    pub fn open<F>(config: SessionConfig, factory: F) -> ProdriskResult<Self>
    where
        F: FnOnce(&str, bool) -> ProdriskResult<E>,
    {
        logging::init(&config.logging)?;
        if let Some(path) = &config.license.path {
            apply_license_environment(path, config.license_file());
        }

        let session_id = session_id_at(Local::now().naive_local());
        let engine = Rc::new(factory(&session_id, config.logging.silent)?);
        let keep_working_directory = config.solver.keep_working_directory;
        engine.keep_working_directory(keep_working_directory)?;

        let shared: Rc<dyn Engine> = engine.clone();
        let model = ModelBuilder::new(Rc::clone(&shared), &[SETTING_TYPE])?;
        let setting = ModelBuilder::new(shared, &[])?
            .get(SETTING_TYPE)?
            .add_object(SETTING_TYPE)?;
        let settings = setting
            .attribute_names()
            .into_iter()
            .map(|name| (camel_to_snake(&name), name))
            .collect();

        info!(session_id = %session_id, "session opened");
        Ok(Self {
            engine,
            config,
            session_id,
            model,
            setting,
            settings,
            n_scenarios: 1,
            keep_working_directory,
            period: None,
        })
    }

    pub fn engine(&self) -> &Rc<E> {
        &self.engine
    }

    /// Model of every object type except the setting object.
    pub fn model(&self) -> &ModelBuilder {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ModelBuilder {
        &mut self.model
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn license_path(&self) -> Option<&Path> {
        self.config.license.path.as_deref()
    }

    pub fn prodrisk_path(&self) -> &Path {
        &self.config.solver.prodrisk_path
    }

    pub fn mpi_path(&self) -> &Path {
        &self.config.solver.mpi_path
    }

    pub fn use_coin_osi(&self) -> bool {
        self.config.solver.use_coin_osi
    }

    /// snake_case names of the settings.
    pub fn setting_names(&self) -> Vec<String> {
        self.settings.keys().cloned().collect()
    }

    /// Attribute of the setting object, by snake_case name.
    pub fn setting(&self, name: &str) -> ProdriskResult<Rc<AttributeProxy>> {
        let attribute = self
            .settings
            .get(name)
            .ok_or_else(|| ProdriskError::UnknownSetting(name.to_string()))?;
        self.setting.attribute(attribute)
    }

    pub fn set_setting(&self, name: &str, value: impl Into<Value>) -> ProdriskResult<()> {
        self.setting(name)?.set(value)
    }

    pub fn n_scenarios(&self) -> usize {
        self.n_scenarios
    }

    pub fn set_n_scenarios(&mut self, n: usize) -> ProdriskResult<()> {
        if n == 0 {
            return Err(ProdriskError::precondition("n_scenarios must be positive"));
        }
        self.n_scenarios = n;
        Ok(())
    }

    pub fn keep_working_directory(&self) -> bool {
        self.keep_working_directory
    }

    pub fn set_keep_working_directory(&mut self, keep: bool) -> ProdriskResult<()> {
        self.engine.keep_working_directory(keep)?;
        self.keep_working_directory = keep;
        Ok(())
    }

    /// Optimize over `n_weeks` weeks from `start`.
    pub fn set_optimization_period(&mut self, start: NaiveDateTime, n_weeks: u32) -> ProdriskResult<()> {
        let end = Duration::try_weeks(i64::from(n_weeks))
            .and_then(|length| start.checked_add_signed(length))
            .ok_or_else(|| {
                ProdriskError::precondition(format!(
                    "an optimization period of {n_weeks} weeks from {start} is out of range"
                ))
            })?;
        self.engine
            .set_optimization_period(&format_api_time(&start), &format_api_time(&end))?;
        info!(%start, %end, n_weeks, "optimization period set");
        self.period = Some(OptimizationPeriod { start, end, n_weeks });
        Ok(())
    }

    pub fn optimization_period(&self) -> Option<OptimizationPeriod> {
        self.period
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.period.map(|p| p.start)
    }

    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.period.map(|p| p.end)
    }

    pub fn n_weeks(&self) -> Option<u32> {
        self.period.map(|p| p.n_weeks)
    }

    /// Generate the engine input files, then optimize and simulate.
    ///
    /// Returns the engine's success flag; details of a failure are in the
    /// engine log.
    pub fn run(&self) -> ProdriskResult<bool> {
        if !self.engine.generate_prodrisk_files()? {
            error!(
                session_id = %self.session_id,
                "an error occurred and the optimization/simulation was not run; check the log for details"
            );
            return Ok(false);
        }
        let status = self.engine.run_prodrisk()?;
        if status {
            info!(session_id = %self.session_id, "run finished");
        } else {
            error!(
                session_id = %self.session_id,
                "an error occurred during the optimization/simulation; check the log for details"
            );
        }
        Ok(status)
    }
}

fn apply_license_environment(path: &Path, file: &str) {
    std::env::set_var("LTM_LICENSE_CONTROL_SYSTEM", "TRUE");
    std::env::set_var("LTM_LICENSE_FILE", file);
    std::env::set_var("LTM_LICENSE_PATH", path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn camel_case_becomes_snake_case() {
        assert_eq!(camel_to_snake("nPriceLevels"), "n_price_levels");
        assert_eq!(camel_to_snake("maxIterations"), "max_iterations");
        assert_eq!(camel_to_snake("getHTTPResponse"), "get_http_response");
        assert_eq!(camel_to_snake("n_scen"), "n_scen");
        assert_eq!(camel_to_snake("Sim2Scen"), "sim2_scen");
    }

    #[test]
    fn session_id_uses_local_timestamp() {
        let time = NaiveDate::from_ymd_opt(2022, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();
        assert_eq!(session_id_at(time), "session_2022-03-04-05-06-07");
    }
}
