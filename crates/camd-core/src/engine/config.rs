use crate::core::feasibility::FeasibilityLimits;
use crate::core::models::hansen::HansenReference;
use crate::core::properties::estimator::{DEFAULT_LOG_FLOOR, DEFAULT_MIN_CONTRIBUTION_SUM};
use crate::core::properties::window::PropertyWindow;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Where a coefficient table comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DataSource {
    /// The table shipped with the crate.
    #[default]
    Builtin,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub limits: FeasibilityLimits,
    pub window: PropertyWindow,
    /// Weight `w` of the density reward in the objective.
    pub density_weight: f64,
    /// Positive floor `eps` inside the Tb/Tm logarithms.
    pub log_floor: f64,
    /// Strictly positive lower bound on the Tb and Tm contribution sums.
    pub min_contribution_sum: f64,
    /// Lower-bounds RED at zero, removing the negative root of `RED^2 = Ra^2`.
    pub red_non_negative: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            limits: FeasibilityLimits::default(),
            window: PropertyWindow::default(),
            density_weight: 0.001,
            log_floor: DEFAULT_LOG_FLOOR,
            min_contribution_sum: DEFAULT_MIN_CONTRIBUTION_SUM,
            red_non_negative: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignConfig {
    pub groups: DataSource,
    pub heat_capacity: DataSource,
    /// Overrides the reference species of the group library.
    pub reference: Option<HansenReference>,
    pub settings: ModelSettings,
}

#[derive(Default)]
pub struct DesignConfigBuilder {
    groups: Option<DataSource>,
    heat_capacity: Option<DataSource>,
    reference: Option<HansenReference>,
    limits: Option<FeasibilityLimits>,
    window: Option<PropertyWindow>,
    density_weight: Option<f64>,
    log_floor: Option<f64>,
    min_contribution_sum: Option<f64>,
    red_non_negative: Option<bool>,
}

impl DesignConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(mut self, source: DataSource) -> Self {
        self.groups = Some(source);
        self
    }
    pub fn heat_capacity(mut self, source: DataSource) -> Self {
        self.heat_capacity = Some(source);
        self
    }
    pub fn reference(mut self, reference: HansenReference) -> Self {
        self.reference = Some(reference);
        self
    }
    pub fn limits(mut self, limits: FeasibilityLimits) -> Self {
        self.limits = Some(limits);
        self
    }
    pub fn max_per_fragment(mut self, bound: u32) -> Self {
        self.limits.get_or_insert_with(FeasibilityLimits::default).max_per_fragment = bound;
        self
    }
    pub fn max_total(mut self, bound: u32) -> Self {
        self.limits.get_or_insert_with(FeasibilityLimits::default).max_total = bound;
        self
    }
    pub fn window(mut self, window: PropertyWindow) -> Self {
        self.window = Some(window);
        self
    }
    pub fn density_weight(mut self, weight: f64) -> Self {
        self.density_weight = Some(weight);
        self
    }
    pub fn log_floor(mut self, floor: f64) -> Self {
        self.log_floor = Some(floor);
        self
    }
    pub fn min_contribution_sum(mut self, minimum: f64) -> Self {
        self.min_contribution_sum = Some(minimum);
        self
    }
    pub fn red_non_negative(mut self, enabled: bool) -> Self {
        self.red_non_negative = Some(enabled);
        self
    }

    pub fn build(self) -> Result<DesignConfig, ConfigError> {
        let defaults = ModelSettings::default();
        let settings = ModelSettings {
            limits: self.limits.unwrap_or(defaults.limits),
            window: self.window.unwrap_or(defaults.window),
            density_weight: self.density_weight.unwrap_or(defaults.density_weight),
            log_floor: self.log_floor.unwrap_or(defaults.log_floor),
            min_contribution_sum: self.min_contribution_sum.unwrap_or(defaults.min_contribution_sum),
            red_non_negative: self.red_non_negative.unwrap_or(defaults.red_non_negative),
        };
        validate(&settings)?;
        if let Some(reference) = &self.reference {
            let triple = reference.triple.as_vector();
            if !triple.iter().all(|x| x.is_finite()) {
                return Err(invalid("reference", "Hansen parameters must be finite"));
            }
        }
        Ok(DesignConfig {
            groups: self.groups.unwrap_or_default(),
            heat_capacity: self.heat_capacity.unwrap_or_default(),
            reference: self.reference,
            settings,
        })
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.to_string(),
    }
}

fn validate(settings: &ModelSettings) -> Result<(), ConfigError> {
    let limits = &settings.limits;
    if limits.min_total == 0 {
        return Err(invalid("min_total", "a molecule needs at least one fragment"));
    }
    if limits.max_total < limits.min_total {
        return Err(invalid("max_total", "must not be below min_total"));
    }
    if limits.max_per_fragment == 0 {
        return Err(invalid("max_per_fragment", "must be at least 1"));
    }
    if !settings.window.min_boiling_point.is_finite() || !settings.window.max_melting_point.is_finite() {
        return Err(invalid("window", "temperature bounds must be finite"));
    }
    if !(settings.density_weight.is_finite() && settings.density_weight >= 0.0) {
        return Err(invalid("density_weight", "must be finite and non-negative"));
    }
    if !(settings.log_floor.is_finite() && settings.log_floor > 0.0) {
        return Err(invalid("log_floor", "must be finite and strictly positive"));
    }
    if !(settings.min_contribution_sum.is_finite() && settings.min_contribution_sum > 0.0) {
        return Err(invalid("min_contribution_sum", "must be finite and strictly positive"));
    }
    Ok(())
}
