use super::basis::{CpGroup, ParseCpGroupError, ReferenceTemperature};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Rayer GAA heat-capacity contributions shipped with the crate.
pub const BUILTIN_HEAT_CAPACITY_CSV: &str = include_str!("../../../data/heat_capacity.csv");

#[derive(Debug, Deserialize)]
struct RawCpRecord {
    group: String,
    cp_313: Option<f64>,
    cp_393: Option<f64>,
}

#[derive(Debug, Error)]
pub enum HeatCapacityLoadError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error(transparent)]
    UnknownGroup(#[from] ParseCpGroupError),
    #[error("Heat-capacity group '{0}' appears more than once")]
    DuplicateGroup(CpGroup),
    #[error("No heat-capacity coefficient for group '{group}' at {temperature}")]
    MissingHeatCapacity {
        group: CpGroup,
        temperature: ReferenceTemperature,
    },
    #[error("Non-finite heat-capacity coefficient for group '{group}' at {temperature}")]
    NonFinite {
        group: CpGroup,
        temperature: ReferenceTemperature,
    },
}

/// Heat-capacity coefficients (J/(mol K)) of every basis group at both
/// reference temperatures, indexed by group discriminant.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatCapacityTable {
    coefficients: [[f64; 2]; CpGroup::ALL.len()],
}

impl HeatCapacityTable {
    pub fn load(path: &Path) -> Result<Self, HeatCapacityLoadError> {
        let origin = path.to_string_lossy().to_string();
        let reader = csv::Reader::from_path(path).map_err(|e| HeatCapacityLoadError::Csv {
            path: origin.clone(),
            source: e,
        })?;
        Self::read(reader, &origin)
    }

    pub fn from_csv_str(content: &str) -> Result<Self, HeatCapacityLoadError> {
        Self::read(csv::Reader::from_reader(content.as_bytes()), "<string>")
    }

    pub fn builtin() -> Result<Self, HeatCapacityLoadError> {
        Self::read(
            csv::Reader::from_reader(BUILTIN_HEAT_CAPACITY_CSV.as_bytes()),
            "<builtin heat_capacity.csv>",
        )
    }

    fn read<R: Read>(mut reader: csv::Reader<R>, origin: &str) -> Result<Self, HeatCapacityLoadError> {
        let mut rows = HashMap::new();
        for result in reader.deserialize::<RawCpRecord>() {
            let record = result.map_err(|e| HeatCapacityLoadError::Csv {
                path: origin.to_string(),
                source: e,
            })?;
            let group = record.group.parse::<CpGroup>()?;
            let low = Self::required(group, ReferenceTemperature::Low, record.cp_313)?;
            let high = Self::required(group, ReferenceTemperature::High, record.cp_393)?;
            if rows.insert(group, [low, high]).is_some() {
                return Err(HeatCapacityLoadError::DuplicateGroup(group));
            }
        }

        let mut coefficients = [[0.0; 2]; CpGroup::ALL.len()];
        for group in CpGroup::ALL {
            let row = rows.get(&group).ok_or(HeatCapacityLoadError::MissingHeatCapacity {
                group,
                temperature: ReferenceTemperature::Low,
            })?;
            coefficients[group as usize] = *row;
        }

        info!(
            "Loaded heat-capacity table from {} covering all {} basis groups.",
            origin,
            rows.len()
        );
        Ok(Self { coefficients })
    }

    fn required(
        group: CpGroup,
        temperature: ReferenceTemperature,
        value: Option<f64>,
    ) -> Result<f64, HeatCapacityLoadError> {
        let value = value.ok_or(HeatCapacityLoadError::MissingHeatCapacity { group, temperature })?;
        if !value.is_finite() {
            return Err(HeatCapacityLoadError::NonFinite { group, temperature });
        }
        Ok(value)
    }

    /// Coefficient of `group` at `temperature`. Total after a successful load.
    #[inline]
    pub fn coefficient(&self, group: CpGroup, temperature: ReferenceTemperature) -> f64 {
        let index = match temperature {
            ReferenceTemperature::Low => 0,
            ReferenceTemperature::High => 1,
        };
        self.coefficients[group as usize][index]
    }
}
