//! Build-size status check rules and their filters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Result, RuleError};

/// Metric a rule watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    InstallSize,
    DownloadSize,
    TotalInsights,
}

impl MetricType {
    pub const ALL: [MetricType; 3] = [
        MetricType::InstallSize,
        MetricType::DownloadSize,
        MetricType::TotalInsights,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::InstallSize => "install_size",
            MetricType::DownloadSize => "download_size",
            MetricType::TotalInsights => "total_insights",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricType::InstallSize => "Install/Uncompressed Size",
            MetricType::DownloadSize => "Download Size",
            MetricType::TotalInsights => "Total Insights",
        }
    }
}

impl FromStr for MetricType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        MetricType::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| RuleError::UnknownKind(format!("metric '{}'", s)))
    }
}

/// How the metric is compared against the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    Absolute,
    AbsoluteDiff,
    RelativeDiff,
}

impl MeasurementType {
    pub const ALL: [MeasurementType; 3] = [
        MeasurementType::Absolute,
        MeasurementType::AbsoluteDiff,
        MeasurementType::RelativeDiff,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MeasurementType::Absolute => "absolute",
            MeasurementType::AbsoluteDiff => "absolute_diff",
            MeasurementType::RelativeDiff => "relative_diff",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeasurementType::Absolute => "Absolute Size",
            MeasurementType::AbsoluteDiff => "Absolute Diff",
            MeasurementType::RelativeDiff => "Relative Diff",
        }
    }
}

impl FromStr for MeasurementType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        MeasurementType::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| RuleError::UnknownKind(format!("measurement '{}'", s)))
    }
}

/// Threshold unit, always derived from the measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    #[serde(rename = "MB")]
    Megabytes,
    #[serde(rename = "%")]
    Percent,
}

impl UnitType {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitType::Megabytes => "MB",
            UnitType::Percent => "%",
        }
    }
}

/// `relative_diff` is a percentage, everything else is in MB
pub fn unit_for_measurement(measurement: MeasurementType) -> UnitType {
    match measurement {
        MeasurementType::RelativeDiff => UnitType::Percent,
        MeasurementType::Absolute | MeasurementType::AbsoluteDiff => UnitType::Megabytes,
    }
}

/// One build-metadata predicate, e.g. `build.platform = android`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCheckFilter {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub negated: bool,
}

impl StatusCheckFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>, negated: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            negated,
        }
    }
}

/// A metric threshold rule with its build filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCheckRule {
    pub id: String,
    pub metric: MetricType,
    pub measurement: MeasurementType,
    pub value: f64,
    pub unit: UnitType,
    pub filters: Vec<StatusCheckFilter>,
}

impl StatusCheckRule {
    /// Fresh rule with a random id: install size, absolute, 0 MB, no filters
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            metric: MetricType::InstallSize,
            measurement: MeasurementType::Absolute,
            value: 0.0,
            unit: UnitType::Megabytes,
            filters: Vec::new(),
        }
    }

    pub fn with_metric(&self, metric: MetricType) -> Self {
        Self {
            metric,
            ..self.clone()
        }
        .normalized()
    }

    pub fn with_measurement(&self, measurement: MeasurementType) -> Self {
        Self {
            measurement,
            ..self.clone()
        }
        .normalized()
    }

    pub fn with_value(&self, value: f64) -> Self {
        Self {
            value,
            ..self.clone()
        }
        .normalized()
    }

    pub fn with_filters(&self, filters: Vec<StatusCheckFilter>) -> Self {
        Self {
            filters,
            ..self.clone()
        }
        .normalized()
    }

    /// Recompute the unit from the measurement
    pub fn normalized(mut self) -> Self {
        self.unit = unit_for_measurement(self.measurement);
        self
    }

    /// Threshold with its unit: `5%` or `5 MB`
    pub fn value_with_unit(&self) -> String {
        match self.unit {
            UnitType::Percent => format!("{}%", self.value),
            UnitType::Megabytes => format!("{} {}", self.value, self.unit.as_str()),
        }
    }

    /// Filters grouped by key: `android OR ios (platform) • NOT main (branch)`
    pub fn filter_summary(&self) -> String {
        let mut groups: Vec<(&str, Vec<&StatusCheckFilter>)> = Vec::new();
        for filter in &self.filters {
            match groups.iter_mut().find(|(key, _)| *key == filter.key) {
                Some((_, members)) => members.push(filter),
                None => groups.push((filter.key.as_str(), vec![filter])),
            }
        }

        groups
            .into_iter()
            .map(|(key, members)| {
                let values = members
                    .iter()
                    .map(|f| {
                        if f.negated {
                            format!("NOT {}", f.value)
                        } else {
                            f.value.clone()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" OR ");
                format!("{} ({})", values, key.strip_prefix("build.").unwrap_or(key))
            })
            .collect::<Vec<_>>()
            .join(" \u{2022} ")
    }
}

impl fmt::Display for StatusCheckRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \u{2022} {} \u{2022} {}",
            self.metric.label(),
            self.measurement.label(),
            self.value_with_unit()
        )
    }
}
