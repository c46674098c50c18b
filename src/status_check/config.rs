//! Status check configuration as stored in project options
//!
//! The rules live in a single option as a JSON-encoded string, next to a
//! boolean enable flag. Reads are lenient: anything unreadable is treated as
//! "no rules" rather than an error.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Result, RuleError};
use crate::status_check::types::{
    MeasurementType, MetricType, StatusCheckFilter, StatusCheckRule,
};

/// Project option holding the enable flag
pub const ENABLED_KEY: &str = "sentry:preprod_size_status_checks_enabled";
/// Project option holding the JSON-encoded rule list
pub const RULES_KEY: &str = "sentry:preprod_size_status_checks_rules";

/// Partial update applied to a rule by id; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleUpdate {
    pub metric: Option<MetricType>,
    pub measurement: Option<MeasurementType>,
    pub value: Option<f64>,
    pub filters: Option<Vec<StatusCheckFilter>>,
}

impl RuleUpdate {
    /// Apply to `rule`, keeping the unit in step with the measurement
    pub fn apply(&self, rule: &StatusCheckRule) -> StatusCheckRule {
        StatusCheckRule {
            id: rule.id.clone(),
            metric: self.metric.unwrap_or(rule.metric),
            measurement: self.measurement.unwrap_or(rule.measurement),
            value: self.value.unwrap_or(rule.value),
            unit: rule.unit,
            filters: self.filters.clone().unwrap_or_else(|| rule.filters.clone()),
        }
        .normalized()
    }
}

/// Enable flag plus the ordered rule list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusCheckConfig {
    pub enabled: bool,
    pub rules: Vec<StatusCheckRule>,
}

impl StatusCheckConfig {
    /// Read from raw project option values.
    ///
    /// Only a literal `true` enables checks. Missing or malformed rule JSON
    /// yields an empty rule list.
    pub fn from_options(enabled: Option<&Value>, rules_json: Option<&str>) -> Self {
        let enabled = matches!(enabled, Some(Value::Bool(true)));
        let rules = rules_json.map(parse_rules).unwrap_or_default();
        Self { enabled, rules }
    }

    /// Read from a project options map
    pub fn from_option_map(options: &Map<String, Value>) -> Self {
        Self::from_options(
            options.get(ENABLED_KEY),
            options.get(RULES_KEY).and_then(Value::as_str),
        )
    }

    /// Both option entries, with the rules encoded as a JSON string.
    ///
    /// Fails on a non-finite rule value, which JSON would store as `null`
    /// and make the whole rule list unreadable.
    pub fn to_options(&self) -> Result<Map<String, Value>> {
        if let Some(rule) = self.rules.iter().find(|r| !r.value.is_finite()) {
            return Err(RuleError::InvalidValue(format!(
                "rule '{}' has non-finite value {}",
                rule.id, rule.value
            )));
        }
        let mut options = Map::new();
        options.insert(ENABLED_KEY.to_string(), Value::Bool(self.enabled));
        options.insert(
            RULES_KEY.to_string(),
            Value::String(serde_json::to_string(&self.rules)?),
        );
        Ok(options)
    }

    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self {
            enabled,
            rules: self.rules.clone(),
        }
    }

    pub fn add_rule(&self, rule: StatusCheckRule) -> Self {
        let mut rules = self.rules.clone();
        rules.push(rule.normalized());
        Self {
            enabled: self.enabled,
            rules,
        }
    }

    /// Update the rule with `id`; unknown ids leave the rules unchanged
    pub fn update_rule(&self, id: &str, update: &RuleUpdate) -> Self {
        if !self.rules.iter().any(|r| r.id == id) {
            debug!(id, "no status check rule to update");
        }
        let rules = self
            .rules
            .iter()
            .map(|r| if r.id == id { update.apply(r) } else { r.clone() })
            .collect();
        Self {
            enabled: self.enabled,
            rules,
        }
    }

    pub fn delete_rule(&self, id: &str) -> Self {
        Self {
            enabled: self.enabled,
            rules: self.rules.iter().filter(|r| r.id != id).cloned().collect(),
        }
    }

    pub fn rule(&self, id: &str) -> Option<&StatusCheckRule> {
        self.rules.iter().find(|r| r.id == id)
    }
}

/// Parse stored rule JSON; unreadable input yields no rules
pub fn parse_rules(json: &str) -> Vec<StatusCheckRule> {
    if json.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<StatusCheckRule>>(json) {
        Ok(rules) => rules.into_iter().map(StatusCheckRule::normalized).collect(),
        Err(err) => {
            warn!(%err, "ignoring malformed status check rules");
            Vec::new()
        }
    }
}
