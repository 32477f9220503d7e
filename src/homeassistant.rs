//! Home Assistant integration
//!
//! Optional. Entity states drive a small alert indicator in the header and an
//! `input_text` entity can supply a message of the day that replaces the title.

use crate::config::HomeAssistantConfig;
use crate::error::{OctodashError, Result};
use crate::logging::{StructuredLogger, get_logger};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How individual condition results are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionLogic {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    LessThan,
    GreaterThan,
    Equals,
    NotEquals,
}

/// Expected value; numbers compare numerically, text compares as strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One entity check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCondition {
    pub entity_id: String,
    pub condition: Comparison,
    pub value: ConditionValue,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct EntityState {
    state: String,
}

/// Whether `condition` holds for an entity's current `state`.
///
/// Numeric comparisons fail when either side is not a number.
pub fn condition_holds(condition: &AlertCondition, state: &str) -> bool {
    let numeric = || -> Option<(f64, f64)> {
        let current = state.trim().parse::<f64>().ok()?;
        let expected = match &condition.value {
            ConditionValue::Number(n) => *n,
            ConditionValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        Some((current, expected))
    };
    match condition.condition {
        Comparison::LessThan => numeric().is_some_and(|(c, e)| c < e),
        Comparison::GreaterThan => numeric().is_some_and(|(c, e)| c > e),
        Comparison::Equals => state == condition.value.to_string(),
        Comparison::NotEquals => state != condition.value.to_string(),
    }
}

/// Combine per-condition results; no results means no alert
pub fn combine(logic: ConditionLogic, results: &[bool]) -> bool {
    if results.is_empty() {
        return false;
    }
    match logic {
        ConditionLogic::And => results.iter().all(|&r| r),
        ConditionLogic::Or => results.iter().any(|&r| r),
    }
}

/// Message text from an `input_text` state, if there is anything to show
pub fn normalize_message(state: &str) -> Option<String> {
    let trimmed = state.trim();
    if trimmed.is_empty() || matches!(trimmed, "unknown" | "unavailable") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// REST client for the Home Assistant states API
pub struct HomeAssistantClient {
    http: reqwest::Client,
    config: HomeAssistantConfig,
    logger: StructuredLogger,
}

impl HomeAssistantClient {
    pub fn new(config: &HomeAssistantConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
            logger: get_logger("homeassistant"),
        })
    }

    async fn entity_state(&self, entity_id: &str) -> Result<String> {
        let url = format!(
            "{}/api/states/{}",
            self.config.url.trim_end_matches('/'),
            entity_id
        );
        let resp = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token.trim()))
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(OctodashError::api(format!(
                "Home Assistant returned {} for {}",
                resp.status(),
                entity_id
            )));
        }
        let entity: EntityState = resp.json().await?;
        Ok(entity.state)
    }

    /// Evaluate all configured conditions; unreachable entities count as not met
    pub async fn should_alert(&self) -> bool {
        let mut results = Vec::with_capacity(self.config.conditions.len());
        for condition in &self.config.conditions {
            let met = match self.entity_state(&condition.entity_id).await {
                Ok(state) => {
                    let met = condition_holds(condition, &state);
                    self.logger.debug(&format!(
                        "{} = {} ({:?} {}): {}",
                        condition.entity_id, state, condition.condition, condition.value, met
                    ));
                    met
                }
                Err(e) => {
                    self.logger.warn(&format!(
                        "Failed to read {}: {}",
                        condition.entity_id, e
                    ));
                    false
                }
            };
            results.push(met);
        }
        combine(self.config.logic, &results)
    }

    /// Message of the day, if an entity is configured and holds text
    pub async fn message_of_the_day(&self) -> Option<String> {
        let entity_id = self.config.message_entity_id.as_deref()?;
        match self.entity_state(entity_id).await {
            Ok(state) => normalize_message(&state),
            Err(e) => {
                self.logger
                    .warn(&format!("Failed to read message entity {}: {}", entity_id, e));
                None
            }
        }
    }
}
