//! Feasibility result: the structured answer parsed out of the model's free-form text.

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Summary value the model uses to say the job cannot be done.
pub const NOT_ASSESSABLE: &str = "NA";

/// Either a fully populated estimate or the `{"summary": "NA"}` sentinel.
/// There is no partially populated state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireResult", try_from = "WireResult")]
pub enum FeasibilityResult {
    Feasible {
        summary: String,
        minimum_number_of_people: u32,
        hours: f64,
        tools: Vec<String>,
    },
    Infeasible,
}

impl FeasibilityResult {
    pub fn is_feasible(&self) -> bool {
        matches!(self, FeasibilityResult::Feasible { .. })
    }

    pub fn summary(&self) -> &str {
        match self {
            FeasibilityResult::Feasible { summary, .. } => summary,
            FeasibilityResult::Infeasible => NOT_ASSESSABLE,
        }
    }
}

/// How the raw model text turned into a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    /// Valid JSON in one of the two expected shapes.
    Parsed,
    /// Valid JSON, but not a complete estimate nor the sentinel.
    Malformed,
    /// Not JSON at all.
    Unparsable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub result: FeasibilityResult,
    pub status: ParseStatus,
}

impl ParseOutcome {
    fn collapsed(status: ParseStatus) -> Self {
        Self {
            result: FeasibilityResult::Infeasible,
            status,
        }
    }

    pub fn into_result(self) -> FeasibilityResult {
        self.result
    }
}

/// The JSON shape exchanged with the model and with HTTP clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireResult {
    summary: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "whole_number"
    )]
    minimum_number_of_people: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<String>>,
}

/// Accepts `2` and `2.0` alike; models often emit integers as floats.
fn whole_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(n) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if n.fract() != 0.0 || n < 0.0 || n > f64::from(u32::MAX) {
        return Err(de::Error::custom(format!("expected a whole number, got {n}")));
    }
    Ok(Some(n as u32))
}

#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("minimum_number_of_people must be at least 1")]
    NoPeople,

    #[error("hours must be a non-negative number, got {0}")]
    InvalidHours(f64),
}

impl From<FeasibilityResult> for WireResult {
    fn from(result: FeasibilityResult) -> Self {
        match result {
            FeasibilityResult::Feasible {
                summary,
                minimum_number_of_people,
                hours,
                tools,
            } => WireResult {
                summary,
                minimum_number_of_people: Some(minimum_number_of_people),
                hours: Some(hours),
                tools: Some(tools),
            },
            FeasibilityResult::Infeasible => WireResult {
                summary: NOT_ASSESSABLE.to_string(),
                minimum_number_of_people: None,
                hours: None,
                tools: None,
            },
        }
    }
}

impl TryFrom<WireResult> for FeasibilityResult {
    type Error = ShapeError;

    fn try_from(wire: WireResult) -> Result<Self, Self::Error> {
        // The sentinel wins over anything else the model added next to it.
        if wire.summary == NOT_ASSESSABLE {
            return Ok(FeasibilityResult::Infeasible);
        }

        let minimum_number_of_people = wire
            .minimum_number_of_people
            .ok_or(ShapeError::MissingField("minimum_number_of_people"))?;
        let hours = wire.hours.ok_or(ShapeError::MissingField("hours"))?;
        let tools = wire.tools.ok_or(ShapeError::MissingField("tools"))?;

        if minimum_number_of_people == 0 {
            return Err(ShapeError::NoPeople);
        }
        if !hours.is_finite() || hours < 0.0 {
            return Err(ShapeError::InvalidHours(hours));
        }

        Ok(FeasibilityResult::Feasible {
            summary: wire.summary,
            minimum_number_of_people,
            hours,
            tools,
        })
    }
}

/// Parses raw model output. Never fails: anything that is not a complete estimate
/// or the sentinel collapses to `Infeasible`, with `status` recording why.
pub fn parse_feasibility(raw: &str) -> ParseOutcome {
    let text = strip_json_fences(raw);

    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => return ParseOutcome::collapsed(ParseStatus::Unparsable),
    };

    let wire: WireResult = match serde_json::from_value(value) {
        Ok(w) => w,
        Err(_) => return ParseOutcome::collapsed(ParseStatus::Malformed),
    };

    match FeasibilityResult::try_from(wire) {
        Ok(result) => ParseOutcome {
            result,
            status: ParseStatus::Parsed,
        },
        Err(_) => ParseOutcome::collapsed(ParseStatus::Malformed),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
