use calendario::{CalendarDate, CalendarError, DateRange};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// How much a commitment matters, with the weight used to rank it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "ImportanceRepr")]
pub enum Importance {
    #[default]
    None,
    Small,
    Medium,
    Large,
    Extreme,
    Exclusive,
    /// A weight with no matching level
    Unknown,
}

impl Importance {
    pub fn from_weight(weight: u32) -> Self {
        match weight {
            0 => Importance::None,
            5 => Importance::Small,
            10 => Importance::Medium,
            20 => Importance::Large,
            50 => Importance::Extreme,
            60 => Importance::Exclusive,
            _ => Importance::Unknown,
        }
    }

    pub fn weight(&self) -> u32 {
        match self {
            Importance::None | Importance::Unknown => 0,
            Importance::Small => 5,
            Importance::Medium => 10,
            Importance::Large => 20,
            Importance::Extreme => 50,
            Importance::Exclusive => 60,
        }
    }
}

/// Importance as sent by clients: a level name or its weight
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportanceRepr {
    Weight(u32),
    Name(String),
}

impl From<ImportanceRepr> for Importance {
    fn from(repr: ImportanceRepr) -> Self {
        match repr {
            ImportanceRepr::Weight(weight) => Importance::from_weight(weight),
            ImportanceRepr::Name(name) => match name.trim().to_ascii_lowercase().as_str() {
                "" | "none" => Importance::None,
                "small" => Importance::Small,
                "medium" => Importance::Medium,
                "large" => Importance::Large,
                "extreme" => Importance::Extreme,
                "exclusive" => Importance::Exclusive,
                other => other
                    .parse()
                    .map_or(Importance::Unknown, Importance::from_weight),
            },
        }
    }
}

/// Why a commitment was refused at save time
#[derive(Debug, Error)]
pub enum CommitmentError {
    #[error("Field '{0}' must not be empty")]
    MissingField(&'static str),

    #[error(transparent)]
    InvalidDate(#[from] CalendarError),

    #[error("Invalid {field}: {value:?} (expected HH:MM)")]
    InvalidTime { field: &'static str, value: String },

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart {
        start: CalendarDate,
        end: CalendarDate,
    },

    #[error("Malformed commitment: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A task recorded over a date range and a time range
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Commitment {
    /// What has to be done
    pub task: String,

    /// First day, YYYY-MM-DD
    pub start_date: String,

    /// Last day, YYYY-MM-DD
    pub end_date: String,

    /// HH:MM
    pub start_time: String,

    /// HH:MM
    pub end_time: String,

    #[serde(default)]
    pub importance: Importance,
}

impl Commitment {
    pub fn new(
        task: String,
        start_date: String,
        end_date: String,
        start_time: String,
        end_time: String,
        importance: Importance,
    ) -> Self {
        Self {
            task,
            start_date,
            end_date,
            start_time,
            end_time,
            importance,
        }
    }

    /// Check every field and return the parsed date range.
    ///
    /// All text fields are required, dates must read as YYYY-MM-DD, times
    /// as HH:MM, and the end date may not precede the start date.
    pub fn validate(&self) -> Result<DateRange, CommitmentError> {
        let fields = [
            ("task", &self.task),
            ("start_date", &self.start_date),
            ("end_date", &self.end_date),
            ("start_time", &self.start_time),
            ("end_time", &self.end_time),
        ];
        if let Some((name, _)) = fields.into_iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(CommitmentError::MissingField(name));
        }

        let range = DateRange::parse(&self.start_date, &self.end_date)?;
        if range.is_inverted() {
            return Err(CommitmentError::EndBeforeStart {
                start: range.start,
                end: range.end,
            });
        }

        parse_time("start_time", &self.start_time)?;
        parse_time("end_time", &self.end_time)?;

        Ok(range)
    }
}

fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, CommitmentError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| CommitmentError::InvalidTime {
        field,
        value: value.to_string(),
    })
}

/// Read a save request body: a single commitment or an array of them, with
/// nested arrays flattened in order. Every commitment is validated.
pub fn commitments_from_payload(payload: Value) -> Result<Vec<Commitment>, CommitmentError> {
    let mut flat = Vec::new();
    flatten_into(payload, &mut flat);

    flat.into_iter()
        .map(|value| {
            let commitment: Commitment = serde_json::from_value(value)?;
            commitment.validate()?;
            Ok(commitment)
        })
        .collect()
}

fn flatten_into(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        other => out.push(other),
    }
}
