use std::fmt::{self, Display};
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::paced_train::ChangeGroups;
use crate::error::ChartError;
use crate::time::to_epoch_ms;

/// Identifies one occurrence of a paced train.
///
/// Regular occurrences are addressed by their grid index, added occurrences
/// by their exception key; the two spaces never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OccurrenceId {
    BaseOccurrence { index: u64 },
    ModifiedException { index: u64, exception_key: String },
    CreatedException { exception_key: String },
}

impl OccurrenceId {
    /// Grid index for regular occurrences, `None` for added ones
    #[must_use]
    pub fn index(&self) -> Option<u64> {
        match self {
            Self::BaseOccurrence { index } | Self::ModifiedException { index, .. } => Some(*index),
            Self::CreatedException { .. } => None,
        }
    }
}

/// Identifier of a train as exchanged with the host: a plain train schedule
/// or one occurrence of a paced train.
///
/// Textual forms: `42`, `42#3`, `42@key`, `42@key#3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrainId {
    TrainSchedule(i64),
    PacedTrain {
        paced_train_id: i64,
        occurrence_id: OccurrenceId,
    },
}

impl Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrainSchedule(id) => write!(f, "{id}"),
            Self::PacedTrain { paced_train_id, occurrence_id } => match occurrence_id {
                OccurrenceId::BaseOccurrence { index } => write!(f, "{paced_train_id}#{index}"),
                OccurrenceId::CreatedException { exception_key } => {
                    write!(f, "{paced_train_id}@{exception_key}")
                }
                OccurrenceId::ModifiedException { index, exception_key } => {
                    write!(f, "{paced_train_id}@{exception_key}#{index}")
                }
            },
        }
    }
}

impl FromStr for TrainId {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ChartError::InvalidTrainId { input: s.to_string(), reason };
        let parse_train = |id: &str| id.parse::<i64>().map_err(|_| invalid("invalid train id"));
        let parse_index = |index: &str| index.parse::<u64>().map_err(|_| invalid("invalid occurrence index"));

        if let Some((train, exception)) = s.split_once('@') {
            let paced_train_id = parse_train(train)?;
            let occurrence_id = match exception.split_once('#') {
                Some((key, index)) if !key.is_empty() => OccurrenceId::ModifiedException {
                    index: parse_index(index)?,
                    exception_key: key.to_string(),
                },
                None if !exception.is_empty() => OccurrenceId::CreatedException {
                    exception_key: exception.to_string(),
                },
                _ => return Err(invalid("empty exception key")),
            };
            return Ok(Self::PacedTrain { paced_train_id, occurrence_id });
        }

        if let Some((train, index)) = s.split_once('#') {
            return Ok(Self::PacedTrain {
                paced_train_id: parse_train(train)?,
                occurrence_id: OccurrenceId::BaseOccurrence { index: parse_index(index)? },
            });
        }

        Ok(Self::TrainSchedule(parse_train(s)?))
    }
}

/// Aggregated validity of a simulated train, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TrainStatus {
    #[default]
    Valid,
    TrainTooFast,
    ScheduleNotHonored,
    Invalid,
}

impl TrainStatus {
    /// Status key used by the host; empty when there is nothing to report
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "",
            Self::TrainTooFast => "trainTooFast",
            Self::ScheduleNotHonored => "scheduleNotHonored",
            Self::Invalid => "invalid",
        }
    }
}

impl Display for TrainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a simulation, as summarized by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimulationSummary {
    Success {
        /// Total run time in milliseconds
        duration: i64,
        /// At least one scheduled point is reached after its target time
        #[serde(default)]
        is_late: bool,
        /// The train runs faster than physically allowed to honor its schedule
        #[serde(default)]
        is_too_fast: bool,
    },
    Invalid {
        reason: String,
    },
}

impl SimulationSummary {
    #[must_use]
    pub fn status(&self) -> TrainStatus {
        match self {
            Self::Invalid { .. } => TrainStatus::Invalid,
            Self::Success { is_late: true, .. } => TrainStatus::ScheduleNotHonored,
            Self::Success { is_too_fast: true, .. } => TrainStatus::TrainTooFast,
            Self::Success { .. } => TrainStatus::Valid,
        }
    }
}

/// One concrete instance of a paced train, derived from the model and its exception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub train_name: String,
    pub start_time: DateTime<Utc>,
    pub rolling_stock_name: String,
    #[serde(default)]
    pub summary: Option<SimulationSummary>,
    /// Change groups overridden by the exception, if any
    #[serde(default)]
    pub exception_change_groups: Option<ChangeGroups>,
}

impl Occurrence {
    /// Start time in chart milliseconds
    #[must_use]
    pub fn start_ms(&self) -> i64 {
        to_epoch_ms(self.start_time)
    }
}
