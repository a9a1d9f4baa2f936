use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use super::train_schedule::{
    Comfort, Distribution, Margins, PathItem, PowerRestrictionItem, ScheduleItem, TrainCategory,
    TrainSchedule, TrainScheduleOptions,
};
use crate::time::iso_duration_serde;

/// Recurrence of a paced train: one occurrence every `interval` during `time_window`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paced {
    #[serde(with = "iso_duration_serde")]
    pub time_window: Duration,
    #[serde(with = "iso_duration_serde")]
    pub interval: Duration,
}

/// A train definition repeated at a fixed interval, with sparse per-occurrence overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacedTrain {
    pub id: i64,
    #[serde(flatten)]
    pub base: TrainSchedule,
    pub paced: Paced,
    #[serde(default)]
    pub exceptions: Vec<PacedTrainException>,
}

/// A single overridden value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeGroup<T> {
    pub value: T,
}

impl<T> ChangeGroup<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingStockChangeGroup {
    pub rolling_stock_name: String,
    pub comfort: Comfort,
}

/// Path, margins, power restrictions and schedule change together since they reference each other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAndScheduleChangeGroup {
    pub path: Vec<PathItem>,
    pub schedule: Vec<ScheduleItem>,
    pub margins: Margins,
    pub power_restrictions: Vec<PowerRestrictionItem>,
}

/// Sparse override of a paced train.
///
/// With `occurrence_index` set it modifies a regular occurrence; without it,
/// it describes an extra occurrence identified by `key` only.
/// Every absent change group inherits the paced train's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PacedTrainException {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_index: Option<u64>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_name: Option<ChangeGroup<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<ChangeGroup<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_limit_tag: Option<ChangeGroup<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<ChangeGroup<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_speed: Option<ChangeGroup<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_distribution: Option<ChangeGroup<Distribution>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_stock_category: Option<ChangeGroup<Option<TrainCategory>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_stock: Option<RollingStockChangeGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ChangeGroup<TrainScheduleOptions>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_and_schedule: Option<PathAndScheduleChangeGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    /// Overrides the regular occurrence at this index
    Modified { occurrence_index: u64 },
    /// An occurrence outside of the regular grid
    Added,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeGroups: u16 {
        const TRAIN_NAME              = 1 << 0;
        const START_TIME              = 1 << 1;
        const SPEED_LIMIT_TAG         = 1 << 2;
        const LABELS                  = 1 << 3;
        const INITIAL_SPEED           = 1 << 4;
        const CONSTRAINT_DISTRIBUTION = 1 << 5;
        const ROLLING_STOCK_CATEGORY  = 1 << 6;
        const ROLLING_STOCK           = 1 << 7;
        const OPTIONS                 = 1 << 8;
        const PATH_AND_SCHEDULE       = 1 << 9;
    }
}

impl Serialize for ChangeGroups {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.bits())
    }
}

impl<'de> Deserialize<'de> for ChangeGroups {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u16::deserialize(deserializer)?;
        Self::from_bits(bits).ok_or_else(|| serde::de::Error::custom("Invalid ChangeGroups bits"))
    }
}

impl PacedTrainException {
    #[must_use]
    pub fn kind(&self) -> ExceptionKind {
        match self.occurrence_index {
            Some(occurrence_index) => ExceptionKind::Modified { occurrence_index },
            None => ExceptionKind::Added,
        }
    }

    /// Set of change groups carried by this exception
    #[must_use]
    pub fn change_groups(&self) -> ChangeGroups {
        let mut groups = ChangeGroups::empty();
        groups.set(ChangeGroups::TRAIN_NAME, self.train_name.is_some());
        groups.set(ChangeGroups::START_TIME, self.start_time.is_some());
        groups.set(ChangeGroups::SPEED_LIMIT_TAG, self.speed_limit_tag.is_some());
        groups.set(ChangeGroups::LABELS, self.labels.is_some());
        groups.set(ChangeGroups::INITIAL_SPEED, self.initial_speed.is_some());
        groups.set(ChangeGroups::CONSTRAINT_DISTRIBUTION, self.constraint_distribution.is_some());
        groups.set(ChangeGroups::ROLLING_STOCK_CATEGORY, self.rolling_stock_category.is_some());
        groups.set(ChangeGroups::ROLLING_STOCK, self.rolling_stock.is_some());
        groups.set(ChangeGroups::OPTIONS, self.options.is_some());
        groups.set(ChangeGroups::PATH_AND_SCHEDULE, self.path_and_schedule.is_some());
        groups
    }
}
