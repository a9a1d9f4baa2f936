//! Occurrence model of paced trains.
//!
//! A paced train expands into `ceil(time_window / interval)` regular
//! occurrences plus the occurrences added by key-only exceptions. Exception
//! lists are never patched in place: every store operation returns a new
//! array.

use chrono::{DateTime, Duration, Utc};
use crate::error::{ChartError, Result};
use crate::models::{
    ChangeGroup, ExceptionKind, Occurrence, OccurrenceId, Paced, PacedTrain, PacedTrainException,
    PathAndScheduleChangeGroup, RollingStockChangeGroup, SimulationSummary, TrainSchedule, TrainStatus,
};

/// Number of regular occurrences generated by a recurrence.
///
/// # Errors
///
/// Returns [`ChartError::ZeroInterval`] when the interval is zero.
pub fn occurrences_count(paced: &Paced) -> Result<u64> {
    let interval = paced.interval.num_milliseconds();
    if interval <= 0 {
        return Err(ChartError::ZeroInterval);
    }
    let window = paced.time_window.num_milliseconds();
    if window <= 0 {
        return Ok(0);
    }
    Ok(u64::try_from(window / interval + i64::from(window % interval != 0)).unwrap_or(0))
}

/// Find the exception matching an occurrence id.
///
/// Regular ids match on `occurrence_index`, added ids on `key`.
#[must_use]
pub fn find_exception<'a>(exceptions: &'a [PacedTrainException], id: &OccurrenceId) -> Option<&'a PacedTrainException> {
    match id {
        OccurrenceId::BaseOccurrence { index } | OccurrenceId::ModifiedException { index, .. } => {
            exceptions.iter().find(|e| e.occurrence_index == Some(*index))
        }
        OccurrenceId::CreatedException { exception_key } => exceptions
            .iter()
            .find(|e| e.occurrence_index.is_none() && e.key == *exception_key),
    }
}

/// Id of the occurrence an exception describes
#[must_use]
pub fn exception_occurrence_id(exception: &PacedTrainException) -> OccurrenceId {
    match exception.kind() {
        ExceptionKind::Modified { occurrence_index } => OccurrenceId::ModifiedException {
            index: occurrence_index,
            exception_key: exception.key.clone(),
        },
        ExceptionKind::Added => OccurrenceId::CreatedException { exception_key: exception.key.clone() },
    }
}

/// Derive the name of the occurrence at `index` from the paced train name.
///
/// The last run of digits is incremented by `2 × index`, keeping its zero
/// padding (`"8601"` → `"8605"` at index 2, `"T009"` → `"T011"` at index 1).
/// A name without digits gets the 1-based index appended (`"Fret"` → `"Fret 2"`).
#[must_use]
pub fn compute_occurrence_name(name: &str, index: u64) -> String {
    let Some(end) = name.rfind(|c: char| c.is_ascii_digit()).map(|i| i + 1) else {
        return format!("{name} {}", index + 1);
    };
    let start = end - name[..end].chars().rev().take_while(char::is_ascii_digit).count();
    let digits = &name[start..end];

    let Some(number) = digits
        .parse::<u128>()
        .ok()
        .and_then(|n| n.checked_add(u128::from(index) * 2))
    else {
        return format!("{name} {}", index + 1);
    };

    format!("{}{:0width$}{}", &name[..start], number, &name[end..], width = digits.len())
}

impl PacedTrainException {
    /// Overwrite every change group carried by this exception onto `schedule`.
    ///
    /// Absent groups leave the schedule untouched, so applying the same
    /// exception twice gives the same result as applying it once.
    pub fn apply_to(&self, schedule: &mut TrainSchedule) {
        if let Some(group) = &self.train_name {
            schedule.train_name.clone_from(&group.value);
        }
        if let Some(group) = &self.start_time {
            schedule.start_time = group.value;
        }
        if let Some(group) = &self.speed_limit_tag {
            schedule.speed_limit_tag.clone_from(&group.value);
        }
        if let Some(group) = &self.labels {
            schedule.labels.clone_from(&group.value);
        }
        if let Some(group) = &self.initial_speed {
            schedule.initial_speed = group.value;
        }
        if let Some(group) = &self.constraint_distribution {
            schedule.constraint_distribution = group.value;
        }
        if let Some(group) = &self.rolling_stock_category {
            schedule.category.clone_from(&group.value);
        }
        if let Some(group) = &self.rolling_stock {
            schedule.rolling_stock_name.clone_from(&group.rolling_stock_name);
            schedule.comfort = group.comfort;
        }
        if let Some(group) = &self.options {
            schedule.options = group.value;
        }
        if let Some(group) = &self.path_and_schedule {
            schedule.path.clone_from(&group.path);
            schedule.schedule.clone_from(&group.schedule);
            schedule.margins.clone_from(&group.margins);
            schedule.power_restrictions.clone_from(&group.power_restrictions);
        }
    }
}

impl PacedTrain {
    /// Start time of the regular occurrence at `index`, `None` when it is not
    /// representable
    #[must_use]
    pub fn occurrence_start_time(&self, index: u64) -> Option<DateTime<Utc>> {
        let steps = i64::try_from(index).ok()?;
        let offset = self.paced.interval.num_milliseconds().checked_mul(steps)?;
        self.base.start_time.checked_add_signed(Duration::try_milliseconds(offset)?)
    }

    /// Schedule of a regular occurrence before any exception is applied.
    ///
    /// `None` when `index` lies outside the grid.
    #[must_use]
    pub fn regular_occurrence(&self, index: u64) -> Option<TrainSchedule> {
        if index >= occurrences_count(&self.paced).ok()? {
            return None;
        }
        Some(TrainSchedule {
            train_name: compute_occurrence_name(&self.base.train_name, index),
            start_time: self.occurrence_start_time(index)?,
            ..self.base.clone()
        })
    }

    /// Effective schedule of the occurrence described by `exception`.
    ///
    /// Indexed exceptions start from their regular occurrence, so one without
    /// a start time group keeps its grid time. Added exceptions start from
    /// the model itself. An indexed exception outside the grid describes no
    /// occurrence and gives `None`.
    #[must_use]
    pub fn apply_exception(&self, exception: &PacedTrainException) -> Option<TrainSchedule> {
        let mut schedule = match exception.kind() {
            ExceptionKind::Modified { occurrence_index } => self.regular_occurrence(occurrence_index)?,
            ExceptionKind::Added => self.base.clone(),
        };
        exception.apply_to(&mut schedule);
        Some(schedule)
    }

    /// Effective schedule of any occurrence, `None` if the id does not exist
    #[must_use]
    pub fn occurrence_schedule(&self, id: &OccurrenceId) -> Option<TrainSchedule> {
        match (id.index(), find_exception(&self.exceptions, id)) {
            (_, Some(exception)) => self.apply_exception(exception),
            (Some(index), None) => self.regular_occurrence(index),
            (None, None) => None,
        }
    }

    /// Every enabled occurrence, sorted by start time.
    ///
    /// Regular occurrences are generated from the grid; those with an
    /// exception are replaced by it (or skipped when disabled). Added
    /// exceptions follow. Indexed exceptions outside the grid are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::ZeroInterval`] when the interval is zero.
    pub fn occurrences(&self) -> Result<Vec<Occurrence>> {
        let count = occurrences_count(&self.paced)?;
        let mut occurrences = Vec::new();

        for index in 0..count {
            let id = OccurrenceId::BaseOccurrence { index };
            let occurrence = match find_exception(&self.exceptions, &id) {
                Some(exception) if exception.disabled => None,
                Some(exception) => self
                    .apply_exception(exception)
                    .map(|schedule| build_occurrence(exception_occurrence_id(exception), &schedule, Some(exception))),
                None => self
                    .regular_occurrence(index)
                    .map(|schedule| build_occurrence(id, &schedule, None)),
            };
            occurrences.extend(occurrence);
        }

        for exception in &self.exceptions {
            if exception.kind() == ExceptionKind::Added && !exception.disabled {
                let occurrence = self
                    .apply_exception(exception)
                    .map(|schedule| build_occurrence(exception_occurrence_id(exception), &schedule, Some(exception)));
                occurrences.extend(occurrence);
            }
        }

        occurrences.sort_by_key(|o| o.start_time);
        Ok(occurrences)
    }
}

fn build_occurrence(id: OccurrenceId, schedule: &TrainSchedule, exception: Option<&PacedTrainException>) -> Occurrence {
    Occurrence {
        id,
        train_name: schedule.train_name.clone(),
        start_time: schedule.start_time,
        rolling_stock_name: schedule.rolling_stock_name.clone(),
        summary: None,
        exception_change_groups: exception.map(PacedTrainException::change_groups),
    }
}

/// Worst simulation status across the model and its enabled exceptions.
///
/// Missing summaries count as valid. Disabled exceptions never contribute.
#[must_use]
pub fn occurrences_worst_status<'a, I>(model: Option<&SimulationSummary>, exceptions: I) -> TrainStatus
where
    I: IntoIterator<Item = (&'a PacedTrainException, Option<&'a SimulationSummary>)>,
{
    exceptions
        .into_iter()
        .filter(|(exception, _)| !exception.disabled)
        .filter_map(|(_, summary)| summary.map(SimulationSummary::status))
        .chain(model.map(SimulationSummary::status))
        .max()
        .unwrap_or_default()
}

/// Build the exception turning `model` into `edited`, keeping only the groups that differ
#[must_use]
pub fn diff_exception(
    model: &TrainSchedule,
    edited: &TrainSchedule,
    key: String,
    occurrence_index: Option<u64>,
) -> PacedTrainException {
    fn changed<T: PartialEq + Clone>(model: &T, edited: &T) -> Option<ChangeGroup<T>> {
        (model != edited).then(|| ChangeGroup::new(edited.clone()))
    }

    let rolling_stock = (model.rolling_stock_name != edited.rolling_stock_name || model.comfort != edited.comfort)
        .then(|| RollingStockChangeGroup {
            rolling_stock_name: edited.rolling_stock_name.clone(),
            comfort: edited.comfort,
        });

    let path_and_schedule = (model.path != edited.path
        || model.schedule != edited.schedule
        || model.margins != edited.margins
        || model.power_restrictions != edited.power_restrictions)
        .then(|| PathAndScheduleChangeGroup {
            path: edited.path.clone(),
            schedule: edited.schedule.clone(),
            margins: edited.margins.clone(),
            power_restrictions: edited.power_restrictions.clone(),
        });

    PacedTrainException {
        key,
        occurrence_index,
        disabled: false,
        train_name: changed(&model.train_name, &edited.train_name),
        start_time: changed(&model.start_time, &edited.start_time),
        speed_limit_tag: changed(&model.speed_limit_tag, &edited.speed_limit_tag),
        labels: changed(&model.labels, &edited.labels),
        initial_speed: changed(&model.initial_speed, &edited.initial_speed),
        constraint_distribution: changed(&model.constraint_distribution, &edited.constraint_distribution),
        rolling_stock_category: changed(&model.category, &edited.category),
        rolling_stock,
        options: changed(&model.options, &edited.options),
        path_and_schedule,
    }
}

fn new_exception_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Record an edited occurrence, returning the new exception array.
///
/// The edit is diffed against what the occurrence would be without any
/// exception. An indexed exception left without any change group (and not
/// disabled) is removed. Added occurrences always keep their start time.
///
/// # Errors
///
/// Returns [`ChartError::ZeroInterval`] when the interval is zero and
/// [`ChartError::OccurrenceOutOfGrid`] when a regular occurrence index is
/// past the last occurrence.
pub fn upsert_occurrence(
    train: &PacedTrain,
    id: &OccurrenceId,
    edited: &TrainSchedule,
) -> Result<Vec<PacedTrainException>> {
    let existing = find_exception(&train.exceptions, id);
    let key = existing.map_or_else(new_exception_key, |e| e.key.clone());
    let disabled = existing.is_some_and(|e| e.disabled);

    let updated = match id.index() {
        Some(index) => {
            let count = occurrences_count(&train.paced)?;
            let model = train
                .regular_occurrence(index)
                .ok_or(ChartError::OccurrenceOutOfGrid { index, count })?;
            let exception = PacedTrainException {
                disabled,
                ..diff_exception(&model, edited, key, Some(index))
            };
            (exception.disabled || !exception.change_groups().is_empty()).then_some(exception)
        }
        None => {
            let mut exception = diff_exception(&train.base, edited, key, None);
            exception.disabled = disabled;
            exception.start_time = Some(ChangeGroup::new(edited.start_time));
            Some(exception)
        }
    };

    if updated.is_none() {
        crate::log!("Occurrence {:?} matches the model, dropping its exception", id);
    }
    Ok(replace_exception(&train.exceptions, existing, updated))
}

/// Disable an occurrence, returning the new exception array.
///
/// Regular occurrences get (or keep) an exception flagged as disabled. Added
/// occurrences only exist through their exception, so it is removed.
#[must_use]
pub fn disable_occurrence(exceptions: &[PacedTrainException], id: &OccurrenceId) -> Vec<PacedTrainException> {
    let existing = find_exception(exceptions, id);
    let updated = match (id.index(), existing) {
        (Some(_), Some(exception)) => Some(PacedTrainException { disabled: true, ..exception.clone() }),
        (Some(index), None) => Some(PacedTrainException {
            key: new_exception_key(),
            occurrence_index: Some(index),
            disabled: true,
            ..Default::default()
        }),
        (None, _) => None,
    };
    replace_exception(exceptions, existing, updated)
}

/// Re-enable a disabled occurrence, returning the new exception array.
///
/// An indexed exception that carried nothing but the disabled flag is removed.
#[must_use]
pub fn restore_occurrence(exceptions: &[PacedTrainException], id: &OccurrenceId) -> Vec<PacedTrainException> {
    let Some(existing) = find_exception(exceptions, id) else {
        return exceptions.to_vec();
    };
    let restored = PacedTrainException { disabled: false, ..existing.clone() };
    let keep = restored.occurrence_index.is_none() || !restored.change_groups().is_empty();
    replace_exception(exceptions, Some(existing), keep.then_some(restored))
}

/// Add an occurrence outside of the regular grid.
///
/// Returns the new exception array and the id of the added occurrence.
#[must_use]
pub fn add_occurrence(
    exceptions: &[PacedTrainException],
    start_time: DateTime<Utc>,
    train_name: Option<String>,
) -> (Vec<PacedTrainException>, OccurrenceId) {
    let exception = PacedTrainException {
        key: new_exception_key(),
        start_time: Some(ChangeGroup::new(start_time)),
        train_name: train_name.map(ChangeGroup::new),
        ..Default::default()
    };
    let id = exception_occurrence_id(&exception);
    let mut updated = exceptions.to_vec();
    updated.push(exception);
    (updated, id)
}

/// Shift every occurrence start, model and exceptions alike
#[must_use]
pub fn shift_paced_train(train: &PacedTrain, delta: Duration) -> PacedTrain {
    let mut shifted = train.clone();
    shifted.base.start_time += delta;
    for exception in &mut shifted.exceptions {
        if let Some(group) = &mut exception.start_time {
            group.value += delta;
        }
    }
    shifted
}

fn replace_exception(
    exceptions: &[PacedTrainException],
    existing: Option<&PacedTrainException>,
    updated: Option<PacedTrainException>,
) -> Vec<PacedTrainException> {
    let mut result: Vec<PacedTrainException> = exceptions
        .iter()
        .filter(|e| existing.map_or(true, |x| !std::ptr::eq(*e, x)))
        .cloned()
        .collect();
    if let Some(exception) = updated {
        match existing.and_then(|x| exceptions.iter().position(|e| std::ptr::eq(e, x))) {
            Some(position) => result.insert(position, exception),
            None => result.push(exception),
        }
    }
    result
}
