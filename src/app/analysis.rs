//! Read-only summaries over a finished dataset, the numbers a shelter dashboard shows.

use crate::constants::{derived, WEEKS_PER_YEAR};
use crate::core::enrich::{age_in_weeks_column, breed_column};
use crate::domain::model::Record;
use crate::domain::table::Dataset;
use serde::Serialize;
use std::collections::HashMap;

pub const OTHER_SLICE: &str = "Other";
pub const DEFAULT_SLICE_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RescueType {
    Water,
    Mountain,
    Disaster,
}

impl RescueType {
    pub const ALL: [RescueType; 3] = [Self::Water, Self::Mountain, Self::Disaster];

    pub fn breeds(self) -> &'static [&'static str] {
        match self {
            Self::Water => &["labrador", "retriever", "newfoundland"],
            Self::Mountain => &["german shepherd", "malamute", "sheepdog"],
            Self::Disaster => &["doberman", "german shepherd", "bloodhound"],
        }
    }

    pub fn max_age_years(self) -> f64 {
        match self {
            Self::Water => 2.0,
            Self::Mountain | Self::Disaster => 3.0,
        }
    }
}

/// Count per breed value, largest first, ties broken by name.
pub fn breed_distribution(dataset: &Dataset) -> Vec<(String, usize)> {
    let Some(column) = breed_column(dataset.columns()) else {
        return Vec::new();
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in dataset.rows() {
        let breed = row.get(column).map(|v| v.to_string()).unwrap_or_default();
        *counts.entry(breed).or_default() += 1;
    }

    let mut distribution: Vec<_> = counts.into_iter().collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    distribution
}

/// Collapses categories whose share of the total is below `threshold` into "Other".
pub fn group_small_slices(counts: &[(String, usize)], threshold: f64) -> Vec<(String, usize)> {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut kept = Vec::new();
    let mut other = 0;
    for (name, count) in counts {
        if (*count as f64) / (total as f64) < threshold {
            other += count;
        } else {
            kept.push((name.clone(), *count));
        }
    }
    if other > 0 {
        kept.push((OTHER_SLICE.to_string(), other));
    }
    kept
}

pub fn average_days_in_shelter(dataset: &Dataset) -> Option<f64> {
    let days: Vec<i64> = dataset
        .column(derived::DAYS_IN_SHELTER)?
        .filter_map(|v| v.as_i64())
        .collect();
    if days.is_empty() {
        return None;
    }
    Some(days.iter().sum::<i64>() as f64 / days.len() as f64)
}

pub fn working_dog_count(dataset: &Dataset) -> usize {
    dataset
        .column(derived::IS_WORKING_DOG)
        .map(|values| values.filter(|v| v.as_bool() == Some(true)).count())
        .unwrap_or(0)
}

fn age_in_years(dataset: &Dataset, row: &Record) -> Option<f64> {
    if let Some(age) = row.get(derived::AGE_IN_YEARS).and_then(|v| v.as_f64()) {
        return Some(age);
    }
    let weeks = age_in_weeks_column(dataset.columns())?;
    row.get(weeks)
        .and_then(|v| v.as_f64())
        .map(|w| w / WEEKS_PER_YEAR)
}

/// Rows whose breed names one of the rescue type's breeds and whose age is within its limit.
///
/// Without any age column every breed match qualifies; with one, rows of unknown age never do.
pub fn rescue_candidates(dataset: &Dataset, rescue: RescueType) -> Vec<&Record> {
    let Some(column) = breed_column(dataset.columns()) else {
        return Vec::new();
    };
    let has_age = dataset.has_column(derived::AGE_IN_YEARS)
        || age_in_weeks_column(dataset.columns()).is_some();

    dataset
        .rows()
        .iter()
        .filter(|row| {
            let Some(breed) = row.get(column).and_then(|v| v.as_text()) else {
                return false;
            };
            let breed = breed.to_lowercase();
            rescue.breeds().iter().any(|b| breed.contains(b))
        })
        .filter(|row| {
            !has_age
                || matches!(age_in_years(dataset, row), Some(age) if age <= rescue.max_age_years())
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescueCount {
    pub rescue_type: RescueType,
    pub candidates: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub working_dogs: usize,
    pub average_days_in_shelter: Option<f64>,
    pub breeds: Vec<(String, usize)>,
    pub rescue: Vec<RescueCount>,
}

pub fn summarize(dataset: &Dataset) -> DatasetSummary {
    DatasetSummary {
        rows: dataset.len(),
        working_dogs: working_dog_count(dataset),
        average_days_in_shelter: average_days_in_shelter(dataset),
        breeds: group_small_slices(&breed_distribution(dataset), DEFAULT_SLICE_THRESHOLD),
        rescue: RescueType::ALL
            .iter()
            .map(|&rescue_type| RescueCount {
                rescue_type,
                candidates: rescue_candidates(dataset, rescue_type).len(),
            })
            .collect(),
    }
}
