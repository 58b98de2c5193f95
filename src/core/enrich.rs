use crate::constants::{
    derived, fields, ANIMAL_ID, DATETIME_INTAKE, DATETIME_OUTCOME, INTAKE_SUFFIX,
    OUTCOME_SUFFIX, WEEKS_PER_YEAR, WORKING_BREEDS,
};
use crate::domain::model::{FieldValue, Record};
use crate::domain::table::RowSet;
use crate::utils::error::{EtlError, Result};
use crate::utils::timestamp::render_timestamp;
use chrono::NaiveDateTime;

const SECONDS_PER_DAY: i64 = 86_400;

/// Finds the merged column carrying `base`: the plain name, then each suffix in order.
pub fn resolve_column<'a>(columns: &'a [String], base: &str, suffixes: &[&str]) -> Option<&'a str> {
    std::iter::once(base.to_string())
        .chain(suffixes.iter().map(|suffix| format!("{}{}", base, suffix)))
        .find_map(|candidate| columns.iter().find(|c| **c == candidate))
        .map(String::as_str)
}

pub fn intake_timestamp_column(columns: &[String]) -> Option<&str> {
    resolve_column(columns, DATETIME_INTAKE, &[INTAKE_SUFFIX, OUTCOME_SUFFIX])
}

pub fn outcome_timestamp_column(columns: &[String]) -> Option<&str> {
    resolve_column(columns, DATETIME_OUTCOME, &[OUTCOME_SUFFIX, INTAKE_SUFFIX])
}

/// Breed as the reporting surface reads it: `breed_outcome`, `breed_intake`, then `breed`.
pub fn breed_column(columns: &[String]) -> Option<&str> {
    [OUTCOME_SUFFIX, INTAKE_SUFFIX]
        .iter()
        .map(|suffix| format!("{}{}", fields::BREED, suffix))
        .chain(std::iter::once(fields::BREED.to_string()))
        .find_map(|candidate| columns.iter().find(|c| **c == candidate))
        .map(String::as_str)
}

pub fn age_in_weeks_column(columns: &[String]) -> Option<&str> {
    [fields::AGE_UPON_OUTCOME_IN_WEEKS, fields::AGE_IN_WEEKS]
        .iter()
        .find_map(|base| resolve_column(columns, base, &[OUTCOME_SUFFIX, INTAKE_SUFFIX]))
}

pub fn is_working_breed(breed: &str) -> bool {
    let breed = breed.to_lowercase();
    WORKING_BREEDS.contains(&breed.as_str())
}

/// Whole days from intake to outcome, floored like a calendar timedelta.
pub fn days_between(intake: NaiveDateTime, outcome: NaiveDateTime) -> i64 {
    (outcome - intake).num_seconds().div_euclid(SECONDS_PER_DAY)
}

fn year_bucket(ts: Option<NaiveDateTime>) -> FieldValue {
    match ts {
        Some(ts) => FieldValue::Text(render_timestamp(&ts).chars().take(4).collect()),
        None => FieldValue::Unknown,
    }
}

fn cell<'r>(row: &'r Record, column: Option<&str>) -> Option<&'r FieldValue> {
    column.and_then(|c| row.get(c))
}

/// Adds the derived columns and replaces every missing value with `unknown`.
///
/// Pure: the same merged rows always produce the same output.
pub fn enrich(merged: RowSet) -> Result<RowSet> {
    if !merged.has_column(ANIMAL_ID) {
        return Err(EtlError::schema("merged", ANIMAL_ID));
    }

    let RowSet { mut columns, rows } = merged;
    let intake_ts = intake_timestamp_column(&columns).map(str::to_string);
    let outcome_ts = outcome_timestamp_column(&columns).map(str::to_string);
    let breed = breed_column(&columns).map(str::to_string);
    let age_weeks = age_in_weeks_column(&columns).map(str::to_string);

    let mut derived_columns = Vec::with_capacity(5);
    if age_weeks.is_some() {
        derived_columns.push(derived::AGE_IN_YEARS);
    }
    derived_columns.extend([
        derived::INTAKE_YEAR,
        derived::OUTCOME_YEAR,
        derived::DAYS_IN_SHELTER,
        derived::IS_WORKING_DOG,
    ]);
    for column in &derived_columns {
        if !columns.iter().any(|c| c == column) {
            columns.push(column.to_string());
        }
    }

    let enriched = rows
        .into_iter()
        .map(|mut row| {
            let intake_at = cell(&row, intake_ts.as_deref()).and_then(FieldValue::as_timestamp);
            let outcome_at = cell(&row, outcome_ts.as_deref()).and_then(FieldValue::as_timestamp);

            if age_weeks.is_some() {
                let years = match cell(&row, age_weeks.as_deref()) {
                    Some(value) if !value.is_missing() => match value.as_f64() {
                        Some(weeks) => FieldValue::Float(weeks / WEEKS_PER_YEAR),
                        None => {
                            let err = EtlError::ValueCoercion {
                                field: derived::AGE_IN_YEARS.to_string(),
                                value: value.to_string(),
                            };
                            tracing::debug!("{}", err);
                            FieldValue::Unknown
                        }
                    },
                    _ => FieldValue::Unknown,
                };
                row.insert(derived::AGE_IN_YEARS, years);
            }

            row.insert(derived::INTAKE_YEAR, year_bucket(intake_at));
            row.insert(derived::OUTCOME_YEAR, year_bucket(outcome_at));

            let days = match (intake_at, outcome_at) {
                (Some(intake), Some(outcome)) => FieldValue::Integer(days_between(intake, outcome)),
                _ => FieldValue::Unknown,
            };
            row.insert(derived::DAYS_IN_SHELTER, days);

            let working = cell(&row, breed.as_deref())
                .filter(|value| !value.is_missing())
                .is_some_and(|value| is_working_breed(&value.to_string()));
            row.insert(derived::IS_WORKING_DOG, FieldValue::Bool(working));

            fill_unknown(&mut row, &columns);
            row
        })
        .collect();

    Ok(RowSet::new(columns, enriched))
}

fn fill_unknown(row: &mut Record, columns: &[String]) {
    for column in columns {
        let value = row.data.entry(column.clone()).or_insert(FieldValue::Unknown);
        if matches!(value, FieldValue::Null) {
            *value = FieldValue::Unknown;
        }
    }
}
