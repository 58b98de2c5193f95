use crate::core::enrich::intake_timestamp_column;
use crate::domain::model::FieldValue;
use crate::domain::table::{Dataset, RowSet};
use std::cmp::Ordering;

/// Newest intake first; rows without an intake timestamp go last.
///
/// The sort is stable, so equal and missing keys keep their enriched order.
pub fn finalize(enriched: &RowSet) -> Dataset {
    let mut rows = enriched.rows.clone();

    if let Some(column) = intake_timestamp_column(&enriched.columns) {
        rows.sort_by(|a, b| {
            let a = a.get(column).and_then(FieldValue::as_timestamp);
            let b = b.get(column).and_then(FieldValue::as_timestamp);
            match (a, b) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
    }

    Dataset::new(enriched.columns.clone(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ANIMAL_ID, DATETIME_INTAKE};
    use crate::domain::model::Record;
    use chrono::NaiveDate;

    fn row(id: &str, intake: Option<(i32, u32, u32)>) -> Record {
        let value = match intake {
            Some((y, m, d)) => FieldValue::Timestamp(
                NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            ),
            None => FieldValue::Unknown,
        };
        Record::new()
            .with(ANIMAL_ID, FieldValue::text(id))
            .with(DATETIME_INTAKE, value)
    }

    fn columns() -> Vec<String> {
        vec![ANIMAL_ID.to_string(), DATETIME_INTAKE.to_string()]
    }

    fn order(dataset: &Dataset) -> Vec<&str> {
        dataset.rows().iter().filter_map(Record::id).collect()
    }

    #[test]
    fn test_sorted_newest_first_with_missing_last() {
        let enriched = RowSet::new(
            columns(),
            vec![
                row("old", Some((2018, 1, 1))),
                row("missing-1", None),
                row("new", Some((2021, 6, 1))),
                row("missing-2", None),
                row("mid", Some((2019, 3, 1))),
            ],
        );

        let dataset = finalize(&enriched);

        assert_eq!(order(&dataset), vec!["new", "mid", "old", "missing-1", "missing-2"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let enriched = RowSet::new(
            columns(),
            vec![
                row("b", Some((2020, 1, 1))),
                row("a", Some((2020, 1, 1))),
                row("c", Some((2020, 1, 1))),
            ],
        );

        assert_eq!(order(&finalize(&enriched)), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let enriched = RowSet::new(
            columns(),
            vec![row("old", Some((2018, 1, 1))), row("new", Some((2021, 1, 1)))],
        );
        let before = enriched.clone();

        let dataset = finalize(&enriched);

        assert_eq!(enriched, before);
        assert_eq!(dataset.columns(), enriched.columns.as_slice());
    }

    #[test]
    fn test_without_intake_column_order_is_kept() {
        let enriched = RowSet::new(
            vec![ANIMAL_ID.to_string()],
            vec![
                Record::new().with(ANIMAL_ID, FieldValue::text("x")),
                Record::new().with(ANIMAL_ID, FieldValue::text("y")),
            ],
        );
        assert_eq!(order(&finalize(&enriched)), vec!["x", "y"]);
    }
}
