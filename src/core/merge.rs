use crate::constants::ANIMAL_ID;
use crate::core::dedupe::SeenIds;
use crate::domain::model::{EntityKind, Record};
use crate::domain::table::{RowSet, Table};
use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;

/// Joined rows plus how many intake rows found an outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub rows: RowSet,
    pub matched: usize,
}

/// Left outer join of intake (driving side) with outcome on `animal_id`.
///
/// Exactly one row per distinct intake identifier; outcome-only identifiers are
/// ignored and repeated outcome identifiers contribute their first row only.
/// Columns present on both sides, other than the identifier, are renamed with
/// `_intake` / `_outcome`.
pub fn merge(intake: &Table, outcome: &Table) -> Result<Merged> {
    require_identifier(intake)?;
    require_identifier(outcome)?;

    let collisions: HashSet<&str> = intake
        .columns()
        .iter()
        .filter(|c| c.as_str() != ANIMAL_ID && outcome.has_column(c))
        .map(String::as_str)
        .collect();
    let rename = |column: &str, side: EntityKind| -> String {
        if collisions.contains(column) {
            format!("{}{}", column, side.suffix())
        } else {
            column.to_string()
        }
    };

    let mut columns: Vec<String> = intake
        .columns()
        .iter()
        .map(|c| rename(c, EntityKind::Intake))
        .collect();
    columns.extend(
        outcome
            .columns()
            .iter()
            .filter(|c| c.as_str() != ANIMAL_ID)
            .map(|c| rename(c, EntityKind::Outcome)),
    );

    let mut seen = SeenIds::with_capacity(intake.len());
    let mut rows = Vec::with_capacity(intake.distinct_ids());
    let mut matched = 0;

    for intake_row in intake.rows() {
        let Some(id) = intake_row.id() else {
            continue;
        };
        if !seen.first_sighting(id) {
            continue;
        }

        let mut merged = Record::new();
        for (column, value) in &intake_row.data {
            merged.insert(rename(column, EntityKind::Intake), value.clone());
        }
        if let Some(outcome_row) = outcome.get(id) {
            matched += 1;
            for (column, value) in &outcome_row.data {
                if column != ANIMAL_ID {
                    merged.insert(rename(column, EntityKind::Outcome), value.clone());
                }
            }
        }
        rows.push(merged);
    }

    Ok(Merged {
        rows: RowSet::new(columns, rows),
        matched,
    })
}

fn require_identifier(table: &Table) -> Result<()> {
    if table.has_column(ANIMAL_ID) {
        Ok(())
    } else {
        Err(EtlError::schema(table.kind().name(), ANIMAL_ID))
    }
}
