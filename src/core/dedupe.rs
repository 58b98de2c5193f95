use crate::constants::ANIMAL_ID;
use crate::domain::table::Table;
use std::collections::HashSet;

/// Identifiers already emitted during one pass over a table.
#[derive(Debug, Default)]
pub struct SeenIds {
    ids: HashSet<String>,
}

impl SeenIds {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: HashSet::with_capacity(capacity),
        }
    }

    /// Records `id` and reports whether this is its first sighting.
    pub fn first_sighting(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Keeps the first row for every identifier, preserving input order.
///
/// Tables without an identifier column, and empty tables, pass through untouched.
/// Rows lacking an identifier cannot collide and are kept.
pub fn dedupe(table: Table) -> Table {
    if table.is_empty() || !table.has_column(ANIMAL_ID) {
        return table;
    }

    let (kind, columns, rows) = table.into_parts();
    let mut seen = SeenIds::with_capacity(rows.len());
    let unique: Vec<_> = rows
        .into_iter()
        .filter(|row| match row.id() {
            Some(id) => seen.first_sighting(id),
            None => true,
        })
        .collect();

    Table::new(kind, columns, unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EntityKind, FieldValue, Record};

    fn row(id: &str, seq: i64) -> Record {
        Record::new()
            .with(ANIMAL_ID, FieldValue::text(id))
            .with("seq", FieldValue::Integer(seq))
    }

    fn seqs(table: &Table) -> Vec<i64> {
        table
            .rows()
            .iter()
            .filter_map(|r| r.get("seq").and_then(FieldValue::as_i64))
            .collect()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let table = Table::from_rows(
            EntityKind::Intake,
            vec![row("A", 1), row("B", 2), row("A", 3), row("C", 4), row("B", 5)],
        );

        let deduped = dedupe(table);

        assert_eq!(deduped.len(), 3);
        assert_eq!(seqs(&deduped), vec![1, 2, 4]);
    }

    #[test]
    fn test_at_most_one_row_per_identifier() {
        let rows = (0..500).map(|i| row(&format!("A{}", i % 37), i)).collect();
        let deduped = dedupe(Table::from_rows(EntityKind::Outcome, rows));

        let mut seen = SeenIds::default();
        assert!(deduped.rows().iter().all(|r| seen.first_sighting(r.id().unwrap())));
        assert_eq!(deduped.len(), 37);
    }

    #[test]
    fn test_empty_table_is_unchanged() {
        let table = Table::empty(EntityKind::Intake);
        assert_eq!(dedupe(table.clone()), table);
    }

    #[test]
    fn test_table_without_identifier_column_is_unchanged() {
        let rows = vec![
            Record::new().with("name", FieldValue::text("Rex")),
            Record::new().with("name", FieldValue::text("Rex")),
        ];
        let table = Table::new(EntityKind::Intake, vec!["name".to_string()], rows);

        assert_eq!(dedupe(table.clone()), table);
    }

    #[test]
    fn test_seen_ids() {
        let mut seen = SeenIds::default();
        assert!(seen.is_empty());
        assert!(seen.first_sighting("A1"));
        assert!(!seen.first_sighting("A1"));
        assert!(seen.first_sighting("A2"));
        assert_eq!(seen.len(), 2);
    }
}
