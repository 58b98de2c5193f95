use crate::constants::ANIMAL_ID;
use crate::domain::model::{EntityKind, FieldValue, Record};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

static UNKNOWN_CELL: FieldValue = FieldValue::Unknown;

/// Normalized records of one entity kind, indexed by animal identifier.
///
/// The index points at the first row carrying each identifier, so lookups
/// agree with first-occurrence deduplication even before duplicates are removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    kind: EntityKind,
    columns: Vec<String>,
    rows: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Table {
    /// A table with no rows that still declares the identifier column.
    pub fn empty(kind: EntityKind) -> Self {
        Self::new(kind, vec![ANIMAL_ID.to_string()], Vec::new())
    }

    pub fn new(kind: EntityKind, columns: Vec<String>, rows: Vec<Record>) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            if let Some(id) = row.id() {
                index.entry(id.to_string()).or_insert(position);
            }
        }

        Self {
            kind,
            columns,
            rows,
            index,
        }
    }

    /// Builds the column list from the rows: identifier first, then first-seen order.
    pub fn from_rows(kind: EntityKind, rows: Vec<Record>) -> Self {
        let mut columns = vec![ANIMAL_ID.to_string()];
        for row in &rows {
            for column in row.data.keys() {
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.clone());
                }
            }
        }
        Self::new(kind, columns, rows)
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row carrying `id`.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&position| &self.rows[position])
    }

    pub fn distinct_ids(&self) -> usize {
        self.index.len()
    }

    pub fn into_parts(self) -> (EntityKind, Vec<String>, Vec<Record>) {
        (self.kind, self.columns, self.rows)
    }
}

/// Rows sharing one ordered column list: the merged and the enriched stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The finished, ordered table handed to reporting consumers.
///
/// Every row holds a value for every column and the identifier column is unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Dataset {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.rows.iter().find(|row| row.id() == Some(id))
    }

    /// Values of one column in row order; `None` for an undeclared column.
    pub fn column<'a>(&'a self, name: &'a str) -> Option<impl Iterator<Item = &'a FieldValue> + 'a> {
        let name = self.has_column(name).then_some(name)?;
        Some(self.rows.iter().filter_map(move |row| row.get(name)))
    }

    /// Cells of one row in column order.
    pub fn positional_row<'a>(&'a self, row: &'a Record) -> impl Iterator<Item = &'a FieldValue> + 'a {
        self.columns
            .iter()
            .map(move |column| row.get(column).unwrap_or(&UNKNOWN_CELL))
    }
}

struct OrderedRow<'a> {
    columns: &'a [String],
    row: &'a Record,
}

impl Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column, self.row.get(column).unwrap_or(&UNKNOWN_CELL))?;
        }
        map.end()
    }
}

/// Serializes as an array of objects whose keys follow the column order.
impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&OrderedRow {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}
