//! Column type inference.
//!
//! Types use the pandas dtype vocabulary (`int64`, `float64`, `bool`,
//! `object`) since that is what the report consumers expect to see.
//!
//! ## Rules
//!
//! For every column the inferrer tracks whether all present cells parse as
//! integers, as numbers, or as booleans, and whether any cell is missing:
//!
//! | present cells        | no missing | some missing |
//! |----------------------|------------|--------------|
//! | none (all missing)   | -          | `float64`    |
//! | all integers         | `int64`    | `float64`    |
//! | all numbers          | `float64`  | `float64`    |
//! | all booleans         | `bool`     | `object`     |
//! | anything else        | `object`   | `object`     |
//!
//! A column without any cell at all (header-only file) is `object`.

use csv::StringRecord;
use std::collections::BTreeSet;
use std::fmt;

/// Cell spellings treated as missing values
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_VALUES: &[&str] = &["True", "TRUE", "true"];
const FALSE_VALUES: &[&str] = &["False", "FALSE", "false"];

/// Inferred type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnType {
    /// Boolean literals only
    Bool,
    /// Numbers, or integers with gaps
    Float64,
    /// Integers without gaps
    Int64,
    /// Free text
    Object,
}

impl ColumnType {
    /// Returns the dtype name
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Bool => "bool",
            ColumnType::Float64 => "float64",
            ColumnType::Int64 => "int64",
            ColumnType::Object => "object",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `cell` is one of the missing-value spellings
pub fn is_missing(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

/// Running type evidence for a single column
#[derive(Debug, Clone)]
struct ColumnEvidence {
    present: usize,
    missing: usize,
    all_int: bool,
    all_numeric: bool,
    all_bool: bool,
}

impl Default for ColumnEvidence {
    fn default() -> Self {
        Self {
            present: 0,
            missing: 0,
            all_int: true,
            all_numeric: true,
            all_bool: true,
        }
    }
}

impl ColumnEvidence {
    fn observe(&mut self, cell: Option<&str>) {
        let Some(cell) = cell.filter(|c| !is_missing(c)) else {
            self.missing += 1;
            return;
        };
        self.present += 1;

        let value = cell.trim();
        if self.all_int && value.parse::<i64>().is_err() {
            self.all_int = false;
        }
        if self.all_numeric && !self.all_int && value.parse::<f64>().is_err() {
            self.all_numeric = false;
        }
        if self.all_bool && !TRUE_VALUES.contains(&value) && !FALSE_VALUES.contains(&value) {
            self.all_bool = false;
        }
    }

    fn resolve(&self) -> ColumnType {
        if self.present == 0 {
            return if self.missing == 0 {
                ColumnType::Object
            } else {
                ColumnType::Float64
            };
        }

        let gaps = self.missing > 0;
        if self.all_int {
            if gaps {
                ColumnType::Float64
            } else {
                ColumnType::Int64
            }
        } else if self.all_numeric {
            ColumnType::Float64
        } else if self.all_bool && !gaps {
            ColumnType::Bool
        } else {
            ColumnType::Object
        }
    }
}

/// Ordered column types of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<ColumnType>,
}

impl Schema {
    /// Infers one type per column over `records`.
    ///
    /// Records shorter than `width` count as missing in their trailing
    /// columns; extra fields beyond `width` are ignored.
    pub fn infer<'a>(records: impl IntoIterator<Item = &'a StringRecord>, width: usize) -> Self {
        let mut evidence = vec![ColumnEvidence::default(); width];
        for record in records {
            for (index, column) in evidence.iter_mut().enumerate() {
                column.observe(record.get(index));
            }
        }
        Self {
            columns: evidence.iter().map(ColumnEvidence::resolve).collect(),
        }
    }

    /// Returns the column types in order
    pub fn columns(&self) -> &[ColumnType] {
        &self.columns
    }

    /// Returns the distinct types
    pub fn distinct(&self) -> BTreeSet<ColumnType> {
        self.columns.iter().copied().collect()
    }

    /// Returns the indices where the two schemas disagree, comparing field by field
    pub fn differing_columns(&self, other: &Schema) -> Vec<usize> {
        let width = self.columns.len().max(other.columns.len());
        (0..width)
            .filter(|&i| self.columns.get(i) != other.columns.get(i))
            .collect()
    }
}
