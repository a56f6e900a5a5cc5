//! Batch type and dataset trait for list-wise data pipelines.

use indexmap::IndexMap;
use ndarray::{Array1, Array2};

use crate::data::labels::Labels;
use crate::error::Result;

/// Name of the identifier column holding left-entity ids.
pub const ID_LEFT: &str = "id_left";
/// Name of the identifier column holding right-entity ids.
pub const ID_RIGHT: &str = "id_right";

/// One served item: an assembled batch and, in supervised stages, its labels.
pub type ListItem = (Batch, Option<Labels>);

/// One column of an assembled batch.
///
/// Numeric feature columns are stacked into dense arrays; sequence columns
/// whose lengths differ across the list fall back to a ragged
/// representation. Identifier columns carry the raw id strings.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchColumn {
    /// Raw entity ids, one per row.
    Ids(Vec<String>),
    /// Stacked scalar feature, shape `[k]`.
    Scalars(Array1<f32>),
    /// Stacked equal-length sequence feature, shape `[k, seq_len]`.
    Sequences(Array2<f32>),
    /// Sequence feature with per-row lengths.
    Ragged(Vec<Vec<f32>>),
}

impl BatchColumn {
    /// Number of rows in this column.
    pub fn len(&self) -> usize {
        match self {
            BatchColumn::Ids(v) => v.len(),
            BatchColumn::Scalars(a) => a.len(),
            BatchColumn::Sequences(a) => a.nrows(),
            BatchColumn::Ragged(v) => v.len(),
        }
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_ids(&self) -> Option<&[String]> {
        match self {
            BatchColumn::Ids(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_scalars(&self) -> Option<&Array1<f32>> {
        match self {
            BatchColumn::Scalars(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_sequences(&self) -> Option<&Array2<f32>> {
        match self {
            BatchColumn::Sequences(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_ragged(&self) -> Option<&[Vec<f32>]> {
        match self {
            BatchColumn::Ragged(v) => Some(v),
            _ => None,
        }
    }
}

/// An assembled batch for one candidate list.
///
/// Maps column name to column data, in a fixed order: every left-table
/// feature column, every right-table feature column, then [`ID_LEFT`] and
/// [`ID_RIGHT`]. Every column has exactly one entry per relation row of the
/// serving index-group, and entry `i` of every column corresponds to the
/// same relation row.
#[derive(Debug, Clone)]
pub struct Batch {
    columns: IndexMap<String, BatchColumn>,
}

impl Batch {
    pub(crate) fn from_columns(columns: IndexMap<String, BatchColumn>) -> Self {
        Self { columns }
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&BatchColumn> {
        self.columns.get(name)
    }

    /// Column names in batch order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Number of columns, identifiers included.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows (the serving group's length).
    pub fn num_rows(&self) -> usize {
        self.columns
            .get(ID_LEFT)
            .map(BatchColumn::len)
            .unwrap_or(0)
    }

    /// The left-id column.
    pub fn id_left(&self) -> &[String] {
        self.columns
            .get(ID_LEFT)
            .and_then(BatchColumn::as_ids)
            .unwrap_or(&[])
    }

    /// The right-id column.
    pub fn id_right(&self) -> &[String] {
        self.columns
            .get(ID_RIGHT)
            .and_then(BatchColumn::as_ids)
            .unwrap_or(&[])
    }

    /// Iterate `(name, column)` pairs in batch order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BatchColumn)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Trait for indexable list datasets served one candidate list at a time.
///
/// `len()` is the number of candidate lists; `get(idx)` assembles the batch
/// for list `idx`. The `ListLoader` handles epoch iteration and shuffling.
pub trait ListDataset: Send + Sync {
    /// Number of candidate lists in the dataset.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assemble the batch (and labels, in supervised stages) for one list.
    fn get(&self, idx: usize) -> Result<ListItem>;
}
