//! Stage-dependent label handling.
//!
//! Supervised stages (train, evaluate) require the relation's label column
//! cast to the task's output dtype; predict serves no labels. The cast is
//! performed exactly once, eagerly at generator construction, so every
//! later batch request is a pure read and concurrent readers never race a
//! write to the label column.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::data::datapack::Relation;
use crate::error::{Error, Result};

/// Pipeline stage, controlling whether labels are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Train,
    Evaluate,
    Predict,
}

impl Stage {
    /// Whether batches served in this stage carry labels.
    pub fn requires_labels(self) -> bool {
        matches!(self, Stage::Train | Stage::Evaluate)
    }
}

/// Output dtype of the ranking task's label column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelDType {
    #[default]
    F32,
    F64,
}

/// A label column (or a slice of one) in the task's output dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum Labels {
    F32(Array1<f32>),
    F64(Array1<f64>),
}

impl Labels {
    /// Cast the relation's entire label column to `dtype`.
    ///
    /// Called once at generator construction for supervised stages. A null
    /// label is a cast failure and propagates as [`Error::LabelCast`]; it is
    /// never coerced to a sentinel value.
    pub fn normalize(relation: &Relation, dtype: LabelDType) -> Result<Self> {
        let mut raw = Vec::with_capacity(relation.len());
        for (row, r) in relation.rows().iter().enumerate() {
            match r.label {
                Some(v) => raw.push(v),
                None => return Err(Error::LabelCast { row }),
            }
        }
        Ok(match dtype {
            LabelDType::F32 => Labels::F32(raw.iter().map(|&v| v as f32).collect()),
            LabelDType::F64 => Labels::F64(Array1::from_vec(raw)),
        })
    }

    /// Gather the labels at the group's row positions, in group order.
    ///
    /// The group's positions come from the `RelationIndex` built over the
    /// same relation, so they are in bounds by construction.
    pub fn project(&self, group: &[usize]) -> Labels {
        match self {
            Labels::F32(col) => Labels::F32(group.iter().map(|&pos| col[pos]).collect()),
            Labels::F64(col) => Labels::F64(group.iter().map(|&pos| col[pos]).collect()),
        }
    }

    /// Number of label entries.
    pub fn len(&self) -> usize {
        match self {
            Labels::F32(a) => a.len(),
            Labels::F64(a) => a.len(),
        }
    }

    /// Whether there are no label entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The dtype these labels were cast to.
    pub fn dtype(&self) -> LabelDType {
        match self {
            Labels::F32(_) => LabelDType::F32,
            Labels::F64(_) => LabelDType::F64,
        }
    }

    pub fn as_f32(&self) -> Option<&Array1<f32>> {
        match self {
            Labels::F32(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&Array1<f64>> {
        match self {
            Labels::F64(a) => Some(a),
            _ => None,
        }
    }
}
