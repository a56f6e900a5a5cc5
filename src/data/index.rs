//! Relation index: row positions grouped into per-query candidate lists.
//!
//! Groups relation rows by left-id with an explicit scan into an
//! insertion-ordered map, so group order is the first-appearance order of
//! each left-id and rows within a group keep their original table order.
//! One group is the unit of one served batch.

use indexmap::IndexMap;

use crate::data::datapack::Relation;

/// Ordered collection of index-groups over a relation table.
///
/// The groups partition the relation's row positions exactly: every row
/// belongs to one group, groups are disjoint, and
/// `groups.iter().map(|g| g.len()).sum() == relation.len()`.
///
/// Built once at generator construction and never mutated afterward.
#[derive(Debug, Clone)]
pub struct RelationIndex {
    groups: Vec<Vec<usize>>,
}

impl RelationIndex {
    /// Scan the relation and group row positions by left-id.
    ///
    /// An empty relation yields zero groups.
    pub fn build(relation: &Relation) -> Self {
        let mut by_left: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (pos, row) in relation.rows().iter().enumerate() {
            by_left
                .entry(row.id_left.as_str())
                .or_insert_with(Vec::new)
                .push(pos);
        }
        Self {
            groups: by_left.into_values().collect(),
        }
    }

    /// Number of index-groups (one per distinct left-id).
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the index holds no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The group at `idx`, or `None` past the end.
    pub fn group(&self, idx: usize) -> Option<&[usize]> {
        self.groups.get(idx).map(Vec::as_slice)
    }

    /// Iterate groups in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.groups.iter().map(Vec::as_slice)
    }
}
