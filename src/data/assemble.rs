//! Batch assembly and index shuffling helpers.

use indexmap::IndexMap;
use ndarray::{Array1, Array2};

use crate::data::datapack::{DataPack, Feature, FeatureTable};
use crate::data::dataset::{Batch, BatchColumn, ID_LEFT, ID_RIGHT};
use crate::error::{Error, Result};

/// Assemble the batch for one index-group.
///
/// Gathers the group's left-id and right-id sequences in row order, then
/// materializes one column per left-table feature, per right-table feature,
/// and the two identifier columns. Feature lookup is by id value, so an id
/// serving many rows has its record replicated, not referenced.
///
/// A missing feature-table entry aborts the whole batch with
/// [`Error::MissingEntity`]; no partial batch is produced.
pub(crate) fn assemble_batch(pack: &DataPack, group: &[usize]) -> Result<Batch> {
    if group.is_empty() {
        return Err(Error::DataError {
            reason: "empty index-group".to_string(),
        });
    }

    let relation = pack.relation();
    let mut ids_left = Vec::with_capacity(group.len());
    let mut ids_right = Vec::with_capacity(group.len());
    for &pos in group {
        let row = relation.row(pos).ok_or_else(|| Error::DataError {
            reason: format!(
                "row position {pos} out of bounds for relation of length {}",
                relation.len()
            ),
        })?;
        ids_left.push(row.id_left.clone());
        ids_right.push(row.id_right.clone());
    }

    let mut columns = IndexMap::new();
    gather_feature_columns(pack.left(), "left", &ids_left, &mut columns)?;
    gather_feature_columns(pack.right(), "right", &ids_right, &mut columns)?;
    columns.insert(ID_LEFT.to_string(), BatchColumn::Ids(ids_left));
    columns.insert(ID_RIGHT.to_string(), BatchColumn::Ids(ids_right));

    Ok(Batch::from_columns(columns))
}

/// Gather every column of `table` for the given per-row ids.
fn gather_feature_columns(
    table: &FeatureTable,
    side: &'static str,
    ids: &[String],
    out: &mut IndexMap<String, BatchColumn>,
) -> Result<()> {
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        let record = table.record(id).ok_or_else(|| Error::MissingEntity {
            table: side,
            id: id.clone(),
        })?;
        records.push(record);
    }

    for (col_idx, name) in table.columns().iter().enumerate() {
        let values: Vec<&Feature> = records.iter().map(|r| &r[col_idx]).collect();
        out.insert(name.clone(), stack_column(name, &values)?);
    }
    Ok(())
}

/// Stack one feature column's per-row values into a batch column.
///
/// All-scalar columns become a `[k]` array; all-sequence columns with one
/// common length become a `[k, seq_len]` array, and ragged lengths fall
/// back to per-row vectors. A column mixing scalars and sequences is
/// inconsistent input and rejected.
fn stack_column(name: &str, values: &[&Feature]) -> Result<BatchColumn> {
    if values.iter().all(|f| matches!(f, Feature::Scalar(_))) {
        let data: Vec<f32> = values
            .iter()
            .map(|f| match f {
                Feature::Scalar(v) => *v,
                Feature::Sequence(_) => unreachable!(),
            })
            .collect();
        return Ok(BatchColumn::Scalars(Array1::from_vec(data)));
    }

    if values.iter().all(|f| matches!(f, Feature::Sequence(_))) {
        let rows: Vec<&[f32]> = values
            .iter()
            .map(|f| match f {
                Feature::Sequence(v) => v.as_slice(),
                Feature::Scalar(_) => unreachable!(),
            })
            .collect();

        let width = rows[0].len();
        if rows.iter().all(|r| r.len() == width) {
            let mut flat = Vec::with_capacity(rows.len() * width);
            for row in &rows {
                flat.extend_from_slice(row);
            }
            let stacked = Array2::from_shape_vec((rows.len(), width), flat).map_err(|e| {
                Error::DataError {
                    reason: format!("failed to stack column '{name}': {e}"),
                }
            })?;
            return Ok(BatchColumn::Sequences(stacked));
        }
        return Ok(BatchColumn::Ragged(
            rows.into_iter().map(<[f32]>::to_vec).collect(),
        ));
    }

    Err(Error::DataError {
        reason: format!("column '{name}' mixes scalar and sequence features"),
    })
}

/// Generate shuffled indices `[0..len)` deterministically from a seed.
///
/// Uses splitmix64 PRNG + Fisher-Yates shuffle for uniform permutation
/// reproducible across platforms.
pub(crate) fn shuffled_indices(len: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    if len <= 1 {
        return indices;
    }

    let mut state = seed;
    let mut next_u64 = move || -> u64 {
        state = state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    };

    // Fisher-Yates shuffle
    for i in (1..len).rev() {
        let j = (next_u64() as usize) % (i + 1);
        indices.swap(i, j);
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datapack::{Relation, RelationRow};

    fn worked_example() -> DataPack {
        let relation = Relation::from_rows(vec![
            RelationRow::new("q0", "d0", 0.0),
            RelationRow::new("q0", "d1", 1.0),
            RelationRow::new("q0", "d2", 2.0),
        ]);
        let mut left = FeatureTable::new(vec!["text_left".into()]);
        left.insert("q0", vec![vec![1.0, 2.0].into()]).unwrap();
        let mut right = FeatureTable::new(vec!["text_right".into()]);
        right.insert("d0", vec![vec![2.0, 3.0].into()]).unwrap();
        right.insert("d1", vec![vec![3.0, 4.0].into()]).unwrap();
        right.insert("d2", vec![vec![4.0, 5.0].into()]).unwrap();
        DataPack::new(relation, left, right)
    }

    #[test]
    fn test_assemble_worked_example() {
        let pack = worked_example();
        let batch = assemble_batch(&pack, &[0, 1, 2]).unwrap();

        assert_eq!(batch.num_rows(), 3);
        let names: Vec<&str> = batch.column_names().collect();
        assert_eq!(names, vec!["text_left", "text_right", ID_LEFT, ID_RIGHT]);

        let text_left = batch.column("text_left").unwrap().as_sequences().unwrap();
        assert_eq!(text_left.shape(), &[3, 2]);
        for row in 0..3 {
            assert_eq!(text_left.row(row).to_vec(), vec![1.0, 2.0]);
        }

        let text_right = batch.column("text_right").unwrap().as_sequences().unwrap();
        assert_eq!(text_right.row(0).to_vec(), vec![2.0, 3.0]);
        assert_eq!(text_right.row(1).to_vec(), vec![3.0, 4.0]);
        assert_eq!(text_right.row(2).to_vec(), vec![4.0, 5.0]);

        assert_eq!(batch.id_left(), &["q0", "q0", "q0"]);
        assert_eq!(batch.id_right(), &["d0", "d1", "d2"]);
    }

    #[test]
    fn test_assemble_id_columns_round_trip() {
        let pack = worked_example();
        let batch = assemble_batch(&pack, &[2, 0]).unwrap();
        let relation = pack.relation();
        for (i, &pos) in [2usize, 0].iter().enumerate() {
            assert_eq!(batch.id_left()[i], relation.row(pos).unwrap().id_left);
            assert_eq!(batch.id_right()[i], relation.row(pos).unwrap().id_right);
        }
    }

    #[test]
    fn test_assemble_missing_right_entity() {
        let relation = Relation::from_rows(vec![RelationRow::new("q0", "d9", 0.0)]);
        let mut left = FeatureTable::new(vec!["text_left".into()]);
        left.insert("q0", vec![vec![1.0].into()]).unwrap();
        let right = FeatureTable::new(vec!["text_right".into()]);
        let pack = DataPack::new(relation, left, right);

        let err = assemble_batch(&pack, &[0]).unwrap_err();
        match err {
            Error::MissingEntity { table, id } => {
                assert_eq!(table, "right");
                assert_eq!(id, "d9");
            }
            other => panic!("expected MissingEntity, got {other:?}"),
        }
    }

    #[test]
    fn test_assemble_scalar_column() {
        let relation = Relation::from_rows(vec![
            RelationRow::new("q0", "d0", 0.0),
            RelationRow::new("q0", "d1", 1.0),
        ]);
        let mut left = FeatureTable::new(vec!["length_left".into()]);
        left.insert("q0", vec![4.0f32.into()]).unwrap();
        let mut right = FeatureTable::new(vec!["length_right".into()]);
        right.insert("d0", vec![7.0f32.into()]).unwrap();
        right.insert("d1", vec![9.0f32.into()]).unwrap();
        let pack = DataPack::new(relation, left, right);

        let batch = assemble_batch(&pack, &[0, 1]).unwrap();
        let left_col = batch.column("length_left").unwrap().as_scalars().unwrap();
        assert_eq!(left_col.to_vec(), vec![4.0, 4.0]);
        let right_col = batch.column("length_right").unwrap().as_scalars().unwrap();
        assert_eq!(right_col.to_vec(), vec![7.0, 9.0]);
    }

    #[test]
    fn test_assemble_ragged_column() {
        let relation = Relation::from_rows(vec![
            RelationRow::new("q0", "d0", 0.0),
            RelationRow::new("q0", "d1", 1.0),
        ]);
        let mut left = FeatureTable::new(vec!["text_left".into()]);
        left.insert("q0", vec![vec![1.0].into()]).unwrap();
        let mut right = FeatureTable::new(vec!["text_right".into()]);
        right.insert("d0", vec![vec![2.0, 3.0].into()]).unwrap();
        right.insert("d1", vec![vec![4.0].into()]).unwrap();
        let pack = DataPack::new(relation, left, right);

        let batch = assemble_batch(&pack, &[0, 1]).unwrap();
        let ragged = batch.column("text_right").unwrap().as_ragged().unwrap();
        assert_eq!(ragged, &[vec![2.0, 3.0], vec![4.0]]);
    }

    #[test]
    fn test_assemble_mixed_column_kind_rejected() {
        let relation = Relation::from_rows(vec![
            RelationRow::new("q0", "d0", 0.0),
            RelationRow::new("q0", "d1", 1.0),
        ]);
        let mut left = FeatureTable::new(vec!["text_left".into()]);
        left.insert("q0", vec![vec![1.0].into()]).unwrap();
        let mut right = FeatureTable::new(vec!["feat".into()]);
        right.insert("d0", vec![vec![2.0].into()]).unwrap();
        right.insert("d1", vec![5.0f32.into()]).unwrap();
        let pack = DataPack::new(relation, left, right);

        assert!(assemble_batch(&pack, &[0, 1]).is_err());
    }

    #[test]
    fn test_assemble_empty_group_rejected() {
        let pack = worked_example();
        assert!(assemble_batch(&pack, &[]).is_err());
    }

    #[test]
    fn test_shuffled_indices_deterministic() {
        let a = shuffled_indices(100, 42);
        let b = shuffled_indices(100, 42);
        assert_eq!(a, b);

        let c = shuffled_indices(100, 43);
        assert_ne!(a, c);
    }

    #[test]
    fn test_shuffled_indices_permutation() {
        let indices = shuffled_indices(10, 123);
        let mut sorted = indices.clone();
        sorted.sort();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
    }
}
