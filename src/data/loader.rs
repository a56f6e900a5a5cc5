//! Loader with per-epoch shuffling and background prefetching.
//!
//! Iterates a `ListDataset`, serving one candidate list per step. Shuffles
//! list order deterministically per epoch from a seed. Prefetches batches in
//! a background thread to overlap assembly with training compute.

use std::sync::mpsc;
use std::thread;

use crate::data::assemble::shuffled_indices;
use crate::data::dataset::{ListDataset, ListItem};
use crate::error::Result;

/// Loader that iterates a list dataset with shuffling and prefetching.
///
/// Every list is served exactly once per epoch; there is no incomplete-batch
/// truncation because each step serves one complete candidate list.
///
/// # Lifecycle
///
/// ```ignore
/// let loader = generator.into_loader(seed);
/// for epoch in 0..num_epochs {
///     for item in loader.iter(epoch) {
///         let (batch, labels) = item?;
///     }
/// }
/// ```
pub struct ListLoader<D> {
    dataset: D,
    seed: u64,
    shuffle: bool,
    prefetch_count: usize,
}

impl<D> ListLoader<D>
where
    D: ListDataset,
{
    /// Create a new loader.
    ///
    /// # Arguments
    /// * `dataset` - The list dataset to iterate
    /// * `seed` - Random seed for deterministic shuffling
    pub fn new(dataset: D, seed: u64) -> Self {
        Self {
            dataset,
            seed,
            shuffle: true,
            prefetch_count: 2,
        }
    }

    /// Enable or disable per-epoch shuffling.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set the number of items to prefetch in the background thread.
    ///
    /// Default is 2.
    pub fn with_prefetch(mut self, count: usize) -> Self {
        self.prefetch_count = count;
        self
    }

    /// Number of lists served per epoch.
    pub fn num_lists(&self) -> usize {
        self.dataset.len()
    }

    /// The underlying dataset.
    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    fn epoch_indices(&self, epoch: u64) -> Vec<usize> {
        if self.shuffle {
            shuffled_indices(self.dataset.len(), self.seed.wrapping_add(epoch))
        } else {
            (0..self.dataset.len()).collect()
        }
    }

    /// Create a synchronous iterator for one epoch.
    ///
    /// With shuffling enabled, list order is a deterministic permutation
    /// from `seed + epoch`; otherwise lists are served in index order.
    pub fn iter(&self, epoch: u64) -> ListLoaderIter<'_, D> {
        ListLoaderIter {
            loader: self,
            indices: self.epoch_indices(epoch),
            pos: 0,
        }
    }
}

/// Synchronous iterator over one epoch's lists.
///
/// Implements `Iterator<Item = Result<ListItem>>`.
pub struct ListLoaderIter<'a, D> {
    loader: &'a ListLoader<D>,
    indices: Vec<usize>,
    pos: usize,
}

impl<D> ListLoaderIter<'_, D>
where
    D: ListDataset,
{
    /// Number of lists remaining in this epoch.
    pub fn remaining(&self) -> usize {
        self.indices.len() - self.pos
    }

    fn advance(&mut self) -> Result<Option<ListItem>> {
        if self.pos >= self.indices.len() {
            return Ok(None);
        }
        let item = self.loader.dataset.get(self.indices[self.pos])?;
        self.pos += 1;
        Ok(Some(item))
    }
}

impl<D> Iterator for ListLoaderIter<'_, D>
where
    D: ListDataset,
{
    type Item = Result<ListItem>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<D> ExactSizeIterator for ListLoaderIter<'_, D> where D: ListDataset {}

/// Prefetching iterator that assembles batches in a background thread.
///
/// Created via [`ListLoader::prefetch_iter`]. Uses a bounded channel to
/// pipeline batch assembly with compute.
///
/// Implements `Iterator<Item = Result<ListItem>>`.
pub struct PrefetchIter {
    receiver: mpsc::Receiver<Result<ListItem>>,
    _handle: Option<thread::JoinHandle<()>>,
}

impl<D> ListLoader<D>
where
    D: ListDataset + Clone + 'static,
{
    /// Create a prefetching iterator that assembles batches in a background
    /// thread.
    ///
    /// The background thread assembles up to `prefetch_count` items ahead.
    /// Requires `D: Clone` because the dataset is moved into the background
    /// thread. Safe without locking: every shared structure is immutable
    /// after generator construction.
    pub fn prefetch_iter(&self, epoch: u64) -> PrefetchIter {
        let indices = self.epoch_indices(epoch);
        let capacity = self.prefetch_count.max(1);
        let (tx, rx) = mpsc::sync_channel::<Result<ListItem>>(capacity);

        let dataset = self.dataset.clone();
        let handle = thread::spawn(move || {
            for idx in indices {
                let result = dataset.get(idx);
                if tx.send(result).is_err() {
                    break; // Receiver dropped, stop prefetching
                }
            }
        });

        PrefetchIter {
            receiver: rx,
            _handle: Some(handle),
        }
    }
}

impl Iterator for PrefetchIter {
    type Item = Result<ListItem>;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}

impl Drop for PrefetchIter {
    fn drop(&mut self) {
        // Drop order closes the channel, then we wait for the thread.
        if let Some(handle) = self._handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::config::GeneratorConfig;
    use crate::data::datapack::{DataPack, FeatureTable, Relation, RelationRow};
    use crate::data::generator::ListGenerator;

    fn generator(num_queries: usize, shuffle: bool) -> ListGenerator {
        let mut relation = Relation::new();
        let mut left = FeatureTable::new(vec!["text_left".into()]);
        let mut right = FeatureTable::new(vec!["text_right".into()]);
        for q in 0..num_queries {
            let qid = format!("q{q}");
            left.insert(&*qid, vec![vec![q as f32].into()]).unwrap();
            for d in 0..2 {
                let did = format!("d{q}_{d}");
                right
                    .insert(&*did, vec![vec![d as f32, q as f32].into()])
                    .unwrap();
                relation.push(RelationRow::new(qid.clone(), did, d as f64));
            }
        }
        let pack = DataPack::new(relation, left, right);
        let config = GeneratorConfig::default().with_shuffle(shuffle);
        ListGenerator::new(pack, config).unwrap()
    }

    #[test]
    fn test_loader_serves_each_list_once() {
        let loader = generator(5, true).into_loader(7);
        assert_eq!(loader.num_lists(), 5);

        let mut seen = Vec::new();
        for item in loader.iter(0) {
            let (batch, labels) = item.expect("batch should not error");
            assert_eq!(batch.num_rows(), 2);
            assert_eq!(labels.unwrap().len(), 2);
            seen.push(batch.id_left()[0].clone());
        }
        seen.sort();
        assert_eq!(seen, vec!["q0", "q1", "q2", "q3", "q4"]);
    }

    #[test]
    fn test_loader_unshuffled_order() {
        let loader = generator(4, false).into_loader(0);
        let order: Vec<String> = loader
            .iter(0)
            .map(|item| item.unwrap().0.id_left()[0].clone())
            .collect();
        assert_eq!(order, vec!["q0", "q1", "q2", "q3"]);
    }

    #[test]
    fn test_loader_epochs_differ_when_shuffled() {
        let loader = generator(10, true).into_loader(42);
        let epoch0: Vec<String> = loader
            .iter(0)
            .map(|item| item.unwrap().0.id_left()[0].clone())
            .collect();
        let epoch1: Vec<String> = loader
            .iter(1)
            .map(|item| item.unwrap().0.id_left()[0].clone())
            .collect();
        assert_eq!(epoch0.len(), epoch1.len());
        assert_ne!(epoch0, epoch1);

        // same epoch replays identically
        let replay: Vec<String> = loader
            .iter(0)
            .map(|item| item.unwrap().0.id_left()[0].clone())
            .collect();
        assert_eq!(epoch0, replay);
    }

    #[test]
    fn test_loader_exact_size() {
        let loader = generator(3, true).into_loader(0);
        let iter = loader.iter(0);
        assert_eq!(iter.len(), 3);
    }

    #[test]
    fn test_loader_empty_dataset() {
        let pack = DataPack::new(
            Relation::new(),
            FeatureTable::new(vec!["text_left".into()]),
            FeatureTable::new(vec!["text_right".into()]),
        );
        let gen = ListGenerator::new(pack, GeneratorConfig::default()).unwrap();
        let loader = gen.into_loader(0);
        assert_eq!(loader.num_lists(), 0);
        assert!(loader.iter(0).next().is_none());
    }

    #[test]
    fn test_loader_prefetch() {
        let loader = generator(6, true).into_loader(11).with_prefetch(2);
        let mut count = 0;
        for item in loader.prefetch_iter(0) {
            let (batch, _) = item.expect("prefetch item should not error");
            assert_eq!(batch.num_rows(), 2);
            count += 1;
        }
        assert_eq!(count, 6);
    }
}
