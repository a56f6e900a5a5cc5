//! List-wise batch generator for ranking data.
//!
//! Groups the relation table into per-query candidate lists at construction
//! and serves one list per request: an aligned batch of left features, right
//! features, and identifiers, plus labels in supervised stages.

use crate::data::assemble::assemble_batch;
use crate::data::config::GeneratorConfig;
use crate::data::datapack::DataPack;
use crate::data::dataset::{ListDataset, ListItem};
use crate::data::index::RelationIndex;
use crate::data::labels::Labels;
use crate::data::loader::ListLoader;
use crate::error::{Error, Result};

/// Generator serving one candidate list per request.
///
/// Construction builds the relation index once and, for supervised stages,
/// casts the label column to the task dtype once. Every `get` afterwards is
/// a pure read over immutable state, so the generator can back a
/// prefetching loader without synchronization.
///
/// # Example
///
/// ```ignore
/// let generator = ListGenerator::new(pack, GeneratorConfig::default())?;
/// assert_eq!(generator.len(), num_distinct_queries);
/// let (batch, labels) = generator.get(0)?;
/// // batch.column("text_left"), batch.id_right(), labels per candidate
/// ```
#[derive(Debug, Clone)]
pub struct ListGenerator {
    pack: DataPack,
    index: RelationIndex,
    labels: Option<Labels>,
    config: GeneratorConfig,
}

impl ListGenerator {
    /// Build a generator over `pack`.
    ///
    /// Fails on an invalid config, or on a null label when the stage
    /// requires supervision.
    pub fn new(pack: DataPack, config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let index = RelationIndex::build(pack.relation());
        let labels = if config.stage.requires_labels() {
            Some(Labels::normalize(pack.relation(), config.label_dtype)?)
        } else {
            None
        };
        Ok(Self {
            pack,
            index,
            labels,
            config,
        })
    }

    /// Number of candidate lists (distinct left-ids).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the generator serves no lists.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Assemble the batch for list `idx`.
    ///
    /// Labels are `None` in predict stage; that is designed behavior, not
    /// an error.
    pub fn get(&self, idx: usize) -> Result<ListItem> {
        let group = self.index.group(idx).ok_or_else(|| Error::DataError {
            reason: format!(
                "list index {idx} out of bounds for generator of length {}",
                self.index.len()
            ),
        })?;
        let batch = assemble_batch(&self.pack, group)?;
        let labels = self.labels.as_ref().map(|col| col.project(group));
        Ok((batch, labels))
    }

    /// The generator's configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The precomputed relation index.
    pub fn index(&self) -> &RelationIndex {
        &self.index
    }

    /// The underlying dataset.
    pub fn pack(&self) -> &DataPack {
        &self.pack
    }

    /// Wrap the generator in a loader, forwarding the config's shuffle flag.
    pub fn into_loader(self, seed: u64) -> ListLoader<Self> {
        let shuffle = self.config.shuffle;
        ListLoader::new(self, seed).with_shuffle(shuffle)
    }
}

impl ListDataset for ListGenerator {
    fn len(&self) -> usize {
        self.len()
    }

    fn get(&self, idx: usize) -> Result<ListItem> {
        self.get(idx)
    }
}
