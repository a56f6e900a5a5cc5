pub mod assemble;
pub mod config;
pub mod datapack;
pub mod dataset;
pub mod generator;
pub mod index;
pub mod labels;
pub mod loader;

pub use config::GeneratorConfig;
pub use datapack::{DataPack, Feature, FeatureTable, Relation, RelationRow};
pub use dataset::{Batch, BatchColumn, ListDataset, ListItem, ID_LEFT, ID_RIGHT};
pub use generator::ListGenerator;
pub use index::RelationIndex;
pub use labels::{LabelDType, Labels, Stage};
pub use loader::{ListLoader, PrefetchIter};
