//! # rankr
//!
//! **List-wise batch generation for ranking models.**
//!
//! rankr turns a relational dataset of (query, document, relevance-label)
//! triples plus per-entity feature tables into the batches a ranking model
//! consumes: one candidate list per request, with left features, right
//! features, identifiers, and labels aligned row-for-row.
//!
//! ## Pipeline
//!
//! ```text
//! DataPack ──► ListGenerator ──► ListLoader
//! (relation,    (RelationIndex     (epoch shuffling,
//!  features)     + assembly)        prefetching)
//! ```
//!
//! ## Design
//!
//! - **RelationIndex**: relation rows grouped by left-id into ordered
//!   candidate lists, first-appearance order, built once at construction
//! - **Batch assembly**: per-request gather of feature records by id, with
//!   scalar and sequence columns stacked into dense `ndarray` arrays
//! - **Labels**: cast eagerly to the task dtype at construction, so every
//!   batch request is a pure read over immutable state

pub mod data;
pub mod error;

// Re-export the primary pipeline types
pub use data::{
    Batch, BatchColumn, DataPack, Feature, FeatureTable, GeneratorConfig, LabelDType, Labels,
    ListDataset, ListGenerator, ListItem, ListLoader, Relation, RelationIndex, RelationRow, Stage,
    ID_LEFT, ID_RIGHT,
};
pub use error::{Error, Result};
