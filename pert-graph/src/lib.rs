pub mod analyze;
pub mod errors;
pub mod graph;
pub mod metadata;

pub use analyze::{
    all_pairs_distances, connected_components, distance_ratios, ComponentDistances, DistanceMap,
    DEFAULT_MIN_COMPONENT_SIZE,
};
pub use errors::{GraphError, Result};
pub use graph::{GraphArgs, MissingMetadata, PertGraph, PertNode};
pub use metadata::{JsonCollectionStore, MetadataStore, Record, StaticStore};
