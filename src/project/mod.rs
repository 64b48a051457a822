//! Project object graph, its builder and its serializer

pub mod builder;
pub mod graph;
pub mod serializer;

pub use builder::{DefaultProjectBuilder, ProjectObjectBuilder, GENERATED_FILES_ROOT};
pub use graph::{
    FileReference, Group, ProductType, ProjectGraph, Reference, SourceTree, Target, TargetKind,
    TargetLookup, VersionGroup,
};
pub use serializer::{JsonProjectSerializer, ProjectSerializer};
