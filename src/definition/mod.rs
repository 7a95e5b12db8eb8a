//! Pipeline definitions
//!
//! This module contains the declarative form of a pipeline:
//! - `model` - PipelineDefinition, JobDefinition and TransitionDefinition
//! - `loader` - Load definitions from YAML files and strings

pub mod loader;
pub mod model;

pub use loader::{LoadError, PipelineLoader};
pub use model::{
    parse_condition, DefinitionError, JobDefaults, JobDefinition, PipelineDefinition,
    TransitionDefinition,
};
