//! Core type definitions used across the Coreplus workspace.

pub mod model;
pub mod viewer;

pub use model::ModelMeta;
pub use viewer::Viewer;
