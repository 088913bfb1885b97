//! Core data structures for multibuild.
//!
//! This module contains the target model shared by every toolchain:
//! - Target descriptors and command-line token parsing
//! - Artifact tags and output paths
//! - Target validation against the configuration

pub mod artifact;
pub mod target;
pub mod validate;

pub use artifact::ArtifactDescriptor;
pub use target::{Architecture, BinaryType, BuildRequest, Mode, TargetDescriptor};
pub use validate::{validate, TargetError};
