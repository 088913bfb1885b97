//! Artifact naming.
//!
//! Every target maps to an ordered tag sequence such as
//! `py2-debug-gcc-x86` (plus `dll` for libraries). The joined tags name the
//! object directory and suffix the output filename, so targets that differ in
//! any field never share objects or overwrite each other's binaries, while a
//! repeated build of the same target reuses its object directory.

use std::path::{Path, PathBuf};

use crate::core::target::{BinaryType, TargetDescriptor};

/// Tag appended to the object directory name of dynamic libraries.
pub const DLL_TAG: &str = "dll";

/// Derived naming information for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    tags: Vec<String>,
    binary_type: BinaryType,
}

impl ArtifactDescriptor {
    /// Compute the tag sequence for a target.
    pub fn new(runtime_prefix: &str, target: &TargetDescriptor) -> Self {
        let mut tags = vec![
            format!("{}{}", runtime_prefix, target.runtime),
            target.mode.to_string(),
            target.compiler.clone(),
            target.architecture.to_string(),
        ];
        if target.binary_type == BinaryType::Dll {
            tags.push(DLL_TAG.to_string());
        }

        ArtifactDescriptor {
            tags,
            binary_type: target.binary_type,
        }
    }

    /// All tags, including the `dll` tag for libraries.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Tags joined with `-`; the object directory name.
    pub fn joined(&self) -> String {
        self.tags.join("-")
    }

    /// The artifact file name: `{base}-{tags}.{ext}`.
    ///
    /// The binary type is carried by the extension, so the `dll` tag is left
    /// out of the file name.
    pub fn file_name(&self, base_name: &str) -> String {
        let tags = match self.binary_type {
            BinaryType::Dll => &self.tags[..self.tags.len() - 1],
            BinaryType::Application => &self.tags[..],
        };
        format!(
            "{}-{}.{}",
            base_name,
            tags.join("-"),
            self.binary_type.extension()
        )
    }

    /// Full path of the artifact inside `bin_dir`.
    pub fn artifact_path(&self, bin_dir: &Path, base_name: &str) -> PathBuf {
        bin_dir.join(self.file_name(base_name))
    }

    /// Object directory for this target inside `obj_dir`.
    pub fn object_dir(&self, obj_dir: &Path) -> PathBuf {
        obj_dir.join(self.joined())
    }
}
