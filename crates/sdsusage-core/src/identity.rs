//! Identity keys and raw observations.

use std::fmt;
use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// The `(project, version, ident)` triple a data file is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey {
    /// Project name.
    pub project: CompactString,
    /// Version name within the project.
    pub version: CompactString,
    /// Ident name within the project.
    pub ident: CompactString,
}

impl IdentityKey {
    /// Create a new identity key.
    pub fn new(
        project: impl Into<CompactString>,
        version: impl Into<CompactString>,
        ident: impl Into<CompactString>,
    ) -> Self {
        Self {
            project: project.into(),
            version: version.into(),
            ident: ident.into(),
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.project, self.version, self.ident)
    }
}

/// A single discovered unit of data: `size` bytes of `identity` stored under `root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Known root the file was found under.
    pub root: PathBuf,
    /// Identity the file is attributed to.
    pub identity: IdentityKey,
    /// File size in bytes.
    pub size: u64,
}

impl Observation {
    /// Create a new observation.
    pub fn new(root: impl Into<PathBuf>, identity: IdentityKey, size: u64) -> Self {
        Self {
            root: root.into(),
            identity,
            size,
        }
    }
}
