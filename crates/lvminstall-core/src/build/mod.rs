//! Build-type detection and build steps.
//!
//! A checked-out product is inspected for marker files; each marker adds a
//! [`BuildType`] independently and `plain` is always present. Steps are
//! applied in the fixed order `plain`, `py`, `make`, `src`.

mod steps;

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use steps::{Builder, DEFAULT_PYVERSION, PYVERSION_SCRIPT};

/// A single build step. Declaration order is application order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    /// Copy the tree into the install directory.
    Plain,
    /// `python setup.py install`.
    Py,
    /// `make install`.
    Make,
    /// `make -C src all`.
    Src,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Py => "py",
            Self::Make => "make",
            Self::Src => "src",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker path and the build type it implies.
const MARKERS: [(&str, BuildType); 3] = [
    ("Makefile", BuildType::Make),
    ("setup.py", BuildType::Py),
    ("src", BuildType::Src),
];

/// Deduplicated set of build types, iterated in application order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildTypes(BTreeSet<BuildType>);

impl Default for BuildTypes {
    fn default() -> Self {
        Self(BTreeSet::from([BuildType::Plain]))
    }
}

impl BuildTypes {
    pub fn contains(&self, build_type: BuildType) -> bool {
        self.0.contains(&build_type)
    }

    pub fn insert(&mut self, build_type: BuildType) {
        self.0.insert(build_type);
    }

    pub fn iter(&self) -> impl Iterator<Item = BuildType> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the `plain` step copies the tree into the install directory.
    /// `py` installs through `setup.py` instead.
    pub fn copies_tree(&self) -> bool {
        self.contains(BuildType::Plain) && !self.contains(BuildType::Py)
    }
}

impl<const N: usize> From<[BuildType; N]> for BuildTypes {
    fn from(types: [BuildType; N]) -> Self {
        let mut set = Self::default();
        for t in types {
            set.insert(t);
        }
        set
    }
}

impl fmt::Display for BuildTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|t| t.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}

/// Detect the build types of the tree at `dir`.
///
/// `force_make` adds `make` whatever the tree contains. A missing
/// directory yields just `plain`.
pub fn detect_build_types(dir: &Path, force_make: bool) -> BuildTypes {
    let mut types = BuildTypes::default();
    if force_make {
        types.insert(BuildType::Make);
    }
    for (marker, build_type) in MARKERS {
        if dir.join(marker).exists() {
            types.insert(build_type);
        }
    }
    types
}
