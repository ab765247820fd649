//! Source specification types.

use serde::{Deserialize, Serialize};

/// Where a product's repository lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Hosting {
    Git,
    Svn,
}

/// A product identifier resolved against the registry and overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Identifier as given, e.g. `desihub/desispec` or `lvmutil`.
    pub identifier: String,
    /// Owner prefix when the identifier was `owner/name`.
    pub owner: Option<String>,
    /// Canonical product name, the final segment of the identifier.
    pub name: String,
    /// Repository base URL, without version components.
    pub base_url: String,
    pub hosting: Hosting,
}

/// Lexical classification of a version string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "kebab-case")]
pub enum VersionToken {
    /// `trunk`, the subversion development head.
    Trunk,
    /// `master` or `main`, the git development head.
    Head(String),
    /// `branches/<name>`.
    Branch(String),
    /// Anything else, treated as a tag.
    Tag(String),
}

impl VersionToken {
    pub fn parse(version: &str) -> Self {
        match version {
            "trunk" => Self::Trunk,
            "master" | "main" => Self::Head(version.to_string()),
            _ => match version.strip_prefix("branches/") {
                Some(branch) if !branch.is_empty() => Self::Branch(branch.to_string()),
                _ => Self::Tag(version.to_string()),
            },
        }
    }

    /// True for tags that parse as a (possibly abbreviated) semantic version.
    pub fn is_semver_like(&self) -> bool {
        match self {
            Self::Tag(tag) => parse_loose_version(tag).is_some(),
            _ => false,
        }
    }

    pub fn is_development(&self) -> bool {
        !matches!(self, Self::Tag(_))
    }
}

/// Parse `1`, `1.2` or `1.2.3` (with an optional leading `v`) as a semver
/// version, padding missing components with zeros.
pub fn parse_loose_version(tag: &str) -> Option<semver::Version> {
    let tag = tag.strip_prefix('v').unwrap_or(tag);
    if let Ok(version) = semver::Version::parse(tag) {
        return Some(version);
    }
    let parts: Vec<&str> = tag.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part.parse().ok()?;
    }
    Some(semver::Version::new(numbers[0], numbers[1], numbers[2]))
}

/// How the resolved URL is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceKind {
    /// A `.tar.gz` archive of a git tag.
    GitArchive,
    /// A clone of the repository, optionally of a named branch.
    GitHead { branch: Option<String> },
    /// A subversion tags/trunk/branches path.
    SvnPath,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::GitArchive => "git-archive",
            Self::GitHead { .. } => "git-head",
            Self::SvnPath => "svn-path",
        }
    }

    pub fn is_git(&self) -> bool {
        !matches!(self, Self::SvnPath)
    }
}

/// A product/version pair resolved to a fetchable URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSource {
    pub product: Product,
    /// Version string as given; names the install directory.
    pub version: String,
    pub token: VersionToken,
    /// Fully qualified fetch URL.
    pub url: String,
    pub kind: SourceKind,
}

impl ResolvedSource {
    pub fn name(&self) -> &str {
        &self.product.name
    }

    pub fn is_git(&self) -> bool {
        self.kind.is_git()
    }

    pub fn is_svn(&self) -> bool {
        !self.kind.is_git()
    }
}
