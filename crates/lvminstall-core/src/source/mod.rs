//! Source resolution for products.
//!
//! Maps a product identifier and a version string to a fetchable URL:
//! - git-hosted tags resolve to `<repo>/archive/<version>.tar.gz`
//! - git development heads and branches resolve to the clone URL
//! - subversion products resolve to `trunk`, `branches/<x>` or `tags/<v>`

mod resolver;
mod spec;

pub use resolver::SourceResolver;
pub use spec::{
    Hosting, Product, ResolvedSource, SourceKind, VersionToken, parse_loose_version,
};
