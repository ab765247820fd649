//! Git operations for fetching products.
//!
//! - Development heads and branches are cloned with the `git` binary
//! - Tags are downloaded as `.tar.gz` archives and unpacked in place

mod fetcher;
mod spec;

pub use fetcher::{FetchResult, GitFetcher, head_commit};
pub use spec::GitSpec;
