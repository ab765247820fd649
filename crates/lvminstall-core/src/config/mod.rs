//! Installer configuration.
//!
//! Two layers feed the resolver and planner:
//! - [`Registry`]: built-in tables (known svn products, git host, NERSC
//!   directory templates), constructed once and passed explicitly
//! - [`ConfigOverrides`]: the optional INI file supplied with
//!   `--configuration`, loaded once at startup

pub mod parser;
pub mod registry;
pub mod schema;
pub mod store;

pub use parser::{parse_overrides, parse_overrides_str};
pub use registry::{HostTemplate, Registry};
pub use schema::{ConfigOverrides, KNOWN_PRODUCTS_SECTION, MODULE_PROCESSING_SECTION};
pub use store::ConfigStore;
