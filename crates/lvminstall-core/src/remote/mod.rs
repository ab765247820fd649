//! Remote existence checks and HTTP access.
//!
//! The validator is a hard gate in front of every fetch: a product
//! version whose URL cannot be confirmed is never downloaded.

mod http;
mod validator;

pub use http::{DEFAULT_TIMEOUT, HttpClient, ReqwestClient};
pub use validator::DEFAULT_SVN;
pub use validator::RemoteValidator;
