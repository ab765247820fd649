//! Source resolver implementation.

use tracing::debug;
use url::Url;

use crate::config::{ConfigOverrides, Registry};

use super::spec::{Hosting, Product, ResolvedSource, SourceKind, VersionToken};

/// Resolves product/version pairs into fetchable source URLs.
///
/// Resolution is pure string computation: nothing here touches the
/// network, and malformed identifiers simply produce URLs that the remote
/// validator rejects.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    registry: Registry,
    overrides: ConfigOverrides,
}

impl SourceResolver {
    pub fn new(registry: Registry, overrides: ConfigOverrides) -> Self {
        Self {
            registry,
            overrides,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve a product identifier and version string.
    ///
    /// Base URL precedence:
    /// 1. an override file entry for the identifier or product name
    /// 2. a known subversion product
    /// 3. `https://<git host>/<owner>/<name>`, with the default owner for
    ///    bare names
    pub fn resolve(&self, identifier: &str, version: &str) -> ResolvedSource {
        let product = self.resolve_product(identifier);
        let token = VersionToken::parse(version);
        let (url, kind) = match product.hosting {
            Hosting::Git => git_url(&product.base_url, version, &token),
            Hosting::Svn => (svn_url(&product.base_url, version, &token), SourceKind::SvnPath),
        };
        debug!(
            product = %product.name,
            version,
            url = %url,
            kind = kind.label(),
            "Resolved product source"
        );
        ResolvedSource {
            product,
            version: version.to_string(),
            token,
            url,
            kind,
        }
    }

    /// Resolve only the product part: owner, canonical name, base URL.
    pub fn resolve_product(&self, identifier: &str) -> Product {
        let trimmed = identifier.trim_end_matches('/');
        let (owner, name) = match trimmed.rsplit_once('/') {
            Some((owner, name)) => (Some(owner.to_string()), name.to_string()),
            None => (None, trimmed.to_string()),
        };

        let overridden = self
            .overrides
            .product_url(trimmed)
            .or_else(|| self.overrides.product_url(&name));

        let (base_url, hosting) = if let Some(url) = overridden {
            let url = url.trim_end_matches('/').to_string();
            let hosting = self.classify(&url);
            (url, hosting)
        } else if let Some(url) = self.registry.svn_product(&name) {
            (url.trim_end_matches('/').to_string(), Hosting::Svn)
        } else {
            let owner = owner.as_deref().unwrap_or(&self.registry.default_owner);
            (
                format!("https://{}/{}/{}", self.registry.git_host, owner, name),
                Hosting::Git,
            )
        };

        Product {
            identifier: identifier.to_string(),
            owner,
            name,
            base_url,
            hosting,
        }
    }

    /// URLs on the git host are git-hosted, everything else is subversion.
    fn classify(&self, url: &str) -> Hosting {
        match Url::parse(url) {
            Ok(parsed) if parsed.host_str() == Some(self.registry.git_host.as_str()) => {
                Hosting::Git
            }
            _ => Hosting::Svn,
        }
    }
}

fn git_url(base_url: &str, version: &str, token: &VersionToken) -> (String, SourceKind) {
    let repo = base_url.strip_suffix(".git").unwrap_or(base_url);
    match token {
        VersionToken::Head(_) => (format!("{repo}.git"), SourceKind::GitHead { branch: None }),
        VersionToken::Branch(branch) => (
            format!("{repo}.git"),
            SourceKind::GitHead {
                branch: Some(branch.clone()),
            },
        ),
        VersionToken::Trunk | VersionToken::Tag(_) => (
            format!("{repo}/archive/{version}.tar.gz"),
            SourceKind::GitArchive,
        ),
    }
}

fn svn_url(base_url: &str, version: &str, token: &VersionToken) -> String {
    match token {
        VersionToken::Trunk => format!("{base_url}/trunk"),
        VersionToken::Branch(branch) => format!("{base_url}/branches/{branch}"),
        VersionToken::Head(_) | VersionToken::Tag(_) => format!("{base_url}/tags/{version}"),
    }
}
