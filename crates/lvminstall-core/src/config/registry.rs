//! Built-in product and host tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Host of git-hosted products.
pub const DEFAULT_GIT_HOST: &str = "github.com";
/// Owner applied to bare product names.
pub const DEFAULT_GIT_OWNER: &str = "desihub";

/// A NERSC host's default install root, with `{knl}` and
/// `{desiconda_version}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTemplate {
    pub host: String,
    pub template: String,
}

impl HostTemplate {
    pub fn new(host: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            template: template.into(),
        }
    }

    /// Render the template. Empty placeholders collapse, so `a/{knl}/b`
    /// renders as `a/b` when `knl` is empty.
    pub fn render(&self, knl: &str, desiconda_version: &str) -> PathBuf {
        let rendered = self
            .template
            .replace("{knl}", knl)
            .replace("{desiconda_version}", desiconda_version);
        Path::new(&rendered).components().collect()
    }
}

/// Immutable lookup tables consulted by the resolver and planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub git_host: String,
    pub default_owner: String,
    /// Subversion-hosted products: name -> base URL.
    pub svn_products: BTreeMap<String, String>,
    pub host_templates: Vec<HostTemplate>,
    /// Hosts that receive symlinks with `--cross-install`.
    pub cross_install_hosts: Vec<String>,
}

impl Default for Registry {
    fn default() -> Self {
        let svn_root = "https://desi.lbl.gov/svn/code";
        let svn_products = [
            ("desiAdmin", "tools/desiAdmin"),
            ("dspecsim", "spectro/dspecsim"),
            ("elg_deep2", "targeting/elg_deep2"),
            ("lrgmodel", "targeting/lrgmodel"),
            ("plate_layout", "focalplane/plate_layout"),
            ("positioner_control", "focalplane/positioner_control"),
        ]
        .into_iter()
        .map(|(name, path)| (name.to_string(), format!("{svn_root}/{path}")))
        .collect();

        let host_templates = vec![
            HostTemplate::new(
                "edison",
                "/global/common/software/desi/edison/desiconda/{desiconda_version}",
            ),
            HostTemplate::new(
                "cori",
                "/global/common/software/desi/cori/{knl}/desiconda/{desiconda_version}",
            ),
            HostTemplate::new(
                "datatran",
                "/global/common/software/desi/datatran/desiconda/{desiconda_version}",
            ),
            HostTemplate::new(
                "scigate",
                "/global/common/software/desi/scigate/desiconda/{desiconda_version}",
            ),
        ];

        Self {
            git_host: DEFAULT_GIT_HOST.to_string(),
            default_owner: DEFAULT_GIT_OWNER.to_string(),
            svn_products,
            host_templates,
            cross_install_hosts: vec![
                "cori".to_string(),
                "edison".to_string(),
                "datatran".to_string(),
            ],
        }
    }
}

impl Registry {
    pub fn svn_product(&self, name: &str) -> Option<&str> {
        self.svn_products.get(name).map(String::as_str)
    }

    pub fn host_template(&self, host: &str) -> Option<&HostTemplate> {
        self.host_templates.iter().find(|t| t.host == host)
    }

    /// True when `host` names a NERSC host with a directory template.
    pub fn is_known_host(&self, host: &str) -> bool {
        self.host_template(host).is_some()
    }

    pub fn with_svn_product(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.svn_products.insert(name.into(), url.into());
        self
    }

    pub fn with_host_template(mut self, template: HostTemplate) -> Self {
        self.host_templates.retain(|t| t.host != template.host);
        self.host_templates.push(template);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_knows_svn_products() {
        let registry = Registry::default();
        assert_eq!(
            registry.svn_product("desiAdmin"),
            Some("https://desi.lbl.gov/svn/code/tools/desiAdmin")
        );
        assert_eq!(registry.svn_product("lvmutil"), None);
    }

    #[test]
    fn render_collapses_empty_knl() {
        let registry = Registry::default();
        let cori = registry.host_template("cori").unwrap();
        assert_eq!(
            cori.render("", "current"),
            PathBuf::from("/global/common/software/desi/cori/desiconda/current")
        );
        assert_eq!(
            cori.render("knl", "current"),
            PathBuf::from("/global/common/software/desi/cori/knl/desiconda/current")
        );
    }

    #[test]
    fn render_ignores_unused_placeholders() {
        let registry = Registry::default();
        let edison = registry.host_template("edison").unwrap();
        assert_eq!(
            edison.render("knl", "frobulate"),
            PathBuf::from("/global/common/software/desi/edison/desiconda/frobulate")
        );
    }

    #[test]
    fn with_host_template_replaces_existing() {
        let registry = Registry::default()
            .with_host_template(HostTemplate::new("edison", "/x/{desiconda_version}"));
        assert_eq!(
            registry.host_template("edison").unwrap().render("", "v"),
            PathBuf::from("/x/v")
        );
        assert_eq!(registry.host_templates.len(), 4);
    }
}
