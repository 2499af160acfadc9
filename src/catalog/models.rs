use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The whole catalogue document: where the Maven API lives and which
/// projects get a download page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub(crate) endpoints: Endpoints,
    #[serde(default)]
    pub(crate) groups: Vec<ProjectGroup>,
}

impl Catalog {
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn groups(&self) -> &[ProjectGroup] {
        &self.groups
    }

    /// Every project of every group, in catalogue order.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.groups.iter().flat_map(|g| g.projects.iter())
    }

    pub fn by_slug(&self, slug: &str) -> Option<&Project> {
        self.projects().find(|p| p.slug == slug)
    }
}

/// Base URLs of the three upstream endpoints (listing, details, downloads).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub(crate) versions: String,
    pub(crate) details: String,
    pub(crate) downloads: String,
}

impl Endpoints {
    #[allow(unused)]
    pub fn new(versions: impl Into<String>, details: impl Into<String>, downloads: impl Into<String>) -> Self {
        Self {
            versions: versions.into(),
            details: details.into(),
            downloads: downloads.into(),
        }
    }

    pub fn versions(&self) -> &str {
        &self.versions
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn downloads(&self) -> &str {
        &self.downloads
    }
}

/// A labelled navigation group, e.g. "CloudburstMC".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectGroup {
    pub(crate) label: String,
    #[serde(default)]
    pub(crate) projects: Vec<Project>,
}

impl ProjectGroup {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub(crate) slug: String,
    pub(crate) name: String,
    pub(crate) group_id: String,
    pub(crate) artifact_id: String,
    #[serde(default)]
    pub(crate) ignored_versions: HashSet<String>,
}

impl Project {
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Display name, used in page titles.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn ignored_versions(&self) -> &HashSet<String> {
        &self.ignored_versions
    }

    /// Title shown above the download page.
    pub fn title(&self) -> String {
        format!("Downloads | {}", self.name)
    }
}
