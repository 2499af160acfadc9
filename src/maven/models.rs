use serde::{Deserialize, Serialize};

/// Body of the version-listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionListing {
    pub versions: Vec<String>,
}

/// Body of the version-details endpoint. Only file names are used.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionDetails {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    pub name: String,
}

/// One version and its builds, newest build first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    version: String,
    artifacts: Vec<ArtifactEntry>,
}

impl VersionEntry {
    pub fn new(version: impl Into<String>, artifacts: Vec<ArtifactEntry>) -> Self {
        Self {
            version: version.into(),
            artifacts,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn artifacts(&self) -> &[ArtifactEntry] {
        &self.artifacts
    }

    /// Newest build, if the version has any.
    pub fn latest(&self) -> Option<&ArtifactEntry> {
        self.artifacts.first()
    }

    pub fn by_build(&self, build_number: &str) -> Option<&ArtifactEntry> {
        self.artifacts.iter().find(|a| a.build_number == build_number)
    }
}

/// A single downloadable snapshot jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactEntry {
    build_number: String,
    display_name: String,
    /// `yyyyMMdd.HHmmss`
    timestamp: String,
    download_url: String,
}

impl ArtifactEntry {
    pub fn new(
        build_number: impl Into<String>,
        display_name: impl Into<String>,
        timestamp: impl Into<String>,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            build_number: build_number.into(),
            display_name: display_name.into(),
            timestamp: timestamp.into(),
            download_url: download_url.into(),
        }
    }

    pub fn build_number(&self) -> &str {
        &self.build_number
    }

    /// The matched file name, e.g. `nukkit-2.0.0-20230101.120000-5.jar`.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn download_url(&self) -> &str {
        &self.download_url
    }
}
