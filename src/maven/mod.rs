//! Discovery of snapshot builds published to a Maven repository.
//!
//! The upstream API returns versions and files oldest first; both lists are
//! reversed here to present the newest first. That ordering is an assumption
//! about the upstream, not something this module verifies.

pub mod client;
pub mod models;
pub mod pattern;

use std::cmp::Reverse;
use std::collections::HashSet;

use futures::{StreamExt, TryStreamExt, stream};

pub use client::{FetchError, HttpMavenApi, MavenApi};
pub use models::{ArtifactEntry, VersionEntry};
pub use pattern::SnapshotPattern;

/// How builds inside a version are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BuildOrder {
    /// Reverse of the upstream file listing.
    #[default]
    Upstream,
    /// Newest embedded timestamp first, ties broken by build number.
    Timestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct DiscoveryOptions {
    /// Detail requests in flight at once; `1` is fully sequential.
    pub concurrency: usize,
    pub build_order: BuildOrder,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            build_order: BuildOrder::Upstream,
        }
    }
}

/// `org.example` + `artifact` -> `org/example/artifact`
pub fn artifact_path(group_id: &str, artifact_id: &str) -> String {
    format!("{}/{artifact_id}", group_id.replace('.', "/"))
}

pub struct Discovery<A> {
    api: A,
    options: DiscoveryOptions,
}

impl<A: MavenApi> Discovery<A> {
    #[allow(unused)]
    pub fn new(api: A) -> Self {
        Self::with_options(api, DiscoveryOptions::default())
    }

    pub fn with_options(api: A, options: DiscoveryOptions) -> Self {
        Self { api, options }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// List every non-ignored version of `group_id:artifact_id` with its
    /// snapshot jars, newest version first.
    ///
    /// Any failed request fails the whole call; nothing is returned for the
    /// versions that did succeed.
    pub async fn discover(
        &self,
        group_id: &str,
        artifact_id: &str,
        ignored_versions: &HashSet<String>,
    ) -> Result<Vec<VersionEntry>, FetchError> {
        let path = artifact_path(group_id, artifact_id);
        let listing = self.api.versions(&path).await?;

        let wanted: Vec<&String> = listing.versions.iter().filter(|v| !ignored_versions.contains(*v)).collect();
        tracing::debug!(
            %path,
            listed = listing.versions.len(),
            wanted = wanted.len(),
            "fetching version details"
        );

        // `buffered` yields in input order, so concurrency never reorders.
        let mut versions: Vec<VersionEntry> = stream::iter(wanted)
            .map(|version| self.version_entry(&path, artifact_id, version))
            .buffered(self.options.concurrency.max(1))
            .try_collect()
            .await?;

        versions.reverse();
        Ok(versions)
    }

    async fn version_entry(&self, path: &str, artifact_id: &str, version: &str) -> Result<VersionEntry, FetchError> {
        let details = self.api.details(path, version).await?;
        let pattern = SnapshotPattern::new(artifact_id, version);

        let mut artifacts: Vec<ArtifactEntry> = details
            .files
            .iter()
            .filter_map(|file| {
                let parsed = pattern.parse(&file.name)?;
                Some(ArtifactEntry::new(
                    parsed.build_number,
                    file.name.as_str(),
                    parsed.timestamp,
                    self.api.download_url(path, version, &file.name),
                ))
            })
            .collect();

        match self.options.build_order {
            BuildOrder::Upstream => artifacts.reverse(),
            BuildOrder::Timestamp => artifacts.sort_by_key(|a| {
                (
                    Reverse(a.timestamp().to_string()),
                    Reverse(a.build_number().parse::<u64>().unwrap_or(0)),
                )
            }),
        }

        Ok(VersionEntry::new(version, artifacts))
    }
}
