use std::sync::OnceLock;

use regex::Regex;

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// `<prefix>-<yyyyMMdd.HHmmss>-<build>.jar`, anchored on both ends.
///
/// The build segment is digits only, so the split between prefix and
/// timestamp is unique for any matching name.
fn snapshot_file_regex() -> &'static Regex {
    static FILE_RE: OnceLock<Regex> = OnceLock::new();
    FILE_RE.get_or_init(|| {
        Regex::new(r"^(?P<prefix>.+)-(?P<timestamp>[0-9]{8}\.[0-9]{6})-(?P<build>[0-9]+)\.jar$")
            .expect("invalid snapshot artifact filename regex")
    })
}

/// Strip a trailing `-SNAPSHOT` from a version, if present.
pub fn base_version(version: &str) -> &str {
    version.strip_suffix(SNAPSHOT_SUFFIX).unwrap_or(version)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile<'a> {
    pub timestamp: &'a str,
    pub build_number: &'a str,
}

/// Matches the timestamped jar names published for one version of one
/// artifact. `artifact_id` and the base version are compared literally.
#[derive(Debug, Clone)]
pub struct SnapshotPattern {
    prefix: String,
}

impl SnapshotPattern {
    pub fn new(artifact_id: &str, version: &str) -> Self {
        Self {
            prefix: format!("{artifact_id}-{}", base_version(version)),
        }
    }

    pub fn parse<'a>(&self, file_name: &'a str) -> Option<SnapshotFile<'a>> {
        let caps = snapshot_file_regex().captures(file_name)?;
        if caps.name("prefix")?.as_str() != self.prefix {
            return None;
        }

        Some(SnapshotFile {
            timestamp: caps.name("timestamp")?.as_str(),
            build_number: caps.name("build")?.as_str(),
        })
    }

    #[allow(unused)]
    pub fn matches(&self, file_name: &str) -> bool {
        self.parse(file_name).is_some()
    }
}
