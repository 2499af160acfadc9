use std::fmt::{self, Write};

use crate::catalog::{Catalog, Project};
use crate::maven::{ArtifactEntry, VersionEntry};

pub const HOME_TITLE: &str = "Open Collaboration Downloads";
pub const NOT_FOUND_TITLE: &str = "404 Page Not Found";
/// The only thing shown when discovery fails.
pub const FETCH_FAILED: &str = "Failed to fetch data";

impl fmt::Display for VersionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.artifacts().len() {
            1 => write!(f, "{} (1 build)", self.version()),
            n => write!(f, "{} ({n} builds)", self.version()),
        }
    }
}

impl fmt::Display for ArtifactEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} | {}", self.build_number(), self.display_name())
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
}

/// Landing page: every navigation group and the projects under it.
pub fn home_page(catalog: &Catalog) -> String {
    let mut out = String::new();
    heading(&mut out, HOME_TITLE);

    for group in catalog.groups() {
        let _ = writeln!(out, "\n{}", group.label());
        for project in group.projects() {
            let _ = writeln!(out, "  {} ({})", project.name(), project.slug());
        }
    }
    out
}

/// One section per version, builds listed newest first.
pub fn project_page(project: &Project, versions: &[VersionEntry]) -> String {
    let mut out = String::new();
    heading(&mut out, &project.title());

    for version in versions {
        let _ = writeln!(out, "\n{}", version.version());
        if version.artifacts().is_empty() {
            let _ = writeln!(out, "  (no builds)");
            continue;
        }

        let width = version
            .artifacts()
            .iter()
            .map(|a| a.display_name().len())
            .max()
            .unwrap_or(0);
        for artifact in version.artifacts() {
            let build = format!("#{}", artifact.build_number());
            let _ = writeln!(
                out,
                "  {build:<6} {:<width$}  {}",
                artifact.display_name(),
                artifact.download_url()
            );
        }
    }
    out
}

pub fn not_found_page() -> String {
    let mut out = String::new();
    heading(&mut out, NOT_FOUND_TITLE);
    out
}

pub fn json(versions: &[VersionEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(versions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = include_str!("../../resources/catalog.json");

    fn nukkit() -> Project {
        Catalog::from_json_str(CATALOG).unwrap().by_slug("nukkit").unwrap().clone()
    }

    fn sample() -> Vec<VersionEntry> {
        let url = |v: &str, n: &str| format!("https://repo.example/cn/nukkit/nukkit/{v}/{n}");
        vec![
            VersionEntry::new(
                "1.0-SNAPSHOT",
                vec![
                    ArtifactEntry::new(
                        "12",
                        "nukkit-1.0-20200102.000000-12.jar",
                        "20200102.000000",
                        url("1.0-SNAPSHOT", "nukkit-1.0-20200102.000000-12.jar"),
                    ),
                    ArtifactEntry::new(
                        "9",
                        "nukkit-1.0-20200101.000000-9.jar",
                        "20200101.000000",
                        url("1.0-SNAPSHOT", "nukkit-1.0-20200101.000000-9.jar"),
                    ),
                ],
            ),
            VersionEntry::new("0.9-SNAPSHOT", vec![]),
        ]
    }

    #[test]
    fn home_page_lists_groups_and_projects() {
        let page = home_page(&Catalog::from_json_str(CATALOG).unwrap());

        assert!(page.starts_with("Open Collaboration Downloads\n============================\n"));
        assert!(page.contains("\nCloudburstMC\n"));
        assert!(page.contains("  Cloudburst (cloudburst)\n"));
        assert!(page.contains("  Nukkit (nukkit)\n"));
    }

    #[test]
    fn project_page_keeps_version_and_build_order() {
        let page = project_page(&nukkit(), &sample());

        assert!(page.starts_with("Downloads | Nukkit\n"));
        let v10 = page.find("\n1.0-SNAPSHOT\n").unwrap();
        let v09 = page.find("\n0.9-SNAPSHOT\n").unwrap();
        assert!(v10 < v09);

        let b12 = page.find("#12").unwrap();
        let b9 = page.find("#9 ").unwrap();
        assert!(b12 < b9);

        assert!(page.contains("https://repo.example/cn/nukkit/nukkit/1.0-SNAPSHOT/nukkit-1.0-20200101.000000-9.jar"));
        assert!(page.ends_with("\n0.9-SNAPSHOT\n  (no builds)\n"));
    }

    #[test]
    fn json_uses_snake_case_fields() {
        let value: serde_json::Value = serde_json::from_str(&json(&sample()).unwrap()).unwrap();

        assert_eq!(value[0]["version"], "1.0-SNAPSHOT");
        assert_eq!(value[0]["artifacts"][0]["build_number"], "12");
        assert_eq!(value[0]["artifacts"][1]["display_name"], "nukkit-1.0-20200101.000000-9.jar");
        assert_eq!(value[1]["artifacts"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn picker_labels() {
        let versions = sample();
        assert_eq!(versions[0].to_string(), "1.0-SNAPSHOT (2 builds)");
        assert_eq!(versions[1].to_string(), "0.9-SNAPSHOT (0 builds)");
        assert_eq!(versions[0].artifacts()[1].to_string(), "#9 | nukkit-1.0-20200101.000000-9.jar");
    }

    #[test]
    fn not_found_page_has_title() {
        assert_eq!(not_found_page(), "404 Page Not Found\n==================\n");
    }
}
