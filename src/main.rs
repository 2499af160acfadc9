mod catalog;
mod helpers;
mod maven;
mod render;

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};

use catalog::{CATALOG_ENV, Catalog, Project};
use helpers::download::{Verification, download_artifact};
use helpers::{choose_index, choose_one};
use maven::{ArtifactEntry, BuildOrder, Discovery, DiscoveryOptions, HttpMavenApi, VersionEntry};

const BUNDLED_CATALOG: &str = include_str!("../resources/catalog.json");

/// List and download snapshot builds published to the Open Collaboration
/// Maven repository.
#[derive(Parser, Debug)]
#[command(name = "opencollab-downloads")]
struct Cli {
    /// Project slug, e.g. `nukkit`. Without it, project, version and build
    /// are picked interactively and the build is downloaded.
    project: Option<String>,

    /// Catalog JSON to use instead of the bundled one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the project list and exit
    #[arg(long, conflicts_with = "project")]
    home: bool,

    /// Print the versions as JSON instead of a page
    #[arg(long)]
    json: bool,

    /// Version detail requests in flight at once
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// How builds are ordered within a version
    #[arg(long, value_enum, default_value_t = BuildOrder::Upstream)]
    order: BuildOrder,

    /// Download a build instead of listing them
    #[arg(long, requires = "project")]
    download: bool,

    /// Version to download from (default: newest version with builds)
    #[arg(long, requires = "download")]
    version: Option<String>,

    /// Build number to download (default: newest)
    #[arg(long, requires = "download")]
    build: Option<String>,

    /// Directory downloads are written to
    #[arg(long, default_value = ".")]
    dest: PathBuf,

    /// Do not check downloads against the published sha256
    #[arg(long)]
    no_verify: bool,
}

fn init_logging() {
    use tracing_subscriber::Layer;
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}

/// `--config`, then the env var, then the catalog compiled into the binary.
fn load_catalog(config: Option<&Path>) -> Result<&'static Catalog> {
    if let Some(path) = config {
        return catalog::init_from_file(path).with_context(|| format!("load catalog from {}", path.display()));
    }
    if std::env::var_os(CATALOG_ENV).is_some() {
        return catalog::init_from_env(CATALOG_ENV).with_context(|| format!("load catalog from ${CATALOG_ENV}"));
    }
    catalog::init_from_json_str(BUNDLED_CATALOG).context("load bundled catalog")
}

fn pick_project(catalog: &'static Catalog) -> Result<&'static Project> {
    let projects: Vec<&Project> = catalog.projects().collect();
    let labels: Vec<String> = catalog
        .groups()
        .iter()
        .flat_map(|g| g.projects().iter().map(move |p| format!("{} / {}", g.label(), p.name())))
        .collect();

    let idx = choose_index("Select Project", &labels)?;
    Ok(projects[idx])
}

fn pick_artifact(versions: &[VersionEntry]) -> Result<&ArtifactEntry> {
    let with_builds: Vec<&VersionEntry> = versions.iter().filter(|v| !v.artifacts().is_empty()).collect();
    if with_builds.is_empty() {
        bail!("No builds published yet");
    }

    let version = choose_one("Select Version", with_builds)?;
    let builds: Vec<&ArtifactEntry> = version.artifacts().iter().collect();
    choose_one("Select Build", builds)
}

/// Resolve `--version` / `--build` against the discovered versions.
fn select_artifact<'a>(
    versions: &'a [VersionEntry],
    version: Option<&str>,
    build: Option<&str>,
) -> Result<&'a ArtifactEntry> {
    let entry = match version {
        Some(wanted) => versions
            .iter()
            .find(|v| v.version() == wanted)
            .with_context(|| format!("version '{wanted}' not found"))?,
        None => versions
            .iter()
            .find(|v| !v.artifacts().is_empty())
            .context("No builds published yet")?,
    };

    match build {
        Some(wanted) => entry
            .by_build(wanted)
            .with_context(|| format!("build #{wanted} not found in {}", entry.version())),
        None => entry
            .latest()
            .with_context(|| format!("version {} has no builds", entry.version())),
    }
}

async fn download(api: &HttpMavenApi, artifact: &ArtifactEntry, dest: &Path, verify: bool) -> Result<()> {
    let outcome = download_artifact(api.client(), artifact, dest, verify)
        .await
        .with_context(|| format!("download {}", artifact.display_name()))?;

    match outcome.verification {
        Verification::Verified => println!("sha256 verified: {}", outcome.sha256),
        Verification::Unavailable => println!("sha256 (unverified): {}", outcome.sha256),
        Verification::Skipped => {}
    }
    println!("Saved {} ({} bytes)", outcome.path.display(), outcome.bytes);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let catalog = load_catalog(cli.config.as_deref())?;

    if cli.home {
        print!("{}", render::home_page(catalog));
        return Ok(());
    }

    let project = match cli.project.as_deref() {
        Some(slug) => match catalog::by_slug(slug)? {
            Some(project) => project,
            None => {
                print!("{}", render::not_found_page());
                bail!("unknown project '{slug}'");
            }
        },
        None => pick_project(catalog)?,
    };

    let api = HttpMavenApi::new(catalog.endpoints().clone()).context("build HTTP client")?;
    let options = DiscoveryOptions {
        concurrency: cli.concurrency,
        build_order: cli.order,
    };
    let discovery = Discovery::with_options(api, options);

    tracing::info!(project = project.slug(), "discovering builds");
    let loading = helpers::loading_spinner(format!("Loading {}...", project.name()));
    let discovered = discovery
        .discover(project.group_id(), project.artifact_id(), project.ignored_versions())
        .await;
    loading.finish_and_clear();

    let versions = match discovered {
        Ok(versions) => versions,
        Err(err) => {
            println!("{}", render::FETCH_FAILED);
            return Err(err).with_context(|| format!("discover builds of {}", project.name()));
        }
    };

    let verify = !cli.no_verify;
    if cli.project.is_none() {
        let artifact = pick_artifact(&versions)?;
        download(discovery.api(), artifact, &cli.dest, verify).await
    } else if cli.download {
        let artifact = select_artifact(&versions, cli.version.as_deref(), cli.build.as_deref())?;
        download(discovery.api(), artifact, &cli.dest, verify).await
    } else if cli.json {
        println!("{}", render::json(&versions)?);
        Ok(())
    } else {
        print!("{}", render::project_page(project, &versions));
        Ok(())
    }
}
