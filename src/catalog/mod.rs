mod models;

use std::{collections::HashSet, fs, path::Path, sync::OnceLock};

use url::Url;

pub use models::{Catalog, Endpoints, Project};

/// Environment variable that may hold the whole catalogue as JSON.
pub const CATALOG_ENV: &str = "OPENCOLLAB_DOWNLOADS_CATALOG";

/// Single, module-private cache (set exactly once).
static CACHE: OnceLock<Catalog> = OnceLock::new();

// ---- Public API (serde hidden from callers) ----

/// Initialize from a JSON file path.
pub fn init_from_file(path: impl AsRef<Path>) -> Result<&'static Catalog, CatalogError> {
    let data = fs::read_to_string(path).map_err(CatalogError::Io)?;
    init_from_json_str(&data)
}

/// Initialize from a JSON string.
pub fn init_from_json_str(json: &str) -> Result<&'static Catalog, CatalogError> {
    let parsed = Catalog::from_json_str(json)?;
    CACHE.set(parsed).map_err(|_| CatalogError::AlreadyInitialized)?;
    get()
}

/// Initialize from an env var containing JSON.
pub fn init_from_env(var: &str) -> Result<&'static Catalog, CatalogError> {
    let s = std::env::var(var).map_err(|_| CatalogError::MissingEnv(var.to_string()))?;
    init_from_json_str(&s)
}

pub fn get() -> Result<&'static Catalog, CatalogError> {
    CACHE.get().ok_or(CatalogError::NotInitialized)
}

/// Find a project by slug without cloning.
pub fn by_slug(slug: &str) -> Result<Option<&'static Project>, CatalogError> {
    Ok(get()?.by_slug(slug))
}

impl Catalog {
    /// Parse and validate a catalogue document.
    ///
    /// Endpoints must be absolute http(s) URLs; trailing slashes are trimmed
    /// so paths can be appended with a single `/`. Slugs must be unique.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let mut catalog: Catalog = serde_json::from_str(json).map_err(CatalogError::Json)?;

        for endpoint in [
            &mut catalog.endpoints.versions,
            &mut catalog.endpoints.details,
            &mut catalog.endpoints.downloads,
        ] {
            let parsed = Url::parse(endpoint.as_str())
                .map_err(|e| CatalogError::InvalidEndpoint(endpoint.clone(), e.to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(CatalogError::InvalidEndpoint(
                    endpoint.clone(),
                    format!("unsupported scheme '{}'", parsed.scheme()),
                ));
            }
            let trimmed = endpoint.trim_end_matches('/').len();
            endpoint.truncate(trimmed);
        }

        {
            let mut seen = HashSet::new();
            for project in catalog.projects() {
                if !seen.insert(project.slug()) {
                    return Err(CatalogError::DuplicateSlug(project.slug().to_string()));
                }
            }
        }

        Ok(catalog)
    }
}

/// ---- Errors ----
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("catalog is not initialized")]
    NotInitialized,
    #[error("catalog already initialized")]
    AlreadyInitialized,
    #[error("missing env var: {0}")]
    MissingEnv(String),
    #[error("invalid endpoint '{0}': {1}")]
    InvalidEndpoint(String, String),
    #[error("duplicate project slug '{0}'")]
    DuplicateSlug(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
