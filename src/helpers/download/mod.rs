use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle, style::TemplateError};
use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};

use crate::maven::ArtifactEntry;

#[derive(thiserror::Error, Debug)]
pub enum DownloadError {
    #[error("failed to GET '{url}': {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{url}' responded with {status}")]
    Status { url: String, status: StatusCode },
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },
    #[error("failed to build progress style: {0}")]
    Style(#[from] TemplateError),
}

/// What happened to the checksum of a finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified,
    /// The repository publishes no `.sha256` for this file.
    Unavailable,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
    pub verification: Verification,
}

/// Download `artifact` into `dest_dir`, named after its display name.
///
/// With `verify` set, the body is checked against the `.sha256` file the
/// repository keeps next to the jar. A failed transfer or a mismatch removes
/// the written file.
pub async fn download_artifact(
    client: &Client,
    artifact: &ArtifactEntry,
    dest_dir: &Path,
    verify: bool,
) -> Result<DownloadOutcome, DownloadError> {
    let url = artifact.download_url();

    let expected = if verify {
        fetch_published_sha256(client, url).await?
    } else {
        None
    };

    let mut res = get(client, url).await?;

    let pb = match res.content_length() {
        Some(total) => ProgressBar::new(total),
        None => ProgressBar::new_spinner(),
    };
    let style = ProgressStyle::with_template(
        "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] \
         {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    )?
    .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(format!("Downloading {url}"));

    fs::create_dir_all(dest_dir).map_err(|source| DownloadError::Io {
        path: dest_dir.to_path_buf(),
        source,
    })?;
    let out_path = dest_dir.join(artifact.display_name());

    let (written, digest) = match write_body(&mut res, &out_path, &pb).await {
        Ok(done) => done,
        Err(err) => {
            discard(&pb, &out_path, format!("Download of {url} failed"));
            return Err(err);
        }
    };
    let actual = hex::encode(digest);

    let verification = match (verify, expected) {
        (false, _) => Verification::Skipped,
        (true, None) => {
            tracing::warn!(%url, "no published sha256, skipping verification");
            Verification::Unavailable
        }
        (true, Some(expected)) if expected.eq_ignore_ascii_case(&actual) => Verification::Verified,
        (true, Some(expected)) => {
            discard(&pb, &out_path, format!("Checksum mismatch for {url}"));
            return Err(DownloadError::ChecksumMismatch {
                file: artifact.display_name().to_string(),
                expected,
                actual,
            });
        }
    };

    pb.finish_with_message(format!("Downloaded {url} to {}", out_path.display()));
    tracing::info!(path = %out_path.display(), bytes = written, ?verification, "download finished");

    Ok(DownloadOutcome {
        path: out_path,
        bytes: written,
        sha256: actual,
        verification,
    })
}

/// Stream the body into `out_path`, returning the byte count and sha256.
async fn write_body(
    res: &mut reqwest::Response,
    out_path: &Path,
    pb: &ProgressBar,
) -> Result<(u64, Vec<u8>), DownloadError> {
    let url = res.url().to_string();
    let io_err = |source| DownloadError::Io {
        path: out_path.to_path_buf(),
        source,
    };

    let mut file = File::create(out_path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    let mut written: u64 = 0;

    while let Some(chunk) = res.chunk().await.map_err(|source| DownloadError::Request {
        url: url.clone(),
        source,
    })? {
        file.write_all(&chunk).map_err(io_err)?;
        hasher.update(&chunk);
        written += chunk.len() as u64;
        pb.set_position(written);
    }
    file.flush().map_err(io_err)?;

    Ok((written, hasher.finalize().to_vec()))
}

/// Drop a download that must not be kept under the artifact's name.
fn discard(pb: &ProgressBar, out_path: &Path, message: String) {
    pb.abandon_with_message(message);
    if let Err(err) = fs::remove_file(out_path) {
        if err.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %out_path.display(), error = %err, "could not remove incomplete download");
        }
    }
}

async fn get(client: &Client, url: &str) -> Result<reqwest::Response, DownloadError> {
    let res = client.get(url).send().await.map_err(|source| DownloadError::Request {
        url: url.to_string(),
        source,
    })?;

    let status = res.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(res)
}

/// `Ok(None)` when the repository has no `.sha256` sidecar for `url`.
async fn fetch_published_sha256(client: &Client, url: &str) -> Result<Option<String>, DownloadError> {
    let sum_url = format!("{url}.sha256");
    let res = match get(client, &sum_url).await {
        Ok(res) => res,
        Err(DownloadError::Status {
            status: StatusCode::NOT_FOUND,
            ..
        }) => return Ok(None),
        Err(err) => return Err(err),
    };

    let body = res.text().await.map_err(|source| DownloadError::Request {
        url: sum_url.clone(),
        source,
    })?;

    // `<hex>` or `<hex>  <file name>`
    Ok(body.split_whitespace().next().map(str::to_ascii_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    const JAR: &[u8] = b"PK\x03\x04 not really a jar";
    const NAME: &str = "nukkit-2.0.0-20230101.120000-5.jar";

    fn artifact_on(server: &MockServer) -> ArtifactEntry {
        ArtifactEntry::new(
            "5",
            NAME,
            "20230101.120000",
            server.url(format!("/snapshots/cn/nukkit/nukkit/2.0.0-SNAPSHOT/{NAME}")),
        )
    }

    fn jar_path() -> String {
        format!("/snapshots/cn/nukkit/nukkit/2.0.0-SNAPSHOT/{NAME}")
    }

    fn jar_sha256() -> String {
        hex::encode(Sha256::digest(JAR))
    }

    #[tokio::test]
    async fn downloads_and_verifies_checksum() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(jar_path());
                then.status(200).body(JAR);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("{}.sha256", jar_path()));
                then.status(200).body(format!("{}  {NAME}\n", jar_sha256().to_uppercase()));
            })
            .await;
        let dir = TempDir::new().unwrap();

        let outcome = download_artifact(&Client::new(), &artifact_on(&server), dir.path(), true)
            .await
            .unwrap();

        assert_eq!(outcome.verification, Verification::Verified);
        assert_eq!(outcome.path, dir.path().join(NAME));
        assert_eq!(outcome.bytes, JAR.len() as u64);
        assert_eq!(outcome.sha256, jar_sha256());
        assert_eq!(fs::read(&outcome.path).unwrap(), JAR);
    }

    #[tokio::test]
    async fn missing_checksum_is_not_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(jar_path());
                then.status(200).body(JAR);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("{}.sha256", jar_path()));
                then.status(404);
            })
            .await;
        let dir = TempDir::new().unwrap();

        let outcome = download_artifact(&Client::new(), &artifact_on(&server), dir.path(), true)
            .await
            .unwrap();

        assert_eq!(outcome.verification, Verification::Unavailable);
        assert!(outcome.path.exists());
    }

    #[tokio::test]
    async fn checksum_mismatch_removes_file() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(jar_path());
                then.status(200).body(JAR);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("{}.sha256", jar_path()));
                then.status(200).body("0000000000000000000000000000000000000000000000000000000000000000");
            })
            .await;
        let dir = TempDir::new().unwrap();

        let err = download_artifact(&Client::new(), &artifact_on(&server), dir.path(), true)
            .await
            .unwrap_err();

        match err {
            DownloadError::ChecksumMismatch { file, actual, .. } => {
                assert_eq!(file, NAME);
                assert_eq!(actual, jar_sha256());
            }
            other => panic!("expected checksum mismatch, got {other:?}"),
        }
        assert!(!dir.path().join(NAME).exists());
    }

    #[tokio::test]
    async fn skipping_verification_never_requests_checksum() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(jar_path());
                then.status(200).body(JAR);
            })
            .await;
        let checksum = server
            .mock_async(|when, then| {
                when.method(GET).path(format!("{}.sha256", jar_path()));
                then.status(200).body(jar_sha256());
            })
            .await;
        let dir = TempDir::new().unwrap();

        let outcome = download_artifact(&Client::new(), &artifact_on(&server), dir.path(), false)
            .await
            .unwrap();

        assert_eq!(outcome.verification, Verification::Skipped);
        assert_eq!(checksum.hits_async().await, 0);
    }

    /// Serves one response announcing `Content-Length: 1000` but only sends
    /// a few bytes before closing the connection.
    fn serve_truncated_jar() -> String {
        use std::io::Read;
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\nhello world");
            let _ = stream.flush();
        });
        format!("http://{addr}/snapshots/cn/nukkit/nukkit/2.0.0-SNAPSHOT/{NAME}")
    }

    #[tokio::test]
    async fn truncated_transfer_removes_partial_file() {
        let artifact = ArtifactEntry::new("5", NAME, "20230101.120000", serve_truncated_jar());
        let dir = TempDir::new().unwrap();

        let err = download_artifact(&Client::new(), &artifact, dir.path(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Request { .. }), "unexpected error: {err:?}");
        assert!(!dir.path().join(NAME).exists());
    }

    #[tokio::test]
    async fn missing_jar_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(jar_path());
                then.status(404);
            })
            .await;
        let dir = TempDir::new().unwrap();

        let err = download_artifact(&Client::new(), &artifact_on(&server), dir.path(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Status { status: StatusCode::NOT_FOUND, .. }));
        assert!(!dir.path().join(NAME).exists());
    }
}
