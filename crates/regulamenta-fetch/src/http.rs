//! HTTP document fetcher.
//!
//! One `reqwest::Client` is shared by every request of a run. Requests are
//! paced: each one after the first waits until the configured delay has
//! passed since the previous one started.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::kind::infer_extension;

const ACCEPT_DOCUMENTS: &str =
    "text/html,application/xhtml+xml,application/pdf;q=0.9,text/plain;q=0.8,*/*;q=0.5";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Minimum spacing between the start of two requests.
    pub delay: Duration,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("regulamenta/{}", env!("CARGO_PKG_VERSION")),
            delay: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Destination already existed; no request was made.
    Skipped { path: PathBuf },
    Downloaded { path: PathBuf, bytes: u64 },
}

impl DownloadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Skipped { path } | Self::Downloaded { path, .. } => path,
        }
    }
}

pub struct DocumentFetcher {
    client: reqwest::Client,
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl DocumentFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_DOCUMENTS));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("pt-BR,pt;q=0.9,en;q=0.5"));
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            delay: config.delay,
            last_request: Mutex::new(None),
        })
    }

    /// Wait out the politeness delay, then mark a request as started.
    async fn pace(&self) {
        let wait = {
            let mut last = self
                .last_request
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let now = Instant::now();
            let wait = remaining_delay(*last, now, self.delay);
            *last = Some(now + wait);
            wait
        };
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "pacing request");
            tokio::time::sleep(wait).await;
        }
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<reqwest::Response, FetchError> {
        self.pace().await;
        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        info!(url = %url, "querying");
        let body = self.get(url, query).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Download `url` to a fixed destination, skipping when it already exists.
    pub async fn download_to(&self, url: &str, dest: &Path) -> Result<DownloadOutcome, FetchError> {
        if dest.exists() {
            debug!(path = %dest.display(), "already downloaded");
            return Ok(DownloadOutcome::Skipped {
                path: dest.to_path_buf(),
            });
        }
        let resp = self.get(url, &[]).await?;
        save(resp, dest).await
    }

    /// Download a document whose extension is not known up front.
    ///
    /// `dest_for` maps an extension (`pdf`, `html`, `txt`) to the destination
    /// path. The URL decides the extension when it can; otherwise the
    /// response's `Content-Type` does, after the request.
    pub async fn download<F>(&self, url: &str, dest_for: F) -> Result<DownloadOutcome, FetchError>
    where
        F: Fn(&str) -> PathBuf,
    {
        if let Some(ext) = infer_extension(url, None) {
            return self.download_to(url, &dest_for(ext)).await;
        }

        let resp = self.get(url, &[]).await?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let Some(ext) = infer_extension(url, content_type.as_deref()) else {
            return Err(FetchError::UnknownType {
                url: url.to_string(),
                content_type,
            });
        };
        let dest = dest_for(ext);
        if dest.exists() {
            debug!(path = %dest.display(), "already downloaded");
            return Ok(DownloadOutcome::Skipped { path: dest });
        }
        save(resp, &dest).await
    }
}

fn remaining_delay(last: Option<Instant>, now: Instant, delay: Duration) -> Duration {
    match last {
        Some(prev) => (prev + delay).saturating_duration_since(now),
        None => Duration::ZERO,
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

/// A response body read chunk by chunk.
trait ChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError>;
}

impl ChunkSource for reqwest::Response {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError> {
        Ok(self.chunk().await?.map(|b| b.to_vec()))
    }
}

async fn write_chunks<S: ChunkSource>(body: &mut S, partial: &Path) -> Result<u64, FetchError> {
    let mut file = tokio::fs::File::create(partial)
        .await
        .map_err(|e| FetchError::io(partial, e))?;
    let mut bytes = 0u64;
    while let Some(chunk) = body.next_chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(partial, e))?;
        bytes += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| FetchError::io(partial, e))?;
    Ok(bytes)
}

/// Stream the body to `<dest>.part`, then rename into place. A failed
/// transfer removes the partial file.
async fn save<S: ChunkSource>(mut body: S, dest: &Path) -> Result<DownloadOutcome, FetchError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FetchError::io(parent, e))?;
    }
    let partial = partial_path(dest);
    let bytes = match write_chunks(&mut body, &partial).await {
        Ok(bytes) => bytes,
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&partial).await {
                debug!(path = %partial.display(), error = %rm, "partial file not removed");
            }
            return Err(e);
        }
    };

    tokio::fs::rename(&partial, dest)
        .await
        .map_err(|e| FetchError::io(dest, e))?;
    info!(path = %dest.display(), bytes, "downloaded");
    Ok(DownloadOutcome::Downloaded {
        path: dest.to_path_buf(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_is_not_delayed() {
        let now = Instant::now();
        assert_eq!(remaining_delay(None, now, Duration::from_secs(5)), Duration::ZERO);
    }

    #[test]
    fn later_requests_wait_out_the_delay() {
        let start = Instant::now();
        let delay = Duration::from_millis(1000);
        let wait = remaining_delay(Some(start), start + Duration::from_millis(300), delay);
        assert_eq!(wait, Duration::from_millis(700));
        assert_eq!(
            remaining_delay(Some(start), start + Duration::from_secs(2), delay),
            Duration::ZERO
        );
    }

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/data/LAI/dados_brutos/capital/Recife_LAI.pdf")),
            PathBuf::from("/data/LAI/dados_brutos/capital/Recife_LAI.pdf.part")
        );
    }

    /// Yields the queued chunks, then fails.
    struct BrokenBody(Vec<Vec<u8>>);

    impl ChunkSource for BrokenBody {
        async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError> {
            if self.0.is_empty() {
                return Err(FetchError::Status {
                    status: 502,
                    url: "http://gazette.example/d.pdf".into(),
                });
            }
            Ok(Some(self.0.remove(0)))
        }
    }

    struct WholeBody(Option<Vec<u8>>);

    impl ChunkSource for WholeBody {
        async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError> {
            Ok(self.0.take())
        }
    }

    #[tokio::test]
    async fn interrupted_transfer_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("capital").join("Recife_LAI.pdf");

        let err = save(BrokenBody(vec![b"%PDF-1.4 ".to_vec()]), &dest).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 502, .. }));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn completed_transfer_is_renamed_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Recife_LAI.pdf");

        let outcome = save(WholeBody(Some(b"%PDF-1.4".to_vec())), &dest).await.unwrap();
        assert_eq!(outcome, DownloadOutcome::Downloaded { path: dest.clone(), bytes: 8 });
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.4");
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn existing_destination_is_skipped_without_a_request() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Recife_LAI.pdf");
        std::fs::write(&dest, b"%PDF-1.4").unwrap();

        let fetcher = DocumentFetcher::new(&FetchConfig::default()).unwrap();
        // Unroutable host: any request would fail.
        let outcome = fetcher
            .download("http://invalid.invalid/decreto.pdf", |ext| {
                dir.path().join(format!("Recife_LAI.{ext}"))
            })
            .await
            .unwrap();
        assert_eq!(outcome, DownloadOutcome::Skipped { path: dest });
        assert_eq!(std::fs::read(outcome.path()).unwrap(), b"%PDF-1.4");
    }
}
