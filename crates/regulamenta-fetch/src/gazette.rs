//! Querido Diário gazette search.
//!
//! Used when a municipality's regulation link is missing or dead: the public
//! API indexes the official gazettes of most capitals, so a decree number can
//! be searched for directly.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::http::{DocumentFetcher, DownloadOutcome};
use crate::territory::capital_ibge_code;

pub const QUERIDO_DIARIO_API: &str = "https://queridodiario.ok.org.br/api/gazettes";

#[derive(Debug, Clone, PartialEq)]
pub struct GazetteQuery {
    pub querystring: String,
    pub territory_ids: Vec<String>,
    pub published_since: NaiveDate,
    pub published_until: NaiveDate,
    pub excerpt_size: u32,
}

impl GazetteQuery {
    /// Search for a decree number inside gazettes that also cite `reference`
    /// (the regulated law's number, e.g. `13.019`).
    pub fn for_decree(
        reference: &str,
        decree_number: &str,
        territory_id: &str,
        published_since: NaiveDate,
        published_until: NaiveDate,
    ) -> Self {
        Self {
            querystring: format!("{reference}+{decree_number}"),
            territory_ids: vec![territory_id.to_string()],
            published_since,
            published_until,
            excerpt_size: 2000,
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("querystring", self.querystring.clone())];
        params.extend(
            self.territory_ids
                .iter()
                .map(|id| ("territory_ids", id.clone())),
        );
        params.push(("published_since", self.published_since.to_string()));
        params.push(("published_until", self.published_until.to_string()));
        params.push(("excerpt_size", self.excerpt_size.to_string()));
        params
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gazette {
    pub territory_id: String,
    #[serde(default)]
    pub territory_name: Option<String>,
    pub date: NaiveDate,
    pub url: String,
    #[serde(default)]
    pub txt_url: Option<String>,
    #[serde(default)]
    pub excerpts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GazetteSearch {
    #[serde(default)]
    pub total_gazettes: u64,
    #[serde(default)]
    pub gazettes: Vec<Gazette>,
}

/// Files written for one gazette hit.
#[derive(Debug, Default)]
pub struct SavedGazette {
    pub excerpt: Option<PathBuf>,
    pub full_text: Option<DownloadOutcome>,
    pub pdf: Option<DownloadOutcome>,
}

pub struct GazetteClient<'a> {
    fetcher: &'a DocumentFetcher,
    base_url: String,
}

impl<'a> GazetteClient<'a> {
    pub fn new(fetcher: &'a DocumentFetcher) -> Self {
        Self::with_base_url(fetcher, QUERIDO_DIARIO_API.to_string())
    }

    /// `base_url` is the gazettes endpoint; a trailing slash is dropped.
    pub fn with_base_url(fetcher: &'a DocumentFetcher, base_url: String) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn search(&self, query: &GazetteQuery) -> Result<GazetteSearch, FetchError> {
        let result: GazetteSearch = self.fetcher.get_json(&self.base_url, &query.params()).await?;
        info!(
            querystring = %query.querystring,
            total = result.total_gazettes,
            returned = result.gazettes.len(),
            "gazette search"
        );
        Ok(result)
    }

    /// Search a capital by name; unknown capitals are an error.
    pub async fn search_capital(
        &self,
        capital: &str,
        reference: &str,
        decree_number: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<GazetteSearch, FetchError> {
        let code = capital_ibge_code(capital)
            .ok_or_else(|| FetchError::UnknownTerritory(capital.to_string()))?;
        let query = GazetteQuery::for_decree(reference, decree_number, code, since, until);
        self.search(&query).await
    }

    /// Save a hit under `dir`: the first excerpt as `<date>.txt`, the full
    /// text as `<date>_full_gazette.txt` and, when asked, the original PDF as
    /// `<date>_full_gazette.pdf`. Existing files are left alone.
    pub async fn save(
        &self,
        gazette: &Gazette,
        dir: &Path,
        with_pdf: bool,
    ) -> Result<SavedGazette, FetchError> {
        std::fs::create_dir_all(dir).map_err(|e| FetchError::io(dir, e))?;
        let mut saved = SavedGazette::default();

        if let Some(excerpt) = gazette.excerpts.first() {
            let path = dir.join(format!("{}.txt", gazette.date));
            if !path.exists() {
                std::fs::write(&path, excerpt).map_err(|e| FetchError::io(&path, e))?;
            }
            saved.excerpt = Some(path);
        }

        match &gazette.txt_url {
            Some(txt_url) => {
                let dest = dir.join(format!("{}_full_gazette.txt", gazette.date));
                saved.full_text = Some(self.fetcher.download_to(txt_url, &dest).await?);
            }
            None => warn!(date = %gazette.date, url = %gazette.url, "gazette has no text version"),
        }

        if with_pdf {
            let dest = dir.join(format!("{}_full_gazette.pdf", gazette.date));
            saved.pdf = Some(self.fetcher.download_to(&gazette.url, &dest).await?);
        }
        Ok(saved)
    }
}
