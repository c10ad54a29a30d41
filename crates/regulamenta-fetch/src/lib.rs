//! Downloader: regulation documents over HTTP and the Querido Diário gazette API.

pub mod kind;
pub mod territory;

pub use kind::infer_extension;
pub use territory::{CAPITALS, capital_ibge_code};

#[cfg(feature = "http")]
mod error;
#[cfg(feature = "http")]
pub mod gazette;
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use error::FetchError;
#[cfg(feature = "http")]
pub use gazette::{Gazette, GazetteClient, GazetteQuery, GazetteSearch, QUERIDO_DIARIO_API, SavedGazette};
#[cfg(feature = "http")]
pub use http::{DocumentFetcher, DownloadOutcome, FetchConfig};
