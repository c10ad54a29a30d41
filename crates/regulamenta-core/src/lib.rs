//! Core types, decree-number heuristics, and schema mapping for Regulamenta.

pub mod config;
pub mod decree;
pub mod law;
pub mod record;
pub mod schema;
pub mod snippet;

pub use config::{ConfigError, PipelineConfig};
pub use decree::{DecreePattern, extract_decree_number, is_plausible_year};
pub use law::{Law, TerritoryType};
pub use record::{
    Document, DocumentKind, ExtractedText, ExtractionMethod, MatchResult, RegulationRecord,
};
pub use schema::{ColumnMap, ColumnRole};
pub use snippet::{NOT_FOUND, SearchOutcome, Snippet, SnippetOptions, SnippetStrategy, find_snippet};
