//! Storage layer: directory layout convention, CSV tables, extracted-text corpus.

mod error;
pub use error::StoreError;

pub mod layout;
pub mod table;
pub mod texts;

pub use layout::Layout;
pub use table::{Table, decode_text, load_records, read_table, write_table};
pub use texts::{TextFile, load_corpus};
