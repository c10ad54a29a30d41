//! Spreadsheet schema mapping.
//!
//! Survey sheets are edited by hand and their headers drift between laws and
//! revisions ("Capital / Estado", "capital ou estado", "Se sim, número da
//! regulamentação (original)"...). Headers are matched to roles once, when the
//! sheet is loaded, and every row is then read through the resulting
//! [`ColumnMap`] into a typed [`RegulationRecord`].

use std::fmt;

use crate::decree::{DecreePattern, extract_decree_number};
use crate::law::{Law, TerritoryType};
use crate::record::RegulationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    TerritoryType,
    Name,
    Regulation,
    DecreeNumber,
    Link,
}

impl ColumnRole {
    pub const REQUIRED: [ColumnRole; 3] = [Self::TerritoryType, Self::Name, Self::Regulation];
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TerritoryType => "capital/estado",
            Self::Name => "nome",
            Self::Regulation => "regulamentação",
            Self::DecreeNumber => "número extraído",
            Self::Link => "link",
        })
    }
}

/// Column index per role, as detected from a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub territory_type: Option<usize>,
    pub name: Option<usize>,
    pub regulation: Option<usize>,
    pub decree_number: Option<usize>,
    pub link: Option<usize>,
}

fn first(headers: &[String], pred: impl Fn(&str) -> bool) -> Option<usize> {
    headers.iter().position(|h| pred(&h.trim().to_lowercase()))
}

impl ColumnMap {
    /// Assign roles to header positions.
    ///
    /// Regulation text prefers an explicit "(original)" column, then a
    /// "número ... regulamenta..." column, then any "regulamenta..." column
    /// that is not the link.
    pub fn detect(headers: &[String]) -> Self {
        let territory_type = first(headers, |h| h.contains("capital") || h.contains("estado"));
        let name = first(headers, |h| h == "nome");
        let decree_number = first(headers, |h| {
            h.contains("número extraído") || h.contains("numero extraido")
        });
        let link = first(headers, |h| h.contains("link"));
        let regulation = first(headers, |h| h.contains("(original)"))
            .or_else(|| {
                first(headers, |h| {
                    h.contains("regulamenta") && (h.contains("número") || h.contains("numero"))
                })
            })
            .or_else(|| first(headers, |h| h.contains("regulamenta") && !h.contains("link")));

        Self {
            territory_type,
            name,
            regulation,
            decree_number,
            link,
        }
    }

    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::TerritoryType => self.territory_type,
            ColumnRole::Name => self.name,
            ColumnRole::Regulation => self.regulation,
            ColumnRole::DecreeNumber => self.decree_number,
            ColumnRole::Link => self.link,
        }
    }

    /// Required roles that no header matched.
    pub fn missing(&self) -> Vec<ColumnRole> {
        ColumnRole::REQUIRED
            .into_iter()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }

    fn cell<'a>(&self, row: &'a [String], role: ColumnRole) -> &'a str {
        self.get(role)
            .and_then(|i| row.get(i))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    /// Read one row into a typed record.
    ///
    /// A non-empty decree-number column wins; otherwise the number is derived
    /// from the regulation text with `pattern`.
    pub fn record(&self, row: &[String], law: Law, pattern: DecreePattern) -> RegulationRecord {
        let regulation_text = self.cell(row, ColumnRole::Regulation).to_string();
        let listed = self.cell(row, ColumnRole::DecreeNumber);
        let decree_number = if listed.is_empty() {
            extract_decree_number(&regulation_text, pattern)
        } else {
            Some(listed.to_string())
        };
        let link = self.cell(row, ColumnRole::Link);

        RegulationRecord {
            law,
            territory_type: TerritoryType::parse_cell(self.cell(row, ColumnRole::TerritoryType)),
            territory: self.cell(row, ColumnRole::Name).to_string(),
            regulation_text,
            decree_number,
            source_link: (!link.is_empty()).then(|| link.to_string()),
        }
    }
}
