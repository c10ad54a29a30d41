//! Legal frameworks under study and the territory types they are surveyed for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four transparency frameworks tracked by the survey spreadsheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Law {
    /// Lei de Acesso à Informação.
    Lai,
    /// Lei do Governo Digital.
    Lgd,
    /// Lei Geral de Proteção de Dados.
    Lgpd,
    /// Marco Regulatório das Organizações da Sociedade Civil.
    Mrosc,
}

impl Law {
    pub const ALL: [Law; 4] = [Law::Lai, Law::Lgd, Law::Lgpd, Law::Mrosc];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Lai => "LAI",
            Self::Lgd => "LGD",
            Self::Lgpd => "LGPD",
            Self::Mrosc => "MROSC",
        }
    }

    /// Attribute a file stem to a law by looking for a law code in it.
    ///
    /// The first code found in [`Law::ALL`] order wins.
    pub fn detect_in(name: &str) -> Option<Law> {
        let upper = name.to_uppercase();
        Self::ALL.into_iter().find(|law| upper.contains(law.code()))
    }
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Law {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|law| law.code() == upper)
            .ok_or_else(|| format!("unknown law code: {s}"))
    }
}

/// Territory classification: a state capital municipality or a whole state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerritoryType {
    Capital,
    Estado,
}

impl TerritoryType {
    pub const ALL: [TerritoryType; 2] = [TerritoryType::Capital, TerritoryType::Estado];

    /// Directory name used under `<LAW>/`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Capital => "capital",
            Self::Estado => "estado",
        }
    }

    /// Parse a spreadsheet cell such as "Capital", "estados" or " ESTADO ".
    pub fn parse_cell(cell: &str) -> Option<Self> {
        match cell.trim().to_lowercase().as_str() {
            "capital" | "capitais" => Some(Self::Capital),
            "estado" | "estados" => Some(Self::Estado),
            _ => None,
        }
    }

    /// Label written back to spreadsheets.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Capital => "Capital",
            Self::Estado => "Estado",
        }
    }
}

impl fmt::Display for TerritoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn law_codes_parse_case_insensitively() {
        assert_eq!("lgpd".parse::<Law>().unwrap(), Law::Lgpd);
        assert_eq!(" MROSC ".parse::<Law>().unwrap(), Law::Mrosc);
        assert!("LEI".parse::<Law>().is_err());
    }

    #[test]
    fn detect_law_from_file_stem() {
        assert_eq!(Law::detect_in("Sao_LAI"), Some(Law::Lai));
        assert_eq!(Law::detect_in("recife_lgpd"), Some(Law::Lgpd));
        assert_eq!(Law::detect_in("Manaus_LGD"), Some(Law::Lgd));
        assert_eq!(Law::detect_in("relatorio"), None);
    }

    #[test]
    fn territory_cells() {
        assert_eq!(TerritoryType::parse_cell("Capital"), Some(TerritoryType::Capital));
        assert_eq!(TerritoryType::parse_cell(" estados "), Some(TerritoryType::Estado));
        assert_eq!(TerritoryType::parse_cell("municipio"), None);
        assert_eq!(TerritoryType::Estado.dir_name(), "estado");
    }
}
