/// Billing Code Catalog
///
/// The catalog is a fixed, read-only reference table of billing codes grouped
/// by coding system. Tables are plain `'static` slices so iteration order is
/// declaration order: systems in the order they are declared, codes in the
/// order they appear within their system.

mod data;

use std::fmt;
use std::str::FromStr;

use data::BUILTIN;

/// Medical coding standard. Each system has its own independent code namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeSystem {
    Cpt,
    Icd10,
    Hcpcs,
}

impl CodeSystem {
    /// All systems in declaration order.
    pub const ALL: [CodeSystem; 3] = [CodeSystem::Cpt, CodeSystem::Icd10, CodeSystem::Hcpcs];

    /// Wire name used in tool arguments and formatted output.
    pub fn as_str(self) -> &'static str {
        match self {
            CodeSystem::Cpt => "CPT",
            CodeSystem::Icd10 => "ICD10",
            CodeSystem::Hcpcs => "HCPCS",
        }
    }
}

impl fmt::Display for CodeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeSystem {
    type Err = UnknownCodeSystem;

    /// Exact, case-sensitive match on the wire name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CodeSystem::ALL
            .into_iter()
            .find(|system| system.as_str() == s)
            .ok_or_else(|| UnknownCodeSystem(s.to_string()))
    }
}

/// Returned when a string does not name a known coding system.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown code system: {0}")]
pub struct UnknownCodeSystem(pub String);

/// Reference data for a single billing code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRecord {
    pub description: &'static str,
    pub category: &'static str,
    /// Only populated for some systems; absence is expected.
    pub typical_reimbursement: Option<&'static str>,
}

/// Ordered code table for one system.
pub type CodeTable = &'static [(&'static str, CodeRecord)];

/// Which systems a search visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemFilter {
    #[default]
    All,
    Only(CodeSystem),
}

impl SystemFilter {
    /// Parse a `code_type` search argument. `ALL` selects every system.
    ///
    /// Returns `None` for values outside `CPT|ICD10|HCPCS|ALL`.
    pub fn parse(value: &str) -> Option<Self> {
        if value == "ALL" {
            return Some(SystemFilter::All);
        }
        value.parse().ok().map(SystemFilter::Only)
    }

    fn includes(self, system: CodeSystem) -> bool {
        match self {
            SystemFilter::All => true,
            SystemFilter::Only(only) => only == system,
        }
    }
}

/// One search match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub system: CodeSystem,
    pub code: &'static str,
    pub record: &'static CodeRecord,
}

/// Immutable mapping of code system to its ordered code table.
#[derive(Debug)]
pub struct Catalog {
    tables: &'static [(CodeSystem, CodeTable)],
}

impl Catalog {
    pub const fn new(tables: &'static [(CodeSystem, CodeTable)]) -> Self {
        Self { tables }
    }

    /// The built-in sample catalog shared by every tool.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Systems in declaration order.
    pub fn systems(&self) -> impl Iterator<Item = CodeSystem> + '_ {
        self.tables.iter().map(|(system, _)| *system)
    }

    /// Ordered entries for one system (empty if the system has no table).
    pub fn entries(&self, system: CodeSystem) -> CodeTable {
        self.tables
            .iter()
            .find(|(s, _)| *s == system)
            .map(|(_, table)| *table)
            .unwrap_or(&[])
    }

    /// Total number of codes across all systems.
    pub fn len(&self) -> usize {
        self.tables.iter().map(|(_, table)| table.len()).sum()
    }

    /// Exact lookup. Codes are matched literally and case-sensitively.
    pub fn get(&self, system: CodeSystem, code: &str) -> Option<&'static CodeRecord> {
        self.entries(system)
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, record)| record)
    }

    /// Case-insensitive substring search over descriptions.
    ///
    /// Hits come back in catalog order: system declaration order, then code
    /// order within each system.
    pub fn search(&self, keyword: &str, filter: SystemFilter) -> Vec<SearchHit> {
        let needle = keyword.to_lowercase();
        self.tables
            .iter()
            .filter(|(system, _)| filter.includes(*system))
            .flat_map(|&(system, table)| {
                table.iter().map(move |(code, record)| SearchHit {
                    system,
                    code: *code,
                    record,
                })
            })
            .filter(|hit| hit.record.description.to_lowercase().contains(&needle))
            .collect()
    }
}
