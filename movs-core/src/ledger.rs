//! Named, ordered collections of movements and their merge.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::movement::Movement;

/// A named sequence of movements. Consumers read it and derive new values;
/// nothing in the workspace mutates a ledger once it has been handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub name: String,
    pub movements: Vec<Movement>,
}

impl Ledger {
    pub fn new(name: impl Into<String>, movements: Vec<Movement>) -> Self {
        Self {
            name: name.into(),
            movements,
        }
    }

    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Concatenate several ledgers into one, sorted by accounting date
    /// descending. The sort is stable, so movements sharing a date keep
    /// their input order. Overlapping movements are not deduplicated.
    pub fn merge(ledgers: impl IntoIterator<Item = Ledger>) -> Ledger {
        let mut names = Vec::new();
        let mut movements = Vec::new();
        for ledger in ledgers {
            names.push(ledger.name);
            movements.extend(ledger.movements);
        }
        movements.sort_by(|a, b| b.accounting_date.cmp(&a.accounting_date));

        let merged = Ledger::new(names.join("&"), movements);
        info!(name = %merged.name, movements = merged.len(), "merged ledgers");
        merged
    }
}

/// File stem of a source identifier, used as ledger name
/// (`/data/BPOL_2021.txt` -> `BPOL_2021`).
pub fn source_stem(source_id: &str) -> String {
    Path::new(source_id)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_id.to_string())
}
