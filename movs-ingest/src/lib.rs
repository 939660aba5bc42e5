//! movs-ingest: statement loading. Dispatches each source to the text or
//! workbook parser and merges several sources into one ledger.

pub mod parsers;

use movs_core::{ContentProvider, Header, Ledger, LoadError};
use std::path::Path;
use tracing::info;

pub use parsers::bond_sheet::{parse_bond_range, parse_bond_workbook};
pub use parsers::statement_text::{decode_statement, parse_statement_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Fixed-layout text export.
    Statement,
    /// Bond/deposit xlsx export.
    BondWorkbook,
}

impl SourceKind {
    /// Pick the parser from the source id's extension.
    pub fn detect(source_id: &str) -> Self {
        let ext = Path::new(source_id)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        match ext.as_deref() {
            Some("xlsx" | "xlsm") => SourceKind::BondWorkbook,
            _ => SourceKind::Statement,
        }
    }
}

/// Read and parse one source. Any error aborts the whole source.
pub fn load(provider: &dyn ContentProvider, source_id: &str) -> Result<(Header, Ledger), LoadError> {
    let bytes = provider.read(source_id)?;
    let kind = SourceKind::detect(source_id);

    let (header, ledger) = match kind {
        SourceKind::Statement => parse_statement_text(source_id, &decode_statement(&bytes))?,
        SourceKind::BondWorkbook => parse_bond_workbook(source_id, &bytes)?,
    };

    info!(source_id, ?kind, movements = ledger.len(), "loaded source");
    Ok((header, ledger))
}

/// Load every source and merge them into one ledger named after all the
/// source stems joined by `&`. Headers are discarded.
pub fn load_and_merge(
    provider: &dyn ContentProvider,
    source_ids: &[impl AsRef<str>],
) -> Result<Ledger, LoadError> {
    let ledgers = source_ids
        .iter()
        .map(|id| load(provider, id.as_ref()).map(|(_, ledger)| ledger))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Ledger::merge(ledgers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use movs_core::MemoryProvider;

    const A: &str = "Saldo contabile: 10,00\nSaldo disponibile: 10,00\n02/01/2021;02/01/2021;;10,00;A\n";
    const B: &str = "Saldo contabile: -4,00\nSaldo disponibile: -4,00\n03/01/2021;03/01/2021;4,00;;B\n01/01/2021;01/01/2021;;0,00;B0\n";

    #[test]
    fn test_detect_kind() {
        assert_eq!(SourceKind::detect("x/buoni.xlsx"), SourceKind::BondWorkbook);
        assert_eq!(SourceKind::detect("BUONI.XLSX"), SourceKind::BondWorkbook);
        assert_eq!(SourceKind::detect("bpol.txt"), SourceKind::Statement);
        assert_eq!(SourceKind::detect("noext"), SourceKind::Statement);
    }

    #[test]
    fn test_load_text_source() {
        let provider = MemoryProvider::new().with_source("dir/a.txt", A);
        let (header, ledger) = load(&provider, "dir/a.txt").unwrap();
        assert_eq!(ledger.name, "a");
        assert_eq!(header.accounting_balance.to_string(), "10.00");
    }

    #[test]
    fn test_load_and_merge() {
        let provider = MemoryProvider::new()
            .with_source("a.txt", A)
            .with_source("b.txt", B);
        let merged = load_and_merge(&provider, &["a.txt", "b.txt"]).unwrap();
        assert_eq!(merged.name, "a&b");
        let descs: Vec<_> = merged.movements.iter().map(|m| m.description.as_str()).collect();
        assert_eq!(descs, vec!["B", "A", "B0"]);
    }

    fn bond_workbook(sheet_name: &str) -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name).unwrap();
        let row = [
            (1, "BFP"),
            (5, "€220,00"),
            (9, "02/01/2020"),
            (10, "€200,00"),
            (11, "02.01.2030"),
            (12, "TF1"),
            (13, "LIBRETTO"),
        ];
        for (col, value) in row {
            sheet.write_string(1, col, value).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_load_dispatches_xlsx_to_bond_parser() {
        let provider = MemoryProvider::new()
            .with_source("data/buoni.xlsx", bond_workbook(parsers::bond_sheet::SHEET_NAME))
            .with_source("data/altro.xlsx", bond_workbook("Foglio1"));

        let (header, ledger) = load(&provider, "data/buoni.xlsx").unwrap();
        assert_eq!(ledger.name, "buoni");
        assert_eq!(ledger.len(), 2);
        assert_eq!(header.available_balance.to_string(), "20.00");

        let err = load(&provider, "data/altro.xlsx").unwrap_err();
        assert!(matches!(err, LoadError::SheetNotFound { .. }), "{err:?}");
    }

    #[test]
    fn test_load_and_merge_is_all_or_nothing() {
        let provider = MemoryProvider::new().with_source("a.txt", A);
        let err = load_and_merge(&provider, &["a.txt", "missing.txt"]).unwrap_err();
        assert_eq!(err.source_id(), "missing.txt");
    }
}
