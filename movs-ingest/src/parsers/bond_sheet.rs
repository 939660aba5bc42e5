//! Postal bond ("buoni postali") workbook parser.
//!
//! Each instrument row becomes two synthetic movements: the subscription
//! (debit of the nominal value) and the redemption (credit of the net
//! redemption value at maturity). Consumed columns, 1-indexed:
//!   2 tipologia, 6 valore rimborso netto, 10 data sottoscrizione,
//!   11 valore nominale, 12 scadenza, 13 serie, 14 regolato su

use calamine::{Data, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use movs_core::amount::{
    FormatError, check_amount_range, parse_currency_cell, parse_date_dotted, parse_date_slashed,
};
use movs_core::{Header, Ledger, LoadError, Movement, ParseError, source_stem};
use rust_decimal::Decimal;
use std::io::Cursor;
use tracing::debug;

pub const SHEET_NAME: &str = "RPOL_PatrimonioBuoni";
/// First and last data rows, 1-indexed and inclusive.
pub const FIRST_ROW: u32 = 2;
pub const LAST_ROW: u32 = 999;
pub const ACCOUNT_TYPE: &str = "buoni postali";

#[derive(Debug, Clone, Copy)]
struct Column {
    name: &'static str,
    /// 0-based index into the sheet.
    index: u32,
}

const TIPOLOGIA: Column = Column { name: "tipologia", index: 1 };
const RIMBORSO_NETTO: Column = Column { name: "valore_rimborso_netto", index: 5 };
const SOTTOSCRIZIONE: Column = Column { name: "data_sottoscrizione", index: 9 };
const NOMINALE: Column = Column { name: "valore_nominale", index: 10 };
const SCADENZA: Column = Column { name: "scadenza", index: 11 };
const SERIE: Column = Column { name: "serie", index: 12 };
const REGOLATO_SU: Column = Column { name: "regolato_su", index: 13 };

const CONSUMED: [Column; 7] = [
    TIPOLOGIA,
    RIMBORSO_NETTO,
    SOTTOSCRIZIONE,
    NOMINALE,
    SCADENZA,
    SERIE,
    REGOLATO_SU,
];

static EMPTY: Data = Data::Empty;

/// One data row of the bond sheet.
struct Row<'a> {
    source_id: &'a str,
    range: &'a Range<Data>,
    /// 0-based sheet row.
    index: u32,
}

impl Row<'_> {
    fn cell(&self, column: Column) -> &Data {
        self.range.get_value((self.index, column.index)).unwrap_or(&EMPTY)
    }

    fn is_blank(&self) -> bool {
        CONSUMED.iter().all(|c| matches!(self.cell(*c), Data::Empty))
    }

    fn mismatch(&self, column: Column, expected: &'static str) -> LoadError {
        LoadError::TypeMismatch {
            source_id: self.source_id.to_string(),
            column: column.name.to_string(),
            row: self.index as usize + 1,
            expected,
            found: cell_kind(self.cell(column)).to_string(),
        }
    }

    fn malformed(&self, column: Column, err: FormatError) -> LoadError {
        LoadError::parse(
            self.source_id,
            ParseError::line(self.index as usize + 1, format!("column `{}`: {err}", column.name)),
        )
    }

    fn text(&self, column: Column) -> Result<String, LoadError> {
        match self.cell(column) {
            Data::String(s) => Ok(s.trim().to_string()),
            _ => Err(self.mismatch(column, "string")),
        }
    }

    fn money(&self, column: Column) -> Result<Decimal, LoadError> {
        match self.cell(column) {
            Data::String(s) => parse_currency_cell(s).map_err(|e| self.malformed(column, e)),
            Data::Int(i) => {
                check_amount_range(Decimal::from(*i)).map_err(|e| self.malformed(column, e))
            }
            Data::Float(f) => Decimal::try_from(*f)
                .map(|d| d.round_dp(2))
                .map_err(|_| self.mismatch(column, "finite number"))
                .and_then(|d| check_amount_range(d).map_err(|e| self.malformed(column, e))),
            _ => Err(self.mismatch(column, "string or number")),
        }
    }

    fn date(
        &self,
        column: Column,
        parse: fn(&str) -> Result<NaiveDate, FormatError>,
    ) -> Result<NaiveDate, LoadError> {
        match self.cell(column) {
            Data::String(s) => parse(s).map_err(|e| self.malformed(column, e)),
            Data::DateTime(dt) => {
                excel_serial_to_date(dt.as_f64()).ok_or_else(|| self.mismatch(column, "date"))
            }
            Data::DateTimeIso(s) => s
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                .ok_or_else(|| self.mismatch(column, "date")),
            _ => Err(self.mismatch(column, "string or date")),
        }
    }

    /// Subscription and redemption movements for this instrument.
    fn movements(&self) -> Result<[Movement; 2], LoadError> {
        let tipologia = self.text(TIPOLOGIA)?;
        let rimborso_netto = self.money(RIMBORSO_NETTO)?;
        // the subscription cell may carry a time after the date
        let sottoscrizione = self.date(SOTTOSCRIZIONE, |s| {
            let s = s.trim();
            parse_date_slashed(s.get(..10).unwrap_or(s))
        })?;
        let nominale = self.money(NOMINALE)?;
        let scadenza = self.date(SCADENZA, parse_date_dotted)?;
        let serie = self.text(SERIE)?;
        let regolato_su = self.text(REGOLATO_SU)?;

        let suffix = format!("{tipologia},{serie},{regolato_su}");
        Ok([
            Movement::debit(
                sottoscrizione,
                sottoscrizione,
                nominale,
                format!("sottoscrizione {suffix}"),
            ),
            Movement::credit(
                scadenza,
                scadenza,
                rimborso_netto,
                format!("rimborso {suffix}"),
            ),
        ])
    }
}

fn cell_kind(cell: &Data) -> &'static str {
    match cell {
        Data::Empty => "empty cell",
        Data::String(_) => "string",
        Data::Int(_) | Data::Float(_) => "number",
        Data::Bool(_) => "boolean",
        Data::DateTime(_) | Data::DateTimeIso(_) => "date",
        Data::DurationIso(_) => "duration",
        Data::Error(_) => "error cell",
    }
}

/// Excel serial date, 1899-12-30 based.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::try_days(serial.floor() as i64)?)
}

/// Parse the bond sheet of an already opened workbook.
///
/// Rows past the used area are not visited; fully blank rows are skipped.
pub fn parse_bond_range(source_id: &str, range: &Range<Data>) -> Result<(Header, Ledger), LoadError> {
    let mut movements = Vec::new();

    if let Some((last_used, _)) = range.end() {
        let last = last_used.min(LAST_ROW - 1);
        for index in (FIRST_ROW - 1)..=last {
            let row = Row {
                source_id,
                range,
                index,
            };
            if row.is_blank() {
                continue;
            }
            movements.extend(row.movements()?);
        }
    }

    if movements.is_empty() {
        return Err(LoadError::EmptyInput {
            source_id: source_id.to_string(),
        });
    }

    movements.sort_by(|a, b| b.accounting_date.cmp(&a.accounting_date));
    let total: Decimal = movements.iter().map(Movement::signed_amount).sum();

    debug!(source_id, movements = movements.len(), %total, "parsed bond sheet");
    Ok((
        Header::synthetic(ACCOUNT_TYPE, total),
        Ledger::new(source_stem(source_id), movements),
    ))
}

/// Open an xlsx workbook from raw bytes and parse its bond sheet.
pub fn parse_bond_workbook(source_id: &str, bytes: &[u8]) -> Result<(Header, Ledger), LoadError> {
    let workbook_error = |reason: String| LoadError::Workbook {
        source_id: source_id.to_string(),
        reason,
    };

    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| workbook_error(e.to_string()))?;

    if !workbook.sheet_names().iter().any(|name| name == SHEET_NAME) {
        return Err(LoadError::SheetNotFound {
            source_id: source_id.to_string(),
            sheet: SHEET_NAME.to_string(),
        });
    }

    let range = workbook
        .worksheet_range(SHEET_NAME)
        .map_err(|e| workbook_error(e.to_string()))?;
    parse_bond_range(source_id, &range)
}
