//! BancoPosta-style text statement parser.
//!
//! Expected layout after decoding:
//!   Da: (gg/mm/aaaa) 01/01/2021
//!   A: (gg/mm/aaaa) 31/03/2021
//!   Tipo: Conto BancoPosta
//!   Conto BancoPosta n.: 000012345678
//!   Intestato a: MARIO ROSSI
//!   Saldo al: 31/03/2021
//!   Saldo contabile: +1.000,00 Euro
//!   Saldo disponibile: +1.000,00 Euro
//!
//!   Data Contabile;Data Valuta;Addebiti (euro);Accrediti (euro);Descrizione operazioni
//!   01/03/2021;01/03/2021;;1.000,00;BONIFICO SEPA RICEVUTO

use chrono::NaiveDate;
use encoding_rs::WINDOWS_1252;
use movs_core::amount::{parse_date_slashed, parse_locale_decimal, parse_signed_amount};
use movs_core::{Header, Ledger, LoadError, Movement, ParseError, source_stem};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;
use tracing::{debug, warn};

static HEADER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<label>[^:;]+?)\s*:\s*(?P<value>.*?)\s*$").expect("valid header regex")
});
static MOVEMENT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{1,2}/\d{1,2}/\d{4}\s*;").expect("valid movement regex"));
static DATE_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\s*gg/mm/aaaa\s*\)\s*").expect("valid hint regex"));

const TABLE_TITLE: &str = "data contabile";
const FIELDS_PER_LINE: usize = 5;

/// Known header labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderField {
    PeriodStart,
    PeriodEnd,
    AccountType,
    AccountNumber,
    Holder,
    BalanceAsOf,
    AccountingBalance,
    AvailableBalance,
}

impl HeaderField {
    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().trim_end_matches('.').to_lowercase();
        let field = match label.as_str() {
            "da" => HeaderField::PeriodStart,
            "a" => HeaderField::PeriodEnd,
            "tipo" => HeaderField::AccountType,
            "conto" | "numero conto" | "conto bancoposta" | "conto bancoposta n" => {
                HeaderField::AccountNumber
            }
            "intestato a" => HeaderField::Holder,
            "saldo al" => HeaderField::BalanceAsOf,
            "saldo contabile" => HeaderField::AccountingBalance,
            "saldo disponibile" => HeaderField::AvailableBalance,
            _ => return None,
        };
        Some(field)
    }

    fn label(&self) -> &'static str {
        match self {
            HeaderField::PeriodStart => "Da",
            HeaderField::PeriodEnd => "A",
            HeaderField::AccountType => "Tipo",
            HeaderField::AccountNumber => "Conto",
            HeaderField::Holder => "Intestato a",
            HeaderField::BalanceAsOf => "Saldo al",
            HeaderField::AccountingBalance => "Saldo contabile",
            HeaderField::AvailableBalance => "Saldo disponibile",
        }
    }
}

#[derive(Debug, Default)]
struct HeaderBuilder {
    period_start: Option<NaiveDate>,
    period_end: Option<NaiveDate>,
    account_type: String,
    account_number: String,
    holder: String,
    balance_as_of: Option<NaiveDate>,
    accounting_balance: Option<Decimal>,
    available_balance: Option<Decimal>,
}

impl HeaderBuilder {
    fn set(&mut self, field: HeaderField, value: &str) -> Result<(), ParseError> {
        match field {
            HeaderField::PeriodStart => self.period_start = optional_date(field, value)?,
            HeaderField::PeriodEnd => self.period_end = optional_date(field, value)?,
            HeaderField::BalanceAsOf => self.balance_as_of = optional_date(field, value)?,
            HeaderField::AccountType => self.account_type = value.to_string(),
            HeaderField::AccountNumber => self.account_number = value.to_string(),
            HeaderField::Holder => self.holder = value.to_string(),
            HeaderField::AccountingBalance => self.accounting_balance = Some(balance(field, value)?),
            HeaderField::AvailableBalance => self.available_balance = Some(balance(field, value)?),
        }
        Ok(())
    }

    fn build(self) -> Result<Header, ParseError> {
        let missing = |field: HeaderField| ParseError::MissingField {
            field: field.label().to_string(),
        };
        Ok(Header {
            period_start: self.period_start,
            period_end: self.period_end,
            account_type: self.account_type,
            account_number: self.account_number,
            holder: self.holder,
            balance_as_of: self.balance_as_of,
            accounting_balance: self
                .accounting_balance
                .ok_or_else(|| missing(HeaderField::AccountingBalance))?,
            available_balance: self
                .available_balance
                .ok_or_else(|| missing(HeaderField::AvailableBalance))?,
        })
    }
}

fn optional_date(field: HeaderField, value: &str) -> Result<Option<NaiveDate>, ParseError> {
    let value = DATE_HINT.replace(value, "");
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse_date_slashed(value)
        .map(Some)
        .map_err(|e| ParseError::field(field.label(), value, e.to_string()))
}

fn balance(field: HeaderField, value: &str) -> Result<Decimal, ParseError> {
    parse_signed_amount(value).map_err(|e| ParseError::field(field.label(), value, e.to_string()))
}

/// Decode raw export bytes: UTF-8 (BOM stripped) when valid, Windows-1252
/// otherwise.
pub fn decode_statement(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    let (decoded, _, _) = WINDOWS_1252.decode(bytes);
    decoded.into_owned()
}

/// Parse one movement line. `line_no` is 1-based and only used for errors.
fn parse_movement_line(line: &str, line_no: usize) -> Result<Movement, ParseError> {
    let fields: Vec<&str> = line.splitn(FIELDS_PER_LINE, ';').collect();
    if fields.len() != FIELDS_PER_LINE {
        return Err(ParseError::line(
            line_no,
            format!(
                "expected {FIELDS_PER_LINE} `;`-separated fields, found {}",
                fields.len()
            ),
        ));
    }

    let date = |raw: &str, what: &str| {
        parse_date_slashed(raw).map_err(|e| ParseError::line(line_no, format!("{what} {raw:?}: {e}")))
    };
    let amount = |raw: &str, what: &str| -> Result<Option<Decimal>, ParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        parse_locale_decimal(raw)
            .map(Some)
            .map_err(|e| ParseError::line(line_no, format!("{what} {raw:?}: {e}")))
    };

    let accounting_date = date(fields[0], "accounting date")?;
    let value_date = date(fields[1], "value date")?;
    let debit = amount(fields[2], "debit")?;
    let credit = amount(fields[3], "credit")?;
    if debit.is_some() && credit.is_some() {
        return Err(ParseError::line(line_no, "both debit and credit are set"));
    }

    Ok(Movement {
        accounting_date,
        value_date,
        debit,
        credit,
        description: fields[4].trim().to_string(),
    })
}

/// Parse a whole text statement into its header and a ledger named after
/// the source's file stem. Movements keep file order.
pub fn parse_statement_text(source_id: &str, text: &str) -> Result<(Header, Ledger), LoadError> {
    let mut header = HeaderBuilder::default();
    let mut movements = Vec::new();
    let mut in_table = false;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        if !in_table {
            if line.trim_start().to_lowercase().starts_with(TABLE_TITLE) {
                in_table = true;
                continue;
            }
            if MOVEMENT_START.is_match(line) {
                in_table = true;
            } else {
                match HEADER_LINE.captures(line) {
                    Some(caps) => match HeaderField::from_label(&caps["label"]) {
                        Some(field) => header
                            .set(field, &caps["value"])
                            .map_err(|e| LoadError::parse(source_id, e))?,
                        None => debug!(source_id, line = line_no, "skipping unknown header label"),
                    },
                    None if line.contains(';') => {
                        warn!(source_id, line = line_no, "skipping unrecognized row before the movement table")
                    }
                    None => debug!(source_id, line = line_no, "skipping header line"),
                }
                continue;
            }
        }

        let movement =
            parse_movement_line(line, line_no).map_err(|e| LoadError::parse(source_id, e))?;
        movements.push(movement);
    }

    // no movements means "no data yet", whatever the header looks like
    if movements.is_empty() {
        return Err(LoadError::EmptyInput {
            source_id: source_id.to_string(),
        });
    }
    let header = header.build().map_err(|e| LoadError::parse(source_id, e))?;

    debug!(source_id, movements = movements.len(), "parsed text statement");
    Ok((header, Ledger::new(source_stem(source_id), movements)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Da: (gg/mm/aaaa) 01/01/2021
A: (gg/mm/aaaa) 31/03/2021
Tipo: Conto BancoPosta
Conto BancoPosta n.: 000012345678
Intestato a: MARIO ROSSI
Saldo al: 31/03/2021
Saldo contabile: +1.000,00 Euro
Saldo disponibile: +1.000,00 Euro

Data Contabile;Data Valuta;Addebiti (euro);Accrediti (euro);Descrizione operazioni
15/03/2021;15/03/2021;;700,00;BONIFICO SEPA RICEVUTO
10/02/2021;09/02/2021;200,00;;PAGAMENTO POS ESSELUNGA
01/01/2021;01/01/2021;;500,00;ACCREDITO; STIPENDIO
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parses_header() {
        let (header, _) = parse_statement_text("BPOL_2021.txt", SAMPLE).unwrap();
        assert_eq!(header.period_start, Some(date(2021, 1, 1)));
        assert_eq!(header.period_end, Some(date(2021, 3, 31)));
        assert_eq!(header.account_type, "Conto BancoPosta");
        assert_eq!(header.account_number, "000012345678");
        assert_eq!(header.holder, "MARIO ROSSI");
        assert_eq!(header.balance_as_of, Some(date(2021, 3, 31)));
        assert_eq!(header.accounting_balance.to_string(), "1000.00");
        assert_eq!(header.available_balance.to_string(), "1000.00");
    }

    #[test]
    fn test_parses_movements_in_file_order() {
        let (_, ledger) = parse_statement_text("/data/BPOL_2021.txt", SAMPLE).unwrap();
        assert_eq!(ledger.name, "BPOL_2021");
        assert_eq!(ledger.len(), 3);

        let first = &ledger.movements[0];
        assert_eq!(first.accounting_date, date(2021, 3, 15));
        assert_eq!(first.credit.unwrap().to_string(), "700.00");
        assert!(first.debit.is_none());

        let second = &ledger.movements[1];
        assert_eq!(second.value_date, date(2021, 2, 9));
        assert_eq!(second.debit.unwrap().to_string(), "200.00");

        // semicolons inside the description survive
        assert_eq!(ledger.movements[2].description, "ACCREDITO; STIPENDIO");
    }

    #[test]
    fn test_table_without_title_line() {
        let text = "Saldo contabile: 5,00\nSaldo disponibile: 5,00\n01/03/2021;01/03/2021;;5,00;X\n";
        let (_, ledger) = parse_statement_text("s.txt", text).unwrap();
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_thousands_separator_credit_line() {
        let m = parse_movement_line("01/03/2021;01/03/2021;;1.000,00;BONIFICO SEPA RICEVUTO", 1)
            .unwrap();
        assert_eq!(m.credit.unwrap().to_string(), "1000.00");
        assert_eq!(m.description, "BONIFICO SEPA RICEVUTO");
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let text = SAMPLE.replace("10/02/2021;09/02/2021;200,00", "10/02/2021;09/02/2021;2x0,00");
        let err = parse_statement_text("s.txt", &text).unwrap_err();
        match err {
            LoadError::Parse {
                error: ParseError::Line { line, .. },
                ..
            } => assert_eq!(line, 12),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_both_amounts_is_an_error() {
        let err = parse_movement_line("01/03/2021;01/03/2021;1,00;2,00;X", 4).unwrap_err();
        assert_eq!(err, ParseError::line(4, "both debit and credit are set"));
    }

    #[test]
    fn test_oversized_amount_is_a_line_error() {
        let line = "01/03/2021;01/03/2021;;79.228.162.514.264.337.593.543.950.335;X";
        let err = parse_movement_line(line, 3).unwrap_err();
        assert!(matches!(err, ParseError::Line { line: 3, .. }));
    }

    #[test]
    fn test_short_line_is_an_error() {
        let err = parse_movement_line("01/03/2021;01/03/2021;1,00", 9).unwrap_err();
        assert!(matches!(err, ParseError::Line { line: 9, .. }));
    }

    #[test]
    fn test_malformed_header_names_field() {
        let text = SAMPLE.replace("Saldo contabile: +1.000,00 Euro", "Saldo contabile: mille");
        let err = parse_statement_text("s.txt", &text).unwrap_err();
        match err {
            LoadError::Parse {
                error: ParseError::Field { field, .. },
                ..
            } => assert_eq!(field, "Saldo contabile"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_balance_is_reported() {
        let text = "Saldo contabile: 1,00\n01/03/2021;01/03/2021;;1,00;X\n";
        let err = parse_statement_text("s.txt", text).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse { error: ParseError::MissingField { ref field }, .. } if field == "Saldo disponibile"
        ));
    }

    #[test]
    fn test_no_movements_is_empty_input() {
        let text = "Saldo contabile: 0,00\nSaldo disponibile: 0,00\n\nData Contabile;Data Valuta;Addebiti;Accrediti;Descrizione\n";
        let err = parse_statement_text("s.txt", text).unwrap_err();
        assert!(err.is_empty_input());
    }

    #[test]
    fn test_empty_file_is_empty_input() {
        let err = parse_statement_text("new.txt", "").unwrap_err();
        assert!(err.is_empty_input(), "{err:?}");
    }

    #[test]
    fn test_title_only_file_is_empty_input_without_balances() {
        let text = "Intestato a: MARIO\nData Contabile;Data Valuta;Addebiti;Accrediti;Descrizione\n";
        let err = parse_statement_text("new.txt", text).unwrap_err();
        assert!(err.is_empty_input(), "{err:?}");
    }

    #[test]
    fn test_single_digit_day_starts_the_table() {
        let text = "Saldo contabile: 7,00\nSaldo disponibile: 7,00\n1/03/2021;1/03/2021;;7,00;X\n";
        let (_, ledger) = parse_statement_text("s.txt", text).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.movements[0].accounting_date, date(2021, 3, 1));
    }

    #[test]
    fn test_unrecognized_row_before_table_is_not_a_movement() {
        let text = "Saldo contabile: 7,00\nSaldo disponibile: 7,00\nsaldo iniziale;;;\n01/03/2021;01/03/2021;;7,00;X\n";
        let (_, ledger) = parse_statement_text("s.txt", text).unwrap();
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_decode_windows_1252() {
        // "CAFFÈ" with È encoded as 0xC8
        let bytes = b"CAFF\xC8";
        assert_eq!(decode_statement(bytes), "CAFFÈ");
    }

    #[test]
    fn test_decode_strips_bom() {
        let bytes = b"\xEF\xBB\xBFSaldo";
        assert_eq!(decode_statement(bytes), "Saldo");
    }
}
