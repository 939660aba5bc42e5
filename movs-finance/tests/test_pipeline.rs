use chrono::NaiveDate;
use movs_core::{LoadError, MemoryProvider, Tag};
use movs_finance::{AggregateOptions, RuleTable, aggregate, tag, validate, validate_at};
use movs_ingest::{load, load_and_merge};
use rust_decimal::Decimal;

const BALANCED: &str = "\
Da: (gg/mm/aaaa) 01/01/2021
A: (gg/mm/aaaa) 31/03/2021
Tipo: Conto BancoPosta
Conto BancoPosta n.: 000012345678
Intestato a: MARIO ROSSI
Saldo al: 31/03/2021
Saldo contabile: +1.000,00 Euro
Saldo disponibile: +1.000,00 Euro

Data Contabile;Data Valuta;Addebiti (euro);Accrediti (euro);Descrizione operazioni
01/03/2021;01/03/2021;;700,00;BONIFICO SEPA RICEVUTO
01/02/2021;01/02/2021;200,00;;COMMISSIONI CONTO
01/01/2021;01/01/2021;;500,00;ACCREDITO STIPENDIO
";

const OLDER: &str = "\
Saldo contabile: -12,50 Euro
Saldo disponibile: -12,50 Euro
Data Contabile;Data Valuta;Addebiti (euro);Accrediti (euro);Descrizione operazioni
20/12/2020;20/12/2020;12,50;;MCDONALD'S VIMERCATE VIMERCATE
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn provider() -> MemoryProvider {
    MemoryProvider::new()
        .with_source("data/BPOL_2021.txt", BALANCED)
        .with_source("data/BPOL_2020.txt", OLDER)
}

#[test]
fn test_balanced_statement_validates() {
    let (header, ledger) = load(&provider(), "data/BPOL_2021.txt").unwrap();
    let (ok, diagnostics) = validate(&header, &ledger);
    assert!(ok, "{diagnostics:?}");
    assert!(diagnostics.is_empty());

    let report = validate_at(&header, &ledger, date(2021, 4, 30));
    assert_eq!(report.days_since_balance, Some(30));
}

#[test]
fn test_edited_statement_reports_delta() {
    let edited = BALANCED.replace(";;700,00;", ";;600,00;");
    let provider = MemoryProvider::new().with_source("edited.txt", edited);
    let (header, ledger) = load(&provider, "edited.txt").unwrap();
    let (ok, diagnostics) = validate(&header, &ledger);
    assert!(!ok);
    assert!(diagnostics.iter().any(|l| l == "Δ = 100.00"), "{diagnostics:?}");
}

#[test]
fn test_merged_sources_flow_through_tag_and_aggregate() {
    let ledger = load_and_merge(&provider(), &["data/BPOL_2021.txt", "data/BPOL_2020.txt"]).unwrap();
    assert_eq!(ledger.name, "BPOL_2021&BPOL_2020");
    assert_eq!(ledger.len(), 4);
    assert_eq!(ledger.movements[3].accounting_date, date(2020, 12, 20));

    let tagged = tag(&ledger);
    assert!(tagged[0].has(Tag::Income) && tagged[0].has(Tag::Transfer));
    assert!(tagged[1].has(Tag::Fees));
    assert!(tagged[3].has(Tag::LunchVimercate));
    assert_eq!(tag(&ledger), RuleTable::builtin().tag(&ledger));

    let result = aggregate(&ledger, &AggregateOptions::new(date(2021, 6, 1)));
    let total: Decimal = "987.50".parse().unwrap();
    assert_eq!(result.running.last().unwrap().value, total);
    assert_eq!(result.by_year.len(), 2);
    assert_eq!(result.by_year[0].sum, "-12.50".parse::<Decimal>().unwrap());
    assert_eq!(result.overlays.len(), 2);
    assert_eq!(result.by_month.len(), 24);
}

#[test]
fn test_missing_source_is_io_error() {
    let err = load(&provider(), "nowhere.txt").unwrap_err();
    assert_eq!(err.source_id(), "nowhere.txt");
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn test_statement_without_movements_is_empty_input() {
    let provider = MemoryProvider::new().with_source(
        "empty.txt",
        "Saldo contabile: 0,00\nSaldo disponibile: 0,00\nData Contabile;Data Valuta;Addebiti;Accrediti;Descrizione\n",
    );
    let err = load(&provider, "empty.txt").unwrap_err();
    assert!(err.is_empty_input());
}

#[test]
fn test_user_rule_table_from_toml() {
    let table: RuleTable = toml::from_str(
        r#"
[[rules]]
kind = "prefix"
pattern = "COMMISSIONI"
tags = ["FEES", "BILLS"]

[[rules]]
kind = "all_of"
patterns = ["BONIFICO", "RICEVUTO"]
tags = ["TRANSFER"]

[[rules]]
kind = "shape"
credit_present = true
tags = ["INCOME"]
"#,
    )
    .unwrap();
    assert_eq!(table.rules.len(), 3);

    let (_, ledger) = load(&provider(), "data/BPOL_2021.txt").unwrap();
    let tagged = table.tag(&ledger);
    assert_eq!(tagged[0].tag_list(), "INCOME,TRANSFER");
    assert_eq!(tagged[1].tag_list(), "FEES,BILLS");
    assert_eq!(tagged[2].tag_list(), "INCOME");
}
