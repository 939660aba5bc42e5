pub mod bond_sheet;
pub mod statement_text;
