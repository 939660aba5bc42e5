//! Category tags attached to movements by rule matching.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    Income,
    Transfer,
    Fees,
    Motorway,
    Bills,
    Electricity,
    Phone,
    Gas,
    Groceries,
    PrepaidTopUp,
    Condominium,
    Laundry,
    Savings,
    Passbook,
    CoffeeMachine,
    Transport,
    Delivery,
    LunchVimercate,
    Fuel,
}

impl Tag {
    pub const ALL: [Tag; 19] = [
        Tag::Income,
        Tag::Transfer,
        Tag::Fees,
        Tag::Motorway,
        Tag::Bills,
        Tag::Electricity,
        Tag::Phone,
        Tag::Gas,
        Tag::Groceries,
        Tag::PrepaidTopUp,
        Tag::Condominium,
        Tag::Laundry,
        Tag::Savings,
        Tag::Passbook,
        Tag::CoffeeMachine,
        Tag::Transport,
        Tag::Delivery,
        Tag::LunchVimercate,
        Tag::Fuel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Income => "INCOME",
            Tag::Transfer => "TRANSFER",
            Tag::Fees => "FEES",
            Tag::Motorway => "MOTORWAY",
            Tag::Bills => "BILLS",
            Tag::Electricity => "ELECTRICITY",
            Tag::Phone => "PHONE",
            Tag::Gas => "GAS",
            Tag::Groceries => "GROCERIES",
            Tag::PrepaidTopUp => "PREPAID_TOP_UP",
            Tag::Condominium => "CONDOMINIUM",
            Tag::Laundry => "LAUNDRY",
            Tag::Savings => "SAVINGS",
            Tag::Passbook => "PASSBOOK",
            Tag::CoffeeMachine => "COFFEE_MACHINE",
            Tag::Transport => "TRANSPORT",
            Tag::Delivery => "DELIVERY",
            Tag::LunchVimercate => "LUNCH_VIMERCATE",
            Tag::Fuel => "FUEL",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
