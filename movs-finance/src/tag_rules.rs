//! Deterministic tag rules mapping movement descriptions to category tags.
//!
//! Every rule in the table is evaluated against every movement and the
//! matching tags are unioned, so a movement may carry several tags and the
//! order of the table never changes the result.

use movs_core::{Ledger, Movement, Tag, TaggedMovement};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One entry of the rule table. Pattern matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Matches on the movement's direction alone.
    Shape { credit_present: bool, tags: Vec<Tag> },
    /// Description contains `pattern`; with `credit_only`, only credits match.
    Contains {
        pattern: String,
        #[serde(default)]
        credit_only: bool,
        tags: Vec<Tag>,
    },
    /// Description starts with `pattern`.
    Prefix { pattern: String, tags: Vec<Tag> },
    /// Description contains every one of `patterns`. An empty list never
    /// matches.
    AllOf { patterns: Vec<String>, tags: Vec<Tag> },
}

impl Rule {
    pub fn contains(pattern: &str, tags: &[Tag]) -> Self {
        Rule::Contains {
            pattern: pattern.to_string(),
            credit_only: false,
            tags: tags.to_vec(),
        }
    }

    pub fn prefix(pattern: &str, tags: &[Tag]) -> Self {
        Rule::Prefix {
            pattern: pattern.to_string(),
            tags: tags.to_vec(),
        }
    }

    pub fn all_of(patterns: &[&str], tags: &[Tag]) -> Self {
        Rule::AllOf {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            tags: tags.to_vec(),
        }
    }

    pub fn matches(&self, movement: &Movement) -> bool {
        let desc = movement.description.as_str();
        match self {
            Rule::Shape { credit_present, .. } => movement.is_credit() == *credit_present,
            Rule::Contains {
                pattern,
                credit_only,
                ..
            } => (!credit_only || movement.is_credit()) && desc.contains(pattern.as_str()),
            Rule::Prefix { pattern, .. } => desc.starts_with(pattern.as_str()),
            Rule::AllOf { patterns, .. } => {
                !patterns.is_empty() && patterns.iter().all(|p| desc.contains(p.as_str()))
            }
        }
    }

    pub fn tags(&self) -> &[Tag] {
        match self {
            Rule::Shape { tags, .. }
            | Rule::Contains { tags, .. }
            | Rule::Prefix { tags, .. }
            | Rule::AllOf { tags, .. } => tags,
        }
    }
}

/// An ordered list of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    pub rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Tags for a single movement: the union over all matching rules.
    pub fn tags_for(&self, movement: &Movement) -> BTreeSet<Tag> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(movement))
            .flat_map(|rule| rule.tags().iter().copied())
            .collect()
    }

    /// Tag every movement of the ledger, preserving its order.
    pub fn tag(&self, ledger: &Ledger) -> Vec<TaggedMovement> {
        ledger
            .movements
            .iter()
            .map(|movement| TaggedMovement {
                movement: movement.clone(),
                tags: self.tags_for(movement),
            })
            .collect()
    }

    /// The built-in table for BancoPosta statements.
    pub fn builtin() -> Self {
        use Tag::*;

        let mut rules = vec![
            Rule::Shape {
                credit_present: true,
                tags: vec![Income],
            },
            Rule::Contains {
                pattern: "BONIFICO SEPA".to_string(),
                credit_only: true,
                tags: vec![Transfer],
            },
        ];

        // Fees and charges
        for p in ["COMMISSIONI", "CANONE", "IMPOSTA DI BOLLO"] {
            rules.push(Rule::prefix(p, &[Fees]));
        }

        // Utilities and services
        rules.push(Rule::contains("AUTOSTRADA", &[Motorway]));
        rules.push(Rule::contains("ENEL ENERGIA", &[Bills, Electricity]));
        rules.push(Rule::contains("Wind Tre S.p.A.", &[Bills, Phone]));
        rules.push(Rule::contains("WIND TRE S P A", &[Bills, Phone]));
        rules.push(Rule::contains("SORGENIA S P A", &[Bills, Gas]));
        rules.push(Rule::contains("FASTWEB", &[Bills, Phone]));

        for p in ["ESSELUNGA", "EUROSPIN", "IPERCOOP", "SUPERMERCATO", "IL GIGANTE", "ALDI"] {
            rules.push(Rule::contains(p, &[Groceries]));
        }

        rules.push(Rule::contains("RICARICA POSTEPAY", &[PrepaidTopUp]));

        for p in [
            "STUDIO RAG. ANDREA IANNUZZI",
            "Gestione ordinaria",
            "-CMAV-",
            "ORDINARIA",
            "anticipata",
            "RIFACIMENTO IMPIANTO VIDEOCITOF",
            "ANTICIPATA",
            "TINTEGGIATURA SCALE",
            "BENEF BANCA DI CREDITO COOPERATIVO PER CAUSALE",
            "per Ordinaria",
            "PER Ordinaria",
            "PER gestione ordinaria",
            "ordinaria",
            "BENEF Banca di credito cooperativo PER",
        ] {
            rules.push(Rule::contains(p, &[Condominium]));
        }

        rules.push(Rule::contains("1 H CLEAN DI ROZZA GIU", &[Laundry]));
        rules.push(Rule::contains("000053361801", &[Savings, Passbook]));
        rules.push(Rule::contains("COFFEE CAPP", &[CoffeeMachine]));

        for p in ["ATM MILAN", "TRENORD", "TRENITALIA", "AZIENDATRAS"] {
            rules.push(Rule::contains(p, &[Transport]));
        }
        rules.push(Rule::contains("DELIVEROO", &[Delivery]));

        // Merchants that only count as lunch near the office in Vimercate
        for merchant in [
            "MCDONALD'S VIMERCATE",
            "PELLEGRINI SPA C/O ALC",
            "UAGLIO'-V.TORRIBIANCH",
            "CIOCCOLATI ITALIANI",
            "CLAVERA VIMERCATE",
            "PAN B SRL",
            "GRUPPO NEGOZI SRL",
            "HAMBU VIMERCATE",
            "PAGAMENTO POS MAMMA' ROSA",
            "PAGAMENTO POS OLD WILD WEST",
        ] {
            rules.push(Rule::all_of(&[merchant, "VIMERCATE"], &[LunchVimercate]));
        }
        rules.push(Rule::all_of(&["PAGAMENTO POS 45592 CASTELNUOVO DEL"], &[Fuel]));

        Self::new(rules)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Tag a ledger with the built-in table.
pub fn tag(ledger: &Ledger) -> Vec<TaggedMovement> {
    RuleTable::builtin().tag(ledger)
}
