//! movs-core: data model, locale parsing and error taxonomy shared by the
//! statement ingest and analysis crates.

pub mod amount;
pub mod error;
pub mod header;
pub mod ledger;
pub mod movement;
pub mod source;
pub mod tag;

pub use error::{LoadError, ParseError};
pub use header::Header;
pub use ledger::{Ledger, source_stem};
pub use movement::{Movement, TaggedMovement};
pub use source::{ContentProvider, FsProvider, MemoryProvider};
pub use tag::Tag;
