pub mod backfill;
pub mod detail_parse;
pub mod discovery;

pub use backfill::{BackfillFlow, BackfillOutcome};
pub use detail_parse::parse_order_detail;
pub use discovery::{DiscoveryFlow, DiscoveryReport};
