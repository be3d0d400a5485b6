pub mod detail_extractor;
pub mod exporter;
pub mod listing_extractor;
pub mod money;
pub mod publisher;
pub mod tree_search;

pub use detail_extractor::{extract_order_detail, ExtractOutcome};
pub use listing_extractor::extract_order_ids;
pub use publisher::RefreshPublisher;
