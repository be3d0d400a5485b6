pub mod order;
pub mod page_kind;

pub use order::{OrderDetail, OrderId, OrderItem, Transaction};
pub use page_kind::PageKind;
