pub mod browsing;
pub mod js_executor;
pub mod notify;
pub mod storage;

pub use browsing::{BrowsingHost, ContextId};
pub use js_executor::JsExecutor;
pub use notify::{BroadcastNotifier, UiNotifier};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
