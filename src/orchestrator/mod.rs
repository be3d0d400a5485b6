//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! - 管理浏览器、存储和通知通道的生命周期
//! - 用单任务守卫保证同一时刻只有一个发现或补全流程在写仓库
//! - 每条命令开始时从存储重新加载仓库，不跨命令复用
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (命令分发)
//!     ↓
//! workflow (DiscoveryFlow / BackfillFlow / parse_order_detail)
//!     ↓
//! repository + services (仓库、提取、导出、通知)
//!     ↓
//! infrastructure (BrowsingHost / KeyValueStore / UiNotifier)
//! ```

pub mod app;

pub use app::{selectable_years, App, RunGuard};
