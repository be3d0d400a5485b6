/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::workflow::{BackfillOutcome, DiscoveryReport};

/// 初始化日志
///
/// 优先使用 `RUST_LOG`；未设置时默认 info，详细模式下为 debug。
/// 每行带上程序启动以来的时间。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_timer(fmt::time::uptime())
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(command: &str, storage_path: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", command);
    info!("💾 存储文件: {}", storage_path);
    info!("{}", "=".repeat(60));
}

/// 记录列表页翻页
pub fn log_listing_page(year: i32, start_index: u32) {
    info!("\n[年份 {}] {}", year, "─".repeat(30));
    info!("[年份 {}] 打开订单列表页，偏移 {}", year, start_index);
}

/// 记录发现流程结果
pub fn log_discovery_complete(year: i32, report: &DiscoveryReport, known: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 [年份 {}] 订单号获取完成", year);
    info!("📄 浏览列表页: {}", report.pages_visited);
    info!("🔢 本次找到订单号: {}", report.ids_found);
    info!("📦 该年已知订单: {}", known);
    if report.reached_limit {
        warn!("⚠️ 因达到偏移上限而停止，可能还有更早的订单");
    }
    info!("{}", "=".repeat(60));
}

/// 记录补全流程结果
pub fn log_backfill_outcome(outcome: &BackfillOutcome, missing: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 订单详情补全结束");
    info!("✅ 本次保存: {}", outcome.saved());
    info!("📋 仍缺少详情: {}", missing);
    if let BackfillOutcome::Halted {
        order_id, reason, ..
    } = outcome
    {
        error!("❌ 在订单 {} 处停止: {}", order_id, reason);
    }
    info!("{}", "=".repeat(60));
}
