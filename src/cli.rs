use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(author, version, about = "通过浏览器抓取订单历史并导出", long_about = None)]
pub struct Cli {
    /// TOML 配置文件（可选，环境变量优先）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示详细日志（debug 级别）
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 获取某一年的全部订单号（默认今年）
    Discover {
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// 补全所有缺少详情的订单
    Backfill,
    /// 解析当前页面上的订单详情（只输出，不保存）
    ParseCurrent,
    /// 导出制表符分隔的订单表
    Export {
        /// 输出文件，不指定时打印到标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// 按年份列出已知订单
    Status,
    /// 判断当前页面类型
    PageKind,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Discover { .. } => "获取订单号",
            Command::Backfill => "补全订单详情",
            Command::ParseCurrent => "解析当前订单",
            Command::Export { .. } => "导出订单",
            Command::Status => "订单状态",
            Command::PageKind => "页面类型",
        }
    }

    /// 是否需要连接浏览器
    pub fn needs_browser(&self) -> bool {
        !matches!(self, Command::Export { .. } | Command::Status)
    }
}
