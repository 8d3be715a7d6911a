//! 日志初始化与缩进辅助。
//!
//! 流水线的进度消息带一个缩进层级（片段 → 阶段 → 细节），
//! 通过 `indent(level)` 前缀到 `log` 宏的消息上。

use log::LevelFilter;

const TABS: &str = "\t\t\t\t\t\t\t\t";

/// 返回 `level` 个制表符组成的前缀（超过 8 层按 8 层处理）
#[inline]
pub fn indent(level: usize) -> &'static str {
    &TABS[..level.min(TABS.len())]
}

pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// 初始化 env_logger；`RUST_LOG` 优先于命令行给出的级别。
pub fn init(verbose: u8) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level_from_verbosity(verbose));
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    // tests or embedding programs may have installed a logger already
    let _ = builder.try_init();
}
