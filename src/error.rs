use std::time::Duration;

use thiserror::Error;

/// 核心流水线（提取 / 索引 / 种子 / 链 / 比对 / 编排）的错误类型
#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("invalid base '{base}' at position {position}")]
    InvalidBase { position: usize, base: char },

    /// 链长度不足 2，无法界定比对区域
    #[error("degenerate chain of {len} seed(s)")]
    DegenerateChain { len: usize },

    #[error("fragment exceeded its {limit:?} deadline after {elapsed:?}")]
    Timeout { elapsed: Duration, limit: Duration },

    #[error("fragment task panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
