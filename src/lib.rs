//! # seedmap
//!
//! 基于 minimizer 种子与最长递增子序列（LIS）链的 DNA 片段映射器。
//!
//! 本 crate 将一组片段映射到单条参考序列上，流程包括：
//!
//! - **minimizer 提取**：滑动窗口内的规范 k-mer 最小值（正链与反向互补链同时考虑）
//! - **索引构建**：minimizer → 出现位置，并支持按频率过滤高频 minimizer
//! - **种子匹配**：片段与参考共享的 minimizer
//! - **链构建**：按片段坐标的最长递增子序列
//! - **区域比对**：全局（Needleman-Wunsch）、局部（Smith-Waterman）或半全局的精确 DP
//! - **批量映射**：固定大小的线程池，单片段超时与故障隔离
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use seedmap::map::{Deadline, MapOpt, Mapper};
//! use seedmap::seq::Sequence;
//!
//! let reference = Sequence::new("ref", "ACGTACGTAGCTGATCGTAGCTAGCTAGCTGATCGTAGCTAGCTAGCTGAT");
//! let opt = MapOpt { k: 5, w: 8, f: 0.0, ..MapOpt::default() };
//! let mapper = Mapper::new(reference, opt).unwrap();
//!
//! let frag = Sequence::new("frag", "AGCTGATCGTAGCTAGCTAG");
//! match mapper.map_fragment(0, &frag, &Deadline::unlimited()) {
//!     Ok(rec) => println!("{} -> [{}, {}) score={}", rec.fragment_name, rec.target_begin, rec.target_end, rec.alignment.score),
//!     Err(e) => eprintln!("unmapped: {}", e),
//! }
//! ```
//!
//! ## 模块说明
//!
//! - [`io`]：FASTA / FASTQ 解析、语料统计、PAF 风格输出
//! - [`index`]：minimizer 提取与 minimizer 索引
//! - [`align`]：种子匹配、LIS 链、两两 DP 比对
//! - [`map`]：单片段映射与线程池批处理
//! - [`util`]：DNA 编码 / 反向互补 / 日志工具

pub mod align;
pub mod error;
pub mod index;
pub mod io;
pub mod map;
pub mod seq;
pub mod util;

pub use error::MapError;
pub use map::{BatchReport, MapOpt, Mapper, MappingRecord};
pub use seq::Sequence;
