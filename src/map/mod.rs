//! 片段映射编排：minimizer → 种子 → LIS 链 → 区域比对 → 映射记录。

pub mod batch;

use std::time::Duration;

use log::{debug, trace, warn};

use crate::align::{self, AlignMode, AlignmentResult, ChainRegion, Scoring};
use crate::error::MapError;
use crate::index::{minimizer, MinimizerIndex, Strand};
use crate::seq::Sequence;
use crate::util::logging::indent;

pub use batch::{BatchReport, Deadline, FragmentOutcome, MappingSink, Outcome};

/// 映射参数
#[derive(Clone, Debug)]
pub struct MapOpt {
    pub k: usize,
    pub w: usize,
    /// 频率过滤比例 f ∈ [0, 1]
    pub f: f64,
    pub scoring: Scoring,
    pub mode: AlignMode,
    pub threads: usize,
    /// 单片段墙钟超时；None 表示不限时
    pub timeout: Option<Duration>,
    /// 全局比对时是否生成 CIGAR
    pub emit_cigar: bool,
}

impl Default for MapOpt {
    fn default() -> Self {
        Self {
            k: 15,
            w: 25,
            f: 0.001,
            scoring: Scoring::default(),
            mode: AlignMode::Global,
            threads: 1,
            timeout: None,
            emit_cigar: false,
        }
    }
}

impl MapOpt {
    pub fn validate(&self) -> Result<(), MapError> {
        minimizer::check_params(self.k, self.w)?;
        if !(0.0..=1.0).contains(&self.f) {
            return Err(MapError::InvalidParams(format!("frequency fraction must be in [0, 1], got {}", self.f)));
        }
        if self.threads == 0 {
            return Err(MapError::InvalidParams("worker pool size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// 单个片段的映射结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRecord {
    /// 片段在输入中的序号，并发完成后可据此恢复输入顺序
    pub fragment_index: usize,
    pub fragment_name: String,
    pub fragment: Vec<u8>,
    pub reference_name: String,
    pub reference_len: usize,
    /// 胜出的链来自片段本身还是其反向互补
    pub strand: Strand,
    pub query_begin: usize,
    pub query_end: usize,
    pub target_begin: usize,
    pub target_end: usize,
    pub alignment: AlignmentResult,
}

/// 持有参考序列及其只读 minimizer 索引，可在多个 worker 间共享引用
pub struct Mapper {
    reference: Sequence,
    index: MinimizerIndex,
    opt: MapOpt,
}

impl Mapper {
    pub fn new(reference: Sequence, opt: MapOpt) -> Result<Self, MapError> {
        opt.validate()?;
        debug!("Creating minimizer index for reference '{}' ({} bp)...", reference.name, reference.len());
        let index = MinimizerIndex::build(&reference.seq, opt.k, opt.w, opt.f)?;
        debug!(
            "{}{} distinct minimizers, {} occurrences, {} filtered",
            indent(1),
            index.len(),
            index.occurrence_count(),
            index.filter().removed.len()
        );
        Ok(Self { reference, index, opt })
    }

    /// 复用已保存的索引。
    ///
    /// 索引的 k / w 必须与参数一致；元数据中记录的参考名称和长度（若有）必须与 `reference` 一致，
    /// 且所有出现位置都要落在参考序列之内。
    pub fn with_index(reference: Sequence, index: MinimizerIndex, opt: MapOpt) -> Result<Self, MapError> {
        opt.validate()?;
        if index.k() != opt.k || index.w() != opt.w {
            return Err(MapError::InvalidParams(format!(
                "index was built with k={} w={}, but mapping uses k={} w={}",
                index.k(),
                index.w(),
                opt.k,
                opt.w
            )));
        }
        if let Some(name) = index.meta.reference_name.as_deref() {
            if name != reference.name {
                return Err(MapError::InvalidParams(format!(
                    "index was built for reference '{}', but mapping against '{}'",
                    name, reference.name
                )));
            }
        }
        if let Some(len) = index.meta.reference_len {
            if len != reference.len() {
                return Err(MapError::InvalidParams(format!(
                    "index was built for a {} bp reference, but '{}' is {} bp",
                    len,
                    reference.name,
                    reference.len()
                )));
            }
        }
        let k = index.k();
        let past_end = index
            .iter()
            .flat_map(|(_, occs)| occs.iter())
            .any(|o| o.position + k > reference.len());
        if past_end {
            return Err(MapError::InvalidParams(format!(
                "index holds positions beyond the end of reference '{}' ({} bp)",
                reference.name,
                reference.len()
            )));
        }
        if !index.filter().fractions.iter().any(|&x| x == opt.f) {
            warn!(
                "index was filtered with f={:?}, but mapping uses f={}",
                index.filter().fractions,
                opt.f
            );
        }
        Ok(Self { reference, index, opt })
    }

    pub fn reference(&self) -> &Sequence {
        &self.reference
    }

    pub fn index(&self) -> &MinimizerIndex {
        &self.index
    }

    pub fn opt(&self) -> &MapOpt {
        &self.opt
    }

    /// 映射单个片段。链少于两个种子时返回 `DegenerateChain`；每个阶段之间检查截止时间。
    pub fn map_fragment(
        &self,
        fragment_index: usize,
        fragment: &Sequence,
        deadline: &Deadline,
    ) -> Result<MappingRecord, MapError> {
        let (k, w, f) = (self.opt.k, self.opt.w, self.opt.f);
        deadline.check()?;

        debug!("{}Finding minimizers for fragment...", indent(1));
        let fwd_index = MinimizerIndex::build(&fragment.seq, k, w, f)?;
        let rc_seq = fragment.revcomp();
        let rc_index = MinimizerIndex::build(&rc_seq, k, w, f)?;
        deadline.check()?;

        debug!("{}Finding matches...", indent(1));
        let fwd = align::find_matches_indexed(&fwd_index, &self.index);
        let rev = align::find_matches_indexed(&rc_index, &self.index);
        trace!(
            "{}original: {} + {} rc-key, reverse complement: {} + {} rc-key",
            indent(2),
            fwd.matches.len(),
            fwd.rev_matches.len(),
            rev.matches.len(),
            rev.rev_matches.len()
        );
        deadline.check()?;

        debug!("{}Finding longest increasing subsequence...", indent(1));
        let fwd_chain = align::longest_increasing_subsequence(&fwd.matches);
        let rc_chain = align::longest_increasing_subsequence(&rev.matches);
        // longer chain wins; equal lengths fall back to reference co-linearity, then to the
        // reverse-complement chain. This intentionally departs from handing every length tie to
        // the reverse-complement chain; an rc chain's query slice comes from the rc sequence.
        let fwd_key = (fwd_chain.len(), align::colinear_steps(&fwd_chain));
        let rc_key = (rc_chain.len(), align::colinear_steps(&rc_chain));
        let (strand, chain, query_seq) = if fwd_key > rc_key {
            (Strand::Original, fwd_chain, fragment.seq.as_slice())
        } else {
            (Strand::ReverseComplement, rc_chain, rc_seq.as_slice())
        };
        let region = ChainRegion::from_chain(&chain).ok_or(MapError::DegenerateChain { len: chain.len() })?;
        deadline.check()?;

        debug!("{}Aligning region...", indent(1));
        debug!(
            "{}fragment_begin: {}, fragment_end: {}, reference_begin: {}, reference_end: {}",
            indent(2),
            region.query_begin,
            region.query_end,
            region.target_begin,
            region.target_end
        );
        let query = &query_seq[region.query_begin..region.query_end];
        let target = &self.reference.seq[region.target_begin..region.target_end];
        let mut alignment = align::align(self.opt.mode, query, target, &self.opt.scoring);
        if self.opt.emit_cigar && self.opt.mode == AlignMode::Global {
            alignment.cigar = Some(align::cigar_from_aligned(&alignment.aligned_query, &alignment.aligned_reference));
        }

        Ok(MappingRecord {
            fragment_index,
            fragment_name: fragment.name.clone(),
            fragment: fragment.seq.clone(),
            reference_name: self.reference.name.clone(),
            reference_len: self.reference.len(),
            strand,
            query_begin: region.query_begin,
            query_end: region.query_end,
            target_begin: region.target_begin,
            target_end: region.target_end,
            alignment,
        })
    }
}
