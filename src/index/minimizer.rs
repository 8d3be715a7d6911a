use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::util::dna;

/// 产生最小值的链方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Original,
    ReverseComplement,
}

impl Strand {
    /// PAF 风格的链符号
    pub fn as_char(self) -> char {
        match self {
            Strand::Original => '+',
            Strand::ReverseComplement => '-',
        }
    }
}

/// 窗口最小 k-mer（正反链取小）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Minimizer {
    /// 2-bit 编码的 k-mer 值
    pub value: u64,
    /// 胜出 k-mer 在序列中的绝对起点（不是窗口起点）
    pub position: usize,
    pub strand: Strand,
    pub k: usize,
    pub w: usize,
}

pub fn check_params(k: usize, w: usize) -> Result<(), MapError> {
    if k == 0 || k > dna::MAX_K {
        return Err(MapError::InvalidParams(format!("k must be in 1..={}, got {}", dna::MAX_K, k)));
    }
    if w < k {
        return Err(MapError::InvalidParams(format!("window length w={} is shorter than k={}", w, k)));
    }
    Ok(())
}

/// 窗口数量：max(0, n - w - k + 2)
#[inline]
pub fn window_count(n: usize, k: usize, w: usize) -> usize {
    (n + 2).saturating_sub(w + k)
}

/// 滑动窗口提取 minimizer。
///
/// 对每个窗口起点 i，依次检查偏移 j ∈ [i, i+w-k] 处的正向 k-mer 与其反向互补，
/// 仅在严格更小时替换当前最小值；同值时先出现的偏移胜出，同一偏移先看正链。
/// 序列长度不足 w+k-1 时返回空列表。
pub fn extract(seq: &[u8], k: usize, w: usize) -> Result<Vec<Minimizer>, MapError> {
    check_params(k, w)?;
    let n_windows = window_count(seq.len(), k, w);
    if n_windows == 0 {
        return Ok(Vec::new());
    }

    let fwd = dna::kmer_codes(seq, k)?;
    let rev: Vec<u64> = fwd.iter().map(|&v| dna::revcomp_kmer(v, k)).collect();
    let span = w - k;

    let mut out = Vec::with_capacity(n_windows);
    for i in 0..n_windows {
        let mut best = Minimizer { value: fwd[i], position: i, strand: Strand::Original, k, w };
        for j in i..=i + span {
            if fwd[j] < best.value {
                best.value = fwd[j];
                best.position = j;
                best.strand = Strand::Original;
            }
            if rev[j] < best.value {
                best.value = rev[j];
                best.position = j;
                best.strand = Strand::ReverseComplement;
            }
        }
        out.push(best);
    }
    Ok(out)
}
