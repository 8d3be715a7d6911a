use crate::error::MapError;

/// k-mer 以 2-bit 编码打包进 u64，最多支持 32 个碱基
pub const MAX_K: usize = 32;

/// A=0, C=1, G=2, T=3；其余字符返回 None
#[inline]
pub fn base_code(b: u8) -> Option<u64> {
    match b.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' | b'U' => Some(3),
        _ => None,
    }
}

#[inline]
pub fn code_base(c: u64) -> u8 {
    match c & 3 {
        0 => b'A',
        1 => b'C',
        2 => b'G',
        _ => b'T',
    }
}

pub fn normalize_seq(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    for &b in seq {
        let up = b.to_ascii_uppercase();
        let nb = match up {
            b'A' | b'C' | b'G' | b'T' | b'N' => up,
            b'U' => b'T',
            _ => b'N',
        };
        out.push(nb);
    }
    out
}

#[inline]
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' | b'U' => b'A',
        _ => b'N',
    }
}

pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    for &b in seq.iter().rev() {
        out.push(complement(b));
    }
    out
}

#[inline]
fn kmer_mask(k: usize) -> u64 {
    if k >= MAX_K {
        u64::MAX
    } else {
        (1u64 << (2 * k)) - 1
    }
}

/// 每个起始位置的正向 k-mer 编码（滚动计算）。
///
/// 首个碱基位于最高位，因此对定长 k-mer 而言数值顺序等于字典序。
pub fn kmer_codes(seq: &[u8], k: usize) -> Result<Vec<u64>, MapError> {
    if k == 0 || k > MAX_K {
        return Err(MapError::InvalidParams(format!("k must be in 1..={}, got {}", MAX_K, k)));
    }
    if seq.len() < k {
        return Ok(Vec::new());
    }
    let mask = kmer_mask(k);
    let mut out = Vec::with_capacity(seq.len() - k + 1);
    let mut cur = 0u64;
    for (i, &b) in seq.iter().enumerate() {
        let c = base_code(b).ok_or(MapError::InvalidBase { position: i, base: b as char })?;
        cur = ((cur << 2) | c) & mask;
        if i + 1 >= k {
            out.push(cur);
        }
    }
    Ok(out)
}

/// 编码后 k-mer 的反向互补
pub fn revcomp_kmer(value: u64, k: usize) -> u64 {
    let mut v = value;
    let mut out = 0u64;
    for _ in 0..k {
        out = (out << 2) | (3 - (v & 3));
        v >>= 2;
    }
    out
}

pub fn decode_kmer(value: u64, k: usize) -> Vec<u8> {
    (0..k)
        .rev()
        .map(|i| code_base(value >> (2 * i)))
        .collect()
}
