use std::fmt;

use crate::seq::Sequence;

/// 序列集合的长度统计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusStats {
    pub contig_count: usize,
    pub min: usize,
    pub max: usize,
    pub avg: f64,
    pub n50: usize,
    pub total_len: usize,
}

impl fmt::Display for CorpusStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {:.2}, {})",
            self.contig_count, self.min, self.max, self.avg, self.n50
        )
    }
}

/// N50：按长度降序累加，首次达到总长一半时的序列长度
pub fn n50(lengths: &[usize]) -> usize {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let total: usize = sorted.iter().sum();
    let mut acc = 0usize;
    for len in sorted {
        acc += len;
        if acc * 2 >= total {
            return len;
        }
    }
    0
}

pub fn analyze(records: &[Sequence]) -> Option<CorpusStats> {
    if records.is_empty() {
        return None;
    }
    let lengths: Vec<usize> = records.iter().map(Sequence::len).collect();
    let total_len: usize = lengths.iter().sum();
    Some(CorpusStats {
        contig_count: lengths.len(),
        min: lengths.iter().copied().min().unwrap_or(0),
        max: lengths.iter().copied().max().unwrap_or(0),
        avg: total_len as f64 / lengths.len() as f64,
        n50: n50(&lengths),
        total_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n50_of_known_set() {
        // total 30, descending 10 + 8 = 18 >= 15
        assert_eq!(n50(&[2, 3, 4, 8, 10, 3]), 8);
        assert_eq!(n50(&[5]), 5);
        assert_eq!(n50(&[]), 0);
    }

    #[test]
    fn analyze_records() {
        let recs = vec![Sequence::new("a", "ACGT"), Sequence::new("b", "AC"), Sequence::new("c", "ACGTAC")];
        let s = analyze(&recs).unwrap();
        assert_eq!(s.contig_count, 3);
        assert_eq!((s.min, s.max), (2, 6));
        assert!((s.avg - 4.0).abs() < 1e-12);
        assert_eq!(s.n50, 6);
        assert_eq!(s.to_string(), "(3, 2, 6, 4.00, 6)");
        assert!(analyze(&[]).is_none());
    }
}
