use crate::index::{Minimizer, MinimizerIndex, Occurrence, Strand};
use crate::util::dna;

/// 种子：片段 minimizer 与参考 minimizer 相等（或互为反向互补）的一次命中
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub query_position: usize,
    pub reference_position: usize,
    /// 片段一侧的 minimizer 值
    pub minimizer_value: u64,
    pub query_strand: Strand,
    pub reference_strand: Strand,
}

/// 两个桶：同 key 命中与反向互补 key 命中
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedMatches {
    pub matches: Vec<Match>,
    pub rev_matches: Vec<Match>,
}

impl SeedMatches {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.rev_matches.is_empty()
    }

    fn push_occurrence(&mut self, value: u64, pos: usize, strand: Strand, reference: &MinimizerIndex) {
        // direct hit first; the reverse-complement key is only consulted on a miss
        if let Some(hits) = reference.get(value) {
            extend(&mut self.matches, value, pos, strand, hits);
        } else if let Some(hits) = reference.get(dna::revcomp_kmer(value, reference.k())) {
            extend(&mut self.rev_matches, value, pos, strand, hits);
        }
    }

    fn sort(&mut self) {
        // stable: ties keep scan order
        self.matches.sort_by_key(|m| (m.query_position, m.reference_position));
        self.rev_matches.sort_by_key(|m| (m.query_position, m.reference_position));
    }
}

fn extend(out: &mut Vec<Match>, value: u64, pos: usize, strand: Strand, hits: &[Occurrence]) {
    out.extend(hits.iter().map(|o| Match {
        query_position: pos,
        reference_position: o.position,
        minimizer_value: value,
        query_strand: strand,
        reference_strand: o.strand,
    }));
}

/// 将片段 minimizer 逐个查询参考索引。
///
/// 每个片段出现只会落入一个桶：值本身是 key 时进 `matches`，
/// 否则其反向互补是 key 时进 `rev_matches`。两个列表按
/// (query_position, reference_position) 升序返回，不去重。
pub fn find_matches(fragment: &[Minimizer], reference: &MinimizerIndex) -> SeedMatches {
    let mut out = SeedMatches::default();
    for m in fragment {
        out.push_occurrence(m.value, m.position, m.strand, reference);
    }
    out.sort();
    out
}

/// 与 [`find_matches`] 相同，但片段一侧是（已做频率过滤的）片段索引，按 key 首次插入顺序遍历。
pub fn find_matches_indexed(fragment: &MinimizerIndex, reference: &MinimizerIndex) -> SeedMatches {
    let mut out = SeedMatches::default();
    for (value, occs) in fragment.iter() {
        for o in occs {
            out.push_occurrence(value, o.position, o.strand, reference);
        }
    }
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::minimizer;

    #[test]
    fn identical_sequences_match_same_strand() {
        let seq = b"TTGACCATGCAGTCCGATAGGCTTACAGGATCCA";
        let reference = MinimizerIndex::build(seq, 5, 9, 0.0).unwrap();
        let mins = minimizer::extract(seq, 5, 9).unwrap();
        let res = find_matches(&mins, &reference);
        assert!(res.rev_matches.is_empty());
        assert!(!res.matches.is_empty());
        // every fragment minimizer hits its own position
        for m in &mins {
            assert!(res
                .matches
                .iter()
                .any(|x| x.query_position == m.position && x.reference_position == m.position));
        }
    }

    #[test]
    fn one_match_per_occurrence_pair() {
        let seq = b"AAAAAAAA";
        let reference = MinimizerIndex::build(seq, 2, 4, 0.0).unwrap();
        let mins = minimizer::extract(seq, 2, 4).unwrap();
        let res = find_matches(&mins, &reference);
        assert_eq!(res.matches.len(), mins.len() * mins.len());
    }

    #[test]
    fn revcomp_key_goes_to_second_bucket() {
        let gat = dna::kmer_codes(b"GAT", 3).unwrap()[0];
        let atc = dna::kmer_codes(b"ATC", 3).unwrap()[0];
        let reference = MinimizerIndex::from_minimizers(
            &[Minimizer { value: atc, position: 7, strand: Strand::Original, k: 3, w: 4 }],
            3,
            4,
        );
        let frag = [Minimizer { value: gat, position: 2, strand: Strand::Original, k: 3, w: 4 }];
        let res = find_matches(&frag, &reference);
        assert!(res.matches.is_empty());
        assert_eq!(res.rev_matches.len(), 1);
        assert_eq!(res.rev_matches[0].query_position, 2);
        assert_eq!(res.rev_matches[0].reference_position, 7);
        assert_eq!(res.rev_matches[0].minimizer_value, gat);
    }

    #[test]
    fn palindromic_value_only_in_first_bucket() {
        // ACGT == revcomp(ACGT): must not be emitted twice
        let acgt = dna::kmer_codes(b"ACGT", 4).unwrap()[0];
        let min = Minimizer { value: acgt, position: 0, strand: Strand::Original, k: 4, w: 4 };
        let reference = MinimizerIndex::from_minimizers(&[min], 4, 4);
        let res = find_matches(&[min], &reference);
        assert_eq!(res.matches.len(), 1);
        assert!(res.rev_matches.is_empty());
    }

    #[test]
    fn outputs_are_sorted() {
        let reference = MinimizerIndex::build(b"ACGTTGCATGCAGGCTAGCTAGGATCC", 3, 5, 0.0).unwrap();
        let frag = MinimizerIndex::build(b"GCTAGCTAGGATCCACGTTGCATGCAG", 3, 5, 0.0).unwrap();
        let res = find_matches_indexed(&frag, &reference);
        for list in [&res.matches, &res.rev_matches] {
            assert!(list
                .windows(2)
                .all(|p| (p[0].query_position, p[0].reference_position)
                    <= (p[1].query_position, p[1].reference_position)));
        }
    }

    #[test]
    fn empty_reference_gives_no_matches() {
        let reference = MinimizerIndex::build(b"AAAAAAAAAA", 3, 4, 1.0).unwrap();
        let mins = minimizer::extract(b"AAAAAAA", 3, 4).unwrap();
        assert!(find_matches(&mins, &reference).is_empty());
    }
}
