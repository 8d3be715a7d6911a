use proptest::prelude::*;

use seedmap::align::{self, AlignMode, Match, Scoring};
use seedmap::index::{self, minimizer, MinimizerIndex, Strand};

fn dna(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')], 0..max_len)
}

fn seed(q: usize, r: usize) -> Match {
    Match {
        query_position: q,
        reference_position: r,
        minimizer_value: 0,
        query_strand: Strand::Original,
        reference_strand: Strand::Original,
    }
}

fn strip_gaps(s: &str) -> Vec<u8> {
    s.bytes().filter(|&b| b != b'-').collect()
}

proptest! {
    #[test]
    fn extractor_emits_one_minimizer_per_window(
        seq in dna(120),
        k in 1usize..10,
        extra in 0usize..12,
    ) {
        let w = k + extra;
        let mins = index::extract(&seq, k, w).unwrap();
        let expected = (seq.len() + 2).saturating_sub(w + k);
        prop_assert_eq!(mins.len(), expected);
        prop_assert_eq!(mins.len(), minimizer::window_count(seq.len(), k, w));
        for (i, m) in mins.iter().enumerate() {
            prop_assert!(m.position >= i && m.position <= i + w - k, "position outside its window");
            prop_assert!(m.position + k <= seq.len());
        }
    }

    #[test]
    fn frequency_filter_removes_floor_fraction(
        seq in dna(200),
        f in 0.0f64..=1.0,
    ) {
        let unfiltered = MinimizerIndex::build(&seq, 4, 8, 0.0).unwrap();
        let filtered = MinimizerIndex::build(&seq, 4, 8, f).unwrap();
        let n_removed = (f * unfiltered.len() as f64).floor() as usize;
        prop_assert_eq!(filtered.filter().removed.len(), n_removed);
        prop_assert_eq!(filtered.len(), unfiltered.len() - n_removed);
        for v in &filtered.filter().removed {
            prop_assert!(!filtered.contains(*v));
        }
    }

    #[test]
    fn global_alignment_preserves_inputs(
        query in dna(40),
        reference in dna(40),
    ) {
        let res = align::global(&query, &reference, &Scoring::default());
        prop_assert_eq!(res.aligned_query.len(), res.aligned_reference.len());
        prop_assert_eq!(strip_gaps(&res.aligned_query), query);
        prop_assert_eq!(strip_gaps(&res.aligned_reference), reference);
        let both_gaps = res
            .aligned_query
            .bytes()
            .zip(res.aligned_reference.bytes())
            .any(|(q, r)| q == b'-' && r == b'-');
        prop_assert!(!both_gaps);
    }

    #[test]
    fn local_score_dominates_global(
        query in dna(30),
        reference in dna(30),
    ) {
        let sc = Scoring::default();
        let g = align::align(AlignMode::Global, &query, &reference, &sc);
        let l = align::align(AlignMode::Local, &query, &reference, &sc);
        prop_assert!(l.score >= g.score.max(0));
        prop_assert!(l.score >= 0);
    }

    #[test]
    fn lis_of_increasing_run_is_whole_run(n in 1usize..60, step in 1usize..5) {
        let run: Vec<Match> = (0..n).map(|i| seed(i * step, 1000 - i)).collect();
        prop_assert_eq!(align::longest_increasing_subsequence(&run), run);
    }

    #[test]
    fn lis_of_decreasing_run_is_single(n in 1usize..60) {
        let run: Vec<Match> = (0..n).map(|i| seed(n - i, i)).collect();
        prop_assert_eq!(align::longest_increasing_subsequence(&run).len(), 1);
    }

    #[test]
    fn lis_is_strictly_increasing(qs in proptest::collection::vec(0usize..30, 0..80)) {
        let matches: Vec<Match> = qs.iter().enumerate().map(|(i, &q)| seed(q, i)).collect();
        let chain = align::longest_increasing_subsequence(&matches);
        prop_assert!(chain.windows(2).all(|p| p[0].query_position < p[1].query_position));
        let mut distinct = qs.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert!(chain.len() <= distinct.len());
        prop_assert_eq!(chain.is_empty(), qs.is_empty());
    }
}
