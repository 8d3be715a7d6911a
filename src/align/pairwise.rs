use std::fmt::Write as _;

/// 线性间隙打分；三个值都直接加到 DP 单元上（罚分取负值）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scoring {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_score: i32,
}

impl Default for Scoring {
    fn default() -> Self {
        Self { match_score: 1, mismatch_score: -1, gap_score: -1 }
    }
}

impl Scoring {
    #[inline]
    fn subst(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.match_score
        } else {
            self.mismatch_score
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum AlignMode {
    /// Needleman-Wunsch
    Global,
    /// Smith-Waterman
    Local,
    /// free leading and trailing gaps
    SemiGlobal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    pub aligned_query: String,
    pub aligned_reference: String,
    pub score: i32,
    /// 仅全局比对会填充，且需要调用方显式要求
    pub cigar: Option<String>,
}

/// 回溯方向
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trace {
    Stop,
    /// match / mismatch
    Diag,
    /// query base against a reference gap
    Up,
    /// reference base against a query gap
    Left,
}

/// 打分矩阵与方向矩阵，行优先展平，(m+1) × (n+1)
struct DpMatrix {
    cols: usize,
    h: Vec<i32>,
    t: Vec<Trace>,
}

impl DpMatrix {
    fn new(m: usize, n: usize) -> Self {
        let cols = n + 1;
        let size = (m + 1) * cols;
        Self { cols, h: vec![0; size], t: vec![Trace::Stop; size] }
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    #[inline]
    fn score(&self, i: usize, j: usize) -> i32 {
        self.h[self.idx(i, j)]
    }

    /// 边界：第 0 列只能向上走，第 0 行只能向左走
    fn init_borders(&mut self, m: usize, n: usize, gap: Option<i32>) {
        for i in 1..=m {
            let idx = self.idx(i, 0);
            self.h[idx] = gap.map_or(0, |g| i as i32 * g);
            self.t[idx] = Trace::Up;
        }
        for j in 1..=n {
            self.h[j] = gap.map_or(0, |g| j as i32 * g);
            self.t[j] = Trace::Left;
        }
    }

    /// 计算 (i, j) 的三个候选，同分时优先 diag，其次 up，最后 left
    #[inline]
    fn best_move(&self, q: &[u8], r: &[u8], i: usize, j: usize, sc: &Scoring) -> (i32, Trace) {
        let diag = self.score(i - 1, j - 1) + sc.subst(q[i - 1], r[j - 1]);
        let up = self.score(i - 1, j) + sc.gap_score;
        let left = self.score(i, j - 1) + sc.gap_score;

        let mut best = (diag, Trace::Diag);
        if up > best.0 {
            best = (up, Trace::Up);
        }
        if left > best.0 {
            best = (left, Trace::Left);
        }
        best
    }

    fn fill(&mut self, q: &[u8], r: &[u8], sc: &Scoring) {
        for i in 1..=q.len() {
            for j in 1..=r.len() {
                let (val, dir) = self.best_move(q, r, i, j, sc);
                let idx = self.idx(i, j);
                self.h[idx] = val;
                self.t[idx] = dir;
            }
        }
    }

    /// 从 (i, j) 回溯，`keep_going` 为假或遇到 Stop 时停下
    fn traceback(
        &self,
        q: &[u8],
        r: &[u8],
        mut i: usize,
        mut j: usize,
        keep_going: impl Fn(usize, usize) -> bool,
    ) -> (String, String) {
        let mut aq: Vec<u8> = Vec::with_capacity(i + j);
        let mut ar: Vec<u8> = Vec::with_capacity(i + j);
        while keep_going(i, j) {
            match self.t[self.idx(i, j)] {
                Trace::Diag => {
                    aq.push(q[i - 1]);
                    ar.push(r[j - 1]);
                    i -= 1;
                    j -= 1;
                }
                Trace::Up => {
                    aq.push(q[i - 1]);
                    ar.push(b'-');
                    i -= 1;
                }
                Trace::Left => {
                    aq.push(b'-');
                    ar.push(r[j - 1]);
                    j -= 1;
                }
                Trace::Stop => break,
            }
        }
        aq.reverse();
        ar.reverse();
        (to_string(&aq), to_string(&ar))
    }
}

fn to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// 全局比对（Needleman-Wunsch）。得分为 H[m][n]，回溯从 (m, n) 走到 (0, 0)。
pub fn global(query: &[u8], reference: &[u8], sc: &Scoring) -> AlignmentResult {
    let (m, n) = (query.len(), reference.len());
    let mut dp = DpMatrix::new(m, n);
    dp.init_borders(m, n, Some(sc.gap_score));
    dp.fill(query, reference, sc);

    let (aligned_query, aligned_reference) = dp.traceback(query, reference, m, n, |i, j| i > 0 || j > 0);
    AlignmentResult { aligned_query, aligned_reference, score: dp.score(m, n), cigar: None }
}

/// 局部比对（Smith-Waterman）。
///
/// 单元下限为 0，0 单元没有来向。全局最大值以 `>=` 更新，
/// 行优先扫描中最后一个最大单元作为回溯起点；回溯在得分降到 0 或碰到边界时停止。
pub fn local(query: &[u8], reference: &[u8], sc: &Scoring) -> AlignmentResult {
    let (m, n) = (query.len(), reference.len());
    let mut dp = DpMatrix::new(m, n);

    let mut best = (0i32, 0usize, 0usize);
    for i in 1..=m {
        for j in 1..=n {
            let (mut val, mut dir) = dp.best_move(query, reference, i, j, sc);
            if val <= 0 {
                val = 0;
                dir = Trace::Stop;
            }
            let idx = dp.idx(i, j);
            dp.h[idx] = val;
            dp.t[idx] = dir;
            if val >= best.0 {
                best = (val, i, j);
            }
        }
    }

    let (score, bi, bj) = best;
    let (aligned_query, aligned_reference) =
        dp.traceback(query, reference, bi, bj, |i, j| i > 0 && j > 0 && dp.score(i, j) > 0);
    AlignmentResult { aligned_query, aligned_reference, score, cigar: None }
}

/// 半全局比对：首行首列为 0（前导间隙免费），递推同全局比对。
///
/// 起点取最后一行的最大单元（若其严格大于最后一列的最大值），否则取最后一列的最大单元；
/// 同值取第一个。回溯与全局比对一致，一直走到 (0, 0)。
pub fn semi_global(query: &[u8], reference: &[u8], sc: &Scoring) -> AlignmentResult {
    let (m, n) = (query.len(), reference.len());
    let mut dp = DpMatrix::new(m, n);
    dp.init_borders(m, n, None);
    dp.fill(query, reference, sc);

    let (row_j, row_max) = first_argmax((0..=n).map(|j| dp.score(m, j)));
    let (col_i, col_max) = first_argmax((0..=m).map(|i| dp.score(i, n)));
    let (si, sj) = if row_max > col_max { (m, row_j) } else { (col_i, n) };

    let (aligned_query, aligned_reference) = dp.traceback(query, reference, si, sj, |i, j| i > 0 || j > 0);
    AlignmentResult { aligned_query, aligned_reference, score: dp.score(si, sj), cigar: None }
}

fn first_argmax(values: impl Iterator<Item = i32>) -> (usize, i32) {
    let mut best = (0usize, i32::MIN);
    for (k, v) in values.enumerate() {
        if v > best.1 {
            best = (k, v);
        }
    }
    best
}

pub fn align(mode: AlignMode, query: &[u8], reference: &[u8], sc: &Scoring) -> AlignmentResult {
    match mode {
        AlignMode::Global => global(query, reference, sc),
        AlignMode::Local => local(query, reference, sc),
        AlignMode::SemiGlobal => semi_global(query, reference, sc),
    }
}

/// 由两条比对字符串重建 CIGAR（M / I / D）
pub fn cigar_from_aligned(aligned_query: &str, aligned_reference: &str) -> String {
    let ops: Vec<char> = aligned_query
        .bytes()
        .zip(aligned_reference.bytes())
        .filter_map(|(q, r)| match (q, r) {
            (b'-', b'-') => None,
            (b'-', _) => Some('D'),
            (_, b'-') => Some('I'),
            _ => Some('M'),
        })
        .collect();
    ops_to_cigar(&ops)
}

pub fn ops_to_cigar(ops: &[char]) -> String {
    let mut cigar = String::new();
    if ops.is_empty() {
        return cigar;
    }
    let mut cur = ops[0];
    let mut len = 1usize;
    for &op in &ops[1..] {
        if op == cur {
            len += 1;
        } else {
            let _ = write!(&mut cigar, "{}{}", len, cur);
            cur = op;
            len = 1;
        }
    }
    let _ = write!(&mut cigar, "{}{}", len, cur);
    cigar
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(s: &str) -> String {
        s.chars().filter(|&c| c != '-').collect()
    }

    #[test]
    fn global_identical() {
        let res = global(b"GATTACA", b"GATTACA", &Scoring::default());
        assert_eq!(res.score, 7);
        assert_eq!(res.aligned_query, "GATTACA");
        assert_eq!(res.aligned_reference, "GATTACA");
        assert_eq!(res.cigar, None);
    }

    #[test]
    fn global_classic_example() {
        let sc = Scoring::default();
        let res = global(b"GATTACA", b"GCATGCU", &sc);
        assert_eq!(res.score, 0);
        assert_eq!(strip(&res.aligned_query), "GATTACA");
        assert_eq!(strip(&res.aligned_reference), "GCATGCU");
        assert_eq!(res.aligned_query.len(), res.aligned_reference.len());
    }

    #[test]
    fn global_single_deletion_prefers_up_over_left() {
        let sc = Scoring::default();
        let res = global(b"ACGT", b"ACT", &sc);
        assert_eq!(res.score, 2);
        assert_eq!(res.aligned_query, "ACGT");
        assert_eq!(res.aligned_reference, "AC-T");
    }

    #[test]
    fn global_empty_sides() {
        let sc = Scoring::default();
        let res = global(b"", b"ACG", &sc);
        assert_eq!(res.aligned_query, "---");
        assert_eq!(res.aligned_reference, "ACG");
        assert_eq!(res.score, -3);

        let res = global(b"AC", b"", &sc);
        assert_eq!(res.aligned_query, "AC");
        assert_eq!(res.aligned_reference, "--");

        let res = global(b"", b"", &sc);
        assert_eq!(res.score, 0);
        assert!(res.aligned_query.is_empty());
    }

    #[test]
    fn local_finds_embedded_match() {
        let sc = Scoring { match_score: 2, mismatch_score: -1, gap_score: -2 };
        let res = local(b"TTTACGTGGG", b"CCACGTCC", &sc);
        assert_eq!(res.score, 8);
        assert_eq!(res.aligned_query, "ACGT");
        assert_eq!(res.aligned_reference, "ACGT");
    }

    #[test]
    fn local_ties_report_last_maximal_cell() {
        // "A" and "C" both score 1; the scan meets the C cell last
        let res = local(b"AC", b"AC", &Scoring { match_score: 1, mismatch_score: -5, gap_score: -5 });
        assert_eq!(res.score, 2);
        let res = local(b"AGC", b"ATC", &Scoring { match_score: 1, mismatch_score: -5, gap_score: -5 });
        assert_eq!(res.score, 1);
        assert_eq!(res.aligned_query, "C");
        assert_eq!(res.aligned_reference, "C");
    }

    #[test]
    fn local_no_similarity() {
        let res = local(b"AAAA", b"TTTT", &Scoring::default());
        assert_eq!(res.score, 0);
        assert!(res.aligned_query.is_empty());
        assert!(res.aligned_reference.is_empty());
        assert_eq!(local(b"", b"ACGT", &Scoring::default()).score, 0);
    }

    #[test]
    fn semi_global_free_leading_gaps() {
        let sc = Scoring::default();
        let res = semi_global(b"ACGT", b"TTTTACGT", &sc);
        assert_eq!(res.score, 4);
        assert_eq!(strip(&res.aligned_query), "ACGT");
        assert_eq!(strip(&res.aligned_reference), "TTTTACGT");
        assert!(res.aligned_query.ends_with("ACGT"));
    }

    #[test]
    fn semi_global_start_on_last_row() {
        // best end of the query is in the middle of the reference
        let sc = Scoring::default();
        let res = semi_global(b"ACGT", b"ACGTTTTT", &sc);
        assert_eq!(res.score, 4);
        assert_eq!(res.aligned_query, "ACGT");
        assert_eq!(res.aligned_reference, "ACGT");
    }

    #[test]
    fn semi_global_empty_inputs() {
        let sc = Scoring::default();
        let res = semi_global(b"", b"ACG", &sc);
        assert_eq!(res.score, 0);
        assert_eq!(res.aligned_query, "---");
        let res = semi_global(b"", b"", &sc);
        assert!(res.aligned_reference.is_empty());
    }

    #[test]
    fn align_dispatch() {
        let sc = Scoring::default();
        assert_eq!(align(AlignMode::Global, b"ACGT", b"ACGT", &sc).score, 4);
        assert_eq!(align(AlignMode::Local, b"ACGT", b"ACGT", &sc).score, 4);
        assert_eq!(align(AlignMode::SemiGlobal, b"ACGT", b"ACGT", &sc).score, 4);
    }

    #[test]
    fn cigar_from_columns() {
        assert_eq!(cigar_from_aligned("AC-T", "ACGT"), "2M1D1M");
        assert_eq!(cigar_from_aligned("ACGT", "AC-T"), "2M1I1M");
        assert_eq!(cigar_from_aligned("", ""), "");
    }
}
