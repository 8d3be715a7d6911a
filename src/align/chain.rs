use super::seed::Match;

/// 链界定的近似映射区域（半开区间 [begin, end)）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainRegion {
    pub query_begin: usize,
    pub query_end: usize,
    pub target_begin: usize,
    pub target_end: usize,
}

impl ChainRegion {
    /// 由链的首尾种子给出区域；参考坐标若逆序则交换。少于 2 个种子返回 None。
    pub fn from_chain(chain: &[Match]) -> Option<Self> {
        if chain.len() < 2 {
            return None;
        }
        let first = chain.first()?;
        let last = chain.last()?;
        let (mut tb, mut te) = (first.reference_position, last.reference_position);
        if tb > te {
            std::mem::swap(&mut tb, &mut te);
        }
        Some(Self {
            query_begin: first.query_position,
            query_end: last.query_position,
            target_begin: tb,
            target_end: te,
        })
    }

    pub fn query_len(&self) -> usize {
        self.query_end - self.query_begin
    }

    pub fn target_len(&self) -> usize {
        self.target_end - self.target_begin
    }
}

/// 链中参考坐标递增的相邻种子对数，用于等长链之间的取舍
pub fn colinear_steps(chain: &[Match]) -> usize {
    chain
        .windows(2)
        .filter(|p| p[0].reference_position < p[1].reference_position)
        .count()
}

/// 按 query_position 求最长严格递增子序列（耐心排序 + 二分，O(n log n)）。
///
/// 二分取最左插入点，相等位置只会替换尾部而不会延长链；
/// 前驱关系由输入顺序决定。空输入返回空链。
pub fn longest_increasing_subsequence(matches: &[Match]) -> Vec<Match> {
    if matches.is_empty() {
        return Vec::new();
    }

    // tails[l] = index of the smallest tail of an increasing run of length l + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut tail_pos: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; matches.len()];

    for (i, m) in matches.iter().enumerate() {
        let q = m.query_position;
        let at = tail_pos.partition_point(|&p| p < q);
        if at > 0 {
            prev[i] = Some(tails[at - 1]);
        }
        if at == tails.len() {
            tails.push(i);
            tail_pos.push(q);
        } else {
            tails[at] = i;
            tail_pos[at] = q;
        }
    }

    let mut chain = Vec::with_capacity(tails.len());
    let mut cur = tails.last().copied();
    while let Some(i) = cur {
        chain.push(matches[i]);
        cur = prev[i];
    }
    chain.reverse();
    chain
}
