use std::collections::{HashMap, HashSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::minimizer::{self, Minimizer, Strand};
use crate::error::MapError;

/// minimizer 在序列中的一次出现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub position: usize,
    pub strand: Strand,
}

/// 频率过滤的结果：被整体移除的高频 minimizer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyFilter {
    /// 累计应用过的过滤比例
    pub fractions: Vec<f64>,
    /// 按移除顺序记录（出现次数降序）
    pub removed: Vec<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexMeta {
    pub reference_file: Option<String>,
    pub reference_name: Option<String>,
    pub reference_len: Option<usize>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

/// minimizer 值 → 出现位置列表（按扫描顺序，允许重复）。
///
/// 参考序列与每个片段各自拥有独立实例；构建完成后只读。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimizerIndex {
    k: usize,
    w: usize,
    occurrences: HashMap<u64, Vec<Occurrence>>,
    /// 各 key 首次插入的顺序，用于频率排序时的稳定平局处理
    order: Vec<u64>,
    filter: FrequencyFilter,
    pub meta: IndexMeta,
}

impl PartialEq for MinimizerIndex {
    fn eq(&self, other: &Self) -> bool {
        self.k == other.k
            && self.w == other.w
            && self.order == other.order
            && self.occurrences == other.occurrences
    }
}

impl MinimizerIndex {
    /// 提取 minimizer、累计出现列表，然后移除出现次数最高的 floor(f × distinct) 个值。
    pub fn build(seq: &[u8], k: usize, w: usize, f: f64) -> Result<Self, MapError> {
        let mins = minimizer::extract(seq, k, w)?;
        let mut idx = Self::from_minimizers(&mins, k, w);
        idx.remove_top_fraction(f)?;
        Ok(idx)
    }

    pub fn from_minimizers(mins: &[Minimizer], k: usize, w: usize) -> Self {
        let mut occurrences: HashMap<u64, Vec<Occurrence>> = HashMap::new();
        let mut order = Vec::new();
        for m in mins {
            occurrences
                .entry(m.value)
                .or_insert_with(|| {
                    order.push(m.value);
                    Vec::new()
                })
                .push(Occurrence { position: m.position, strand: m.strand });
        }
        Self {
            k,
            w,
            occurrences,
            order,
            filter: FrequencyFilter::default(),
            meta: IndexMeta::default(),
        }
    }

    /// 频率过滤：按出现次数降序（同次数保持首次插入顺序）移除前 floor(f × distinct) 个 key。
    /// f = 0 不移除任何值，f 接近 1 可能清空索引。
    pub fn remove_top_fraction(&mut self, f: f64) -> Result<Vec<u64>, MapError> {
        if !(0.0..=1.0).contains(&f) {
            return Err(MapError::InvalidParams(format!("frequency fraction must be in [0, 1], got {}", f)));
        }
        let n_remove = (f * self.order.len() as f64).floor() as usize;
        self.filter.fractions.push(f);
        if n_remove == 0 {
            return Ok(Vec::new());
        }

        let mut ranked: Vec<(usize, u64)> = self
            .order
            .iter()
            .map(|v| (self.occurrences.get(v).map_or(0, Vec::len), *v))
            .collect();
        // sort_by is stable: equal counts keep insertion order
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        let removed: Vec<u64> = ranked.into_iter().take(n_remove).map(|(_, v)| v).collect();
        let gone: HashSet<u64> = removed.iter().copied().collect();
        for v in &removed {
            self.occurrences.remove(v);
        }
        self.order.retain(|v| !gone.contains(v));
        self.filter.removed.extend_from_slice(&removed);
        Ok(removed)
    }

    #[inline]
    pub fn get(&self, value: u64) -> Option<&[Occurrence]> {
        self.occurrences.get(&value).map(Vec::as_slice)
    }

    #[inline]
    pub fn contains(&self, value: u64) -> bool {
        self.occurrences.contains_key(&value)
    }

    /// 按首次插入顺序遍历 (value, occurrences)
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[Occurrence])> + '_ {
        self.order
            .iter()
            .filter_map(move |v| self.occurrences.get(v).map(|occ| (*v, occ.as_slice())))
    }

    /// 不同 minimizer 值的个数
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn occurrence_count(&self) -> usize {
        self.occurrences.values().map(Vec::len).sum()
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn w(&self) -> usize {
        self.w
    }

    pub fn filter(&self) -> &FrequencyFilter {
        &self.filter
    }

    pub fn set_meta(&mut self, meta: IndexMeta) {
        self.meta = meta;
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let f = std::fs::File::create(path)?;
        let mut w = std::io::BufWriter::new(f);
        bincode::serialize_into(&mut w, self)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let f = std::fs::File::open(path)?;
        let idx: Self = bincode::deserialize_from(std::io::BufReader::new(f))?;
        Ok(idx)
    }
}
