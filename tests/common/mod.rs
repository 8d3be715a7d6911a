#![allow(dead_code)]

use seedmap::map::MapOpt;

/// 确定性的伪随机参考序列（LCG）
pub fn make_reference(len: usize, seed: u32) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut x = seed;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            bases[(x >> 16) as usize % 4]
        })
        .collect()
}

pub fn small_opt() -> MapOpt {
    MapOpt { k: 11, w: 15, f: 0.0, ..MapOpt::default() }
}
