//! 演示如何在 library 模式下使用 seedmap 映射片段。
//!
//! 运行方式：
//! ```bash
//! cargo run --example simple_map
//! ```

use std::time::Duration;

use seedmap::align::{self, AlignMode, Scoring};
use seedmap::index::{self, MinimizerIndex};
use seedmap::map::{MapOpt, Mapper, MappingRecord, Outcome};
use seedmap::seq::Sequence;
use seedmap::util::dna;

fn make_reference(len: usize, seed: u32) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut x = seed;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            bases[(x >> 16) as usize % 4]
        })
        .collect()
}

fn main() {
    // 1. 构建参考序列
    let reference = make_reference(600, 7);
    println!("参考长度: {} bp", reference.len());

    // 2. minimizer 提取与索引
    let mins = index::extract(&reference, 11, 15).unwrap();
    let idx = MinimizerIndex::build(&reference, 11, 15, 0.0).unwrap();
    println!("minimizer 数: {}, 不同值: {}", mins.len(), idx.len());
    if let Some(m) = mins.first() {
        println!(
            "  第一个: {} @ {} ({})",
            String::from_utf8_lossy(&dna::decode_kmer(m.value, m.k)),
            m.position,
            m.strand.as_char()
        );
    }

    // 3. 两两比对
    let sc = Scoring::default();
    let res = align::global(b"GATTACA", b"GCATGCT", &sc);
    println!("\n全局比对 GATTACA / GCATGCT:");
    println!("  {}", res.aligned_query);
    println!("  {}", res.aligned_reference);
    println!("  Score: {}", res.score);
    let res = align::local(b"TTGATTACAGG", b"CCGATTACACC", &sc);
    println!("局部比对得分: {} ({})", res.score, res.aligned_query);

    // 4. 批量映射：一个正向片段、一个反向互补片段、一个无法映射的片段
    let fragments = vec![
        Sequence::new("fwd", &reference[200..320]),
        Sequence::new("rc", dna::revcomp(&reference[100..260])),
        Sequence::new("poly_a", vec![b'A'; 40]),
    ];
    let opt = MapOpt {
        k: 11,
        w: 15,
        f: 0.0,
        mode: AlignMode::Global,
        threads: 2,
        timeout: Some(Duration::from_secs(5)),
        emit_cigar: true,
        ..MapOpt::default()
    };
    let mapper = Mapper::new(Sequence::new("ref", reference), opt).unwrap();

    let print_record = |rec: &MappingRecord| -> std::io::Result<()> {
        println!(
            "  {}: {} query[{}..{}] -> ref[{}..{}] score={} cigar={}",
            rec.fragment_name,
            rec.strand.as_char(),
            rec.query_begin,
            rec.query_end,
            rec.target_begin,
            rec.target_end,
            rec.alignment.score,
            rec.alignment.cigar.as_deref().unwrap_or("*")
        );
        Ok(())
    };
    println!("\n映射结果:");
    let mut report = mapper.map_all(&fragments, &print_record).unwrap();
    report.sort_by_input();
    for o in &report.outcomes {
        if let Outcome::Failed(cause) = &o.outcome {
            println!("  {} 未映射: {}", o.name, cause);
        }
    }
    println!("\n{}", report);

    println!("\n完成！");
}
