//! PAF 风格的映射记录输出。
//!
//! 每条记录占四行：制表符分隔的摘要行、比对后的片段、比对后的参考、空行。
//! 多个 worker 共享同一个写入器，整条记录在一次加锁内写完。

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};

use crate::io::stats::CorpusStats;
use crate::map::{MappingRecord, MappingSink};

/// 固定的映射质量列
pub const MAPQ: u8 = 60;

pub fn format_record(rec: &MappingRecord) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        String::from_utf8_lossy(&rec.fragment),
        rec.fragment.len(),
        rec.query_begin,
        rec.query_end,
        rec.strand.as_char(),
        rec.reference_name,
        rec.reference_len,
        rec.target_begin,
        rec.target_end,
        rec.alignment.score,
        MAPQ,
    );
    if let Some(cigar) = rec.alignment.cigar.as_deref().filter(|c| !c.is_empty()) {
        let _ = write!(out, "\tcg:Z:{}", cigar);
    }
    out.push('\n');
    out.push_str(&rec.alignment.aligned_query);
    out.push('\n');
    out.push_str(&rec.alignment.aligned_reference);
    out.push_str("\n\n");
    out
}

pub struct PafWriter {
    inner: Mutex<BufWriter<File>>,
}

impl PafWriter {
    /// 以追加模式打开（不存在则创建）
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open output file '{}'", path.display()))?;
        Ok(Self { inner: Mutex::new(BufWriter::new(file)) })
    }

    /// 统计头：参考与片段各一行
    pub fn write_stats(&self, reference: &CorpusStats, fragments: &CorpusStats) -> io::Result<()> {
        let text = format!(
            "STATS:\n(contig_count, min, max, avg, n_50)\n{}\n(contig_count, min, max, avg, n_50)\n{}\n-------------------\n\n",
            reference, fragments
        );
        self.write_block(&text)
    }

    pub fn write_record(&self, rec: &MappingRecord) -> io::Result<()> {
        self.write_block(&format_record(rec))
    }

    fn write_block(&self, text: &str) -> io::Result<()> {
        let mut w = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output writer lock poisoned"))?;
        w.write_all(text.as_bytes())?;
        w.flush()
    }
}

impl MappingSink for PafWriter {
    fn accept(&self, record: &MappingRecord) -> io::Result<()> {
        self.write_record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{self, Scoring};
    use crate::index::Strand;

    fn record(i: usize) -> MappingRecord {
        MappingRecord {
            fragment_index: i,
            fragment_name: format!("frag{}", i),
            fragment: b"GATTACA".to_vec(),
            reference_name: "chr1".to_string(),
            reference_len: 1000,
            strand: Strand::Original,
            query_begin: 1,
            query_end: 6,
            target_begin: 101,
            target_end: 106,
            alignment: align::global(b"ATTAC", b"ATTAC", &Scoring::default()),
        }
    }

    #[test]
    fn record_layout() {
        let text = format_record(&record(0));
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines[0], "GATTACA\t7\t1\t6\t+\tchr1\t1000\t101\t106\t5\t60");
        assert_eq!(lines[0].split('\t').count(), 11);
        assert_eq!(lines[1], "ATTAC");
        assert_eq!(lines[2], "ATTAC");
        assert_eq!(lines[3], "");
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn cigar_tag_appended_when_present() {
        let mut rec = record(0);
        rec.alignment.cigar = Some("5M".to_string());
        rec.strand = Strand::ReverseComplement;
        let first = format_record(&rec).lines().next().unwrap().to_string();
        assert!(first.ends_with("\t60\tcg:Z:5M"));
        assert!(first.contains("\t-\t"));
    }

    #[test]
    fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let writer = PafWriter::append(&path).unwrap();
        std::thread::scope(|s| {
            for t in 0..4 {
                let writer = &writer;
                s.spawn(move || {
                    for i in 0..25 {
                        writer.write_record(&record(t * 100 + i)).unwrap();
                    }
                });
            }
        });
        let text = std::fs::read_to_string(&path).unwrap();
        let blocks: Vec<&str> = text.split("\n\n").filter(|b| !b.is_empty()).collect();
        assert_eq!(blocks.len(), 100);
        let expected = format_record(&record(0));
        for b in blocks {
            assert_eq!(format!("{}\n\n", b), expected);
        }
    }

    #[test]
    fn append_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "header\n").unwrap();
        let writer = PafWriter::append(&path).unwrap();
        writer.write_record(&record(1)).unwrap();
        drop(writer);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("header\nGATTACA\t"));
    }
}
