//! 序列文件读取（FASTA / FASTQ）、语料统计与映射结果输出。

pub mod fasta;
pub mod fastq;
pub mod paf;
pub mod stats;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::seq::Sequence;
use crate::util::dna;

/// 按扩展名识别的序列文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqFormat {
    Fasta,
    Fastq,
}

impl SeqFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "fa" | "fasta" | "fas" | "fna" | "ffn" | "faa" | "mpfa" | "frn" => Some(SeqFormat::Fasta),
            "fq" | "fastq" => Some(SeqFormat::Fastq),
            _ => None,
        }
    }
}

/// 读取整个序列文件；碱基经 `normalize_seq` 统一（小写转大写、U 转 T、其余记为 N）
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>> {
    let path = path.as_ref();
    let format = match SeqFormat::from_path(path) {
        Some(f) => f,
        None => bail!("unsupported sequence file extension: '{}'", path.display()),
    };
    let fh = File::open(path).with_context(|| format!("cannot open sequence file '{}'", path.display()))?;
    let buf = BufReader::new(fh);
    let records: Vec<Sequence> = match format {
        SeqFormat::Fasta => fasta::FastaReader::new(buf)
            .read_all()
            .with_context(|| format!("malformed FASTA file '{}'", path.display()))?
            .into_iter()
            .map(Sequence::from)
            .collect(),
        SeqFormat::Fastq => fastq::FastqReader::new(buf)
            .read_all()
            .with_context(|| format!("malformed FASTQ file '{}'", path.display()))?
            .into_iter()
            .map(Sequence::from)
            .collect(),
    };
    Ok(records
        .into_iter()
        .map(|s| Sequence { seq: dna::normalize_seq(&s.seq), ..s })
        .collect())
}
