use anyhow::{anyhow, Result};
use std::io::BufRead;

use crate::seq::Sequence;

#[derive(Debug, Clone)]
pub struct FastqRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

/// 质量值不参与映射，转换时直接丢弃
impl From<FastqRecord> for Sequence {
    fn from(rec: FastqRecord) -> Self {
        Sequence { name: rec.id, seq: rec.seq }
    }
}

pub struct FastqReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    line_no: usize,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: String::new(), done: false, line_no: 0 }
    }

    fn read_line(&mut self) -> Result<bool> {
        self.buf.clear();
        let n = self.reader.read_line(&mut self.buf)?;
        self.line_no += 1;
        Ok(n > 0)
    }

    pub fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        if self.done { return Ok(None); }

        // header line starting with '@', blank lines between records are tolerated
        loop {
            if !self.read_line()? { self.done = true; return Ok(None); }
            if !self.buf.trim().is_empty() { break; }
        }
        let header = self
            .buf
            .strip_prefix('@')
            .ok_or_else(|| anyhow!("line {}: FASTQ header not starting with '@'", self.line_no))?
            .trim_end()
            .to_string();
        let mut parts = header.splitn(2, char::is_whitespace);
        let id = parts.next().unwrap_or("").to_string();
        let desc = parts.next().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        if !self.read_line()? { return Err(anyhow!("unexpected EOF after header '{}'", id)); }
        let seq: Vec<u8> = self.buf.trim_end().bytes().map(|b| b.to_ascii_uppercase()).collect();

        if !self.read_line()? || !self.buf.starts_with('+') {
            return Err(anyhow!("line {}: missing '+' line for '{}'", self.line_no, id));
        }

        if !self.read_line()? { return Err(anyhow!("missing quality line for '{}'", id)); }
        let qual = self.buf.trim_end().as_bytes().to_vec();

        // line-wrapped FASTQ is not supported
        if qual.len() != seq.len() {
            return Err(anyhow!("'{}': seq/qual length mismatch ({} vs {})", id, seq.len(), qual.len()));
        }

        Ok(Some(FastqRecord { id, desc, seq, qual }))
    }

    pub fn read_all(mut self) -> Result<Vec<FastqRecord>> {
        let mut out = Vec::new();
        while let Some(rec) = self.next_record()? {
            out.push(rec);
        }
        Ok(out)
    }
}
