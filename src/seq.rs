use crate::util::dna;

/// 带名称的只读序列（参考或片段）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub name: String,
    pub seq: Vec<u8>,
}

impl Sequence {
    pub fn new(name: impl Into<String>, seq: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), seq: seq.into() }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn revcomp(&self) -> Vec<u8> {
        dna::revcomp(&self.seq)
    }
}
