//! 种子查找、链构建与两两比对。

pub mod chain;
pub mod pairwise;
pub mod seed;

pub use chain::{colinear_steps, longest_increasing_subsequence, ChainRegion};
pub use pairwise::{align, cigar_from_aligned, global, local, semi_global, AlignMode, AlignmentResult, Scoring};
pub use seed::{find_matches, find_matches_indexed, Match, SeedMatches};
