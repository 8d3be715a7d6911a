pub mod minimizer;
pub mod mm;

pub use minimizer::{extract, Minimizer, Strand};
pub use mm::{FrequencyFilter, IndexMeta, MinimizerIndex, Occurrence};
