pub mod dna;
pub mod logging;
