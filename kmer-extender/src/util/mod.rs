pub mod dna;
pub mod random;
