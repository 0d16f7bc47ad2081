pub mod automorphism;
pub mod base_conversion;
pub mod ring;
pub mod ring_rns;
pub mod sampling;
