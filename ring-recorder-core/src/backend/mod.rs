pub mod simulated;
pub mod software_ring;
