pub mod fragmentation;
pub mod usage;
