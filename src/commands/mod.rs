pub mod agenda;
pub mod describe;
pub mod export;
