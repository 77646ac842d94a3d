pub mod runner;
pub mod toolchain;
