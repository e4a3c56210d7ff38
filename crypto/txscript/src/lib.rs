pub mod opcodes;
pub mod script_builder;
pub mod standard;

pub use standard::*;

pub const MAX_SCRIPTS_SIZE: usize = 10_000;
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;
