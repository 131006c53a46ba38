pub mod recommend;

pub use recommend::*;
