pub mod generation;
pub mod storage;

pub use generation::*;
pub use storage::*;
