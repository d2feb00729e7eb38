pub mod harness;
pub mod result;
pub mod runner;
pub mod testcase;

pub use harness::*;
pub use result::*;
pub use runner::*;
pub use testcase::*;
