pub mod action;
pub mod config;
pub mod sample;
pub mod storage;
pub mod str_interp;
pub mod style;
pub mod template;
pub mod testing;
pub mod verdict;

pub use crate::config::Config;
pub use crate::sample::{extract_samples, Sample};
pub use crate::verdict::{parse_verdict, Outcome, Verdict};
