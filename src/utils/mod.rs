pub mod moon;

pub use moon::*;
