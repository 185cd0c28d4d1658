pub mod somnolence;

pub use somnolence::*;
