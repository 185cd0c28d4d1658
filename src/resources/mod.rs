pub mod capabilities;
pub mod real_time;
pub mod sync_config;
pub mod weather;
pub mod world_clock;

pub use capabilities::*;
pub use real_time::*;
pub use sync_config::*;
pub use weather::*;
pub use world_clock::*;
