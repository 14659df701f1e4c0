mod config;
mod load_config;

pub use config::{Config, CoreConfig, ProfileConfig};
pub use load_config::load;
