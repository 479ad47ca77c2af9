mod data_config;

pub use data_config::{DataConfig, DATA_CONFIG_FILE};
