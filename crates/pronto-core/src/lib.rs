pub mod app_config;
pub mod config;
pub mod restaurant;

pub use app_config::{AppConfig, DataSourceKind, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use restaurant::{
    Coordinates, Deals, RestaurantRecord, UserLocation, CITY_CENTRE, DEAL_DELIMITER,
    UNKNOWN_DISTANCE,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
