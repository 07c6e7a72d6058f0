use std::path::PathBuf;

/// Possible errors from configuration files manipulation.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Cannot read configuration file.
    #[error("cannot read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Cannot deserialize configuration.
    #[error("cannot deserialize configuration: {0}")]
    SerializationError(#[from] serde_yaml::Error),

    /// Configuration file does not exist.
    #[error("configuration file {0} does not exist")]
    NotFound(PathBuf),

    /// Labels or annotations allow-list has a wrong format.
    #[error("invalid format, metric=[label1,label2,labeln...],metricN=[]: {0}")]
    InvalidAllowList(String),

    /// Configuration has an invalid value.
    #[error("invalid configuration: {0}")]
    InvalidValue(String),

    /// Cannot observe configuration file.
    #[error("cannot watch configuration file: {0}")]
    WatchError(#[from] notify::Error),
}
