use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Unable to get resources for package {0}")]
    UnknownPackage(String),
    #[error("Icon I/O error: {0}")]
    IconIo(#[from] std::io::Error),
    #[error("Configuration Error: {0}")]
    Config(String),
    #[error("Invalid {0} value: {1}")]
    InvalidConfigValue(String, String),
}

impl PlaybackError {
    pub fn unknown_package(package: &str) -> Self {
        PlaybackError::UnknownPackage(package.to_string())
    }

    pub fn invalid_config_value(name: &str, value: &str) -> Self {
        PlaybackError::InvalidConfigValue(name.to_string(), value.to_string())
    }
}
