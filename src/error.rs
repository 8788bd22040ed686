use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("config io error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("tick {tick} faulted: {message}")]
    TickFault { tick: u64, message: String },
}
