use thiserror::Error;

pub type PixelResult<T> = Result<T, PixelError>;

#[derive(Error, Debug)]
pub enum PixelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Script injection failed: {0}")]
    InjectionFailure(String),

    #[error("Pixel is not initialized")]
    NotReady,

    #[error("Pixel readiness timed out after {attempts} attempts ({waited_ms}ms)")]
    ReadinessTimeout { attempts: u32, waited_ms: u64 },

    #[error("Invalid ISO-4217 currency code: '{0}'")]
    InvalidCurrency(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Vendor call failed: {0}")]
    Vendor(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
