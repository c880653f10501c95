/// Crate-wide result alias.
pub type SwarmResult<T> = Result<T, SwarmError>;

/// Error type shared by every stage of the choreography pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SwarmError {
    /// Invalid configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Drawing surface or glyph rasterization failure. Fatal at startup.
    #[error("raster error: {0}")]
    Raster(String),

    /// Scheduler misuse, e.g. starting a cycle while another one is still live.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Preview rendering failure.
    #[error("render error: {0}")]
    Render(String),

    /// Frame sink / encoder failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// Config or plan (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually IO with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SwarmError {
    /// Build a [`SwarmError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SwarmError::Raster`].
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    /// Build a [`SwarmError::Schedule`].
    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    /// Build a [`SwarmError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SwarmError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`SwarmError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SwarmError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
