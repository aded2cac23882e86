pub type TexweaveResult<T> = Result<T, TexweaveError>;

#[derive(thiserror::Error, Debug)]
pub enum TexweaveError {
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TexweaveError {
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            TexweaveError::out_of_bounds("x")
                .to_string()
                .contains("out of bounds:")
        );
        assert!(
            TexweaveError::invalid_parameter("x")
                .to_string()
                .contains("invalid parameter:")
        );
        assert!(
            TexweaveError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = TexweaveError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
