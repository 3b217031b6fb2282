use thiserror::Error;
use xform_engine_traits::EngineError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonTransformError {
    #[error("Invalid input JSON: {0}")]
    InvalidInput(String),

    #[error("Invalid transform JSON: {0}")]
    InvalidTransform(String),

    #[error("Path parse error in '{0}': {1}")]
    PathParse(String, String),

    #[error("Unknown function '#{0}'")]
    UnknownFunction(String),

    #[error("Function '#{function}' error: {message}")]
    Function { function: String, message: String },

    #[error("'#{0}' can only be used inside a #loop")]
    OutsideLoop(String),
}

impl JsonTransformError {
    pub(crate) fn function(function: &str, message: impl Into<String>) -> Self {
        JsonTransformError::Function {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

impl From<JsonTransformError> for EngineError {
    fn from(err: JsonTransformError) -> Self {
        match err {
            JsonTransformError::InvalidInput(_) => EngineError::invalid_input(err.to_string()),
            other => EngineError::execution(other.to_string()),
        }
    }
}
