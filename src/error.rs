use std::fmt;

/// Failures coming back from the AWS SDK clients, boxed so callers do not
/// have to name the per-operation error types.
type Source = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug)]
pub enum Error {
    MissingEnvVar(&'static str),
    ImageLookup { source: Source },
    NoMatchingImage,
    ParameterNotFound { name: String },
    ParameterAccess { name: String, source: Source },
    ParameterWrite { name: String, source: Source },
    PipelineStart { name: String, source: Source },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingEnvVar(name) => {
                write!(f, "required environment variable `{name}` is not set")
            }
            Error::ImageLookup { source } => {
                write!(f, "failed to query the image catalog: {source}")
            }
            Error::NoMatchingImage => {
                write!(f, "no available image matches the base image filters")
            }
            Error::ParameterNotFound { name } => {
                write!(f, "parameter `{name}` does not exist")
            }
            Error::ParameterAccess { name, source } => {
                write!(f, "failed to read parameter `{name}`: {source}")
            }
            Error::ParameterWrite { name, source } => {
                write!(f, "failed to update parameter `{name}`: {source}")
            }
            Error::PipelineStart { name, source } => {
                write!(f, "failed to start pipeline `{name}`: {source}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ImageLookup { source }
            | Error::ParameterAccess { source, .. }
            | Error::ParameterWrite { source, .. }
            | Error::PipelineStart { source, .. } => Some(source.as_ref()),
            Error::MissingEnvVar(_) | Error::NoMatchingImage | Error::ParameterNotFound { .. } => {
                None
            }
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
