use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    MissingEnv(&'static str),
    InvalidUrl(String),
    FunctionNotFound(PathBuf),
    IoError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingEnv(var) => write!(f, "{} not set", var),
            Error::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            Error::FunctionNotFound(path) => {
                write!(f, "Function code not found: {}", path.display())
            }
            Error::IoError(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
