//! Module for errors.
use std::{error::Error, fmt::Display};

/// Error from the fill process or one of its collaborators.
#[derive(Debug)]
pub enum WuFillErr {
    // Forwarded errors
    /// Error forwarded from reqwest, covers transport and body decoding.
    Http(reqwest::Error),
    /// Error forwarded from the csv crate.
    Csv(csv::Error),
    /// Error forwarded from chrono while parsing a time string.
    TimeParse(chrono::ParseError),

    // My own errors from this crate
    /// A collaborator answered with an unexpected HTTP status code.
    UnexpectedStatus(reqwest::StatusCode),
    /// A collaborator response could not be interpreted.
    MalformedResponse(String),
    /// The dew point is undefined for humidity values of zero or less.
    InvalidHumidity(i32),
    /// A password is needed to upload.
    MissingPassword,
    /// The remote service rejected an upload.
    UploadRejected(String),
}

impl Display for WuFillErr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use crate::errors::WuFillErr::*;

        match self {
            Http(err) => write!(f, "http error: {}", err),
            Csv(err) => write!(f, "csv error: {}", err),
            TimeParse(err) => write!(f, "time parse error: {}", err),

            UnexpectedStatus(code) => write!(f, "unexpected HTTP status code {}", code),
            MalformedResponse(msg) => write!(f, "malformed response: {}", msg),
            InvalidHumidity(h) => write!(f, "humidity must be positive, got {}", h),
            MissingPassword => write!(f, "password is needed to upload"),
            UploadRejected(msg) => write!(f, "upload rejected: {}", msg),
        }
    }
}

impl Error for WuFillErr {}

impl From<reqwest::Error> for WuFillErr {
    fn from(err: reqwest::Error) -> WuFillErr {
        WuFillErr::Http(err)
    }
}

impl From<csv::Error> for WuFillErr {
    fn from(err: csv::Error) -> WuFillErr {
        WuFillErr::Csv(err)
    }
}

impl From<chrono::ParseError> for WuFillErr {
    fn from(err: chrono::ParseError) -> WuFillErr {
        WuFillErr::TimeParse(err)
    }
}
