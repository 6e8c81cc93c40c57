use thiserror::Error;

use crate::catalogs::psd_reader::ParsePsdError;
use crate::catalogs::ssc_reader::ParseSscError;

#[derive(Error, Debug)]
pub enum TerraposError {
    #[error("Invalid SSC header: {0}")]
    InvalidSscHeader(String),

    #[error("Malformed SSC record: {0}")]
    MalformedSscRecord(ParseSscError),

    #[error("Malformed PSD record: {0}")]
    MalformedPsdRecord(ParsePsdError),

    #[error("Invalid reference epoch (expected an integral year): {0}")]
    InvalidReferenceEpoch(f64),

    #[error("Invalid station key: '{0}'")]
    InvalidStationKey(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl PartialEq for TerraposError {
    fn eq(&self, other: &Self) -> bool {
        use TerraposError::*;
        match (self, other) {
            (InvalidSscHeader(a), InvalidSscHeader(b)) => a == b,
            (MalformedSscRecord(a), MalformedSscRecord(b)) => a == b,
            (MalformedPsdRecord(a), MalformedPsdRecord(b)) => a == b,
            (InvalidReferenceEpoch(a), InvalidReferenceEpoch(b)) => a == b,
            (InvalidStationKey(a), InvalidStationKey(b)) => a == b,

            // I/O errors are not comparable: equal if same variant
            (IoError(_), IoError(_)) => true,

            _ => false,
        }
    }
}
