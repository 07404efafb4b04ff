// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

/// A helper macro to indicate a reportable bug
#[macro_export]
macro_rules! reportable_error {
    ( $($arg:tt)* ) => ({
        $crate::error::ArconResult::Err($crate::error::Error::ReportableBug { msg: format!($($arg)*) })
    })
}

/// A helper macro for failing fast on bad input
#[macro_export]
macro_rules! invalid_argument {
    ( $($arg:tt)* ) => ({
        $crate::error::ArconResult::Err($crate::error::Error::InvalidArgument { msg: format!($($arg)*) })
    })
}

use snafu::Snafu;
use std::io;

/// Top level Result type
pub type ArconResult<T> = std::result::Result<T, Error>;

/// Top level Error type
///
/// Errors raised by user functions travel through this crate untouched,
/// so whatever variant a transform returns is what the caller sees.
#[derive(Debug, Snafu)]
pub enum Error {
    /// A value handed to a constructor or registry was rejected.
    #[snafu(display("Invalid argument {}", msg))]
    InvalidArgument { msg: String },
    /// The system has been used in an unsupported way.
    #[snafu(display("Unsupported operation {}", msg))]
    Unsupported { msg: String },
    /// An unexpected bug has happened. Please open an issue on github!
    #[snafu(display(
        "Unexpected bug {} please report at https://github.com/cda-group/arcon",
        msg
    ))]
    ReportableBug { msg: String },
    /// Configuration could not be loaded or resolved.
    #[snafu(display("Failed to load configuration {}", msg))]
    Config { msg: String },
    /// A read or write error has happened when interacting with the file system.
    #[snafu(display("An IO error occured {}", error))]
    Io { error: io::Error },
}

impl From<io::Error> for Error {
    #[inline]
    fn from(io_error: io::Error) -> Self {
        Error::Io { error: io_error }
    }
}
