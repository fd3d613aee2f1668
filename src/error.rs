use std::error::Error;

use rusoto_core::RusotoError;
use rusoto_ec2::{
    CreateTagsError, DescribeInstancesError, DescribeRegionsError, StartInstancesError,
    StopInstancesError,
};
use std::fmt;
use std::fmt::{Display, Formatter};

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

#[derive(Debug)]
pub enum InstanceSchedulerError {
    NoneValue,
    MissingInstanceIds,
    InvalidAction(String),
    UnsupportedMethod(String),
    JsonError(serde_json::Error),
    DescribeInstancesError(RusotoError<DescribeInstancesError>),
    DescribeRegionsError(RusotoError<DescribeRegionsError>),
    StartInstancesError(RusotoError<StartInstancesError>),
    StopInstancesError(RusotoError<StopInstancesError>),
    CreateTagsError(RusotoError<CreateTagsError>),
}

impl InstanceSchedulerError {
    /// Caller mistakes map to 400, everything the provider or decoder raises to 500.
    pub fn status_code(&self) -> u16 {
        match *self {
            InstanceSchedulerError::MissingInstanceIds
            | InstanceSchedulerError::InvalidAction(_)
            | InstanceSchedulerError::UnsupportedMethod(_) => STATUS_BAD_REQUEST,
            _ => STATUS_INTERNAL_ERROR,
        }
    }
}

impl Display for InstanceSchedulerError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            InstanceSchedulerError::NoneValue => write!(f, "Value is None"),
            InstanceSchedulerError::MissingInstanceIds => write!(f, "Missing instanceIds"),
            InstanceSchedulerError::InvalidAction(ref action) => {
                write!(f, "Invalid action: {}", action)
            }
            InstanceSchedulerError::UnsupportedMethod(ref method) => {
                write!(f, "Unsupported method: {}", method)
            }
            InstanceSchedulerError::JsonError(ref error) => Display::fmt(error, f),
            InstanceSchedulerError::DescribeInstancesError(ref error) => Display::fmt(error, f),
            InstanceSchedulerError::DescribeRegionsError(ref error) => Display::fmt(error, f),
            InstanceSchedulerError::StartInstancesError(ref error) => Display::fmt(error, f),
            InstanceSchedulerError::StopInstancesError(ref error) => Display::fmt(error, f),
            InstanceSchedulerError::CreateTagsError(ref error) => Display::fmt(error, f),
        }
    }
}

impl Error for InstanceSchedulerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            InstanceSchedulerError::JsonError(ref error) => Some(error),
            InstanceSchedulerError::DescribeInstancesError(ref error) => Some(error),
            InstanceSchedulerError::DescribeRegionsError(ref error) => Some(error),
            InstanceSchedulerError::StartInstancesError(ref error) => Some(error),
            InstanceSchedulerError::StopInstancesError(ref error) => Some(error),
            InstanceSchedulerError::CreateTagsError(ref error) => Some(error),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for InstanceSchedulerError {
    fn from(e: serde_json::Error) -> InstanceSchedulerError {
        InstanceSchedulerError::JsonError(e)
    }
}

impl From<RusotoError<DescribeInstancesError>> for InstanceSchedulerError {
    fn from(e: RusotoError<DescribeInstancesError>) -> InstanceSchedulerError {
        InstanceSchedulerError::DescribeInstancesError(e)
    }
}

impl From<RusotoError<DescribeRegionsError>> for InstanceSchedulerError {
    fn from(e: RusotoError<DescribeRegionsError>) -> InstanceSchedulerError {
        InstanceSchedulerError::DescribeRegionsError(e)
    }
}

impl From<RusotoError<StartInstancesError>> for InstanceSchedulerError {
    fn from(e: RusotoError<StartInstancesError>) -> InstanceSchedulerError {
        InstanceSchedulerError::StartInstancesError(e)
    }
}

impl From<RusotoError<StopInstancesError>> for InstanceSchedulerError {
    fn from(e: RusotoError<StopInstancesError>) -> InstanceSchedulerError {
        InstanceSchedulerError::StopInstancesError(e)
    }
}

impl From<RusotoError<CreateTagsError>> for InstanceSchedulerError {
    fn from(e: RusotoError<CreateTagsError>) -> InstanceSchedulerError {
        InstanceSchedulerError::CreateTagsError(e)
    }
}
