//! OpenStack provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("openstack CLI not found. Please install python-openstackclient")]
    CliNotFound,

    #[error("openstack authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("openstack command failed: {0}")]
    CommandFailed(String),

    #[error("no address reported for server {0}")]
    AddressMissing(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OpenStackError>;
