pub mod boot;
pub mod kernels;

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("bad output: {0}")]
    BadOutput(String),
    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// Keyed by a human-readable context such as "list /boot".
pub type ErrorSet = BTreeMap<String, CollectError>;

pub fn single_error(context: impl Into<String>, err: impl Into<CollectError>) -> ErrorSet {
    let mut errors = ErrorSet::new();
    errors.insert(context.into(), err.into());
    errors
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelImage {
    pub name: OsString,
    pub mtime: SystemTime,
    pub ctime: Option<SystemTime>,
}

// Keyed by the raw file name, which need not be UTF-8.
pub type KernelInventory = BTreeMap<OsString, KernelImage>;

#[derive(Debug, Default)]
pub struct KernelScan {
    pub kernels: KernelInventory,
    pub errors: ErrorSet,
}
