//! Resolution of storage-reference field values into byte streams.

use crate::error::InternalError;
use std::io::Read;

///
/// ValueResolver
///
/// Opens the remote content behind a storage reference. Only consulted
/// when a reference-valued field is actually read.
///

pub trait ValueResolver {
    fn resolve(&self, reference: &str) -> Result<Box<dyn Read + '_>, InternalError>;
}

///
/// NoRemoteStorage
///
/// Resolver for deployments without remote storage; every lookup fails.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoRemoteStorage;

impl ValueResolver for NoRemoteStorage {
    fn resolve(&self, reference: &str) -> Result<Box<dyn Read + '_>, InternalError> {
        Err(InternalError::unsupported(
            crate::error::ErrorOrigin::Resolver,
            format!("no remote storage configured to resolve '{reference}'"),
        ))
    }
}
