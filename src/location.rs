// src/location.rs

use std::future::Future;
use std::pin::Pin;

use crate::coordinate::Coordinate;
use crate::error::MapError;

pub type PermissionFuture<'a> = Pin<Box<dyn Future<Output = PermissionStatus> + Send + 'a>>;
pub type PositionFuture<'a> = Pin<Box<dyn Future<Output = Result<Coordinate, MapError>> + Send + 'a>>;

/// Answer of the platform's foreground location permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// The device location service.
///
/// Implementations wrap whatever the platform offers. Prompting the user and
/// sampling the GPS both happen behind these calls.
pub trait LocationProvider: Send + Sync {
    /// Asks for foreground location access, prompting the user if needed.
    fn request_permission(&self) -> PermissionFuture<'_>;

    /// Takes one current-position sample.
    fn current_position(&self) -> PositionFuture<'_>;
}
