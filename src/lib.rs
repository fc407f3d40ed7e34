pub mod client;
pub mod config;
pub mod controller;
pub mod coordinate;
pub mod error;
pub mod geocoding;
pub mod location;
pub mod map;
pub mod report;
pub mod screens;
pub mod session;
pub mod user;

pub use client::AuthClient;
pub use config::{AuthConfig, ControllerOptions, GeocoderConfig, QueryRetention};
pub use controller::{LocationSearchController, Outcome};
pub use coordinate::{Coordinate, Region};
pub use error::MapError;
pub use geocoding::{Geocoder, NominatimGeocoder, SearchResult};
pub use location::{LocationProvider, PermissionStatus};
pub use map::{MapDisplay, Marker, MarkerKind};
pub use report::{ConditionKind, LogReporter, MemoryReporter, Reporter};
pub use screens::{HomeScreen, LoginScreen, Navigator, Route, SignupScreen};
pub use session::Session;
pub use user::SessionUser;
