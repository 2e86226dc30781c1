pub mod location_service;
pub mod profile_service;

pub use location_service::LocationService;
pub use profile_service::ProfileService;
