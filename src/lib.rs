pub mod api;
pub mod core;
pub mod country;
pub mod editor;
pub mod environment;
pub mod error;
pub mod import;
pub mod router;
pub mod services;
pub mod session;
pub mod types;
pub mod utils;
pub mod wizard_cli;

pub use crate::core::{retry_operation, PendingRequests, RetryError, ServiceClient, SessionStore};
pub use editor::ProfileEditor;
pub use environment::{RunMode, WizardConfig};
pub use error::{ApiError, ImportError};
pub use import::CvImport;
pub use router::{ProfileRouter, Route};
pub use services::{LocationService, ProfileService};
pub use session::{NavigationEvent, Navigator, Session};
pub use types::{ImportedProfile, Profile};
