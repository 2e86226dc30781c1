//! Backend endpoints, grouped by resource. Each file extends `ServiceClient`.

pub mod auth;
pub mod extraction;
pub mod location;
pub mod profiles;
pub mod reference;

pub use reference::search_languages;
