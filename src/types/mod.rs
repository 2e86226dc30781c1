pub mod extraction;
pub mod profile;
pub mod reference;

pub use profile::{ImportedProfile, Profile};

use serde::{Deserialize, Deserializer};

/// An explicit `null` reads like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
