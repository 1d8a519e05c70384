//! Wire types for the media API.
//!
//! Field names match the snake_case JSON the backend sends; YouTube types
//! follow Google's camelCase.

pub mod album;
pub mod movie;
pub mod music;
pub mod pagination;
pub mod playback;
pub mod track;
pub mod youtube;

pub use album::*;
pub use movie::*;
pub use music::*;
pub use pagination::*;
pub use playback::*;
pub use track::*;
pub use youtube::*;

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
