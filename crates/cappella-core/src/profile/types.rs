//! Profile record and update payload

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Gender of the profile subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Wire form of the value
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!("Invalid gender '{other}': expected male or female")),
        }
    }
}

/// A baby profile as confirmed by the server
///
/// Replaced wholesale on every successful fetch or update. A freshly created
/// profile may carry null or empty fields; text fields decode those as `""`
/// and the gender as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Opaque server identifier
    pub id: String,
    /// Display name (may be empty until first edit)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Date of birth in the server's string form
    #[serde(rename = "dob", default, deserialize_with = "null_as_empty")]
    pub date_of_birth: String,
    #[serde(default, deserialize_with = "optional_gender")]
    pub gender: Option<Gender>,
    /// Remote picture URI
    #[serde(
        rename = "profile_picture",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub profile_picture_url: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn optional_gender<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Finished set of edited values submitted by a presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub date_of_birth: String,
    pub gender: Gender,
    /// Raw image bytes; `None` keeps the picture already on the server
    pub image: Option<Vec<u8>>,
}

impl ProfileUpdate {
    /// Create an update that leaves the picture untouched
    #[must_use]
    pub fn new(name: impl Into<String>, date_of_birth: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            date_of_birth: date_of_birth.into(),
            gender,
            image: None,
        }
    }

    /// Attach a new picture to upload
    #[must_use]
    pub fn with_image(mut self, bytes: Vec<u8>) -> Self {
        self.image = Some(bytes);
        self
    }

    /// Seed an update from the current profile so untouched fields round-trip.
    ///
    /// Returns `None` while the profile has no gender, since every update
    /// must send one.
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Option<Self> {
        let gender = profile.gender?;
        Some(Self::new(
            profile.name.clone(),
            profile.date_of_birth.clone(),
            gender,
        ))
    }
}
