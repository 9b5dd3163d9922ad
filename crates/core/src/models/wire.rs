//! Lenient deserializers for fields the backend sends in more than one shape.
//!
//! Categories, tags and log actors arrive either as plain strings or as
//! populated objects (`{"name": "..."}`); both collapse to the display name.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NameRef {
    Text(String),
    Named { name: String },
    Email { email: String },
}

impl NameRef {
    fn into_name(self) -> String {
        match self {
            Self::Text(name) | Self::Named { name } => name,
            Self::Email { email } => email,
        }
    }
}

pub fn name_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NameRef>::deserialize(deserializer)?;
    Ok(value
        .map(NameRef::into_name)
        .filter(|name| !name.trim().is_empty()))
}

pub fn name_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    name_opt(deserializer).map(Option::unwrap_or_default)
}

pub fn names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<NameRef>>::deserialize(deserializer)?;
    Ok(value
        .unwrap_or_default()
        .into_iter()
        .map(NameRef::into_name)
        .collect())
}
