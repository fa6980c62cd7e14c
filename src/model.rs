//! Records exchanged with the remote users service.
//!
//! Only the fields the screen shows are typed. Everything else the service
//! sends (`username`, `website`, `company`, ...) is kept in `extra` so it
//! survives a merge untouched.
//!
//! Decoding is lenient where services disagree: a `null` text field reads as
//! empty and an id may arrive as a number or a numeric string.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Remote-assigned user identifier.
pub type UserId = u64;

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
}

fn user_id<'de, D: Deserializer<'de>>(de: D) -> Result<UserId, D::Error> {
    match WireId::deserialize(de)? {
        WireId::Number(id) => Ok(id),
        WireId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid user id {text:?}"))),
    }
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// A key that is present always counts, even when its value is `null`.
fn present<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    null_as_default(de).map(Some)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zipcode: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Address {
    pub fn new(city: impl Into<String>, zipcode: impl Into<String>) -> Self {
        Self { city: city.into(), zipcode: zipcode.into(), extra: Map::new() }
    }
}

/// One record of the remote collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "user_id")]
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: Address,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// "City Zipcode" as shown in the table.
    pub fn city_with_zip(&self) -> String {
        format!("{} {}", self.address.city, self.address.zipcode)
    }

    /// Shallow merge: fields present in `patch` overwrite, absent ones are kept.
    ///
    /// `address` is a single field at this level, so a present address
    /// replaces the old one wholesale.
    pub fn merge(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        for (key, value) in patch.extra {
            self.extra.insert(key, value);
        }
    }
}

/// User-shaped record with optional fields.
///
/// Used both as the body of an update and as the service's echoed reply,
/// which may carry only a subset of the fields.
///
/// `None` means the key was absent. An echoed `null` decodes as an empty
/// value, so merging it clears the old one the way the service sees it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(deserialize_with = "user_id")]
    pub id: UserId,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserPatch {
    pub fn new(id: UserId) -> Self {
        Self { id, ..Self::default() }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn address(mut self, city: impl Into<String>, zipcode: impl Into<String>) -> Self {
        self.address = Some(Address::new(city, zipcode));
        self
    }
}
