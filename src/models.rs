//! Domain types returned by the Gossip API.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Deserialize)]
#[serde(untagged)]
enum WireEnum {
    Int(i64),
    Text(String),
}

// Enums travel as integers on requests but may come back as either the
// integer or the snake_case name.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $code:literal => $text:literal $(| $alias:literal)*),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn code(&self) -> i64 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name.trim().to_ascii_lowercase().as_str() {
                    $($text $(| $alias)* => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_i64(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let parsed = match WireEnum::deserialize(deserializer)? {
                    WireEnum::Int(code) => Self::from_code(code),
                    WireEnum::Text(text) => text
                        .parse::<i64>()
                        .ok()
                        .and_then(Self::from_code)
                        .or_else(|| Self::from_name(&text)),
                };
                parsed.ok_or_else(|| {
                    de::Error::custom(concat!("unrecognized ", stringify!($name), " value"))
                })
            }
        }
    };
}

/// Reads an optional enum field, treating a value outside the known table as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(raw) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(raw.clone()) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::debug!(value = %raw, error = %e, "ignoring unrecognized enum value");
            Ok(None)
        }
    }
}

wire_enum! {
    Gender {
        Female = 0 => "female",
        Male = 1 => "male",
        Unknown = 2 => "unknown" | "unkown",
    }
}

wire_enum! {
    RelationshipStatus {
        Single = 0 => "single",
        InRelationship = 1 => "in_a_relationship" | "in_relationship",
        Married = 2 => "married",
    }
}

wire_enum! {
    Role {
        User = 1 => "user",
        Admin = 2 => "admin",
    }
}

wire_enum! {
    UserStatus {
        Active = 0 => "active",
        Inactive = 1 => "inactive",
        Banned = 2 => "banned",
    }
}

/// The signed-in account as returned by sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    /// Fields this client does not model, kept so a persisted session loses nothing.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => self
                .username
                .clone()
                .unwrap_or_else(|| format!("user #{}", self.id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarData {
    #[serde(default)]
    pub url: Option<String>,
}

/// A user's public profile, as served to the owner (host) or to visitors (guest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "lenient")]
    pub relationship_status: Option<RelationshipStatus>,
    #[serde(default)]
    pub allow_direct_follows: Option<bool>,
    #[serde(default)]
    pub is_gender_public: Option<bool>,
    #[serde(default)]
    pub is_email_public: Option<bool>,
    #[serde(default)]
    pub is_rel_status_public: Option<bool>,
    #[serde(default)]
    pub avatar_data: Option<AvatarData>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Profile {
    pub fn avatar(&self) -> Option<&str> {
        self.avatar_data
            .as_ref()
            .and_then(|a| a.url.as_deref())
            .or(self.avatar_url.as_deref())
    }

    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `GET /profiles/avatar/{id}` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub avatar_data: Option<AvatarData>,
}

impl Avatar {
    pub fn url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or_else(|| self.avatar_data.as_ref().and_then(|a| a.url.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchMeta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// One page of `GET /profiles/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub data: Vec<Profile>,
    #[serde(default)]
    pub meta: Option<SearchMeta>,
}

impl SearchPage {
    /// Total page count, from `meta.pagination.total_pages` or `meta.total_pages`; at least 1.
    pub fn total_pages(&self) -> u32 {
        let meta = self.meta.as_ref();
        meta.and_then(|m| m.pagination.as_ref())
            .and_then(|p| p.total_pages)
            .filter(|n| *n > 0)
            .or_else(|| meta.and_then(|m| m.total_pages).filter(|n| *n > 0))
            .unwrap_or(1)
    }
}

/// Token and identity extracted from a sign-in payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SignInResponse {
    pub access_token: String,
    pub user: Option<User>,
}

impl SignInResponse {
    /// Reads `token`, `accessToken` or `data.token`, and `user` or `data.user`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let nested = value.get("data");
        let token = ["token", "accessToken", "access_token"]
            .iter()
            .find_map(|k| value.get(*k).and_then(Value::as_str))
            .or_else(|| nested.and_then(|d| d.get("token")).and_then(Value::as_str))
            .filter(|t| !t.is_empty())?;
        let user = value
            .get("user")
            .or_else(|| nested.and_then(|d| d.get("user")))
            .and_then(|u| serde_json::from_value(u.clone()).ok());
        Some(Self {
            access_token: token.to_string(),
            user,
        })
    }
}

/// Outcome shown after following an activation link, read from its
/// `confirmed` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationStatus {
    Confirmed,
    Invalid,
    AlreadyConfirmed,
    /// Parameter missing or unrecognized; the user should be sent to sign-in.
    Unknown,
}

impl ActivationStatus {
    pub fn from_confirmed(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("true") => Self::Confirmed,
            Some("invalid") => Self::Invalid,
            Some("already") | Some("already_confirmed") => Self::AlreadyConfirmed,
            _ => Self::Unknown,
        }
    }

    /// Parses the `confirmed` parameter out of a full redirect URL.
    pub fn from_url(raw: &str) -> Self {
        let Ok(parsed) = url::Url::parse(raw) else {
            return Self::Unknown;
        };
        let confirmed = parsed
            .query_pairs()
            .find(|(k, _)| k == "confirmed")
            .map(|(_, v)| v.into_owned());
        Self::from_confirmed(confirmed.as_deref())
    }

    /// Whether the user may resend the activation email from this state.
    pub fn can_resend(&self) -> bool {
        matches!(self, Self::Invalid)
    }
}
