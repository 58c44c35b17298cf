//! Request and response bodies for the onboarding backend.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Backend operations, one per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SaveConfig,
    FetchConfig,
    Register,
    UpdateProfile,
    ListUsers,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Self::SaveConfig,
        Self::FetchConfig,
        Self::Register,
        Self::UpdateProfile,
        Self::ListUsers,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::SaveConfig => "/save-config",
            Self::FetchConfig => "/get-config",
            Self::Register => "/register/",
            Self::UpdateProfile => "/login/update-profile/",
            Self::ListUsers => "/data",
        }
    }

    pub fn is_post(&self) -> bool {
        matches!(self, Self::SaveConfig | Self::Register | Self::UpdateProfile)
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SaveConfig => "save_config",
            Self::FetchConfig => "fetch_config",
            Self::Register => "register",
            Self::UpdateProfile => "update_profile",
            Self::ListUsers => "list_users",
        };
        write!(f, "{s}")
    }
}

/// User identifier assigned by registration. The backend sends an integer;
/// strings are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => UserId(n.to_string()),
            Raw::Str(s) => UserId(s),
        })
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `POST /register/` body.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// `POST /register/` response. Profile fields are echoed for returning users.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
}

/// `POST /login/update-profile/` body.
#[derive(Debug, Serialize)]
pub struct ProfileUpdate {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub birthdate: String,
    pub address: String,
    pub about: String,
}

/// One row of the `GET /data` report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecord {
    #[serde(alias = "user_id")]
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
