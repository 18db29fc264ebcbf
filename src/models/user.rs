use serde::{Deserialize, Serialize};

/// Closed set of social sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    Kakao,
    Naver,
    Google,
}

impl SocialProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialProvider::Kakao => "kakao",
            SocialProvider::Naver => "naver",
            SocialProvider::Google => "google",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "kakao" => Some(SocialProvider::Kakao),
            "naver" => Some(SocialProvider::Naver),
            "google" => Some(SocialProvider::Google),
            _ => None,
        }
    }
}

/// A registered identity. Social-only accounts carry no email or password.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub provider: Option<SocialProvider>,
    #[serde(skip_serializing)]
    pub provider_id: Option<String>,
    pub is_admin: bool,
    pub created: i64,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub provider: Option<SocialProvider>,
    pub provider_id: Option<String>,
    pub is_admin: bool,
}

/// The identity performing an operation, resolved from a bearer credential.
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Actor {
            id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}
