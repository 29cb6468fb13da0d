//! Login audit log entities

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginLog {
    pub id: String,
    pub member_id: String,
    pub login_type: LoginChannel,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoginLogRequest {
    pub member_id: String,
    pub login_type: LoginChannel,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Client surface the login came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoginChannel {
    #[default]
    Web,
    Mobile,
}

impl LoginChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginChannel::Web => "web",
            LoginChannel::Mobile => "mobile",
        }
    }
}

impl fmt::Display for LoginChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoginChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(LoginChannel::Web),
            "mobile" => Ok(LoginChannel::Mobile),
            other => Err(format!("unknown login channel '{other}'")),
        }
    }
}
