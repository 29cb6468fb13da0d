//! HTTP client for the managed identity service's admin API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use membercard_config::IdentityConfig;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    ExternalIdentity, IdentityError, IdentityMetadata, IdentityProvider, IdentityResult,
    NewIdentity,
};

const LOOKUP_PAGE_SIZE: &str = "50";

/// Talks to the `/auth/v1` admin endpoints using the service key.
#[derive(Clone)]
pub struct AdminApiClient {
    http: Client,
    base_url: String,
    service_key: String,
}

impl AdminApiClient {
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> IdentityResult<Self> {
        let http = Client::builder()
            .user_agent("membercard-backend")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        })
    }

    /// Build a client from configuration; a service key is mandatory.
    pub fn from_config(config: &IdentityConfig) -> IdentityResult<Self> {
        let service_key = config
            .service_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| IdentityError::NotConfigured("identity.service_key is not set".into()))?;

        Self::new(
            config.base_url.clone(),
            service_key,
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/auth/v1{}", self.base_url, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

#[async_trait]
impl IdentityProvider for AdminApiClient {
    async fn find_by_email(&self, email: &str) -> IdentityResult<Option<ExternalIdentity>> {
        let response = self
            .request(Method::GET, "/admin/users")
            .query(&[("filter", email), ("page", "1"), ("per_page", LOOKUP_PAGE_SIZE)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let listing: UserListPayload = decode(response).await?;
        let found = listing
            .users
            .into_iter()
            .find(|user| {
                user.email
                    .as_deref()
                    .is_some_and(|candidate| candidate.eq_ignore_ascii_case(email))
            })
            .map(ExternalIdentity::try_from)
            .transpose()?;

        debug!(email, found = found.is_some(), "looked up identity by email");
        Ok(found)
    }

    async fn create(&self, identity: &NewIdentity) -> IdentityResult<ExternalIdentity> {
        let body = CreateUserBody {
            email: &identity.email,
            password: &identity.password,
            email_confirm: identity.email_confirm,
            user_metadata: &identity.metadata,
        };

        let response = self
            .request(Method::POST, "/admin/users")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let created = ExternalIdentity::try_from(decode::<UserPayload>(response).await?)?;
        info!(identity_id = %created.id, email = %created.email, "identity created");
        Ok(created)
    }

    async fn delete(&self, id: &str) -> IdentityResult<()> {
        let response = self
            .request(Method::DELETE, &format!("/admin/users/{id}"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        info!(identity_id = %id, "identity deleted");
        Ok(())
    }

    async fn verify_password(&self, email: &str, password: &str) -> IdentityResult<bool> {
        let response = self
            .request(Method::POST, "/token")
            .query(&[("grant_type", "password")])
            .json(&PasswordGrantBody { email, password })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }

        let error = error_from_response(response).await;
        match error {
            IdentityError::Rejected { ref message, .. }
                if status == StatusCode::BAD_REQUEST && is_invalid_grant(message) =>
            {
                debug!(email, "identity service refused password grant");
                Ok(false)
            }
            other => Err(other),
        }
    }

    async fn set_password(&self, id: &str, password: &str) -> IdentityResult<()> {
        let response = self
            .request(Method::PUT, &format!("/admin/users/{id}"))
            .json(&UpdatePasswordBody { password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        info!(identity_id = %id, "identity password updated");
        Ok(())
    }

    async fn set_email(&self, id: &str, email: &str) -> IdentityResult<()> {
        let response = self
            .request(Method::PUT, &format!("/admin/users/{id}"))
            .json(&UpdateEmailBody {
                email,
                email_confirm: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        info!(identity_id = %id, email, "identity email updated");
        Ok(())
    }

    async fn set_metadata(&self, id: &str, metadata: &IdentityMetadata) -> IdentityResult<()> {
        let response = self
            .request(Method::PUT, &format!("/admin/users/{id}"))
            .json(&UpdateMetadataBody {
                user_metadata: metadata,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        debug!(identity_id = %id, "identity metadata updated");
        Ok(())
    }
}

#[derive(Serialize)]
struct CreateUserBody<'a> {
    email: &'a str,
    password: &'a str,
    email_confirm: bool,
    user_metadata: &'a IdentityMetadata,
}

#[derive(Serialize)]
struct PasswordGrantBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct UpdatePasswordBody<'a> {
    password: &'a str,
}

#[derive(Serialize)]
struct UpdateEmailBody<'a> {
    email: &'a str,
    email_confirm: bool,
}

#[derive(Serialize)]
struct UpdateMetadataBody<'a> {
    user_metadata: &'a IdentityMetadata,
}

#[derive(Debug, Deserialize)]
struct UserListPayload {
    #[serde(default)]
    users: Vec<UserPayload>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    email: Option<String>,
    email_confirmed_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    user_metadata: Option<IdentityMetadata>,
}

impl TryFrom<UserPayload> for ExternalIdentity {
    type Error = IdentityError;

    fn try_from(payload: UserPayload) -> Result<Self, Self::Error> {
        let email = payload.email.ok_or_else(|| {
            IdentityError::InvalidResponse(format!("identity {} has no email", payload.id))
        })?;

        Ok(ExternalIdentity {
            id: payload.id,
            email,
            email_confirmed: payload.email_confirmed_at.is_some(),
            created_at: payload.created_at,
            metadata: payload.user_metadata.unwrap_or_default(),
        })
    }
}

/// The service reports errors in a few shapes depending on the endpoint.
#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl ErrorPayload {
    fn describe(&self) -> Option<String> {
        let text = self
            .msg
            .as_ref()
            .or(self.message.as_ref())
            .or(self.error_description.as_ref())?;

        let code = self.error_code.as_ref().or(self.error.as_ref());
        Some(match code {
            Some(code) => format!("{code}: {text}"),
            None => text.clone(),
        })
    }

    fn is_existing_email(&self) -> bool {
        if matches!(
            self.error_code.as_deref(),
            Some("email_exists" | "user_already_exists")
        ) {
            return true;
        }

        self.msg
            .as_deref()
            .or(self.message.as_deref())
            .map(str::to_ascii_lowercase)
            .is_some_and(|text| text.contains("already been registered") || text.contains("already registered"))
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> IdentityResult<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| IdentityError::InvalidResponse(e.to_string()))
}

async fn error_from_response(response: Response) -> IdentityError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let payload: ErrorPayload = serde_json::from_str(&body).unwrap_or_default();

    if status == StatusCode::NOT_FOUND {
        return IdentityError::NotFound;
    }

    if payload.is_existing_email() {
        return IdentityError::AlreadyRegistered;
    }

    let message = payload.describe().unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            trimmed.to_string()
        }
    });

    debug!(status = status.as_u16(), %message, "identity service returned an error");

    IdentityError::Rejected {
        status: status.as_u16(),
        message,
    }
}

fn is_invalid_grant(message: &str) -> bool {
    message.starts_with("invalid_grant") || message.starts_with("invalid_credentials")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_requires_service_key() {
        let config = IdentityConfig::default();
        let result = AdminApiClient::from_config(&config);
        assert!(matches!(result, Err(IdentityError::NotConfigured(_))));
    }

    #[test]
    fn error_payload_recognises_existing_email() {
        let payload: ErrorPayload = serde_json::from_str(
            r#"{"code":422,"error_code":"email_exists","msg":"A user with this email address has already been registered"}"#,
        )
        .unwrap();
        assert!(payload.is_existing_email());

        let legacy: ErrorPayload = serde_json::from_str(
            r#"{"msg":"A user with this email address has already been registered"}"#,
        )
        .unwrap();
        assert!(legacy.is_existing_email());

        let other: ErrorPayload =
            serde_json::from_str(r#"{"msg":"Password should be at least 6 characters"}"#).unwrap();
        assert!(!other.is_existing_email());
    }

    #[test]
    fn error_payload_describes_grant_errors() {
        let payload: ErrorPayload = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )
        .unwrap();
        let message = payload.describe().unwrap();
        assert_eq!(message, "invalid_grant: Invalid login credentials");
        assert!(is_invalid_grant(&message));
    }
}
