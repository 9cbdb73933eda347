//! User endpoints: registration, login, logout and profiles.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, CredentialRepository, UserId};
use crate::http::{ApiError, HandlerResult, Reply, RequestContext};

/// Body accepted by register and login.
#[derive(Debug, Deserialize)]
struct CredentialsBody {
    username: Option<String>,
    password: Option<String>,
}

impl CredentialsBody {
    fn into_pair(self) -> Result<(String, String), ApiError> {
        match (self.username, self.password) {
            (Some(username), Some(password)) if !username.trim().is_empty() => {
                Ok((username, password))
            }
            _ => Err(ApiError::bad_request("username and password required")),
        }
    }
}

#[derive(Serialize)]
struct MessageBody {
    message: &'static str,
}

#[derive(Serialize)]
struct LoginBody {
    token: String,
    username: String,
}

#[derive(Serialize)]
struct ProfileBody {
    id: UserId,
    username: String,
}

pub struct UsersController {
    auth: Arc<AuthService>,
    credentials: Arc<dyn CredentialRepository>,
}

impl UsersController {
    pub fn new(auth: Arc<AuthService>, credentials: Arc<dyn CredentialRepository>) -> Self {
        Self { auth, credentials }
    }

    /// `POST /api/users/register`
    pub async fn register(self: Arc<Self>, ctx: RequestContext) -> HandlerResult {
        let (username, password) = ctx.json::<CredentialsBody>()?.into_pair()?;
        self.auth.register(&username, &password).await?;
        Ok(Reply::created(&MessageBody {
            message: "User created",
        }))
    }

    /// `POST /api/users/login`
    pub async fn login(self: Arc<Self>, ctx: RequestContext) -> HandlerResult {
        let (username, password) = ctx.json::<CredentialsBody>()?.into_pair()?;
        let outcome = self.auth.login(&username, &password).await?;
        Ok(Reply::ok(&LoginBody {
            token: outcome.token,
            username: outcome.user.username,
        }))
    }

    /// `POST /api/users/logout`
    pub async fn logout(self: Arc<Self>, ctx: RequestContext) -> HandlerResult {
        let session = self.auth.try_authenticate(ctx.authorization())?;
        self.auth.logout(&session.token);
        Ok(Reply::ok(&MessageBody {
            message: "Logged out",
        }))
    }

    /// `GET /api/users/{username}/profile`
    pub async fn profile(self: Arc<Self>, ctx: RequestContext) -> HandlerResult {
        self.auth.try_authenticate(ctx.authorization())?;

        let username = ctx
            .param("username")
            .ok_or_else(|| ApiError::bad_request("username missing in path"))?;

        let credential = self
            .credentials
            .get_by_username(username)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        Ok(Reply::ok(&ProfileBody {
            id: credential.id,
            username: credential.username,
        }))
    }
}
