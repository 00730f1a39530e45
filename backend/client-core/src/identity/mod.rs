//! Identity of the signed-in user and server challenge verification.
//!
//! A server may answer the client hello with an `IdentityRequest`. The client
//! proves who it is by having the identity core vouch for its access token
//! against the server's challenge key.

pub mod http;

pub use http::HttpIdentityProvider;

use crate::error::identity::IdentityError;

use common::RedactedToken;

use std::env;
use std::path::PathBuf;

use futures_util::future::BoxFuture;
use log::{debug, info, warn};

pub const USER_ID_VAR: &str = "HIBISCUS_USER_ID";
pub const DISPLAY_NAME_VAR: &str = "HIBISCUS_DISPLAY_NAME";
pub const PHOTO_URL_VAR: &str = "HIBISCUS_PHOTO_URL";
pub const ACCESS_TOKEN_VAR: &str = "HIBISCUS_ACCESS_TOKEN";

/// The signed-in user. Guests have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user_id: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub access_token: RedactedToken,
}

impl Credential {
    /// Read the credential from the environment, loading `.env` first if present.
    ///
    /// Returns `None` (guest) when the user id or the access token is missing.
    pub fn from_env() -> Option<Credential> {
        let env_file = try_load_dotenv();
        if env_file.is_none() {
            debug!("No .env file found, using process environment");
        }

        let user_id = non_empty_var(USER_ID_VAR)?;
        let Some(access_token) = non_empty_var(ACCESS_TOKEN_VAR) else {
            warn!("{} is set without {}, continuing as guest", USER_ID_VAR, ACCESS_TOKEN_VAR);
            return None;
        };
        let display_name = non_empty_var(DISPLAY_NAME_VAR).unwrap_or_else(|| user_id.clone());
        info!("Signed in as {} from environment", user_id);
        Some(Credential {
            user_id,
            display_name,
            photo_url: non_empty_var(PHOTO_URL_VAR),
            access_token: RedactedToken::new(access_token),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Load `.env` from the working directory, then from beside the executable.
fn try_load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {:?}", path);
        return Some(path);
    }

    let exe_dir = env::current_exe().ok()?.parent()?.to_path_buf();
    let env_path = exe_dir.join(".env");
    if !env_path.exists() {
        return None;
    }
    match dotenvy::from_path(&env_path) {
        Ok(()) => {
            info!("Loaded .env from: {:?}", env_path);
            Some(env_path)
        }
        Err(e) => {
            warn!("Failed to parse .env at {:?}: {}", env_path, e);
            None
        }
    }
}

/// Source of the current credential and verifier of server challenges.
pub trait IdentityProvider: Send + Sync {
    fn current_credential(&self) -> Option<Credential>;

    /// Have the identity core accept `challenge_key` for this token.
    ///
    /// The future owns everything it needs; dropping it abandons the check.
    fn verify_server_challenge(
        &self,
        access_token: RedactedToken,
        challenge_key: String,
    ) -> BoxFuture<'static, Result<(), IdentityError>>;
}

/// Fixed credential with a fixed verdict. Without a credential it is a guest.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    credential: Option<Credential>,
    accept_challenges: bool,
}

impl StaticIdentity {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn signed_in(credential: Credential, accept_challenges: bool) -> Self {
        Self {
            credential: Some(credential),
            accept_challenges,
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_credential(&self) -> Option<Credential> {
        self.credential.clone()
    }

    fn verify_server_challenge(
        &self,
        _access_token: RedactedToken,
        _challenge_key: String,
    ) -> BoxFuture<'static, Result<(), IdentityError>> {
        let verdict = if self.accept_challenges {
            Ok(())
        } else {
            Err(IdentityError::rejected(401, "challenge rejected"))
        };
        Box::pin(futures_util::future::ready(verdict))
    }
}
