use crate::config::IdentityConfig;
use crate::error::identity::IdentityError;
use crate::identity::{Credential, IdentityProvider};

use common::{HttpStatusCode, RedactedToken};

use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use futures_util::future::BoxFuture;
use log::{debug, info, warn};
use reqwest::Client;
use tokio::time::sleep as TokioSleep;
use url::Url;

const JOIN_SERVER_PATH: &str = "api/v1/joinServer";
const SERVER_KEY_HEADER: &str = "X-Server-Key";

/// Verifies challenges against the identity core's `joinServer` endpoint.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    join_url: Url,
    max_elapsed: Duration,
    credential: Option<Credential>,
}

impl HttpIdentityProvider {
    pub fn new(
        core_url: &str,
        request_timeout: Duration,
        max_elapsed: Duration,
        credential: Option<Credential>,
    ) -> Result<Self, IdentityError> {
        let mut base = Url::parse(core_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let join_url = base.join(JOIN_SERVER_PATH)?;
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| IdentityError::configuration(e.to_string()))?;
        Ok(Self {
            client,
            join_url,
            max_elapsed,
            credential,
        })
    }

    pub fn from_config(
        config: &IdentityConfig,
        credential: Option<Credential>,
    ) -> Result<Self, IdentityError> {
        Self::new(
            &config.core_url,
            Duration::from_secs(config.request_timeout_secs),
            Duration::from_secs(config.max_elapsed_secs),
            credential,
        )
    }

    pub fn join_url(&self) -> &Url {
        &self.join_url
    }
}

impl IdentityProvider for HttpIdentityProvider {
    fn current_credential(&self) -> Option<Credential> {
        self.credential.clone()
    }

    fn verify_server_challenge(
        &self,
        access_token: RedactedToken,
        challenge_key: String,
    ) -> BoxFuture<'static, Result<(), IdentityError>> {
        let client = self.client.clone();
        let join_url = self.join_url.clone();
        let max_elapsed = self.max_elapsed;
        Box::pin(async move {
            let mut backoff = ExponentialBackoff {
                max_elapsed_time: Some(max_elapsed),
                ..Default::default()
            };
            loop {
                match join_server(&client, &join_url, &access_token, &challenge_key).await {
                    Ok(()) => {
                        info!("Identity core accepted the server challenge");
                        return Ok(());
                    }
                    Err(e) if e.is_retryable() => match backoff.next_backoff() {
                        Some(duration) => {
                            debug!(
                                "Identity check failed ({}), retrying after {:?}",
                                e.error_category(),
                                duration
                            );
                            TokioSleep(duration).await;
                        }
                        None => {
                            warn!("Identity check gave up after {:?}: {}", max_elapsed, e);
                            return Err(e);
                        }
                    },
                    Err(e) => {
                        warn!("Identity check failed: {}", e);
                        return Err(e);
                    }
                }
            }
        })
    }
}

async fn join_server(
    client: &Client,
    join_url: &Url,
    access_token: &RedactedToken,
    challenge_key: &str,
) -> Result<(), IdentityError> {
    let response = client
        .post(join_url.clone())
        .header(reqwest::header::AUTHORIZATION, access_token.expose())
        .header(SERVER_KEY_HEADER, challenge_key)
        .send()
        .await
        .map_err(|e| IdentityError::from_reqwest(&e))?;

    let status = HttpStatusCode(response.status().as_u16());
    if status == HttpStatusCode::OK {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(IdentityError::rejected(status.0, body))
}
