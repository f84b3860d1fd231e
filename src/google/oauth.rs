//! Browser-based OAuth for Google, using a loopback redirect.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use google_calendar::Client;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::credentials::{Authorizer, ClientSecret, Credential};

const LOOPBACK_ADDRESS: &str = "127.0.0.1:0";

/// Google's installed-app flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleAuthorizer;

impl Authorizer for GoogleAuthorizer {
    async fn authorize(&self, secret: &ClientSecret, scopes: &[String]) -> Result<Credential> {
        // Bind first so the redirect URI can carry the port the OS picked
        let listener = TcpListener::bind(LOOPBACK_ADDRESS)
            .await
            .context("Failed to bind OAuth callback listener")?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://localhost:{}/", port);

        let mut client = Client::new(
            secret.client_id.clone(),
            secret.client_secret.clone(),
            redirect_uri,
            String::new(),
            String::new(),
        );

        let auth_url = client.user_consent_url(scopes);

        println!("\nOpen this URL in your browser to authenticate:\n");
        println!("{}\n", auth_url);

        // Try to open the browser automatically
        if open::that(&auth_url).is_err() {
            println!("(Could not open browser automatically, please copy the URL above)");
        }

        let (code, state) = wait_for_callback(listener).await?;

        println!("\nReceived authorization code, exchanging for tokens...");

        let access_token = client
            .get_access_token(&code, &state)
            .await
            .context("Failed to exchange code for tokens")?;

        println!("Authentication successful!");

        Ok(credential_from(
            access_token.access_token,
            access_token.refresh_token,
            access_token.expires_in,
            String::new(),
            scopes.to_vec(),
        ))
    }

    async fn refresh(&self, secret: &ClientSecret, credential: &Credential) -> Result<Credential> {
        let client = Client::new(
            secret.client_id.clone(),
            secret.client_secret.clone(),
            String::new(),
            credential.access_token.clone(),
            credential.refresh_token.clone(),
        );

        let access_token = client
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        Ok(credential_from(
            access_token.access_token,
            access_token.refresh_token,
            access_token.expires_in,
            credential.refresh_token.clone(),
            credential.scopes.clone(),
        ))
    }
}

/// Google usually leaves `refresh_token` empty on refresh; keep `previous_refresh` then.
fn credential_from(
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    previous_refresh: String,
    scopes: Vec<String>,
) -> Credential {
    let refresh_token = if refresh_token.is_empty() {
        previous_refresh
    } else {
        refresh_token
    };

    Credential {
        access_token,
        refresh_token,
        expires_at: Utc::now() + Duration::seconds(expires_in),
        scopes,
    }
}

/// Accept one redirect and pull `code` and `state` out of its query string
async fn wait_for_callback(listener: TcpListener) -> Result<(String, String)> {
    println!(
        "Waiting for OAuth callback on port {}...",
        listener.local_addr()?.port()
    );

    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    let (code, state) = parse_callback(&request_line)?;

    // Send a response to the browser
    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>Authentication successful!</h1>\
        <p>You can close this window and return to the terminal.</p>\
        </body></html>";

    let mut stream = reader.into_inner();
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;

    Ok((code, state))
}

/// Request line looks like: GET /?code=xxx&state=yyy HTTP/1.1
fn parse_callback(request_line: &str) -> Result<(String, String)> {
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Invalid HTTP request"))?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    if let Some((_, error)) = url.query_pairs().find(|(k, _)| k == "error") {
        anyhow::bail!("Authorization was denied: {}", error);
    }

    let code = url
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
        .ok_or_else(|| anyhow::anyhow!("No code in callback"))?;

    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.to_string())
        .unwrap_or_default();

    Ok((code, state))
}
