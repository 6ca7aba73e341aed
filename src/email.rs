//! Transactional email through the Mailgun HTTP API.

use std::fmt;
use std::time::Duration;

use serde_json::json;

use crate::config::{AppEnv, Config};

const MAILGUN_API_URL: &str = "https://api.mailgun.net/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_AVATAR_URL: &str = "https://taskhive.app/static/logo.svg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The client cannot send at all, e.g. no API key.
    Config(String),
    Timeout(String),
    Request(String),
    /// Mailgun answered with a non-200 status.
    Provider(String),
}

impl fmt::Display for EmailError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmailError::Config(msg)
            | EmailError::Timeout(msg)
            | EmailError::Request(msg)
            | EmailError::Provider(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for EmailError {}

/// Exactly one kind of body is sent with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Html(String),
    /// Name of a stored Mailgun template, rendered with the message's template variables.
    Template(String),
}

#[derive(Debug, Clone)]
pub struct SendMessageParams {
    /// Local part of the sender; the domain is appended.
    pub from_user: String,
    pub to: Vec<String>,
    pub subject: Option<String>,
    pub body: MessageBody,
    pub template_variables: Option<serde_json::Value>,
    pub domain: Option<String>,
}

/// Splits a comma separated address list.
pub fn parse_addresses(addresses: &str) -> Vec<String> {
    addresses
        .split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

impl SendMessageParams {
    fn form_fields(&self, domain: &str) -> Vec<(&'static str, String)> {
        let mut fields = vec![("from", format!("{}@{}", self.from_user, domain))];
        fields.extend(self.to.iter().map(|address| ("to", address.clone())));
        if let Some(subject) = &self.subject {
            fields.push(("subject", subject.clone()));
        }
        match &self.body {
            MessageBody::Text(text) => fields.push(("text", text.clone())),
            MessageBody::Html(html) => fields.push(("html", html.clone())),
            MessageBody::Template(template) => fields.push(("template", template.clone())),
        }
        if let Some(variables) = &self.template_variables {
            fields.push(("h:X-Mailgun-Variables", variables.to_string()));
        }
        fields
    }
}

/// Maps a failed Mailgun response to the error reported to the caller.
fn provider_error(status: u16, message: Option<String>, url: &str) -> EmailError {
    let message = match status {
        401 => "Sending is forbidden. Probably, wrong API key".to_string(),
        404 => format!("Wrong domain in api url: {}", url),
        413 => "Request size exceeds 52.4MiB limit".to_string(),
        _ => message.unwrap_or_else(|| format!("Mailgun responded with status {}", status)),
    };
    EmailError::Provider(message)
}

/// Mailgun API client.
pub struct MailgunClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    domain: String,
    app_env: AppEnv,
    public_host: String,
    frontend_host: String,
}

impl MailgunClient {
    pub fn new(config: &Config) -> Result<Self, EmailError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EmailError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: config.mailgun_api_key.clone(),
            domain: config.mailgun_domain.clone(),
            app_env: config.app_env,
            public_host: config.public_host.clone(),
            frontend_host: config.frontend_host.clone(),
        })
    }

    fn api_url(&self, domain: &str) -> String {
        format!("{}/{}/messages", MAILGUN_API_URL, domain)
    }

    /// Sends one message. Outside `prod` and `dev` nothing leaves the process.
    pub async fn send_message(&self, params: SendMessageParams) -> Result<(), EmailError> {
        let domain = params.domain.as_deref().unwrap_or(&self.domain);
        let url = self.api_url(domain);

        if !self.app_env.sends_email() {
            log::warn!(
                "Message is not actually sent to {:?}. Check APP_ENV.",
                params.to
            );
            return Ok(());
        }

        let api_key = self.api_key.as_deref().ok_or_else(|| {
            let err = "MAILGUN_API_KEY must be provided to send messages".to_string();
            log::error!("{}", err);
            EmailError::Config(err)
        })?;

        let response = self
            .http_client
            .post(&url)
            .basic_auth("api", Some(api_key))
            .form(&params.form_fields(domain))
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    EmailError::Timeout(format!(
                        "Timeout, can't send email to {:?}: {}",
                        params.to, e
                    ))
                } else {
                    EmailError::Request(format!("Can't send email to {:?}: {}", params.to, e))
                };
                log::error!("{}", err);
                err
            })?;

        let status = response.status().as_u16();
        if status == 200 {
            log::info!("Email sent to {:?}", params.to);
            return Ok(());
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(String::from));
        let err = provider_error(status, message, &url);
        log::error!("{}", err);
        Err(err)
    }

    pub async fn send_email_confirmation(
        &self,
        verify_email_token: &str,
        to_address: &str,
        avatar_url: Option<&str>,
        username: Option<&str>,
    ) -> Result<(), EmailError> {
        let confirm_link = format!(
            "https://{}/auth/verifyemail/{}",
            self.public_host, verify_email_token
        );

        self.send_message(SendMessageParams {
            from_user: "confirmemail".to_string(),
            to: parse_addresses(to_address),
            subject: Some("Email confirmation".to_string()),
            body: MessageBody::Template("verify-email".to_string()),
            template_variables: Some(json!({
                "avatar": avatar_url.unwrap_or(DEFAULT_AVATAR_URL),
                "username": username,
                "email": to_address,
                "confirm_link": confirm_link,
            })),
            domain: None,
        })
        .await
    }

    pub async fn send_refresh_password(
        &self,
        refresh_password_token: &str,
        to_address: &str,
        avatar_url: Option<&str>,
        username: Option<&str>,
    ) -> Result<(), EmailError> {
        let reset_link = format!(
            "https://{}/refresh-password/{}",
            self.frontend_host, refresh_password_token
        );

        self.send_message(SendMessageParams {
            from_user: "no-reply".to_string(),
            to: parse_addresses(to_address),
            subject: Some("Refresh password".to_string()),
            body: MessageBody::Template("forgot-password".to_string()),
            template_variables: Some(json!({
                "avatar": avatar_url.unwrap_or(DEFAULT_AVATAR_URL),
                "username": username,
                "reset_link": reset_link,
            })),
            domain: None,
        })
        .await
    }
}
