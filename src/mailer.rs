//! Outbound Email
//!
//! One-shot dispatch of the magic-link login email through the hosted mail
//! API. A failed send is logged and reported back as `false`; it never
//! crashes the login flow.

use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use url::Url;

use crate::config::MailConfig;

pub struct Mailer {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl Mailer {
    pub fn new(config: &MailConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from_email.clone(),
        }
    }

    /// Send one HTML email. Returns whether the mail API accepted it.
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> bool {
        let payload = json!({
            "from": self.from,
            "to": [to],
            "subject": subject,
            "html": html,
        });

        let result = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::error!("Mail API returned HTTP {} for {}", response.status(), to);
                false
            }
            Err(e) => {
                tracing::error!("Failed to send email: {}", e);
                false
            }
        }
    }
}

/// Build the login link carrying the token as the `token` query parameter
pub fn magic_link(base_url: &str, token: &str) -> String {
    match Url::parse(base_url) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("token", token);
            url.to_string()
        }
        Err(_) => format!("{}?token={}", base_url, token),
    }
}

/// HTML body of the login email
pub fn login_email_html(mentor_name: &str, magic_link: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #BE1E2D;">Welcome to the Mentor Portal</h2>
    <p>Hi {mentor_name},</p>
    <p>Click the button below to access your mentor dashboard:</p>
    <p style="margin: 30px 0;">
        <a href="{magic_link}"
           style="background: linear-gradient(135deg, #BE1E2D 0%, #8B1520 100%);
                  color: white;
                  padding: 12px 30px;
                  text-decoration: none;
                  border-radius: 6px;
                  display: inline-block;">
            Access Portal
        </a>
    </p>
    <p style="color: #64748B; font-size: 14px;">
        This link will expire in 1 hour for security reasons.<br>
        If you didn't request this link, you can safely ignore this email.
    </p>
</div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_link_appends_token_param() {
        let link = magic_link("https://portal.example.com", "tok.abc");
        assert_eq!(link, "https://portal.example.com/?token=tok.abc");

        let link = magic_link("https://portal.example.com/app?ref=mail", "tok.abc");
        assert_eq!(link, "https://portal.example.com/app?ref=mail&token=tok.abc");
    }

    #[test]
    fn test_login_email_embeds_name_and_link() {
        let html = login_email_html("Dr. Ada Park", "https://portal.example.com/?token=t1");
        assert!(html.contains("Hi Dr. Ada Park,"));
        assert!(html.contains("href=\"https://portal.example.com/?token=t1\""));
    }
}
