/// Email delivery over SMTP, used for password-reset links.
use anyhow::{anyhow, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::SmtpTransport;
use lettre::{Message, Transport};

use crate::config::SmtpConfig;

pub struct EmailService {
    config: SmtpConfig,
}

impl EmailService {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn create_transport(&self) -> SmtpTransport {
        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        SmtpTransport::builder_dangerous(&self.config.host)
            .port(self.config.port)
            .credentials(creds)
            .build()
    }

    pub fn send_password_reset(&self, to_email: &str, to_name: &str, reset_url: &str) -> Result<()> {
        let email = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|e| anyhow!("invalid sender address: {e}"))?,
            )
            .to(format!("{to_name} <{to_email}>")
                .parse()
                .map_err(|e| anyhow!("invalid recipient address: {e}"))?)
            .subject("Password reset")
            .header(ContentType::TEXT_HTML)
            .body(reset_email_body(to_name, reset_url))
            .map_err(|e| anyhow!("failed to build email: {e}"))?;

        self.create_transport()
            .send(&email)
            .map_err(|e| anyhow!("failed to send email: {e}"))?;

        tracing::info!(to = %to_email, "password reset email sent");
        Ok(())
    }
}

fn reset_email_body(name: &str, reset_url: &str) -> String {
    format!(
        "<p>Hello {name},</p>\
         <p>You requested a password reset. Click the link below to choose a new password. \
         The link is valid for 30 minutes.</p>\
         <p><a href=\"{reset_url}\">{reset_url}</a></p>\
         <p>If you did not request this, you can safely ignore this email.</p>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_body_contains_the_link_and_name() {
        let body = reset_email_body("Aysel", "https://shop.example/password/reset/abc");
        assert!(body.contains("Aysel"));
        assert!(body.contains("https://shop.example/password/reset/abc"));
    }
}
