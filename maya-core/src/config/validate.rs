//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.dialogflow.language_code.trim().is_empty() {
        errors.push("dialogflow.language_code must not be empty".to_string());
    }
    if let Some(location) = &config.dialogflow.location {
        let valid = !location.is_empty()
            && location
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            errors.push(format!(
                "dialogflow.location '{}' must be a region id like 'europe-west2'",
                location
            ));
        }
    }
    if let Some(base) = &config.dialogflow.api_base {
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            errors.push("dialogflow.api_base must be an http(s) URL".to_string());
        }
    }
    if let Some(key) = &config.dialogflow.credentials {
        if key.client_email.trim().is_empty() {
            errors.push("dialogflow.credentials.client_email must not be empty".to_string());
        }
        if key.private_key.trim().is_empty() {
            errors.push("dialogflow.credentials.private_key must not be empty".to_string());
        }
    }

    if config.chat.greeting.trim().is_empty() {
        errors.push("chat.greeting must not be empty".to_string());
    }
    if config.chat.max_sessions == 0 {
        errors.push("chat.max_sessions must be > 0".to_string());
    }
    if config.chat.session_ttl_secs == 0 {
        errors.push("chat.session_ttl_secs must be > 0".to_string());
    }

    if config.server.host.trim().is_empty() {
        errors.push("server.host must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
