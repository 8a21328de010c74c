use crate::utils::error::{Result, StatsError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(StatsError::Input {
            message: format!("{}: URL cannot be empty", field_name),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(StatsError::Input {
                message: format!("{}: unsupported URL scheme: {}", field_name, scheme),
            }),
        },
        Err(e) => Err(StatsError::Input {
            message: format!("{}: invalid URL format: {}", field_name, e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StatsError::Input {
            message: format!("{}: value cannot be empty or whitespace-only", field_name),
        });
    }
    Ok(())
}

pub fn validate_positive_uid(field_name: &str, uid: u64) -> Result<()> {
    if uid == 0 {
        return Err(StatsError::Input {
            message: format!("{}: uid must be a positive integer", field_name),
        });
    }
    Ok(())
}
