//! Small validation helpers shared by the document types.

use crate::error::{ShopError, ShopResult};

/// Prefix every stored image URL must carry (hosted image CDN)
pub const IMAGE_HOST_PREFIX: &str = "https://res.cloudinary.com/";

/// Trimmed, non-empty string with a character count inside `min..=max`.
pub fn length(field: &str, value: &str, min: usize, max: usize) -> ShopResult<String> {
    let trimmed = value.trim();
    let count = trimmed.chars().count();
    if count < min || count > max {
        return Err(ShopError::validation(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(trimmed.to_string())
}

/// Non-blank string.
pub fn required(field: &str, value: &str) -> ShopResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ShopError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

pub fn image_url(field: &str, url: &str) -> ShopResult<String> {
    if !url.starts_with(IMAGE_HOST_PREFIX) {
        return Err(ShopError::validation(format!(
            "Invalid {}: {}. Must be a valid Cloudinary URL",
            field, url
        )));
    }
    Ok(url.to_string())
}

/// Loose shape check; the address is only stored, never mailed.
pub fn email(value: &str) -> ShopResult<String> {
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(trimmed.to_lowercase())
        }
        _ => Err(ShopError::validation(format!("Invalid email: {}", trimmed))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        assert_eq!(length("Title", "  Hello  ", 3, 10).unwrap(), "Hello");
        assert!(length("Title", "Hi", 3, 10).is_err());
        assert!(length("Title", "Hello world!", 3, 10).is_err());
    }

    #[test]
    fn test_image_url() {
        assert!(image_url("image", "https://res.cloudinary.com/demo/a.png").is_ok());
        assert!(image_url("image", "http://example.com/a.png").is_err());
    }

    #[test]
    fn test_email() {
        assert_eq!(email("Ada@Example.com").unwrap(), "ada@example.com");
        assert!(email("not-an-email").is_err());
        assert!(email("@example.com").is_err());
    }
}
