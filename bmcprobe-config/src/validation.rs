//! Domain validation
//!
//! Each domain checks its own fields and reports failures as
//! [`ConfigError::DomainError`] tagged with the domain name.

use crate::error::{ConfigError, ConfigResult};
use std::fmt::{Debug, Display};

pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;

    /// Name used to tag validation errors, e.g. `webui.driver`
    fn domain_name(&self) -> &'static str;

    fn validation_error(&self, message: impl Into<String>) -> ConfigError
    where
        Self: Sized,
    {
        ConfigError::domain(self.domain_name(), message)
    }
}

fn check(ok: bool, domain: &str, message: impl FnOnce() -> String) -> ConfigResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::domain(domain, message()))
    }
}

pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    check(!value.is_empty(), domain, || format!("{} cannot be empty", field_name))
}

/// Strictly greater than the type's zero value
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + Display,
{
    check(value > T::default(), domain, || {
        format!("{} must be greater than 0, got {}", field_name, value)
    })
}

/// Fraction in `0.0..=1.0`, e.g. a match or failure ratio
pub fn validate_ratio(value: f64, field_name: &str, domain: &str) -> ConfigResult<()> {
    check((0.0..=1.0).contains(&value), domain, || {
        format!("{} must be between 0.0 and 1.0, got {}", field_name, value)
    })
}

/// Absolute http(s) URL
pub fn validate_url(url: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    validate_required_string(url, field_name, domain)?;

    let parsed = url::Url::parse(url).map_err(|e| {
        ConfigError::domain(domain, format!("{} has invalid URL format: {}", field_name, e))
    })?;
    let scheme = parsed.scheme();
    check(matches!(scheme, "http" | "https"), domain, || {
        format!("{} scheme '{}' not supported (only http/https)", field_name, scheme)
    })
}

/// Lower bound not above the upper bound, e.g. think-time limits
pub fn validate_range<T>(min: T, max: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Debug,
{
    check(min <= max, domain, || {
        format!("{} minimum {:?} exceeds maximum {:?}", field_name, min, max)
    })
}
