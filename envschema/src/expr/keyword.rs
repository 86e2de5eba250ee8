//! Built-in type keywords

use crate::error::ExpressionError;
use crate::issue::{describe_kind, describe_value, Issue};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::net::IpAddr;

static HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("hostname pattern is valid")
});

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^\s/?#]+\S*$").expect("url pattern is valid")
});

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern is valid")
});

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
const MAX_EPOCH: f64 = 8_640_000_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StringFormat {
    Any,
    Host,
    Url,
    Email,
    Uuid,
    Ip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberFormat {
    Any,
    Integer,
    Port,
    Epoch,
    Safe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    String(StringFormat),
    Number(NumberFormat),
    Boolean,
    Object,
    Unknown,
}

impl Keyword {
    /// Resolve `keyword` or `keyword.subtype`
    pub(crate) fn lookup(name: &str) -> Result<Self, ExpressionError> {
        let keyword = match name {
            "string" => Self::String(StringFormat::Any),
            "string.host" => Self::String(StringFormat::Host),
            "string.url" => Self::String(StringFormat::Url),
            "string.email" => Self::String(StringFormat::Email),
            "string.uuid" => Self::String(StringFormat::Uuid),
            "string.ip" => Self::String(StringFormat::Ip),
            "number" => Self::Number(NumberFormat::Any),
            "number.integer" => Self::Number(NumberFormat::Integer),
            "number.port" => Self::Number(NumberFormat::Port),
            "number.epoch" => Self::Number(NumberFormat::Epoch),
            "number.safe" => Self::Number(NumberFormat::Safe),
            "boolean" => Self::Boolean,
            "object" => Self::Object,
            "unknown" => Self::Unknown,
            _ => {
                return Err(ExpressionError::UnknownKeyword {
                    keyword: name.to_string(),
                })
            }
        };
        Ok(keyword)
    }

    pub(crate) fn describe(self) -> String {
        match self {
            Self::String(StringFormat::Any) => "a string",
            Self::String(StringFormat::Host) => "a hostname or IP address",
            Self::String(StringFormat::Url) => "a URL",
            Self::String(StringFormat::Email) => "an email address",
            Self::String(StringFormat::Uuid) => "a UUID",
            Self::String(StringFormat::Ip) => "an IP address",
            Self::Number(NumberFormat::Any) => "a number",
            Self::Number(NumberFormat::Integer) => "an integer",
            Self::Number(NumberFormat::Port) => "an integer between 0 and 65535",
            Self::Number(NumberFormat::Epoch) => "an integer between 0 and 8640000000000000",
            Self::Number(NumberFormat::Safe) => {
                "a number between -9007199254740991 and 9007199254740991"
            }
            Self::Boolean => "a boolean",
            Self::Object => "an object",
            Self::Unknown => "anything",
        }
        .to_string()
    }

    pub(crate) fn check(self, value: &Value) -> Result<(), Issue> {
        match self {
            Self::String(format) => {
                let Some(s) = value.as_str() else {
                    return Err(Issue::type_mismatch("a string", describe_kind(value)));
                };
                if string_matches(format, s) {
                    Ok(())
                } else {
                    Err(Issue::refinement(self.describe(), describe_value(value)))
                }
            }
            Self::Number(format) => {
                let Some(n) = value.as_f64() else {
                    return Err(Issue::type_mismatch("a number", describe_kind(value)));
                };
                if number_matches(format, n) {
                    Ok(())
                } else {
                    Err(Issue::refinement(self.describe(), describe_value(value)))
                }
            }
            Self::Boolean if value.is_boolean() => Ok(()),
            Self::Object if value.is_object() => Ok(()),
            Self::Unknown => Ok(()),
            Self::Boolean | Self::Object => {
                Err(Issue::type_mismatch(self.describe(), describe_kind(value)))
            }
        }
    }
}

fn string_matches(format: StringFormat, s: &str) -> bool {
    match format {
        StringFormat::Any => true,
        StringFormat::Host => {
            s.parse::<IpAddr>().is_ok() || (s.len() <= 253 && HOSTNAME.is_match(s))
        }
        StringFormat::Url => URL.is_match(s),
        StringFormat::Email => EMAIL.is_match(s),
        StringFormat::Uuid => UUID.is_match(s),
        StringFormat::Ip => s.parse::<IpAddr>().is_ok(),
    }
}

fn number_matches(format: NumberFormat, n: f64) -> bool {
    let integer = n.fract() == 0.0;
    match format {
        NumberFormat::Any => true,
        NumberFormat::Integer => integer,
        NumberFormat::Port => integer && (0.0..=65535.0).contains(&n),
        NumberFormat::Epoch => integer && (0.0..=MAX_EPOCH).contains(&n),
        NumberFormat::Safe => (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&n),
    }
}
