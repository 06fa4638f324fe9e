use serde::{Deserialize, Serialize};

use crate::enums::{CategoryType, DecodeMode, DeviceType, EntityType};
use crate::errors::{ApiErr, ErrorType, Result, UserstackError};

/// Returned by [`Client::detect`](crate::Client::detect).
///
/// The service omits whatever it cannot tell, so every string may be empty
/// and every classification may be `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stack {
    /// The User-Agent string that was looked up.
    pub ua: String,
    #[serde(rename = "type")]
    pub entity_type: Option<EntityType>,
    pub brand: String,
    pub name: String,
    pub url: String,
    pub os: Os,
    pub device: Device,
    pub browser: Browser,
    pub crawler: Crawler,
}

impl Stack {
    /// Shorthand for `crawler.is_crawler`.
    pub fn is_crawler(&self) -> bool {
        self.crawler.is_crawler
    }

    /// Shorthand for `device.is_mobile_device`.
    pub fn is_mobile(&self) -> bool {
        self.device.is_mobile_device
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Os {
    pub name: String,
    /// e.g. "windows_10".
    pub code: String,
    pub url: String,
    pub family: String,
    pub family_code: String,
    pub family_vendor: String,
    pub icon: String,
    pub icon_large: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Device {
    pub is_mobile_device: bool,
    #[serde(rename = "type")]
    pub device_type: Option<DeviceType>,
    pub brand: String,
    pub brand_code: String,
    pub brand_url: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Browser {
    pub name: String,
    pub version: String,
    pub version_major: String,
    /// Rendering engine, e.g. "WebKit/Blink".
    pub engine: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Crawler {
    pub is_crawler: bool,
    pub category: Option<CategoryType>,
    /// As sent, e.g. "2019-09-15 20:35:33". Not parsed.
    pub last_seen: String,
}

/// Either a detection or the reason the service refused to give one.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectOutcome {
    Success(Stack),
    Failure(ApiErr),
}

impl DetectOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Turn a [`DetectOutcome::Failure`] into [`UserstackError::Api`].
    pub fn into_result(self) -> Result<Stack> {
        match self {
            Self::Success(stack) => Ok(stack),
            Self::Failure(err) => Err(UserstackError::Api(err)),
        }
    }
}

/// Per-call request options for [`Client::detect_with`](crate::Client::detect_with).
#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
    /// Restrict the response to these output fields, e.g. `"browser.name,os"`.
    /// Not sent when empty.
    pub fields: Option<String>,
    /// Deadline for this call, overriding the transport's own timeout.
    pub timeout: Option<std::time::Duration>,
}

impl DetectOptions {
    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ---------------------------------------------------------------------------
// Internal deserialization helpers (not part of the public API surface)
// ---------------------------------------------------------------------------

/// The error-carrying view of a response. Present on every body.
#[derive(Deserialize)]
pub(crate) struct Envelope {
    pub success: Option<bool>,
    pub error: Option<RawApiError>,
}

#[derive(Deserialize)]
pub(crate) struct RawApiError {
    pub code: Option<u16>,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub info: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct RawStack {
    pub ua: Option<String>,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub brand: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub os: Option<RawOs>,
    pub device: Option<RawDevice>,
    pub browser: Option<RawBrowser>,
    pub crawler: Option<RawCrawler>,
}

#[derive(Deserialize)]
pub(crate) struct RawOs {
    pub name: Option<String>,
    pub code: Option<String>,
    pub url: Option<String>,
    pub family: Option<String>,
    pub family_code: Option<String>,
    pub family_vendor: Option<String>,
    pub icon: Option<String>,
    pub icon_large: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct RawDevice {
    pub is_mobile_device: Option<bool>,
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    pub brand: Option<String>,
    pub brand_code: Option<String>,
    pub brand_url: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct RawBrowser {
    pub name: Option<String>,
    pub version: Option<String>,
    pub version_major: Option<String>,
    pub engine: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct RawCrawler {
    pub is_crawler: Option<bool>,
    pub category: Option<String>,
    pub last_seen: Option<String>,
}

/// Decode a `/detect` response body.
///
/// The HTTP status is never consulted: userstack answers 200 either way.
/// `success` is tri-state. Only an explicit `false` is a failure; the
/// service leaves the flag out of most successful responses.
pub fn decode_response(body: &[u8], mode: DecodeMode) -> Result<DetectOutcome> {
    let value: serde_json::Value = serde_json::from_slice(body)?;

    let envelope = Envelope::deserialize(&value)?;
    if envelope.success == Some(false) {
        let err = api_err_from_raw(envelope.error, mode)?;
        return Ok(DetectOutcome::Failure(err));
    }

    let raw = RawStack::deserialize(&value)?;
    Ok(DetectOutcome::Success(stack_from_raw(raw, mode)?))
}

pub(crate) fn api_err_from_raw(raw: Option<RawApiError>, mode: DecodeMode) -> Result<ApiErr> {
    let Some(raw) = raw else {
        return Ok(ApiErr {
            success: Some(false),
            code: 0,
            error_type: None,
            info: String::new(),
        });
    };

    let error_type = raw
        .error_type
        .as_deref()
        .map(|s| ErrorType::decode(s, mode))
        .transpose()?;

    // Fall back to the table when the service leaves the code out.
    let code = match (raw.code, &error_type) {
        (Some(code), _) if code != 0 => code,
        (_, Some(ty)) => ty.code(),
        _ => 0,
    };

    Ok(ApiErr {
        success: Some(false),
        code,
        error_type,
        info: raw.info.unwrap_or_default(),
    })
}

pub(crate) fn stack_from_raw(raw: RawStack, mode: DecodeMode) -> Result<Stack> {
    let entity_type = raw
        .entity_type
        .as_deref()
        .map(|s| EntityType::decode(s, mode))
        .transpose()?;

    let os = raw
        .os
        .map(|os| Os {
            name: os.name.unwrap_or_default(),
            code: os.code.unwrap_or_default(),
            url: os.url.unwrap_or_default(),
            family: os.family.unwrap_or_default(),
            family_code: os.family_code.unwrap_or_default(),
            family_vendor: os.family_vendor.unwrap_or_default(),
            icon: os.icon.unwrap_or_default(),
            icon_large: os.icon_large.unwrap_or_default(),
        })
        .unwrap_or_default();

    let device = match raw.device {
        Some(device) => Device {
            is_mobile_device: device.is_mobile_device.unwrap_or_default(),
            device_type: device
                .device_type
                .as_deref()
                .map(|s| DeviceType::decode(s, mode))
                .transpose()?,
            brand: device.brand.unwrap_or_default(),
            brand_code: device.brand_code.unwrap_or_default(),
            brand_url: device.brand_url.unwrap_or_default(),
            name: device.name.unwrap_or_default(),
        },
        None => Device::default(),
    };

    let browser = raw
        .browser
        .map(|browser| Browser {
            name: browser.name.unwrap_or_default(),
            version: browser.version.unwrap_or_default(),
            version_major: browser.version_major.unwrap_or_default(),
            engine: browser.engine.unwrap_or_default(),
        })
        .unwrap_or_default();

    let crawler = match raw.crawler {
        Some(crawler) => Crawler {
            is_crawler: crawler.is_crawler.unwrap_or_default(),
            category: crawler
                .category
                .as_deref()
                .map(|s| CategoryType::decode(s, mode))
                .transpose()?,
            last_seen: crawler.last_seen.unwrap_or_default(),
        },
        None => Crawler::default(),
    };

    Ok(Stack {
        ua: raw.ua.unwrap_or_default(),
        entity_type,
        brand: raw.brand.unwrap_or_default(),
        name: raw.name.unwrap_or_default(),
        url: raw.url.unwrap_or_default(),
        os,
        device,
        browser,
        crawler,
    })
}
