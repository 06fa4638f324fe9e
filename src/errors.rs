use thiserror::Error;

use crate::enums::string_enum;

/// All errors that can occur when using the userstack client.
#[derive(Error, Debug)]
pub enum UserstackError {
    /// The service rejected the request (`"success": false`), or the client
    /// was built without an access key.
    ///
    /// The service answers HTTP 200 for failures too, so this is the usual
    /// way bad input (missing User-Agent, bad key, plan restrictions) shows up.
    #[error("userstack API error {0}")]
    Api(#[from] ApiErr),

    /// A classification value outside the known vocabulary was received while
    /// decoding in [`DecodeMode::Strict`](crate::DecodeMode::Strict).
    #[error(transparent)]
    UnsupportedType(#[from] UnsupportedTypeError),

    /// A transport-level HTTP error from reqwest (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not valid JSON, or not the expected shape.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client configuration is unusable (e.g. an unparsable base URL).
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl UserstackError {
    /// The API error, if this is one.
    pub fn api_error(&self) -> Option<&ApiErr> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// `true` if the service itself rejected the request.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

/// A convenience alias for `Result<T, UserstackError>`.
pub type Result<T> = std::result::Result<T, UserstackError>;

/// A well formed error returned by the userstack API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {info}")]
pub struct ApiErr {
    /// The `success` flag as sent. The service leaves it out of successful
    /// responses, so `None` is normal there; on an error it is `Some(false)`.
    pub success: Option<bool>,
    /// userstack error code, not an HTTP status.
    pub code: u16,
    /// `None` when the body carried no `error.type`.
    pub error_type: Option<ErrorType>,
    /// Human-readable explanation from the service.
    pub info: String,
}

impl ApiErr {
    /// Build a failed-request error with its code taken from [`code_from_error_type`].
    pub fn new(error_type: ErrorType, info: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            code: error_type.code(),
            error_type: Some(error_type),
            info: info.into(),
        }
    }

    pub(crate) fn missing_access_key() -> Self {
        Self::new(
            ErrorType::MissingAccessKey,
            "User did not supply an access key.",
        )
    }
}

/// Returned only in strict mode when the API sends a classification this
/// crate does not know.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported {field} type: {value}")]
pub struct UnsupportedTypeError {
    field: &'static str,
    value: String,
}

impl UnsupportedTypeError {
    pub(crate) fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Which axis was being decoded: `entity`, `device`, `category` or `error`.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The raw string the service sent.
    pub fn value(&self) -> &str {
        &self.value
    }
}

string_enum! {
    /// Failure reasons reported in the `error.type` field.
    pub enum ErrorType in "error" {
        /// The requested resource does not exist.
        NotFound => "404_not_found",
        MissingAccessKey => "missing_access_key",
        InvalidAccessKey => "invalid_access_key",
        /// The account is inactive or blocked.
        InactiveUser => "inactive_user",
        InvalidApiFunction => "invalid_api_function",
        /// Monthly request allowance used up.
        UsageLimitReached => "usage_limit_reached",
        FunctionAccessRestricted => "function_access_restricted",
        /// Free plans only get plain `http`.
        HttpsAccessRestricted => "https_access_restricted",
        MissingUserAgent => "missing_user_agent",
        InvalidFields => "invalid_fields",
        TooManyUserAgents => "too_many_user_agents",
        BatchNotSupportedOnPlan => "batch_not_supported_on_plan",
    }
}

impl ErrorType {
    /// Shorthand for [`code_from_error_type`].
    pub fn code(&self) -> u16 {
        code_from_error_type(self)
    }
}

/// Map an [`ErrorType`] to userstack's numeric error code.
///
/// These codes are not HTTP statuses and cannot be derived from the type
/// string. Returns 0 for anything outside the table.
pub fn code_from_error_type(error_type: &ErrorType) -> u16 {
    match error_type {
        ErrorType::NotFound => 404,
        ErrorType::MissingAccessKey | ErrorType::InvalidAccessKey => 101,
        ErrorType::InactiveUser => 102,
        ErrorType::InvalidApiFunction => 103,
        ErrorType::UsageLimitReached => 104,
        ErrorType::FunctionAccessRestricted | ErrorType::HttpsAccessRestricted => 105,
        ErrorType::MissingUserAgent => 301,
        ErrorType::InvalidFields => 302,
        ErrorType::TooManyUserAgents => 303,
        ErrorType::BatchNotSupportedOnPlan => 304,
        ErrorType::Other(_) => 0,
    }
}
