//! # userstack client for Rust
//!
//! Async client for the [userstack](https://userstack.com) User-Agent
//! detection API. Send a raw `User-Agent` string, get back a typed
//! [`Stack`] describing the browser, operating system, device and crawler
//! behind it.
//!
//! ## Quick start
//!
//! ```no_run
//! use userstack::Client;
//!
//! #[tokio::main]
//! async fn main() -> userstack::Result<()> {
//!     // Free plans must use plain http.
//!     let client = Client::new("your_access_key", false)?;
//!
//!     let stack = client
//!         .detect("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/76.0.3809.100 Safari/537.36")
//!         .await?;
//!
//!     println!("{:?} {} {}", stack.entity_type, stack.browser.name, stack.browser.version);
//!     println!("{} ({})", stack.os.name, stack.os.family_vendor);
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! userstack answers HTTP 200 whether a lookup worked or not, so the client
//! never looks at the status code. A body with `"success": false` becomes
//! [`UserstackError::Api`]; transport failures stay [`UserstackError::Http`].
//!
//! ```no_run
//! use userstack::{Client, ErrorType, UserstackError};
//!
//! # async fn example() -> userstack::Result<()> {
//! let client = Client::new("your_access_key", false)?;
//! match client.detect("").await {
//!     Ok(stack) => println!("{}", stack.ua),
//!     Err(UserstackError::Api(err)) if err.error_type == Some(ErrorType::MissingUserAgent) => {
//!         eprintln!("forgot the User-Agent ({})", err.code);
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Strict and lenient decoding
//!
//! Classifications such as [`EntityType`] or [`DeviceType`] come from a
//! fixed vocabulary that the service may extend. By default the client is
//! strict and fails with [`UnsupportedTypeError`] on values it does not know.
//! With [`DecodeMode::Lenient`] those values are kept as `Other(raw)`:
//!
//! ```no_run
//! use userstack::{ClientBuilder, DecodeMode};
//!
//! # fn example() -> userstack::Result<()> {
//! let client = ClientBuilder::new()
//!     .access_key("your_access_key")
//!     .decode_mode(DecodeMode::Lenient)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! With [`ClientBuilder::debug`] enabled, requests and responses are logged
//! at `DEBUG` through [`tracing`](https://docs.rs/tracing). The access key
//! is replaced by `hidden` in every logged URL.

mod client;
mod enums;
mod errors;
mod models;
mod transport;

pub use client::{Client, ClientBuilder};
pub use enums::{CategoryType, DecodeMode, DeviceType, EntityType};
pub use errors::{
    code_from_error_type, ApiErr, ErrorType, Result, UnsupportedTypeError, UserstackError,
};
pub use models::{
    decode_response, Browser, Crawler, DetectOptions, DetectOutcome, Device, Os, Stack,
};
pub use transport::HttpTransport;
