/// How string-valued classifications are decoded from API responses.
///
/// The userstack service may add new classification values at any time.
/// [`DecodeMode::Strict`] surfaces such values as an
/// [`UnsupportedTypeError`](crate::UnsupportedTypeError)
/// the moment they show up, while [`DecodeMode::Lenient`] keeps them verbatim
/// in the `Other` variant so older code keeps working.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DecodeMode {
    /// Reject any value outside the known vocabulary (default).
    #[default]
    Strict,
    /// Accept any string, storing unknown values as `Other(raw)`.
    Lenient,
}

impl DecodeMode {
    /// `true` for [`DecodeMode::Strict`].
    pub fn is_strict(self) -> bool {
        self == Self::Strict
    }
}

/// Declares a closed vocabulary of userstack string constants with an
/// `Other(String)` escape hatch for lenient decoding.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident in $field:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $value:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
            /// A value this crate does not know about, kept verbatim.
            /// Only produced under [`DecodeMode::Lenient`](crate::DecodeMode::Lenient).
            Other(String),
        }

        impl $name {
            /// Name used for this axis in [`UnsupportedTypeError`](crate::UnsupportedTypeError).
            pub const FIELD: &'static str = $field;

            /// Every value in the known vocabulary, in declaration order.
            pub const KNOWN: &'static [&'static str] = &[$($value),+];

            /// Look up a value in the known vocabulary (exact, case-sensitive).
            pub fn from_known(raw: &str) -> Option<Self> {
                match raw {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Decode a raw API string under the given policy.
            pub fn decode(
                raw: &str,
                mode: $crate::enums::DecodeMode,
            ) -> ::std::result::Result<Self, $crate::errors::UnsupportedTypeError> {
                if let Some(known) = Self::from_known(raw) {
                    return Ok(known);
                }
                match mode {
                    $crate::enums::DecodeMode::Lenient => Ok(Self::Other(raw.to_owned())),
                    $crate::enums::DecodeMode::Strict => {
                        Err($crate::errors::UnsupportedTypeError::new($field, raw))
                    }
                }
            }

            /// The wire representation of this value.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $value,)+
                    Self::Other(raw) => raw,
                }
            }

            /// `false` only for [`Other`](Self::Other).
            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        /// Strict parse.
        impl ::std::str::FromStr for $name {
            type Err = $crate::errors::UnsupportedTypeError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Self::decode(s, $crate::enums::DecodeMode::Strict)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;

string_enum! {
    /// What issued the request: a browser, an app, a crawler, ...
    pub enum EntityType in "entity" {
        Unknown => "unknown",
        Browser => "browser",
        MobileBrowser => "mobile-browser",
        EmailClient => "email-client",
        App => "app",
        FeedReader => "feed-reader",
        Crawler => "crawler",
        OfflineBrowser => "offline-browser",
    }
}

string_enum! {
    /// Hardware class of the detected device.
    pub enum DeviceType in "device" {
        Unknown => "unknown",
        Desktop => "desktop",
        Tablet => "tablet",
        Smartphone => "smartphone",
        Console => "console",
        SmartTv => "smarttv",
        Wearable => "wearable",
    }
}

string_enum! {
    /// Sub-classification of crawlers.
    pub enum CategoryType in "category" {
        Unknown => "unknown",
        SearchEngine => "search-engine",
        Monitoring => "monitoring",
        ScreenshotService => "screenshot-service",
        Scraper => "scraper",
        SecurityScanner => "security-scanner",
    }
}
