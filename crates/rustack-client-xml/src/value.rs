//! Canonical text forms for scalar values.
//!
//! Every scalar written into a document is converted to text here, before escaping. The
//! conversions never depend on locale.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};

/// A value with a canonical XML text representation.
///
/// `None` (via the `Option` impl) means "absent": writers detach the target node instead of
/// rendering an empty element.
pub trait XmlValue {
    /// The canonical text of this value, or `None` when the value is absent.
    fn xml_text(&self) -> Option<String>;
}

impl<T: XmlValue + ?Sized> XmlValue for &T {
    fn xml_text(&self) -> Option<String> {
        (**self).xml_text()
    }
}

impl<T: XmlValue> XmlValue for Option<T> {
    fn xml_text(&self) -> Option<String> {
        self.as_ref().and_then(XmlValue::xml_text)
    }
}

impl XmlValue for str {
    fn xml_text(&self) -> Option<String> {
        Some(self.to_owned())
    }
}

impl XmlValue for String {
    fn xml_text(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl XmlValue for bool {
    fn xml_text(&self) -> Option<String> {
        Some(if *self { "true" } else { "false" }.to_owned())
    }
}

macro_rules! impl_xml_value_for_integers {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl XmlValue for $ty {
                fn xml_text(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )+
    };
}

impl_xml_value_for_integers!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl XmlValue for f32 {
    fn xml_text(&self) -> Option<String> {
        Some(format_float(f64::from(*self)))
    }
}

impl XmlValue for f64 {
    fn xml_text(&self) -> Option<String> {
        Some(format_float(*self))
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_owned()
    } else if v.is_infinite() {
        if v.is_sign_positive() {
            "Infinity".to_owned()
        } else {
            "-Infinity".to_owned()
        }
    } else {
        v.to_string()
    }
}

/// Wire formats for timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds and `Z` suffix (`2006-02-03T16:45:09.000Z`).
    #[default]
    DateTime,
    /// RFC 7231 IMF-fixdate (`Fri, 03 Feb 2006 16:45:09 GMT`).
    HttpDate,
    /// Seconds since the Unix epoch, with a fractional part only when needed.
    EpochSeconds,
}

impl TimestampFormat {
    /// Format a timestamp in this wire format.
    #[must_use]
    pub fn format(self, dt: &DateTime<Utc>) -> String {
        match self {
            Self::DateTime => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            Self::HttpDate => dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
            Self::EpochSeconds => {
                let millis = dt.timestamp_subsec_millis();
                if millis == 0 {
                    dt.timestamp().to_string()
                } else {
                    let fraction = format!("{millis:03}");
                    format!("{}.{}", dt.timestamp(), fraction.trim_end_matches('0'))
                }
            }
        }
    }
}

/// Encode a blob as standard base64.
pub(crate) fn encode_blob(data: &[u8]) -> String {
    STANDARD.encode(data)
}
