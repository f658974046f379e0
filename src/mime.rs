//! MIME type value
//!
//! Parses and compares `type/subtype` strings, including wildcard subtype
//! matching (`image/*` matches any image subtype).

use std::fmt;
use std::str::FromStr;

use crate::error::StorageError;

/// An immutable `type/subtype` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeType {
    type_: String,
    subtype: String,
}

impl MimeType {
    /// Build a MIME type from its two components.
    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            subtype: subtype.into(),
        }
    }

    /// Parse a `type/subtype` string.
    ///
    /// The split happens on the last `/` and both halves must be non-empty;
    /// anything else is a `MimeTypeParse` error.
    pub fn parse(mime_type: &str) -> Result<Self, StorageError> {
        match mime_type.rsplit_once('/') {
            Some((type_, subtype)) if !type_.is_empty() && !subtype.is_empty() => {
                Ok(Self::new(type_, subtype))
            }
            _ => Err(StorageError::MimeTypeParse(mime_type.to_string())),
        }
    }

    /// Create an `audio/*` type.
    pub fn audio(subtype: impl Into<String>) -> Self {
        Self::new("audio", subtype)
    }

    /// Create an `application/*` type.
    pub fn application(subtype: impl Into<String>) -> Self {
        Self::new("application", subtype)
    }

    /// Create a `video/*` type.
    pub fn video(subtype: impl Into<String>) -> Self {
        Self::new("video", subtype)
    }

    /// Create an `image/*` type.
    pub fn image(subtype: impl Into<String>) -> Self {
        Self::new("image", subtype)
    }

    /// Create a `text/*` type.
    pub fn text(subtype: impl Into<String>) -> Self {
        Self::new("text", subtype)
    }

    /// Create a `font/*` type.
    pub fn font(subtype: impl Into<String>) -> Self {
        Self::new("font", subtype)
    }

    /// MIME type component.
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// MIME subtype component.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Compare with another MIME type.
    ///
    /// Types must match exactly; a `*` subtype in `other` matches any
    /// concrete subtype.
    pub fn is(&self, other: &MimeType) -> bool {
        self.is_type(&other.type_) && (other.subtype == "*" || self.is_subtype(&other.subtype))
    }

    /// Compare with a `type/subtype` pattern string.
    ///
    /// An exact string match short-circuits; otherwise the pattern is parsed
    /// and compared with [`MimeType::is`], so a malformed pattern surfaces a
    /// `MimeTypeParse` error.
    pub fn matches(&self, pattern: &str) -> Result<bool, StorageError> {
        if pattern == self.to_string() {
            return Ok(true);
        }
        Ok(self.is(&Self::parse(pattern)?))
    }

    /// Compare only the type component.
    pub fn is_type(&self, type_: &str) -> bool {
        self.type_ == type_
    }

    /// Compare only the subtype component.
    pub fn is_subtype(&self, subtype: &str) -> bool {
        self.subtype == subtype
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)
    }
}

impl FromStr for MimeType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
