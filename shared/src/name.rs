use std::{fmt, ops::Deref};

use crate::{constants::MAX_NAME_LEN, ConfigError};

/// Copies `source` into `destination`, keeping at most `capacity` bytes.
///
/// The copy is cut on a UTF-8 character boundary, so fewer than `capacity`
/// bytes may be kept when a multi-byte character straddles the limit.
/// Returns `true` if the whole of `source` fit, `false` if it was truncated.
pub fn copy_string(source: &str, destination: &mut String, capacity: usize) -> bool {
    destination.clear();

    if source.len() <= capacity {
        destination.push_str(source);
        return true;
    }

    let mut end = capacity;
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    destination.push_str(&source[..end]);
    false
}

/// A display name that never exceeds [`MAX_NAME_LEN`] bytes
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoundedName {
    inner: String,
}

impl BoundedName {
    /// Creates a name, failing if `name` does not fit
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        let mut inner = String::with_capacity(name.len().min(MAX_NAME_LEN));
        if copy_string(name, &mut inner, MAX_NAME_LEN) {
            Ok(Self { inner })
        } else {
            Err(ConfigError::NameTooLong {
                length: name.len(),
                max: MAX_NAME_LEN,
            })
        }
    }

    /// Creates a name, cutting `name` down to fit. Returns the name and
    /// whether it was kept whole.
    pub fn truncated(name: &str) -> (Self, bool) {
        let mut inner = String::new();
        let fit = copy_string(name, &mut inner, MAX_NAME_LEN);
        (Self { inner }, fit)
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Deref for BoundedName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for BoundedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}
