//! Query parameter encoding
//!
//! The directory API takes multi-valued parameters as a single
//! comma-separated value (`?fields=id,name`), so the standard repeated-key
//! form does not apply.

use std::collections::HashMap;
use std::fmt;

use url::form_urlencoded;

/// Query parameters: field name to an ordered list of values.
///
/// Order of values within a key is kept on the wire. Order across keys is
/// not, and callers must not depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(HashMap<String, Vec<String>>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// `fields=` projection, the most common parameter on directory reads.
    pub fn fields<I>(fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new().with("fields", fields)
    }

    /// Set all values for `key`, returning the previous values if any.
    pub fn insert<K, I>(&mut self, key: K, values: I) -> Option<Vec<String>>
    where
        K: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.0
            .insert(key.into(), values.into_iter().map(Into::into).collect())
    }

    /// Builder form of [`Parameters::insert`].
    pub fn with<K, I>(mut self, key: K, values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.insert(key, values);
        self
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a query string: `""` when empty, otherwise
    /// `?key=v1,v2&other=v3`. Values are form-urlencoded, keys are written
    /// as given.
    ///
    /// Escaping is `application/x-www-form-urlencoded`: space becomes `+`,
    /// `*-._` stay literal and every other non-alphanumeric byte, `~`
    /// included, is percent-encoded.
    pub fn encode(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }

        let mut query = String::new();
        for (key, values) in &self.0 {
            query.push(if query.is_empty() { '?' } else { '&' });
            query.push_str(key);
            query.push('=');
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    query.push(',');
                }
                query.extend(form_urlencoded::byte_serialize(value.as_bytes()));
            }
        }
        query
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl<K, I> FromIterator<(K, I)> for Parameters
where
    K: Into<String>,
    I: IntoIterator,
    I::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut params = Parameters::new();
        for (key, values) in iter {
            params.insert(key, values);
        }
        params
    }
}
