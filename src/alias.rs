//! Device alias lookup.

use std::collections::HashMap;

/// Maps raw device identifiers to human-friendly folder names.
///
/// Lookup is total: an identifier without an alias resolves to itself.
///
/// # Examples
///
/// ```
/// use mediasort::alias::AliasResolver;
///
/// let aliases = AliasResolver::from_iter([("2304FPN6DC", "Xiaomi13Ultra")]);
/// assert_eq!(aliases.resolve("2304FPN6DC"), "Xiaomi13Ultra");
/// assert_eq!(aliases.resolve("iPhone 13"), "iPhone 13");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasResolver {
    aliases: HashMap<String, String>,
}

impl AliasResolver {
    /// Creates a resolver with no aliases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the alias for `device_id`.
    pub fn insert(&mut self, device_id: impl Into<String>, alias: impl Into<String>) {
        self.aliases.insert(device_id.into(), alias.into());
    }

    /// Returns the alias for `device_id`, or `device_id` itself when none is configured.
    pub fn resolve<'a>(&'a self, device_id: &'a str) -> &'a str {
        self.aliases
            .get(device_id)
            .map(String::as_str)
            .unwrap_or(device_id)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AliasResolver
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for (device_id, alias) in iter {
            resolver.insert(device_id, alias);
        }
        resolver
    }
}
