// Entry model
//
// A property-oriented view over the sequence of `gsa:content` extensions
// carried by one Atom entry.

use indexmap::IndexMap;

use crate::codec::Extension;
use crate::error::Error;
use crate::xml;

/// A single addressable resource: an optional id plus a bag of named
/// string properties.
///
/// Duplicate property names are accepted by [`add`](Self::add) but are not
/// round-trip-safe. Lookups resolve them deterministically: the most
/// recently added instance wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Atom `<id>`; unset on entries built locally for insertion.
    pub id: Option<String>,
    /// Atom `<title>`, if the appliance supplied one.
    pub title: Option<String>,
    extensions: Vec<Extension>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property. Existing properties with the same name are kept.
    pub fn add(&mut self, name: impl Into<String>, value: &str) {
        self.extensions.push(Extension::new(name, Some(value)));
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, name: impl Into<String>, value: &str) -> Self {
        self.add(name, value);
        self
    }

    /// Value of the named property, if present.
    pub fn get(&self, name: &str) -> Option<String> {
        self.extensions
            .iter()
            .rev()
            .find(|ext| ext.name() == name)
            .map(Extension::value)
    }

    /// Remove every property with this name.
    pub fn remove(&mut self, name: &str) {
        self.extensions.retain(|ext| ext.name() != name);
    }

    /// All properties as a map, one value per name.
    pub fn all(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::with_capacity(self.extensions.len());
        for ext in &self.extensions {
            map.insert(ext.name().to_owned(), ext.value());
        }
        map
    }

    /// The raw extension sequence, in document order.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub(crate) fn push_extension(&mut self, ext: Extension) {
        self.extensions.push(ext);
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Parse a standalone Atom `<entry>` document.
    pub fn from_xml(body: &str) -> Result<Self, Error> {
        xml::parse_entry(body)
    }

    /// Serialize as a standalone Atom `<entry>` document.
    pub fn to_xml(&self) -> Result<String, Error> {
        xml::write_entry(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_none_for_missing_property() {
        let entry = Entry::new().with("a", "1");
        assert_eq!(entry.get("b"), None);
    }

    #[test]
    fn duplicate_names_resolve_to_one_of_the_values() {
        let mut entry = Entry::new();
        entry.add("x", "1");
        entry.add("x", "2");

        let got = entry.get("x").expect("x is present");
        assert!(got == "1" || got == "2");
        // Current policy: last write wins.
        assert_eq!(got, "2");
        assert_eq!(entry.all().get("x").map(String::as_str), Some("2"));
        assert_eq!(entry.len(), 2);
    }

    #[test]
    fn remove_drops_every_instance() {
        let mut entry = Entry::new();
        entry.add("x", "1");
        entry.add("y", "keep");
        entry.add("x", "2");

        entry.remove("x");

        assert_eq!(entry.get("x"), None);
        assert!(entry.extensions().iter().all(|e| e.name() != "x"));
        assert_eq!(entry.get("y").as_deref(), Some("keep"));
    }

    #[test]
    fn all_collects_decoded_values() {
        let entry = Entry::new()
            .with("urlPattern", "/secret/")
            .with("acl", "group:eng user:\"bob\"");
        let all = entry.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all["acl"], "group:eng user:\"bob\"");
        assert_eq!(all["urlPattern"], "/secret/");
    }
}
