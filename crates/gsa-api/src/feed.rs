use crate::entry::Entry;
use crate::error::Error;
use crate::xml;

/// An ordered list of entries, as returned by a listing or a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub id: Option<String>,
    pub title: Option<String>,
    pub entries: Vec<Entry>,
}

impl Feed {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Parse an Atom `<feed>` document.
    pub fn from_xml(body: &str) -> Result<Self, Error> {
        xml::parse_feed(body)
    }

    /// Serialize as an Atom `<feed>` document.
    pub fn to_xml(&self) -> Result<String, Error> {
        xml::write_feed(self)
    }
}

impl IntoIterator for Feed {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Feed {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
