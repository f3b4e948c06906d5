// Atom wire format
//
// Reads and writes `entry` / `feed` documents. Extension text is kept in
// its escaped form end to end: the reader hands the raw bytes of each
// `gsa:content` element to the entry untouched, and the writer emits the
// stored escaped text without escaping it again.

use quick_xml::NsReader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};

use crate::codec::{self, Extension};
use crate::entry::Entry;
use crate::error::Error;
use crate::feed::Feed;
use crate::terms::{ATOM_NAMESPACE, GSA_NAMESPACE, GSA_PREFIX};

const CONTENT: &[u8] = b"content";
const CONTENT_NAME_ATTR: &str = "name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ns {
    Atom,
    Gsa,
    Other,
}

type Reader<'i> = NsReader<&'i [u8]>;

// ── Reading ──────────────────────────────────────────────────────────

pub(crate) fn parse_entry(body: &str) -> Result<Entry, Error> {
    let mut reader = NsReader::from_str(body);
    loop {
        let (ns, event) = next_event(&mut reader, body)?;
        match event {
            Event::Start(ref e) if is_atom_element(ns, e, b"entry") => {
                return read_entry(&mut reader, body);
            }
            Event::Empty(ref e) if is_atom_element(ns, e, b"entry") => return Ok(Entry::new()),
            Event::Start(ref e) | Event::Empty(ref e) => {
                return Err(parse_error(
                    format!(
                        "expected <entry> root element, found <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ),
                    body,
                ));
            }
            Event::Eof => return Err(parse_error("document contains no <entry>", body)),
            _ => {}
        }
    }
}

pub(crate) fn parse_feed(body: &str) -> Result<Feed, Error> {
    let mut reader = NsReader::from_str(body);
    loop {
        let (ns, event) = next_event(&mut reader, body)?;
        match event {
            Event::Start(ref e) if is_atom_element(ns, e, b"feed") => {
                return read_feed(&mut reader, body);
            }
            Event::Empty(ref e) if is_atom_element(ns, e, b"feed") => return Ok(Feed::default()),
            Event::Start(ref e) | Event::Empty(ref e) => {
                return Err(parse_error(
                    format!(
                        "expected <feed> root element, found <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ),
                    body,
                ));
            }
            Event::Eof => return Err(parse_error("document contains no <feed>", body)),
            _ => {}
        }
    }
}

fn read_feed(reader: &mut Reader<'_>, body: &str) -> Result<Feed, Error> {
    let mut feed = Feed::default();
    loop {
        let (ns, event) = next_event(reader, body)?;
        match event {
            Event::Start(ref e) if is_atom_element(ns, e, b"entry") => {
                feed.entries.push(read_entry(reader, body)?);
            }
            Event::Empty(ref e) if is_atom_element(ns, e, b"entry") => {
                feed.entries.push(Entry::new());
            }
            Event::Start(ref e) if is_atom_element(ns, e, b"id") => {
                feed.id = Some(read_plain_text(reader, body)?);
            }
            Event::Start(ref e) if is_atom_element(ns, e, b"title") => {
                feed.title = Some(read_plain_text(reader, body)?);
            }
            Event::Start(ref e) => skip_element(reader, e, body)?,
            Event::End(_) => return Ok(feed),
            Event::Eof => return Err(parse_error("unexpected end of document in <feed>", body)),
            _ => {}
        }
    }
}

fn read_entry(reader: &mut Reader<'_>, body: &str) -> Result<Entry, Error> {
    let mut entry = Entry::new();
    loop {
        let (ns, event) = next_event(reader, body)?;
        match event {
            Event::Start(ref e) if ns == Ns::Gsa && e.local_name().as_ref() == CONTENT => {
                let name = content_name(e, body)?;
                let escaped = read_raw_text(reader, body)?;
                entry.push_extension(Extension::from_escaped(name, Some(escaped)));
            }
            Event::Empty(ref e) if ns == Ns::Gsa && e.local_name().as_ref() == CONTENT => {
                let name = content_name(e, body)?;
                entry.push_extension(Extension::from_escaped(name, None));
            }
            Event::Start(ref e) if is_atom_element(ns, e, b"id") => {
                entry.id = Some(read_plain_text(reader, body)?);
            }
            Event::Start(ref e) if is_atom_element(ns, e, b"title") => {
                entry.title = Some(read_plain_text(reader, body)?);
            }
            Event::Start(ref e) => skip_element(reader, e, body)?,
            Event::End(_) => return Ok(entry),
            Event::Eof => return Err(parse_error("unexpected end of document in <entry>", body)),
            _ => {}
        }
    }
}

/// Collect the text of a `gsa:content` element without decoding entities.
/// CDATA sections are escaped so the stored form stays uniformly escaped.
fn read_raw_text(reader: &mut Reader<'_>, body: &str) -> Result<String, Error> {
    let mut text = String::new();
    loop {
        let (_, event) = next_event(reader, body)?;
        match event {
            Event::Text(t) => text.push_str(utf8(&t, body)?),
            Event::CData(c) => {
                let raw = utf8(&c, body)?;
                text.push_str(&codec::escape(Some(raw)).unwrap_or_default());
            }
            Event::Start(ref e) => skip_element(reader, e, body)?,
            Event::End(_) => return Ok(text),
            Event::Eof => return Err(parse_error("unterminated <gsa:content>", body)),
            _ => {}
        }
    }
}

/// Collect and decode the text of a plain Atom element (`id`, `title`).
fn read_plain_text(reader: &mut Reader<'_>, body: &str) -> Result<String, Error> {
    let mut text = String::new();
    loop {
        let (_, event) = next_event(reader, body)?;
        match event {
            Event::Text(t) => {
                let decoded = t.unescape().map_err(|e| parse_error(e.to_string(), body))?;
                text.push_str(&decoded);
            }
            Event::CData(c) => text.push_str(utf8(&c, body)?),
            Event::Start(ref e) => skip_element(reader, e, body)?,
            Event::End(_) => return Ok(text.trim().to_owned()),
            Event::Eof => return Err(parse_error("unterminated text element", body)),
            _ => {}
        }
    }
}

fn content_name(start: &BytesStart<'_>, body: &str) -> Result<String, Error> {
    let attr = start
        .try_get_attribute(CONTENT_NAME_ATTR)
        .map_err(|e| parse_error(e.to_string(), body))?
        .ok_or_else(|| parse_error("<gsa:content> is missing its name attribute", body))?;
    let value = attr
        .unescape_value()
        .map_err(|e| parse_error(e.to_string(), body))?;
    Ok(value.into_owned())
}

fn skip_element(reader: &mut Reader<'_>, start: &BytesStart<'_>, body: &str) -> Result<(), Error> {
    reader
        .read_to_end(start.name())
        .map_err(|e| parse_error(e.to_string(), body))?;
    Ok(())
}

fn next_event<'i>(reader: &mut Reader<'i>, body: &str) -> Result<(Ns, Event<'i>), Error> {
    let (resolved, event) = reader
        .read_resolved_event()
        .map_err(|e| parse_error(e.to_string(), body))?;
    let ns = match resolved {
        ResolveResult::Bound(Namespace(uri)) if uri == GSA_NAMESPACE.as_bytes() => Ns::Gsa,
        ResolveResult::Bound(Namespace(uri)) if uri == ATOM_NAMESPACE.as_bytes() => Ns::Atom,
        _ => Ns::Other,
    };
    Ok((ns, event))
}

/// Atom elements are matched by local name; documents that omit the
/// default namespace are accepted too. Only the extension namespace is
/// excluded, so `gsa:content` is never mistaken for Atom `content`.
fn is_atom_element(ns: Ns, start: &BytesStart<'_>, local: &[u8]) -> bool {
    ns != Ns::Gsa && start.local_name().as_ref() == local
}

fn utf8<'a>(bytes: &'a [u8], body: &str) -> Result<&'a str, Error> {
    std::str::from_utf8(bytes).map_err(|e| parse_error(e.to_string(), body))
}

fn parse_error(message: impl Into<String>, body: &str) -> Error {
    Error::Parse {
        message: message.into(),
        body: body.to_owned(),
    }
}

// ── Writing ──────────────────────────────────────────────────────────

pub(crate) fn write_entry(entry: &Entry) -> Result<String, Error> {
    let mut writer = Writer::new(Vec::new());
    write_decl(&mut writer)?;
    write_entry_element(&mut writer, entry, true)?;
    finish(writer)
}

pub(crate) fn write_feed(feed: &Feed) -> Result<String, Error> {
    let mut writer = Writer::new(Vec::new());
    write_decl(&mut writer)?;
    let mut start = BytesStart::new("feed");
    push_namespaces(&mut start);
    emit(&mut writer, Event::Start(start))?;
    if let Some(ref id) = feed.id {
        write_text_element(&mut writer, "id", id)?;
    }
    if let Some(ref title) = feed.title {
        write_text_element(&mut writer, "title", title)?;
    }
    for entry in &feed.entries {
        write_entry_element(&mut writer, entry, false)?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("feed")))?;
    finish(writer)
}

fn write_entry_element(
    writer: &mut Writer<Vec<u8>>,
    entry: &Entry,
    declare_namespaces: bool,
) -> Result<(), Error> {
    let mut start = BytesStart::new("entry");
    if declare_namespaces {
        push_namespaces(&mut start);
    }
    emit(writer, Event::Start(start))?;

    if let Some(ref id) = entry.id {
        write_text_element(writer, "id", id)?;
    }
    if let Some(ref title) = entry.title {
        write_text_element(writer, "title", title)?;
    }

    let tag = format!("{GSA_PREFIX}:content");
    for ext in entry.extensions() {
        let mut element = BytesStart::new(tag.as_str());
        element.push_attribute((CONTENT_NAME_ATTR, ext.name()));
        match ext.escaped() {
            Some(text) => {
                emit(writer, Event::Start(element))?;
                emit(writer, Event::Text(BytesText::from_escaped(text)))?;
                emit(writer, Event::End(BytesEnd::new(tag.as_str())))?;
            }
            None => emit(writer, Event::Empty(element))?,
        }
    }

    emit(writer, Event::End(BytesEnd::new("entry")))
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), Error> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn push_namespaces(start: &mut BytesStart<'_>) {
    start.push_attribute(("xmlns", ATOM_NAMESPACE));
    let gsa_decl = format!("xmlns:{GSA_PREFIX}");
    start.push_attribute((gsa_decl.as_str(), GSA_NAMESPACE));
}

fn write_decl(writer: &mut Writer<Vec<u8>>) -> Result<(), Error> {
    emit(
        writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), Error> {
    writer.write_event(event).map_err(|e| Error::Encoding {
        message: e.to_string(),
    })
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, Error> {
    String::from_utf8(writer.into_inner()).map_err(|e| Error::Encoding {
        message: e.to_string(),
    })
}
