// src/mirror/repodata.rs

//! RPM-MD repository metadata parsing
//!
//! Only the fields needed to mirror a repository are extracted: the file
//! list from `repomd.xml` and package locations from the primary metadata.

use crate::hash::{Checksum, ChecksumType};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::engine::MirrorError;

/// A `<data>` entry in `repomd.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepomdEntry {
    pub data_type: String,
    pub location: String,
    pub checksum: Checksum,
}

/// A package entry in primary metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    pub name: String,
    pub arch: String,
    pub location: String,
    pub checksum: Checksum,
}

impl PackageEntry {
    pub fn is_source(&self) -> bool {
        self.arch == "src" || self.arch == "nosrc"
    }
}

fn metadata_error(context: &str, err: impl std::fmt::Display) -> MirrorError {
    MirrorError::Metadata(format!("{context}: {err}"))
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, MirrorError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| metadata_error("malformed attribute", e))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|e| metadata_error("malformed attribute value", e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn checksum_type(element: &BytesStart<'_>) -> Result<ChecksumType, MirrorError> {
    let kind = attribute(element, b"type")?.unwrap_or_else(|| "sha256".to_string());
    kind.parse().map_err(MirrorError::Metadata)
}

/// Fields collected while inside one `<data>` or `<package>` element
#[derive(Default)]
struct Pending {
    data_type: Option<String>,
    name: Option<String>,
    arch: Option<String>,
    location: Option<String>,
    checksum_type: Option<ChecksumType>,
    checksum: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TextField {
    None,
    Name,
    Arch,
    Checksum,
}

/// Parse `repomd.xml` into the list of metadata files it references
pub fn parse_repomd(xml: &str) -> Result<Vec<RepomdEntry>, MirrorError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<Pending> = None;
    let mut field = TextField::None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"data" => {
                    current = Some(Pending {
                        data_type: attribute(&e, b"type")?,
                        ..Pending::default()
                    });
                }
                b"checksum" => {
                    if let Some(pending) = current.as_mut() {
                        pending.checksum_type = Some(checksum_type(&e)?);
                        field = TextField::Checksum;
                    }
                }
                b"location" => {
                    if let Some(pending) = current.as_mut() {
                        pending.location = attribute(&e, b"href")?;
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"location"
                    && let Some(pending) = current.as_mut()
                {
                    pending.location = attribute(&e, b"href")?;
                }
            }
            Ok(Event::Text(t)) => {
                if field == TextField::Checksum
                    && let Some(pending) = current.as_mut()
                {
                    let text = t.unescape().map_err(|e| metadata_error("repomd.xml", e))?;
                    pending.checksum = Some(text.into_owned());
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"checksum" => field = TextField::None,
                b"data" => {
                    if let Some(pending) = current.take() {
                        entries.push(finish_repomd_entry(pending)?);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(metadata_error("repomd.xml", e)),
            _ => {}
        }
    }

    if entries.is_empty() {
        return Err(MirrorError::Metadata(
            "repomd.xml references no metadata files".to_string(),
        ));
    }
    Ok(entries)
}

fn finish_repomd_entry(pending: Pending) -> Result<RepomdEntry, MirrorError> {
    let data_type = pending
        .data_type
        .ok_or_else(|| MirrorError::Metadata("<data> without type".to_string()))?;
    let location = pending.location.ok_or_else(|| {
        MirrorError::Metadata(format!("<data type=\"{data_type}\"> without location"))
    })?;
    let value = pending.checksum.ok_or_else(|| {
        MirrorError::Metadata(format!("<data type=\"{data_type}\"> without checksum"))
    })?;

    Ok(RepomdEntry {
        data_type,
        location,
        checksum: Checksum::new(pending.checksum_type.unwrap_or_default(), value),
    })
}

/// Parse (decompressed) primary metadata into package entries
pub fn parse_primary(xml: &str) -> Result<Vec<PackageEntry>, MirrorError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut packages = Vec::new();
    let mut current: Option<Pending> = None;
    let mut field = TextField::None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"package" => current = Some(Pending::default()),
                b"name" if current.is_some() => field = TextField::Name,
                b"arch" if current.is_some() => field = TextField::Arch,
                b"checksum" => {
                    if let Some(pending) = current.as_mut() {
                        pending.checksum_type = Some(checksum_type(&e)?);
                        field = TextField::Checksum;
                    }
                }
                b"location" => {
                    if let Some(pending) = current.as_mut() {
                        pending.location = attribute(&e, b"href")?;
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"location"
                    && let Some(pending) = current.as_mut()
                {
                    pending.location = attribute(&e, b"href")?;
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(pending) = current.as_mut() {
                    let text = || -> Result<String, MirrorError> {
                        Ok(t.unescape()
                            .map_err(|e| metadata_error("primary metadata", e))?
                            .into_owned())
                    };
                    match field {
                        TextField::Name => pending.name = Some(text()?),
                        TextField::Arch => pending.arch = Some(text()?),
                        TextField::Checksum => pending.checksum = Some(text()?),
                        TextField::None => {}
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"name" | b"arch" | b"checksum" => field = TextField::None,
                b"package" => {
                    if let Some(pending) = current.take() {
                        packages.push(finish_package_entry(pending)?);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(metadata_error("primary metadata", e)),
            _ => {}
        }
    }

    Ok(packages)
}

fn finish_package_entry(pending: Pending) -> Result<PackageEntry, MirrorError> {
    let name = pending
        .name
        .ok_or_else(|| MirrorError::Metadata("<package> without name".to_string()))?;
    let location = pending
        .location
        .ok_or_else(|| MirrorError::Metadata(format!("package {name} without location")))?;
    let value = pending
        .checksum
        .ok_or_else(|| MirrorError::Metadata(format!("package {name} without checksum")))?;

    Ok(PackageEntry {
        name,
        arch: pending.arch.unwrap_or_default(),
        location,
        checksum: Checksum::new(pending.checksum_type.unwrap_or_default(), value),
    })
}
