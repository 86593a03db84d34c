//! ZIP container access for spreadsheet packages.

use crate::error::{Error, Result};
use quick_xml::events::Event;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Component, Path, PathBuf};

/// A relationship entry from a .rels part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path, relative to the source part unless it starts with '/'
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

/// Relationships of one package part, keyed by ID.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    by_id: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// First relationship whose type URI ends with `suffix`.
    ///
    /// Type URIs differ between transitional and strict packages but share
    /// their last path segment (e.g., "/sharedStrings").
    pub fn find_by_type_suffix(&self, suffix: &str) -> Option<&Relationship> {
        let mut matches: Vec<&Relationship> = self
            .by_id
            .values()
            .filter(|r| r.rel_type.ends_with(suffix))
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches.into_iter().next()
    }

    pub fn add(&mut self, rel: Relationship) {
        self.by_id.insert(rel.id.clone(), rel);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Decode XML part bytes to a string.
///
/// Parts are normally UTF-8; a UTF-16 byte order mark switches decoding and
/// the XML declaration is rewritten to match the decoded text.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    let invalid = |e: String| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e));

    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => {
            String::from_utf8(rest.to_vec()).map_err(|e| invalid(e.to_string()))
        }
        [0xFF, 0xFE, rest @ ..] => {
            let text = decode_utf16(rest, u16::from_le_bytes).map_err(invalid)?;
            Ok(declare_utf8(text))
        }
        [0xFE, 0xFF, rest @ ..] => {
            let text = decode_utf16(rest, u16::from_be_bytes).map_err(invalid)?;
            Ok(declare_utf8(text))
        }
        _ => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> std::result::Result<String, String> {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| e.to_string())
}

/// Point the XML declaration at UTF-8 after transcoding.
fn declare_utf8(content: String) -> String {
    let Some(end) = content
        .strip_prefix("<?xml")
        .and_then(|_| content.find("?>"))
    else {
        return content;
    };

    let (decl, rest) = content.split_at(end + 2);
    let mut fixed = decl.to_string();
    for quoted in ["\"UTF-16\"", "'UTF-16'", "\"utf-16\"", "'utf-16'"] {
        fixed = fixed.replace(quoted, "\"UTF-8\"");
    }
    fixed + rest
}

/// A spreadsheet package opened from a ZIP archive held in memory.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open a package from a file path.
    ///
    /// The whole file is read into memory so the archive can be read
    /// without holding the file open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Open a package from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read a part as raw bytes.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read a part as XML text.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        decode_xml_bytes(&self.read_binary(path)?)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().file_names().any(|n| n == path)
    }

    /// Read the relationships of `part_path` (e.g., "xl/workbook.xml").
    ///
    /// A missing .rels part yields an empty set.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let path = Path::new(part_path);
        let parent = path.parent().unwrap_or(Path::new(""));
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        let rels_path = if parent.as_os_str().is_empty() {
            format!("_rels/{}.rels", file_name)
        } else {
            format!("{}/_rels/{}.rels", parent.display(), file_name)
        };

        match self.read_xml(&rels_path) {
            Ok(xml) => parse_relationships(&xml),
            Err(Error::MissingComponent(_)) => Ok(Relationships::new()),
            Err(e) => Err(e),
        }
    }

    /// Resolve a relationship target against the part that declared it.
    pub fn resolve_path(base: &str, target: &str) -> String {
        if let Some(absolute) = target.strip_prefix('/') {
            return absolute.to_string();
        }

        let mut resolved: PathBuf = Path::new(base)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        for component in Path::new(target).components() {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(c) => resolved.push(c),
                _ => {}
            }
        }

        resolved.to_string_lossy().replace('\\', "/")
    }
}

fn parse_relationships(xml: &str) -> Result<Relationships> {
    let mut rels = Relationships::new();
    if xml.trim().is_empty() {
        return Ok(rels);
    }

    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                    external: false,
                };

                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        b"TargetMode" => rel.external = value.eq_ignore_ascii_case("external"),
                        _ => {}
                    }
                }

                if !rel.id.is_empty() {
                    rels.add(rel);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.archive.borrow().len())
            .finish()
    }
}
