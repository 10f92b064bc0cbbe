//! Base types for structure of GMA file.

use binrw::{BinWrite, NullString};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fmt::{self, Debug};
use std::io::{self, BufRead};

/// Every GMA file starts with these four bytes
pub const GMA_MAGIC: [u8; 4] = *b"GMAD";

/// The only format version this library reads and writes
pub const GMA_VERSION: i8 = 3;

/// Value written to the addon version field, which nothing reads back
pub const GMA_ADDON_VERSION: i32 = 1;

/// Addon metadata stored after the magic and format version.
///
/// The string fields are NUL-terminated on disk and decoded lossily as UTF-8.
/// All data is stored in little endian format
#[derive(BinWrite, Debug, Clone, PartialEq, Eq)]
#[bw(little)]
pub struct AddonMetadata {
    /// SteamID64 of the publisher
    pub steam_id: u64,

    /// Unix timestamp (seconds) of when the addon was written
    pub timestamp: u64,

    /// Required content flag, always zero when written by this library
    pub required_content: u8,

    /// Name of the addon
    #[bw(map = |s: &String| NullString::from(s.as_str()))]
    pub name: String,

    /// Description of the addon, usually a JSON document produced by the publishing tools
    #[bw(map = |s: &String| NullString::from(s.as_str()))]
    pub description: String,

    /// Author of the addon
    #[bw(map = |s: &String| NullString::from(s.as_str()))]
    pub author: String,

    /// Addon version, unused
    pub addon_version: i32,
}

impl Default for AddonMetadata {
    fn default() -> Self {
        Self {
            steam_id: Default::default(),
            timestamp: Default::default(),
            required_content: Default::default(),
            name: Default::default(),
            description: Default::default(),
            author: String::from("unknown"),
            addon_version: GMA_ADDON_VERSION,
        }
    }
}

impl AddonMetadata {
    /// Read the metadata that follows the magic and format version.
    ///
    /// Fails with the reader's error, [`io::ErrorKind::UnexpectedEof`] when the stream ends early.
    pub fn read_from<R: BufRead>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            steam_id: reader.read_u64::<LittleEndian>()?,
            timestamp: reader.read_u64::<LittleEndian>()?,
            required_content: reader.read_u8()?,
            name: read_lossy_cstring(reader)?,
            description: read_lossy_cstring(reader)?,
            author: read_lossy_cstring(reader)?,
            addon_version: reader.read_i32::<LittleEndian>()?,
        })
    }
}

/// GMA file record
///
/// Describes one entry in the record list. On disk each record is preceded by its
/// 1-based `u32` index, and a zero index ends the list.
#[derive(BinWrite, Debug, Default, Clone, PartialEq, Eq)]
#[bw(little)]
pub struct GmaRecord {
    /// Name of the entry
    pub name: NullString,

    /// Size of the entry's content. Signed on disk, only non-negative values are valid
    pub size: i64,

    /// CRC32 of the entry's content, written as zero and never checked
    pub checksum: u32,
}

impl GmaRecord {
    /// Read a record, the caller has already consumed its index.
    pub fn read_from<R: BufRead>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            name: NullString(read_cstring(reader)?),
            size: reader.read_i64::<LittleEndian>()?,
            checksum: reader.read_u32::<LittleEndian>()?,
        })
    }
}

/// Read up to and including the next NUL, returning the bytes before it
fn read_cstring<R: BufRead>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut raw = Vec::new();
    reader.read_until(0, &mut raw)?;
    if raw.pop() != Some(0) {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "string is missing its NUL terminator",
        ));
    }
    Ok(raw)
}

fn read_lossy_cstring<R: BufRead>(reader: &mut R) -> io::Result<String> {
    read_cstring(reader).map(|raw| String::from_utf8_lossy(&raw).into_owned())
}

/// A single file packaged in a GMA archive
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    content: Vec<u8>,
}

impl Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("size", &self.size())
            .finish()
    }
}

impl Entry {
    /// Creates an entry owning the given content
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Get the name of the file
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the contents of the file
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Get the size of the file, in bytes
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Unwrap into the name and content
    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.name, self.content)
    }
}
