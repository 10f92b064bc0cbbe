//! Types for writing GMA archives
//!

use binrw::{io::NoSeek, BinWrite, NullString};
use bon::Builder;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{BufWriter, Write};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::read::GmaArchive;
use crate::types::{AddonMetadata, Entry, GmaRecord, GMA_ADDON_VERSION, GMA_MAGIC, GMA_VERSION};

const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Options for how the GMA file should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct GmaWriterOptions {
    /// Timestamp to store in the header instead of the current time
    pub timestamp: Option<u64>,

    /// Capacity of the buffer placed in front of the destination
    #[builder(default = DEFAULT_BUFFER_CAPACITY)]
    pub buffer_capacity: usize,
}

impl Default for GmaWriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// GMA archive generator
///
/// Content is owned by the builder once added, later changes to the caller's buffers are not
/// reflected in the archive.
///
/// ```
/// # fn doit() -> gma::error::Result<()>
/// # {
/// use gma::GmaBuilder;
///
/// let mut gma = GmaBuilder::new("my addon", 76561197960265728);
/// gma.set_author("me")
///     .file_from_string("lua/autorun/hello.lua", "print('Hello, World!')");
///
/// // We use a buffer here, though you'd normally use a `File`
/// let buf = gma.write_to(Vec::new())?;
/// assert_eq!(&buf[..4], b"GMAD");
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct GmaBuilder {
    name: String,
    steam_id: u64,
    author: String,
    description: String,
    entries: Vec<Entry>,
}

impl GmaBuilder {
    /// Starts an empty addon. The author defaults to `unknown` and the description to nothing.
    pub fn new(name: impl Into<String>, steam_id: u64) -> GmaBuilder {
        Self::with_capacity(name, steam_id, 0)
    }

    /// Starts an empty addon with room for `capacity` files
    pub fn with_capacity(name: impl Into<String>, steam_id: u64, capacity: usize) -> GmaBuilder {
        GmaBuilder {
            name: name.into(),
            steam_id,
            author: String::from("unknown"),
            description: String::new(),
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Set the addon description
    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Set the addon author
    pub fn set_author(&mut self, author: impl Into<String>) -> &mut Self {
        self.author = author.into();
        self
    }

    /// Append a file. Files are written in the order they were added.
    pub fn file_from_bytes(
        &mut self,
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.entries.push(Entry::new(name, content));
        self
    }

    /// Append a file with text content
    pub fn file_from_string(
        &mut self,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> &mut Self {
        self.file_from_bytes(name, content.into().into_bytes())
    }

    /// Number of files added so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no files have been added
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Files added so far, in write order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Write the addon to `writer` stamped with the current time.
    ///
    /// See [`GmaBuilder::write_to_with`].
    pub fn write_to<W: Write>(self, writer: W) -> Result<W> {
        self.write_to_with(writer, GmaWriterOptions::default())
    }

    /// Write the addon to `writer` and return it once flushed.
    ///
    /// Every string and the entry count are checked before anything is written, so an
    /// [`Error::InvalidString`], [`Error::EmptyEntryName`] or [`Error::TooManyEntries`] leaves
    /// `writer` untouched. After an [`Error::IOFailure`] the
    /// content of `writer` is undefined and should be discarded.
    #[instrument(skip_all, err, fields(name = %self.name, entries = self.entries.len()))]
    pub fn write_to_with<W: Write>(self, writer: W, options: GmaWriterOptions) -> Result<W> {
        self.validate()?;

        let metadata = AddonMetadata {
            steam_id: self.steam_id,
            timestamp: options.timestamp.unwrap_or_else(unix_now),
            required_content: 0,
            name: self.name,
            description: self.description,
            author: self.author,
            addon_version: GMA_ADDON_VERSION,
        };

        let mut out = NoSeek::new(BufWriter::with_capacity(options.buffer_capacity, writer));

        out.write_all(&GMA_MAGIC).map_err(Error::IOFailure)?;
        out.write_i8(GMA_VERSION).map_err(Error::IOFailure)?;
        metadata.write(&mut out).map_err(Error::io_failure)?;

        for (index, entry) in (1..=u32::MAX).zip(&self.entries) {
            out.write_u32::<LittleEndian>(index)
                .map_err(Error::IOFailure)?;

            GmaRecord {
                name: NullString::from(entry.name()),
                size: entry.content().len() as i64,
                checksum: 0,
            }
            .write(&mut out)
            .map_err(Error::io_failure)?;

            debug!(index, name = %entry.name(), size = entry.size(), "wrote record");
        }
        out.write_u32::<LittleEndian>(0)
            .map_err(Error::IOFailure)?;

        for entry in &self.entries {
            out.write_all(entry.content()).map_err(Error::IOFailure)?;
        }

        // End of file marker
        out.write_u32::<LittleEndian>(0)
            .map_err(Error::IOFailure)?;
        out.flush().map_err(Error::IOFailure)?;

        out.into_inner()
            .into_inner()
            .map_err(|e| Error::IOFailure(e.into_error()))
    }

    fn validate(&self) -> Result<()> {
        check_entry_count(self.entries.len())?;

        validate_cstring("addon name", &self.name)?;
        validate_cstring("addon description", &self.description)?;
        validate_cstring("addon author", &self.author)?;

        for (index, entry) in (1..=u32::MAX).zip(&self.entries) {
            if entry.name().is_empty() {
                return Err(Error::EmptyEntryName { index });
            }
            validate_cstring("entry name", entry.name())?;
        }

        Ok(())
    }
}

impl From<GmaArchive> for GmaBuilder {
    fn from(archive: GmaArchive) -> Self {
        let (metadata, entries) = archive.into_parts();
        GmaBuilder {
            name: metadata.name,
            steam_id: metadata.steam_id,
            author: metadata.author,
            description: metadata.description,
            entries,
        }
    }
}

/// NUL terminates strings on disk so it can't appear inside one
fn validate_cstring(field: &'static str, value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(Error::InvalidString {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

/// Records are indexed from 1 as `u32`, 0 ends the list
fn check_entry_count(count: usize) -> Result<()> {
    if count > u32::MAX as usize {
        return Err(Error::TooManyEntries { count });
    }
    Ok(())
}

/// Seconds since the Unix epoch, or 0 if the system clock is set before 1970
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
