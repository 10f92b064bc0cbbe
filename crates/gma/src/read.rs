//! Types for reading GMA archives
//!

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, BufRead, BufReader, Read};
use tracing::{debug, instrument, trace};

use crate::{
    error::{Error, FileNotFoundError, Result},
    types::{AddonMetadata, Entry, GmaRecord, GMA_MAGIC, GMA_VERSION},
};

/// Name and size of an entry whose content has not been read yet
#[derive(Debug)]
struct PendingEntry {
    name: String,
    size: u64,
}

/// Read every entry of a GMA archive, discarding the addon metadata.
///
/// See [`GmaArchive::new`] for the failure conditions.
pub fn read_gma<R: Read>(reader: R) -> Result<Vec<Entry>> {
    Ok(GmaArchive::new(reader)?.into_entries())
}

/// GMA archive reader
///
/// The whole archive is read into memory when it is opened.
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_gma_contents(reader: impl Read) -> gma::error::Result<()> {
///     let gma = gma::GmaArchive::new(reader)?;
///
///     println!("{} by {}", gma.metadata().name, gma.metadata().author);
///     for entry in gma.entries() {
///         println!("Filename: {} ({} bytes)", entry.name(), entry.size());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GmaArchive {
    metadata: AddonMetadata,
    entries: Vec<Entry>,
}

impl GmaArchive {
    /// Read a GMA archive collecting the files it contains.
    ///
    /// Fails with [`Error::HeaderMismatch`] when the stream does not start with `GMAD`,
    /// [`Error::UnsupportedVersion`] for any format version other than 3,
    /// [`Error::NegativeSize`] when a record declares a negative size and
    /// [`Error::TruncatedStream`] when the stream ends early or cannot be read.
    #[instrument(skip_all, err)]
    pub fn new<R: Read>(reader: R) -> Result<GmaArchive> {
        let mut reader = BufReader::new(reader);

        let metadata = Self::read_header(&mut reader)?;
        debug!(
            name = %metadata.name,
            author = %metadata.author,
            steam_id = metadata.steam_id,
            timestamp = metadata.timestamp,
            "read addon header"
        );

        let pending = Self::read_records(&mut reader)?;
        let entries = Self::read_contents(&mut reader, pending)?;

        // End of file marker, its value is not checked
        reader
            .read_u32::<LittleEndian>()
            .map_err(Error::TruncatedStream)?;

        Ok(GmaArchive { metadata, entries })
    }

    /// Metadata stored in the archive header
    pub fn metadata(&self) -> &AddonMetadata {
        &self.metadata
    }

    /// Number of entries contained in this GMA.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this GMA archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over all the file names in this archive, in archive order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name())
    }

    /// All entries in archive order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Total size of the files in the archive. Doesn't include metadata.
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size()).sum()
    }

    /// Get the index of the first entry with the given name, if it's present.
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name() == name)
    }

    /// Search for a file entry by name
    ///
    /// Names are not unique within an archive, the first match is returned.
    pub fn by_name(&self, name: &str) -> Result<&Entry> {
        let Some(index) = self.index_for_name(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained file by index
    pub fn by_index(&self, file_number: usize) -> Result<&Entry> {
        self.entries
            .get(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))
    }

    /// Unwrap and return the entries
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Unwrap into the metadata and entries
    pub fn into_parts(self) -> (AddonMetadata, Vec<Entry>) {
        (self.metadata, self.entries)
    }

    fn read_header<R: BufRead>(reader: &mut R) -> Result<AddonMetadata> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(Error::TruncatedStream)?;
        if magic != GMA_MAGIC {
            return Err(Error::HeaderMismatch { found: magic });
        }

        let version = reader.read_i8().map_err(Error::TruncatedStream)?;
        if version != GMA_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        AddonMetadata::read_from(reader).map_err(Error::TruncatedStream)
    }

    fn read_records<R: BufRead>(reader: &mut R) -> Result<Vec<PendingEntry>> {
        let mut pending = Vec::new();
        loop {
            let index = reader
                .read_u32::<LittleEndian>()
                .map_err(Error::TruncatedStream)?;
            if index == 0 {
                break;
            }

            let record = GmaRecord::read_from(reader).map_err(Error::TruncatedStream)?;
            let name = String::from_utf8_lossy(&record.name).into_owned();
            let Ok(size) = u64::try_from(record.size) else {
                return Err(Error::NegativeSize {
                    name,
                    size: record.size,
                });
            };

            debug!(index, name = %name, size, "read record");
            pending.push(PendingEntry { name, size });
        }
        Ok(pending)
    }

    fn read_contents<R: Read>(reader: &mut R, pending: Vec<PendingEntry>) -> Result<Vec<Entry>> {
        pending
            .into_iter()
            .map(|PendingEntry { name, size }| {
                // Bounded by the declared size so a bogus size can't over-allocate
                let mut content = Vec::new();
                reader
                    .by_ref()
                    .take(size)
                    .read_to_end(&mut content)
                    .map_err(Error::TruncatedStream)?;

                if content.len() as u64 != size {
                    return Err(Error::TruncatedStream(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("{name}: expected {size} bytes, found {}", content.len()),
                    )));
                }

                trace!(name = %name, size, "read content");
                Ok(Entry::new(name, content))
            })
            .collect()
    }
}
