//! This library handles reading from and creating **GMA** addon archives used by *Garry's Mod*.
//!
//! # GMA Archive Format Documentation
//!
//! A GMA file packages a named collection of files (an "addon") together with some descriptive
//! metadata into a single stream. GMA files are typically identified with the `.gma` extension.
//!
//! ## File Structure
//!
//! A GMA file consists of a header, followed by the record list, the data blocks, and an end marker.
//!
//! | Size (bytes)     | Field                  | Description                                            |
//! |------------------|------------------------|--------------------------------------------------------|
//! | 4                | Magic number           | "GMAD"                                                 |
//! | 1                | Version                | Signed byte, fixed value `3`                           |
//! | 8                | SteamID64              | Identifier of the publisher                            |
//! | 8                | Timestamp              | Unix time (seconds) the addon was written              |
//! | 1                | Required Content       | Unused, always `0`                                     |
//! | variable         | Name                   | NUL-terminated string                                  |
//! | variable         | Description            | NUL-terminated string                                  |
//! | variable         | Author                 | NUL-terminated string                                  |
//! | 4                | Addon Version          | Unused, always `1`                                     |
//! | variable         | Records                | See below, terminated by a zero index                  |
//! | variable         | Data                   | The content of every record, in record order           |
//! | 4                | End Marker             | Always written as `0`, never checked                   |
//!
//! ### Records
//!
//! Every file in the archive is described by a record. Records are stored back to back, and the
//! list ends with a `u32` index of `0` in place of the next record.
//!
//! | Size (bytes)     | Field                  | Description                                            |
//! |------------------|------------------------|--------------------------------------------------------|
//! | 4                | Index                  | 1-based position of the record                         |
//! | variable         | Name                   | NUL-terminated path of the file                        |
//! | 8                | Size                   | Signed size of the file's content                      |
//! | 4                | CRC32                  | Checksum of the content, written as `0` and not read   |
//!
//! ### Data Blocks
//!
//! The content of every file follows the record list without any padding or framing. Since
//! records and data are stored in separate regions, the records must be read in full before the
//! first byte of content can be assigned to a file.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.gma`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Compression**: None
//!

pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use read::{read_gma, GmaArchive};
pub use types::{AddonMetadata, Entry};
pub use write::{GmaBuilder, GmaWriterOptions};
