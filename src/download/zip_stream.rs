//! Forward-only zip reading for archives that arrive over the network.
//!
//! Local file headers are read in stream order and the central directory at
//! the end of the archive is never needed. Streaming servers write entries
//! with general purpose flag bit 3 set: CRC and sizes are zero in the local
//! header and follow the data in a descriptor. Deflated data marks its own
//! end, so such entries are inflated until the deflate stream finishes and
//! the descriptor is read afterwards. Every entry is checked against its CRC
//! and size once fully read.

use std::io::{self, BufRead, Read, Take};

use flate2::Crc;
use flate2::bufread::DeflateDecoder;

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;
const ZIP64_END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0606_4b50;
const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x0807_4b50;

const ZIP64_EXTRA_FIELD: u16 = 0x0001;

const FLAG_ENCRYPTED: u16 = 1;
const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;

/// Reads the entries of a zip archive one after another.
pub(crate) struct ArchiveReader<R> {
    reader: R,
    // An entry was handed out and has not reached its end yet.
    pending: bool,
    finished: bool,
}

impl<R: BufRead> ArchiveReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            pending: false,
            finished: false,
        }
    }

    /// Next entry, or `None` once the central directory is reached.
    ///
    /// The previous entry must have been read to its end.
    pub(crate) fn next_entry(&mut self) -> io::Result<Option<ArchiveEntry<'_, R>>> {
        if self.finished {
            return Ok(None);
        }
        if self.pending {
            return Err(invalid_data(
                "previous archive entry was not read to its end".to_string(),
            ));
        }

        match read_u32(&mut self.reader)? {
            LOCAL_HEADER_SIGNATURE => {}
            CENTRAL_HEADER_SIGNATURE
            | END_OF_CENTRAL_DIRECTORY_SIGNATURE
            | ZIP64_END_OF_CENTRAL_DIRECTORY_SIGNATURE => {
                self.finished = true;
                return Ok(None);
            }
            other => {
                return Err(invalid_data(format!(
                    "invalid local file header signature {other:#010x}"
                )));
            }
        }

        let header = LocalHeader::read(&mut self.reader)?;
        self.pending = true;
        let Self {
            reader, pending, ..
        } = self;
        ArchiveEntry::new(header, reader, pending).map(Some)
    }
}

struct LocalHeader {
    flags: u16,
    method: u16,
    crc32: u32,
    compressed_size: u64,
    size: u64,
    name: String,
    zip64: bool,
}

impl LocalHeader {
    /// Reads the header following a local header signature.
    fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        // version, flags, method, time, date, crc, sizes, name and extra lengths
        let mut fixed = [0u8; 26];
        reader.read_exact(&mut fixed)?;
        let u16_at = |at: usize| u16::from_le_bytes([fixed[at], fixed[at + 1]]);
        let u32_at = |at: usize| {
            u32::from_le_bytes([fixed[at], fixed[at + 1], fixed[at + 2], fixed[at + 3]])
        };

        let flags = u16_at(2);
        let method = u16_at(4);
        let crc32 = u32_at(10);
        let compressed_size = u32_at(14);
        let size = u32_at(18);

        let mut name = vec![0u8; usize::from(u16_at(22))];
        reader.read_exact(&mut name)?;
        let mut extra = vec![0u8; usize::from(u16_at(24))];
        reader.read_exact(&mut extra)?;

        let mut header = Self {
            flags,
            method,
            crc32,
            compressed_size: u64::from(compressed_size),
            size: u64::from(size),
            name: String::from_utf8_lossy(&name).into_owned(),
            zip64: false,
        };

        let mut fields = extra.as_slice();
        while let [id_lo, id_hi, len_lo, len_hi, rest @ ..] = fields {
            let id = u16::from_le_bytes([*id_lo, *id_hi]);
            let len = usize::from(u16::from_le_bytes([*len_lo, *len_hi])).min(rest.len());
            let (data, next) = rest.split_at(len);
            if id == ZIP64_EXTRA_FIELD {
                header.zip64 = true;
                let mut values = data.chunks_exact(8).map(le_u64);
                if size == u32::MAX {
                    header.size = values.next().unwrap_or(header.size);
                }
                if compressed_size == u32::MAX {
                    header.compressed_size = values.next().unwrap_or(header.compressed_size);
                }
            }
            fields = next;
        }

        Ok(header)
    }
}

enum Body<'a, R> {
    Stored(Take<&'a mut R>),
    Deflated(DeflateDecoder<Take<&'a mut R>>),
    // Sizes follow the data; the deflate stream ends on its own.
    DeflatedUntilEnd(DeflateDecoder<&'a mut R>),
}

/// One entry of an [`ArchiveReader`]; reading it yields the entry's data.
pub(crate) struct ArchiveEntry<'a, R> {
    name: String,
    size: Option<u64>,
    crc32: u32,
    zip64: bool,
    body: Body<'a, R>,
    crc: Crc,
    read: u64,
    done: bool,
    pending: &'a mut bool,
}

impl<'a, R: BufRead> ArchiveEntry<'a, R> {
    fn new(header: LocalHeader, reader: &'a mut R, pending: &'a mut bool) -> io::Result<Self> {
        if header.flags & FLAG_ENCRYPTED != 0 {
            return Err(unsupported(format!("{} is encrypted", header.name)));
        }
        let streamed = header.flags & FLAG_DATA_DESCRIPTOR != 0;
        let body = match (header.method, streamed) {
            (METHOD_STORED, false) => Body::Stored(Read::take(reader, header.compressed_size)),
            (METHOD_DEFLATED, false) => Body::Deflated(DeflateDecoder::new(Read::take(
                reader,
                header.compressed_size,
            ))),
            (METHOD_DEFLATED, true) => Body::DeflatedUntilEnd(DeflateDecoder::new(reader)),
            (METHOD_STORED, true) => {
                return Err(unsupported(format!(
                    "{} is stored without sizes in its local header",
                    header.name
                )));
            }
            (method, _) => {
                return Err(unsupported(format!(
                    "{} uses compression method {method}",
                    header.name
                )));
            }
        };

        Ok(Self {
            size: (!streamed).then_some(header.size),
            name: header.name,
            crc32: header.crc32,
            zip64: header.zip64,
            body,
            crc: Crc::new(),
            read: 0,
            done: false,
            pending,
        })
    }

    /// Full entry name, including any folders.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    /// Uncompressed size, unknown until the end for streamed entries.
    pub(crate) fn size(&self) -> Option<u64> {
        self.size
    }

    /// Reads and discards the rest of the entry.
    pub(crate) fn skip(mut self) -> io::Result<()> {
        io::copy(&mut self, &mut io::sink()).map(|_| ())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.done = true;
        let (crc32, size) = match &mut self.body {
            Body::Stored(data) => {
                ensure_drained(data, &self.name)?;
                (self.crc32, self.size.unwrap_or_default())
            }
            Body::Deflated(decoder) => {
                let data = decoder.get_mut();
                io::copy(data, &mut io::sink())?;
                ensure_drained(data, &self.name)?;
                (self.crc32, self.size.unwrap_or_default())
            }
            Body::DeflatedUntilEnd(decoder) => read_descriptor(decoder.get_mut(), self.zip64)?,
        };

        if self.crc.sum() != crc32 {
            return Err(invalid_data(format!("{}: CRC mismatch", self.name)));
        }
        if self.read != size {
            return Err(invalid_data(format!(
                "{}: expected {size} bytes, read {}",
                self.name, self.read
            )));
        }
        *self.pending = false;
        Ok(())
    }
}

impl<R: BufRead> Read for ArchiveEntry<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        let read = match &mut self.body {
            Body::Stored(data) => data.read(buf)?,
            Body::Deflated(decoder) => decoder.read(buf)?,
            Body::DeflatedUntilEnd(decoder) => decoder.read(buf)?,
        };
        if read == 0 {
            self.finish()?;
        } else {
            self.crc.update(&buf[..read]);
            self.read += read as u64;
        }
        Ok(read)
    }
}

fn ensure_drained<R>(data: &Take<R>, name: &str) -> io::Result<()> {
    if data.limit() > 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("{name}: archive ended inside the entry"),
        ));
    }
    Ok(())
}

/// Reads a data descriptor, returning its CRC and uncompressed size.
///
/// The descriptor signature is optional.
fn read_descriptor<R: Read>(reader: &mut R, zip64: bool) -> io::Result<(u32, u64)> {
    let mut crc32 = read_u32(reader)?;
    if crc32 == DATA_DESCRIPTOR_SIGNATURE {
        crc32 = read_u32(reader)?;
    }
    let size = if zip64 {
        read_u64(reader)?;
        read_u64(reader)?
    } else {
        read_u32(reader)?;
        u64::from(read_u32(reader)?)
    };
    Ok((crc32, size))
}

fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_u64<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut bytes = [0u8; 8];
    reader.read_exact(&mut bytes)?;
    Ok(u64::from_le_bytes(bytes))
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut value = [0u8; 8];
    value.copy_from_slice(bytes);
    u64::from_le_bytes(value)
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

fn unsupported(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, message)
}
