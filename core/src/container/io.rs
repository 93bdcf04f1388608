//! Normalized input/output for the container writer and reader.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Buffer shared between a writer and the caller that inspects it.
pub type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    /// Created or truncated.
    File(PathBuf),
    /// Bytes land in the shared buffer; the caller keeps a clone.
    Memory(SharedBuffer),
}

/// Normalize input source into a boxed reader
pub fn open_input(src: InputSource) -> io::Result<Box<dyn Read + Send>> {
    let reader: Box<dyn Read + Send> = match src {
        InputSource::Reader(r) => r,
        InputSource::File(p) => Box::new(BufReader::new(File::open(p)?)),
        InputSource::Memory(b) => Box::new(Cursor::new(b)),
    };
    Ok(reader)
}

/// Open handle behind a `RecordWriter`.
pub(crate) enum SinkHandle {
    File(BufWriter<File>),
    Stream(Box<dyn Write + Send>),
}

impl SinkHandle {
    pub(crate) fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            SinkHandle::File(w) => w.write_all(buf),
            SinkHandle::Stream(w) => w.write_all(buf),
        }
    }

    /// Flush buffers; for files also push the data to durable storage.
    pub(crate) fn sync(&mut self) -> io::Result<()> {
        match self {
            SinkHandle::File(w) => {
                w.flush()?;
                w.get_ref().sync_all()
            }
            SinkHandle::Stream(w) => w.flush(),
        }
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkHandle::File(w) => w.flush(),
            SinkHandle::Stream(w) => w.flush(),
        }
    }
}

/// Normalize output sink into an open handle
pub(crate) fn open_output(sink: OutputSink) -> io::Result<SinkHandle> {
    match sink {
        OutputSink::Writer(w) => Ok(SinkHandle::Stream(w)),
        OutputSink::File(p) => Ok(SinkHandle::File(BufWriter::new(File::create(p)?))),
        OutputSink::Memory(buf) => Ok(SinkHandle::Stream(Box::new(SharedBufferWriter { buf }))),
    }
}

pub struct SharedBufferWriter {
    buf: SharedBuffer,
}

impl SharedBufferWriter {
    pub fn new(buf: SharedBuffer) -> Self {
        Self { buf }
    }
}

impl Write for SharedBufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "shared buffer lock poisoned"))?;
        guard.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fill `buf` as far as the reader allows.
///
/// Returns the number of bytes read; less than `buf.len()` only at EOF.
pub fn read_exact_or_eof<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut off = 0;
    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(off)
}
