use crate::domain::Resource;
use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Stdin, Stdout, Write};

pub enum InputStream {
    Stdin(Stdin),
    File(File),
}

impl InputStream {
    pub fn open(resource: &Resource) -> io::Result<Self> {
        match resource {
            Resource::Stdio => Ok(InputStream::Stdin(io::stdin())),
            Resource::Path(path) => File::open(path).map(InputStream::File),
        }
    }

    /// Bytes left between the current position and the end, for seekable sources.
    pub fn remaining_len(&mut self) -> Option<u64> {
        match self {
            InputStream::Stdin(_) => None,
            InputStream::File(file) => {
                let head = file.stream_position().ok()?;
                let tail = file.seek(SeekFrom::End(0)).ok()?;
                file.seek(SeekFrom::Start(head)).ok()?;
                Some(tail.saturating_sub(head))
            }
        }
    }
}

impl Read for InputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputStream::Stdin(stdin) => stdin.read(buf),
            InputStream::File(file) => file.read(buf),
        }
    }
}

pub enum OutputStream {
    Stdout(Stdout),
    File(BufWriter<File>),
}

impl OutputStream {
    pub fn create(resource: &Resource) -> io::Result<Self> {
        match resource {
            Resource::Stdio => Ok(OutputStream::Stdout(io::stdout())),
            Resource::Path(path) => File::create(path).map(|f| OutputStream::File(BufWriter::new(f))),
        }
    }

    /// Writes one complete line with a single call.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        self.write_all(buf.as_bytes())
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputStream::Stdout(stdout) => stdout.write(buf),
            OutputStream::File(file) => file.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            OutputStream::Stdout(stdout) => stdout.lock().write_all(buf),
            OutputStream::File(file) => file.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputStream::Stdout(stdout) => stdout.flush(),
            OutputStream::File(file) => file.flush(),
        }
    }
}

/// An input/output pair opened together. Named files are closed when
/// the pair is dropped; the standard streams are left open.
pub struct ScopedIo {
    pub input: InputStream,
    pub output: OutputStream,
}

impl ScopedIo {
    pub fn open(input: &Resource, output: &Resource) -> io::Result<Self> {
        let input = InputStream::open(input)?;
        let output = OutputStream::create(output)?;
        Ok(Self { input, output })
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.output.flush()
    }
}

/// Streams `source` byte for byte into `destination`.
pub fn copy_resource(source: &Resource, destination: &Resource) -> io::Result<u64> {
    let mut io = ScopedIo::open(source, destination)?;
    let copied = io::copy(&mut io.input, &mut io.output)?;
    io.finish()?;
    Ok(copied)
}
