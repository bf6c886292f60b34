use super::config::Config;
use noodles::bgzf;
use std::io::{self, Write};

/// Compressing writer. Compressed streams must be terminated with [`Stream::try_finish`].
pub enum Stream<W: Write> {
    Plain(W),
    Gzip(flate2::write::GzEncoder<W>),
    Bgzf(bgzf::io::Writer<W>),
}

impl<W: Write> Stream<W> {
    pub fn new(inner: W, config: Config) -> Self {
        match config {
            Config::Plain => Stream::Plain(inner),
            Config::Gzip(params) => {
                Stream::Gzip(flate2::write::GzEncoder::new(inner, params.compression()))
            }
            Config::Bgzf => Stream::Bgzf(bgzf::io::Writer::new(inner)),
        }
    }

    /// Write the container trailer (gzip footer, BGZF EOF block) and flush the underlying writer.
    /// The stream must not be written to afterwards.
    pub fn try_finish(&mut self) -> io::Result<()> {
        match self {
            Stream::Plain(w) => w.flush(),
            Stream::Gzip(w) => w.try_finish(),
            Stream::Bgzf(w) => w.try_finish(),
        }
    }

    pub fn get_ref(&self) -> &W {
        match self {
            Stream::Plain(w) => w,
            Stream::Gzip(w) => w.get_ref(),
            Stream::Bgzf(w) => w.get_ref(),
        }
    }
}

impl<W: Write> Write for Stream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(w) => w.write(buf),
            Stream::Gzip(w) => w.write(buf),
            Stream::Bgzf(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Plain(w) => w.flush(),
            Stream::Gzip(w) => w.flush(),
            Stream::Bgzf(w) => w.flush(),
        }
    }
}
