use super::config::Config;
use noodles::bgzf;
use std::io::{self, Read};

/// Decompressing reader over a plain, gzip or BGZF stream.
pub enum Stream<R: Read> {
    Plain(R),
    Gzip(flate2::read::MultiGzDecoder<R>),
    Bgzf(bgzf::io::Reader<R>),
}

impl<R: Read> Stream<R> {
    pub fn new(inner: R, config: Config) -> Self {
        match config {
            Config::Plain => Stream::Plain(inner),
            Config::Gzip => Stream::Gzip(flate2::read::MultiGzDecoder::new(inner)),
            Config::Bgzf => Stream::Bgzf(bgzf::io::Reader::new(inner)),
        }
    }
}

impl<R: Read> Read for Stream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(r) => r.read(buf),
            Stream::Gzip(r) => r.read(buf),
            Stream::Bgzf(r) => r.read(buf),
        }
    }
}
