use std::io::{self, BufReader, Read};

use crate::{Error, Result};

/// Compression applied to a remote object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    Zstd,
}

impl Compression {
    /// Suffix appended to the object key, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zstd => "zst",
        }
    }

    /// Wrap `reader` so reads yield decompressed bytes.
    pub fn decoder<R: Read>(self, reader: R) -> Result<Decoder<R>> {
        match self {
            Self::Zstd => {
                let decoder = zstd::stream::read::Decoder::new(reader).map_err(Error::Decoder)?;
                Ok(Decoder(Box::new(decoder)))
            }
        }
    }
}

/// Decompressing reader over the transfer stream.
pub struct Decoder<R: Read>(Box<zstd::stream::read::Decoder<'static, BufReader<R>>>);

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}
