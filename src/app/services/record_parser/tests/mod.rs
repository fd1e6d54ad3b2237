//! Test utilities for record parser testing

use std::io::{self, Read};

use crate::app::models::UnitKey;


pub fn test_unit() -> UnitKey {
    UnitKey::new(2020, "Camden", "Drivers")
}

/// Reader that yields `data` and then fails
pub struct FailingReader {
    data: io::Cursor<Vec<u8>>,
}

impl FailingReader {
    pub fn new(data: &str) -> Self {
        Self {
            data: io::Cursor::new(data.as_bytes().to_vec()),
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.data.read(buf)?;
        if read == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "archive truncated"));
        }
        Ok(read)
    }
}
