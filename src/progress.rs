//! Byte-counting reader used to drive progress bars while loading seed files.

use std::io::Read;

/// A reader wrapper that reports the running total of bytes read.
pub struct ProgressReader<R: Read> {
    reader: R,
    callback: Box<dyn Fn(u64)>,
    bytes_read: u64,
}

impl<R: Read> ProgressReader<R> {
    /// The callback receives the total bytes read so far after each read.
    pub fn new<F>(reader: R, callback: F) -> Self
    where
        F: Fn(u64) + 'static,
    {
        Self {
            reader,
            callback: Box::new(callback),
            bytes_read: 0,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.bytes_read += n as u64;
        (self.callback)(self.bytes_read);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_reports_cumulative_bytes() {
        let seen = Rc::new(Cell::new(0u64));
        let sink = Rc::clone(&seen);
        let data = b"INSERT INTO t VALUES (1);\n".repeat(100);

        let mut reader = ProgressReader::new(&data[..], move |n| sink.set(n));
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();

        assert_eq!(out, data);
        assert_eq!(reader.bytes_read(), data.len() as u64);
        assert_eq!(seen.get(), data.len() as u64);
    }
}
