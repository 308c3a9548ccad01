//! CSV source reading: header row, first data row, then streamed records.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use csv::StringRecord;

use crate::error::{ImportError, ImportResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Open `path` for import.
pub fn open_source(path: &Path) -> ImportResult<File> {
    File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// A CSV stream split into its header row and data records.
///
/// Rows may have any width (the reader is `flexible`); width repair happens later.
///
/// The `csv` parser drops empty lines without yielding a record. They still count as (skipped)
/// data rows, so the source tracks enough to recover how many were dropped; see
/// [`CsvSource::empty_lines`].
pub struct CsvSource<R: Read> {
    rdr: csv::Reader<BufReader<LastByte<R>>>,
    headers: Vec<String>,
    records: u64,
    quoted_newlines: u64,
}

impl<R: Read> CsvSource<R> {
    /// Wrap `reader`, drop a leading UTF-8 byte-order marker and any empty lines before the
    /// header, and read the header row.
    ///
    /// Fails with [`ImportError::MissingHeader`] when the input has no rows at all.
    pub fn new(reader: R, source_name: &str) -> ImportResult<Self> {
        let mut buffered = BufReader::new(LastByte::new(reader));
        skip_preamble(&mut buffered).map_err(|source| ImportError::Io {
            path: source_name.into(),
            source,
        })?;

        let rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(buffered);
        let mut source = Self {
            rdr,
            headers: Vec::new(),
            records: 0,
            quoted_newlines: 0,
        };

        let mut header = StringRecord::new();
        if !source.next_record(&mut header)? {
            return Err(ImportError::MissingHeader {
                source_name: source_name.to_string(),
            });
        }
        source.headers = header.iter().map(str::to_owned).collect();

        Ok(source)
    }

    /// Header fields as written in the file.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Read the next data record into `record`; `Ok(false)` at end of input.
    pub fn next_record(&mut self, record: &mut StringRecord) -> ImportResult<bool> {
        if !self.rdr.read_record(record)? {
            return Ok(false);
        }
        self.records += 1;
        self.quoted_newlines += newlines(record.as_byte_record().as_slice());
        Ok(true)
    }

    /// Empty lines the parser skipped after the header.
    ///
    /// Only exact once [`Self::next_record`] has returned `Ok(false)`. Every `\n` the parser
    /// consumed is either inside a quoted field, the terminator of a record, or an empty line;
    /// every record but the last is terminated, and the last one is when the input ends with
    /// `\n`. Lines ended by a lone `\r` are not counted.
    pub fn empty_lines(&self) -> u64 {
        let consumed = self.rdr.position().line().saturating_sub(1);
        let ends_with_newline = self.rdr.get_ref().get_ref().last == Some(b'\n');
        let terminators = self.records.saturating_sub(1) + u64::from(ends_with_newline);
        consumed.saturating_sub(self.quoted_newlines + terminators)
    }
}

/// Remembers the last byte handed to the parser.
struct LastByte<R> {
    inner: R,
    last: Option<u8>,
}

impl<R> LastByte<R> {
    fn new(inner: R) -> Self {
        Self { inner, last: None }
    }
}

impl<R: Read> Read for LastByte<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        if let Some(&b) = buf[..n].last() {
            self.last = Some(b);
        }
        Ok(n)
    }
}

fn newlines(bytes: &[u8]) -> u64 {
    bytes.iter().filter(|&&b| b == b'\n').count() as u64
}

/// Drop a UTF-8 byte-order marker, then any empty lines before the header.
fn skip_preamble<R: BufRead>(reader: &mut R) -> std::io::Result<()> {
    if reader.fill_buf()?.starts_with(UTF8_BOM) {
        reader.consume(UTF8_BOM.len());
    }
    loop {
        let buf = reader.fill_buf()?;
        let n = buf.iter().take_while(|&&b| b == b'\n' || b == b'\r').count();
        if n == 0 {
            return Ok(());
        }
        reader.consume(n);
    }
}
