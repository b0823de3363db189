use std::{io::Read, sync::Arc};

use csv::{ByteRecord, StringRecord};

use crate::{report::Reporter, types::Severity};

/// Lazy sequence of rows from one CSV table.
///
/// Rows may have any number of fields and invalid UTF-8 is replaced, so
/// callers validate field counts themselves. A read error is reported and
/// ends the sequence; it is kept for `take_error` so a truncated table can't
/// pass for a complete one.
pub struct CsvRows<R> {
    reader: csv::Reader<R>,
    record: ByteRecord,
    filename: String,
    source: &'static str,
    reporter: Arc<dyn Reporter>,
    error: Option<csv::Error>,
    done: bool,
}

impl<R: Read> CsvRows<R> {
    pub fn new(
        reader: R,
        filename: &str,
        source: &'static str,
        delimiter: u8,
        skip_header: bool,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(skip_header)
            .flexible(true)
            .from_reader(reader);
        Self {
            reader,
            record: ByteRecord::new(),
            filename: filename.to_string(),
            source,
            reporter,
            error: None,
            done: false,
        }
    }

    /// The error that ended the sequence early, if any.
    pub fn take_error(&mut self) -> Option<csv::Error> {
        self.error.take()
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = StringRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_byte_record(&mut self.record) {
            Ok(true) => Some(StringRecord::from_byte_record_lossy(self.record.clone())),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                self.reporter.report(
                    self.source,
                    &format!("{} read failed: {}", self.filename, err),
                    Severity::Fail,
                );
                self.error = Some(err);
                None
            }
        }
    }
}
