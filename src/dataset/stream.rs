use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{Batch, DatasetError, Record};

/// Cursor phase. An empty pull moves the cursor to `Exhausted` for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Streaming,
    Exhausted,
}

/// Forward-only cursor over a `review,sentiment` CSV.
///
/// The header row is consumed up front. Records are decoded one at a time, so memory use
/// is bounded by the largest batch the caller asks for.
pub struct ReviewStream<R> {
    records: csv::DeserializeRecordsIntoIter<R, Record>,
    pending: Option<Record>,
    deferred: Option<DatasetError>,
    drained: bool,
    state: StreamState,
    position: u64,
}

impl ReviewStream<File> {
    pub fn open(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> ReviewStream<R> {
    pub fn from_reader(reader: R) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader)
            .into_deserialize();
        Self {
            records,
            pending: None,
            deferred: None,
            drained: false,
            state: StreamState::Streaming,
            position: 0,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// True once a pull came back empty.
    pub fn is_exhausted(&self) -> bool {
        self.state == StreamState::Exhausted
    }

    /// Records handed out so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Whether another record is available, reading ahead by one if needed.
    pub fn has_next(&mut self) -> Result<bool, DatasetError> {
        if self.pending.is_none() {
            self.pending = self.read_next()?;
        }
        Ok(self.pending.is_some())
    }

    /// Pull a single record; `None` exhausts the stream.
    pub fn next_record(&mut self) -> Result<Option<Record>, DatasetError> {
        let record = self.pull()?;
        if record.is_none() {
            self.mark_exhausted();
        }
        Ok(record)
    }

    /// Pull up to `size` records.
    ///
    /// A short batch does not exhaust the stream by itself; the following call returns an
    /// empty batch and flips the state to [`StreamState::Exhausted`]. A row that fails to
    /// decode ends the batch early: the rows read before it are returned and the error is
    /// reported by the next pull.
    pub fn next_batch(&mut self, size: usize) -> Result<Batch, DatasetError> {
        let mut batch = Batch::with_capacity(size.min(4096));
        if size == 0 {
            return Ok(batch);
        }
        while batch.len() < size {
            match self.pull() {
                Ok(Some(record)) => batch.push(record),
                Ok(None) => break,
                Err(err) if !batch.is_empty() => {
                    self.deferred = Some(err);
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        if batch.is_empty() {
            self.mark_exhausted();
        }
        Ok(batch)
    }

    /// Iterate non-empty batches of `size` until the stream is exhausted.
    pub fn batches(&mut self, size: usize) -> MiniBatches<'_, R> {
        MiniBatches {
            stream: self,
            size,
            done: false,
        }
    }

    fn pull(&mut self) -> Result<Option<Record>, DatasetError> {
        if let Some(err) = self.deferred.take() {
            return Err(err);
        }
        if self.is_exhausted() {
            return Ok(None);
        }
        let record = match self.pending.take() {
            Some(record) => Some(record),
            None => self.read_next()?,
        };
        if record.is_some() {
            self.position += 1;
        }
        Ok(record)
    }

    fn read_next(&mut self) -> Result<Option<Record>, DatasetError> {
        if self.drained {
            return Ok(None);
        }
        match self.records.next() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(source)) => Err(DatasetError::Csv {
                line: source.position().map(|pos| pos.line()),
                source,
            }),
            None => {
                self.drained = true;
                Ok(None)
            }
        }
    }

    fn mark_exhausted(&mut self) {
        if self.state != StreamState::Exhausted {
            self.state = StreamState::Exhausted;
            tracing::info!("Review stream exhausted after {} records", self.position);
        }
    }
}

impl<R: Read> Iterator for ReviewStream<R> {
    type Item = Result<Record, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Batch iterator returned by [`ReviewStream::batches`].
pub struct MiniBatches<'a, R> {
    stream: &'a mut ReviewStream<R>,
    size: usize,
    done: bool,
}

impl<R: Read> Iterator for MiniBatches<'_, R> {
    type Item = Result<Batch, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.size == 0 {
            return None;
        }
        match self.stream.next_batch(self.size) {
            Ok(batch) if batch.is_empty() => {
                self.done = true;
                None
            }
            Ok(batch) => Some(Ok(batch)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
