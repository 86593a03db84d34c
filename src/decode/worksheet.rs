//! Worksheet decoding: sizing, row fan-out and streaming publication.

use super::cell::CellDecoder;
use super::options::{CancellationToken, DecodeOptions, ErrorMode};
use super::row::RowAssembler;
use super::stream::{bounded, Publisher, Stream};
use super::spawn_named;
use crate::error::Result;
use crate::model::{Row, RowElement};
use crate::reference::Dimension;
use crate::xlsx::{SharedStrings, SheetData};
use rayon::ThreadPool;
use std::fmt;
use std::sync::{mpsc, Arc};

/// Lifecycle of a worksheet decode, reported at trace level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Sizing,
    Decoding,
    Published,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Created => "created",
            Phase::Sizing => "sizing",
            Phase::Decoding => "decoding",
            Phase::Published => "published",
        };
        f.write_str(name)
    }
}

fn enter(sheet: &str, phase: Phase) {
    log::trace!("worksheet {:?}: {}", sheet, phase);
}

/// A worksheet whose rows are still arriving.
///
/// Rows come out in completion order, not row order. Producers block when
/// the buffer is full, so drain every worksheet you receive or drop it;
/// dropping the handle stops its remaining row tasks.
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    index: usize,
    dimension: Option<Dimension>,
    rows: Stream<Result<Row>>,
}

impl Worksheet {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the sheet in workbook order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Parsed dimension hint, if the sheet declared a usable one.
    pub fn dimension(&self) -> Option<&Dimension> {
        self.dimension.as_ref()
    }

    /// Row buffer size chosen while sizing.
    pub fn capacity(&self) -> usize {
        self.rows.capacity()
    }

    /// Block for the next finished row; `None` once every row task is done.
    pub fn next_row(&self) -> Option<Result<Row>> {
        self.rows.next_item()
    }

    /// Blocking iterator over the remaining rows.
    pub fn rows(&self) -> impl Iterator<Item = Result<Row>> + '_ {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Stream<Result<Row>> {
        self.rows
    }

    /// Drain all rows and order them by row number.
    ///
    /// Stops at the first failed row (strict mode only delivers those).
    pub fn collect_sorted(self) -> Result<Vec<Row>> {
        let mut rows = self.rows.collect::<Result<Vec<_>>>()?;
        rows.sort_by_key(|r| r.number);
        Ok(rows)
    }
}

/// Decodes the rows of one worksheet in parallel.
#[derive(Debug, Clone)]
pub struct WorksheetDecoder {
    name: String,
    index: usize,
    shared_strings: Arc<SharedStrings>,
    options: DecodeOptions,
}

impl WorksheetDecoder {
    pub fn new(
        name: impl Into<String>,
        index: usize,
        shared_strings: Arc<SharedStrings>,
        options: DecodeOptions,
    ) -> Self {
        let decoder = Self {
            name: name.into(),
            index,
            shared_strings,
            options,
        };
        enter(&decoder.name, Phase::Created);
        decoder
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parse worksheet XML and start decoding its rows on `pool`.
    ///
    /// Malformed XML is reported as [`Error::Worksheet`](crate::Error::Worksheet).
    pub fn decode_xml(self, xml: &str, pool: &Arc<ThreadPool>) -> Result<Worksheet> {
        let sheet = SheetData::parse(xml).map_err(|e| e.in_worksheet(&self.name))?;
        self.decode_rows(sheet, pool)
    }

    /// Start decoding `sheet` and return its handle at once.
    ///
    /// Rows are produced from a dedicated thread that fans them out on
    /// `pool` and publishes each as it completes.
    pub fn decode_rows(self, sheet: SheetData, pool: &Arc<ThreadPool>) -> Result<Worksheet> {
        let thread_name = format!("unsheet-sheet-{}", self.index);
        let (worksheet, job) = self.launch(sheet);
        let pool = Arc::clone(pool);
        spawn_named(thread_name, move || job.run(&pool))?;
        Ok(worksheet)
    }

    /// Size the row buffer and split into the consumer handle and the
    /// producer job.
    pub(crate) fn launch(self, sheet: SheetData) -> (Worksheet, RowJob) {
        enter(&self.name, Phase::Sizing);
        let (dimension, capacity) = self.size(sheet.dimension_hint.as_deref());
        let (publisher, rows) = bounded(capacity);

        let worksheet = Worksheet {
            name: self.name.clone(),
            index: self.index,
            dimension,
            rows,
        };
        let job = RowJob {
            sheet: self.name,
            rows: sheet.rows,
            shared_strings: self.shared_strings,
            options: self.options,
            publisher,
        };
        (worksheet, job)
    }

    /// Pick the row buffer size from the dimension hint.
    ///
    /// The hint only sizes the buffer; rows past it are still accepted.
    fn size(&self, hint: Option<&str>) -> (Option<Dimension>, usize) {
        let default = self.options.default_row_capacity;
        let Some(hint) = hint else {
            log::debug!("worksheet {:?} has no dimension hint", self.name);
            return (None, default);
        };

        match Dimension::parse(hint) {
            Ok(dimension) => {
                let capacity =
                    (dimension.row_span() as usize).clamp(1, self.options.max_row_capacity);
                (Some(dimension), capacity)
            }
            Err(e) => {
                log::debug!(
                    "worksheet {:?}: ignoring dimension hint {:?}: {}",
                    self.name,
                    hint,
                    e
                );
                (None, default)
            }
        }
    }
}

/// Rows in flight per pool thread.
const ROWS_IN_FLIGHT_PER_THREAD: usize = 2;

/// Producer side of a worksheet: decodes rows and publishes them.
pub(crate) struct RowJob {
    sheet: String,
    rows: Vec<RowElement>,
    shared_strings: Arc<SharedStrings>,
    options: DecodeOptions,
    publisher: Publisher<Result<Row>>,
}

impl RowJob {
    /// Decode every row as its own task on `pool` and publish each one from
    /// the calling thread as soon as it completes.
    ///
    /// Pool tasks report back over an unbounded channel and never wait on
    /// the stream; only this thread blocks when the consumer falls behind.
    /// At most a few rows per pool thread are in flight at once. The stream
    /// ends when this returns.
    pub(crate) fn run(self, pool: &ThreadPool) {
        let RowJob {
            sheet,
            rows,
            shared_strings,
            options,
            publisher,
        } = self;
        enter(&sheet, Phase::Decoding);

        let sheet: Arc<str> = Arc::from(sheet);
        let window = pool.current_num_threads().max(1) * ROWS_IN_FLIGHT_PER_THREAD;
        let (done_tx, done_rx) = mpsc::channel::<Option<Result<Row>>>();
        let mut pending = rows.into_iter();
        let mut in_flight = 0usize;

        loop {
            while in_flight < window && !options.cancellation.is_cancelled() {
                let Some(element) = pending.next() else {
                    break;
                };
                let task = RowTask {
                    sheet: Arc::clone(&sheet),
                    shared_strings: Arc::clone(&shared_strings),
                    mode: options.error_mode,
                    cancellation: options.cancellation.clone(),
                    done: done_tx.clone(),
                };
                pool.spawn(move || task.run(element));
                in_flight += 1;
            }

            if in_flight == 0 {
                break;
            }
            let Ok(decoded) = done_rx.recv() else {
                break;
            };
            in_flight -= 1;

            if let Some(item) = decoded {
                if !publisher.publish(item) {
                    log::debug!("worksheet {:?}: consumer dropped, stopping", sheet);
                    return;
                }
            }
        }

        if options.cancellation.is_cancelled() {
            log::debug!("worksheet {:?}: cancelled", sheet);
        }
        enter(&sheet, Phase::Published);
    }
}

/// One row decode running on the pool.
struct RowTask {
    sheet: Arc<str>,
    shared_strings: Arc<SharedStrings>,
    mode: ErrorMode,
    cancellation: CancellationToken,
    done: mpsc::Sender<Option<Result<Row>>>,
}

impl RowTask {
    fn run(self, element: RowElement) {
        let decoded = if self.cancellation.is_cancelled() {
            None
        } else {
            let assembler = RowAssembler::new(CellDecoder::new(&self.shared_strings, self.mode));
            decode_row(&assembler, &self.sheet, self.mode, &element)
        };
        // The producer is gone only when its consumer dropped the stream
        let _ = self.done.send(decoded);
    }
}

/// Decode one row, applying the failure policy.
///
/// `None` means there is nothing to publish: the row had no cells or it
/// failed in lenient mode.
fn decode_row(
    assembler: &RowAssembler<'_>,
    sheet: &str,
    mode: ErrorMode,
    element: &RowElement,
) -> Option<Result<Row>> {
    match assembler.assemble(element) {
        Ok(row) => row.map(Ok),
        Err(e) => {
            let e = e.in_row(sheet, element.number);
            match mode {
                ErrorMode::Lenient => {
                    log::warn!("dropping row: {}", e);
                    None
                }
                ErrorMode::Strict => Some(Err(e)),
            }
        }
    }
}
