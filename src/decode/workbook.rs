//! Workbook decoding: package loading and worksheet fan-out.

use super::options::{CancellationToken, DecodeOptions, ErrorMode};
use super::stream::{bounded, Publisher, Stream};
use super::worksheet::{Worksheet, WorksheetDecoder};
use super::{build_pool, spawn_named};
use crate::error::{Error, Result};
use crate::xlsx::{SharedStrings, SheetData, WorkbookPackage, WorksheetPart};
use rayon::ThreadPool;
use std::path::Path;
use std::sync::Arc;

/// Decodes workbooks on a private thread pool.
///
/// One decoder can be reused for many workbooks; they share its pool.
///
/// # Example
///
/// ```no_run
/// use unsheet::decode::{DecodeOptions, WorkbookDecoder};
///
/// let decoder = WorkbookDecoder::new(DecodeOptions::new().strict())?;
/// let workbook = decoder.decode_path("report.xlsx")?;
/// for worksheet in workbook {
///     let worksheet = worksheet?;
///     for row in worksheet.rows() {
///         println!("{}: {:?}", worksheet.name(), row?.values);
///     }
/// }
/// # Ok::<(), unsheet::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct WorkbookDecoder {
    options: DecodeOptions,
    pool: Arc<ThreadPool>,
}

impl WorkbookDecoder {
    pub fn new(options: DecodeOptions) -> Result<Self> {
        let pool = build_pool(options.threads)?;
        log::debug!("decode pool ready with {} threads", pool.current_num_threads());
        Ok(Self {
            options,
            pool: Arc::new(pool),
        })
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// The pool rows are decoded on.
    pub fn pool(&self) -> &Arc<ThreadPool> {
        &self.pool
    }

    /// Open and decode the workbook at `path`.
    pub fn decode_path(&self, path: impl AsRef<Path>) -> Result<Workbook> {
        self.decode_package(WorkbookPackage::open(path)?)
    }

    /// Decode a workbook held in memory.
    pub fn decode_bytes(&self, data: Vec<u8>) -> Result<Workbook> {
        self.decode_package(WorkbookPackage::from_bytes(data)?)
    }

    /// Start decoding an opened package.
    ///
    /// Returns once the shared strings are loaded; worksheets arrive on the
    /// returned [`Workbook`] as their producers start.
    pub fn decode_package(&self, mut package: WorkbookPackage) -> Result<Workbook> {
        let shared_strings = Arc::new(package.take_shared_strings());
        let parts = package.worksheet_parts().to_vec();
        let sheet_names = parts.iter().map(|p| p.name.clone()).collect();
        log::debug!(
            "decoding {} worksheets with {} shared strings",
            parts.len(),
            shared_strings.len()
        );

        // Cancelling this workbook must not cancel later decodes
        let cancellation = self.options.cancellation.child();
        let options = DecodeOptions {
            cancellation: cancellation.clone(),
            ..self.options.clone()
        };

        let (publisher, worksheets) = bounded(parts.len());
        let driver = Driver {
            package,
            parts,
            shared_strings: Arc::clone(&shared_strings),
            options,
            pool: Arc::clone(&self.pool),
            publisher,
        };
        spawn_named("unsheet-workbook".to_string(), move || driver.run())?;

        Ok(Workbook {
            shared_strings,
            sheet_names,
            worksheets,
            cancellation,
        })
    }
}

/// A workbook whose worksheets are still arriving.
///
/// Worksheets come out in the order their producers start, which need not
/// be workbook order; use [`Worksheet::index`] to restore it. In lenient
/// mode, worksheets that fail to parse are left out.
#[derive(Debug)]
pub struct Workbook {
    shared_strings: Arc<SharedStrings>,
    sheet_names: Vec<String>,
    worksheets: Stream<Result<Worksheet>>,
    cancellation: CancellationToken,
}

impl Workbook {
    pub fn shared_strings(&self) -> &Arc<SharedStrings> {
        &self.shared_strings
    }

    /// Names of all sheets listed by the workbook, in workbook order.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    pub fn sheet_count(&self) -> usize {
        self.sheet_names.len()
    }

    /// Stop all outstanding worksheet and row work.
    ///
    /// Streams end once producers notice; a producer blocked on a full
    /// buffer notices after its next item is taken or the stream dropped.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Block for the next worksheet; `None` once all have been delivered.
    pub fn next_worksheet(&self) -> Option<Result<Worksheet>> {
        self.worksheets.next_item()
    }

    pub fn worksheets(&self) -> impl Iterator<Item = Result<Worksheet>> + '_ {
        self.worksheets.iter()
    }

    pub fn into_worksheets(self) -> Stream<Result<Worksheet>> {
        self.worksheets
    }
}

impl Iterator for Workbook {
    type Item = Result<Worksheet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.worksheets.next_item()
    }
}

/// Owns the package and starts one producer per worksheet.
struct Driver {
    package: WorkbookPackage,
    parts: Vec<WorksheetPart>,
    shared_strings: Arc<SharedStrings>,
    options: DecodeOptions,
    pool: Arc<ThreadPool>,
    publisher: Publisher<Result<Worksheet>>,
}

impl Driver {
    fn run(self) {
        for part in &self.parts {
            if self.options.cancellation.is_cancelled() {
                log::debug!("workbook decode cancelled");
                return;
            }

            let xml = match self.package.read_worksheet(part) {
                Ok(xml) => xml,
                Err(e) => {
                    if self.reject(e.in_worksheet(&part.name)) {
                        continue;
                    }
                    return;
                }
            };

            let decoder = WorksheetDecoder::new(
                part.name.clone(),
                part.index,
                Arc::clone(&self.shared_strings),
                self.options.clone(),
            );
            let publisher = self.publisher.clone();
            let pool = Arc::clone(&self.pool);
            let mode = self.options.error_mode;

            let spawned = spawn_named(format!("unsheet-sheet-{}", part.index), move || {
                produce(decoder, &xml, mode, publisher, &pool)
            });
            if let Err(e) = spawned {
                log::error!("cannot start worksheet {:?}: {}", part.name, e);
                self.publisher.publish(Err(e));
                return;
            }
        }
    }

    /// Apply the failure policy to a worksheet that cannot be decoded.
    ///
    /// Returns `false` when the consumer is gone.
    fn reject(&self, error: Error) -> bool {
        match self.options.error_mode {
            ErrorMode::Lenient => {
                log::warn!("dropping worksheet: {}", error);
                true
            }
            ErrorMode::Strict => self.publisher.publish(Err(error)),
        }
    }
}

/// Parse one worksheet, hand its handle to the consumer, then decode rows.
fn produce(
    decoder: WorksheetDecoder,
    xml: &str,
    mode: ErrorMode,
    publisher: Publisher<Result<Worksheet>>,
    pool: &ThreadPool,
) {
    let sheet = match SheetData::parse(xml) {
        Ok(sheet) => sheet,
        Err(e) => {
            let e = e.in_worksheet(decoder.name());
            match mode {
                ErrorMode::Lenient => log::warn!("dropping worksheet: {}", e),
                ErrorMode::Strict => {
                    publisher.publish(Err(e));
                }
            }
            return;
        }
    };

    let (worksheet, job) = decoder.launch(sheet);
    if !publisher.publish(Ok(worksheet)) {
        return;
    }
    // Release the workbook stream before the long row phase
    drop(publisher);
    job.run(pool);
}
