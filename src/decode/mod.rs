//! Concurrent decoding pipeline.
//!
//! A [`WorkbookDecoder`] opens the package, loads the shared strings, and
//! then streams one [`Worksheet`] per listed sheet. Each worksheet streams
//! its [`Row`](crate::model::Row)s as they finish. Both streams are bounded:
//! producers wait while the consumer is behind.

mod cell;
mod options;
mod row;
mod stream;
mod workbook;
mod worksheet;

pub use cell::{parse_date, serial_to_datetime, CellDecoder};
pub use options::{CancellationToken, DecodeOptions, ErrorMode};
pub use row::RowAssembler;
pub use stream::{bounded, Poll, Publisher, Stream};
pub use workbook::{Workbook, WorkbookDecoder};
pub use worksheet::{Worksheet, WorksheetDecoder};

use crate::error::Result;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Build a decode pool with `threads` workers (rayon's default when `None`).
///
/// Falls back to a single worker if the requested size cannot be built.
pub fn build_pool(threads: Option<usize>) -> Result<ThreadPool> {
    let try_build = |n: Option<usize>| {
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|i| format!("unsheet-decode-{}", i));
        if let Some(n) = n {
            builder = builder.num_threads(n.max(1));
        }
        builder.build()
    };

    match try_build(threads) {
        Ok(pool) => Ok(pool),
        Err(e) if threads != Some(1) => {
            log::warn!("falling back to a single decode thread: {}", e);
            Ok(try_build(Some(1))?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Spawn a detached, named producer thread.
pub(crate) fn spawn_named<F>(name: String, f: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    std::thread::Builder::new().name(name).spawn(f)?;
    Ok(())
}
