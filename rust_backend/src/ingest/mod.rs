//! Bulk download of the raw ridership export.
//!
//! [`PagedDownloader`] drives any [`PageSource`]; the HTTP source for the
//! public open-data API lives behind the `download` feature.

pub mod download;
#[cfg(feature = "download")]
pub mod socrata;

pub use download::{
    count_existing_rows, DownloadError, DownloadReport, FetchError, PageSource, PagedDownloader,
    DEFAULT_DECREMENT, DEFAULT_PAGE_SIZE, TOTAL_NUMBER_OF_RECORDS,
};
#[cfg(feature = "download")]
pub use socrata::SocrataSource;
