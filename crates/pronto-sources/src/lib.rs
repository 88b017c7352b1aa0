//! External collaborators for the listing pipeline: CSV files, the Google
//! Sheets export, the database catalog, Nominatim, ipinfo and logo downloads.

pub mod catalog;
pub mod csv_source;
pub mod error;
pub mod geocoder;
mod http;
pub mod ip_locator;
pub mod logo;
pub mod sheets;

pub use catalog::{db_records, import_records, DataSource, ImportSummary};
pub use csv_source::{parse_csv_rows, read_csv_file};
pub use error::SourceError;
pub use geocoder::NominatimGeocoder;
pub use ip_locator::IpLocator;
pub use logo::{drive_file_id, logo_path, safe_name, LogoDownloader, LogoSummary};
pub use sheets::SheetsClient;
