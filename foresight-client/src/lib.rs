//! foresight-client: REST client for profile and cash-flow endpoints, plus CSV forecast import

pub mod api;
pub mod error;
pub mod forecast_csv;
pub mod payload;

pub use api::ApiClient;
pub use error::{FetchError, ImportError};
pub use forecast_csv::{parse_forecast_csv, parse_forecast_csv_reader};
pub use payload::{decode_forecast, decode_profile};
