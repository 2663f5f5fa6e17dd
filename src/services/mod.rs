// Service exports
pub mod dataset;
pub mod geocoding;

pub use dataset::{Dataset, DataError, LoadBoard, ZipTable};
pub use geocoding::{GeocodingError, RemoteGeocoder, ZipResolver};
