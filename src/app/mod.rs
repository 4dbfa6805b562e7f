pub mod catalog_service;
pub mod ports;

pub use catalog_service::{CatalogService, ImportFailure, ImportProgress, ImportReport};
pub use ports::{CatalogApi, HttpClientPort, HttpGetResult};
