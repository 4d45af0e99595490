pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod query;
pub mod store;
pub mod transfer;

pub use config::Config;
pub use datasource::{HttpPriceSource, MockPriceSource, PriceSource, PriceSourceError};
pub use db::{init_db, Repository};
pub use domain::{Decimal, FuturesTrade, RecordId, SpotTrade, TimeMs};
pub use error::AppError;
pub use store::{Collection, Ledger, StoreError};
