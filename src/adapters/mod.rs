// Adapters layer: concrete implementations of the domain ports.

pub mod dataset;
pub mod storage;

pub use dataset::CsvDataset;
pub use storage::LocalStorage;
