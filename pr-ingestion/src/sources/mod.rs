pub mod cells;
pub mod inventory;
pub mod metric_csv_dir;
pub mod processed_table;

pub use inventory::FolderInventory;
pub use metric_csv_dir::MetricCsvDirSource;
pub use processed_table::read_processed_table;
