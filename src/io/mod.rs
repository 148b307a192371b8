pub mod csv_import;
pub mod file;

pub use csv_import::{import_csv, import_csv_str, ImportError};
pub use file::{load_tasks, save_tasks, FileError};
