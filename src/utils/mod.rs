pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::{OUTPUT_DIR_ENV, get_output_dir};
pub use paths::{
    collection_file_name, default_csv_path, event_type_from_file_name, format_path_with_tilde,
    validate_file_size,
};
pub use terminal::printable_label;
