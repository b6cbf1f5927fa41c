pub mod import;
pub mod ingest;
pub mod serve;

pub use import::handle_import_command;
pub use ingest::handle_ingest_command;
pub use serve::handle_serve_command;
