pub mod init;
pub mod init_types;
pub mod resolver;

pub use init::{build_parcels, load_distance_table, load_package_rows};
pub use resolver::LocationIndex;
