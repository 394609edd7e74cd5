// Adapters: everything that touches the filesystem or the network lives
// here, behind the domain ports.

pub mod csv_store;
pub mod fx;
pub mod import;
pub mod rest_store;
