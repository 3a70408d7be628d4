pub mod profile;
pub mod store;

pub use profile::*;
pub use store::*;
