pub mod command_loop;
pub mod console;
pub mod errors;
pub mod probe;
pub mod session;

// Re-export the main types here for easy import elsewhere.
pub use command_loop::*;
pub use console::*;
pub use errors::*;
pub use probe::*;
pub use session::*;
