pub mod session_store;
pub mod sweeper;

pub use session_store::SessionStore;
pub use sweeper::SessionSweeper;
