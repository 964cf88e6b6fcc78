pub mod coordinator;
pub mod generator;
pub mod lock;

pub use coordinator::BookingCoordinator;
pub use lock::{LockPolicy, LockTable};
