// =====================================================================================
// BOOKING CELL - APPOINTMENT SLOT BOOKING ENGINE
// =====================================================================================
//
// This cell provides the concurrent slot booking engine:
// - Deterministic slot generation over a rolling date horizon
// - At-most-once slot claiming under per-resource locks
// - Cancellation with optimistic version re-validation
// - Specialty administration (add, retire, global reset)
//
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;

// Re-export commonly used types
pub use models::{AddSpecialtyRequest, BookSlotRequest, BookingError};
pub use router::{admin_routes, booking_routes};
pub use services::BookingCoordinator;
pub use state::AppState;
