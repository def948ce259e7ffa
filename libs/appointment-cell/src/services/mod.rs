pub mod booking;
pub mod lifecycle;

pub use booking::{AppointmentBookingService, ValidatedBooking};
pub use lifecycle::AppointmentLifecycleService;
