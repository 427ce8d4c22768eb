pub mod booking;
pub mod session;
pub mod time_slot;
pub mod working_hours;

pub use booking::{Booking, NewBooking};
pub use session::{BookingSession, BookingStep};
pub use time_slot::TimeSlot;
pub use working_hours::WorkingHoursRule;
