pub mod bells;
pub mod builder;
pub mod targeting;
pub mod upcoming;
pub mod week;

pub use bells::{BELL_SCHEDULE, BellSlot, bell_slot};
pub use builder::{
    DaySchedule, DaySlot, FloatingEvent, PairStatus, ResolvedPair, ScheduleSources,
    build_day_schedule,
};
pub use targeting::applies_to;
pub use upcoming::{SemesterProgress, UpcomingEvent, semester_progress, upcoming_events};
pub use week::{Parity, day_of_week, monday_of, week_number, week_parity};
