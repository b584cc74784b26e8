//! Date resolution and notification scheduling.
//!
//! - Clock: injected source of local "now"
//! - Resolver: due-date phrase → concrete date
//! - Scheduler: tasks + preferences → notification plan

pub mod clock;
pub mod resolver;
pub mod scheduler;

pub use clock::{Clock, FixedClock, SystemClock};
pub use resolver::{resolve, weekday_from_name, weekday_number, DueDatePhraseResolver};
pub use scheduler::{ApplyReport, NotificationScheduler, SchedulerError};
