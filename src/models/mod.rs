pub mod entry;
pub mod event;
pub mod overrides;
pub mod semester;
pub mod settings;
pub mod student;
pub mod subject;
pub mod targeting;
pub mod teacher;

pub use entry::{EntryType, ScheduleEntry, WeekParity};
pub use event::{Event, EventType};
pub use overrides::{OverrideType, ScheduleOverride};
pub use semester::SemesterConfig;
pub use settings::StudentSettings;
pub use student::Student;
pub use subject::{AdditionalLink, Subject};
pub use targeting::{Language, Subgroup, TargetLanguage, TargetSubgroup, Targets};
pub use teacher::Teacher;
