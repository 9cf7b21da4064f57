//! Content API records for every collection the dashboard reads.

pub mod instrument;
pub mod lenient;
pub mod lesson;
pub mod package;
pub mod payment;
pub mod relation;
pub mod user;

pub use instrument::{Instrument, InstrumentLink};
pub use lesson::{Lesson, LessonStatus};
pub use package::{Package, PackageStatus};
pub use payment::Payment;
pub use relation::Relation;
pub use user::{RoleKind, RoleMatcher, User};
