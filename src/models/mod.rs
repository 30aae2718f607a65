pub mod correction;
pub mod course;
pub mod entity;
pub mod exercise;
pub mod page;

pub use correction::{Correction, CorrectionPatch, CorrectionRow};
pub use course::{Course, CoursePatch, CourseRow};
pub use entity::{Entity, FieldKind, FieldSpec, ReferenceSpec, Rule};
pub use exercise::{Exercise, ExercisePatch, ExerciseRow};
pub use page::PageRequest;
