use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::entity::{Entity, FieldKind, FieldSpec, ReferenceSpec, Rule};
use crate::models::{Correction, Course};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exercise {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub mark: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction: Option<Box<Correction>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExercisePatch {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub mark: Option<i32>,
}

/// Exercise joined with its course and, when present, its correction.
#[derive(Debug, Clone, FromRow)]
pub struct ExerciseRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub mark: i32,
    pub course_id: i64,
    pub course_title: String,
    pub course_content: String,
    pub correction_id: Option<i64>,
    pub correction_content: Option<String>,
}

impl From<ExerciseRow> for Exercise {
    fn from(row: ExerciseRow) -> Self {
        let correction = match (row.correction_id, row.correction_content) {
            (Some(id), Some(content)) => Some(Box::new(Correction {
                id: Some(id),
                content,
                exercise: None,
            })),
            _ => None,
        };

        Self {
            id: Some(row.id),
            title: row.title,
            content: row.content,
            mark: row.mark,
            course: Some(Course {
                id: Some(row.course_id),
                title: row.course_title,
                content: row.course_content,
                exercises: None,
            }),
            correction,
        }
    }
}

static EXERCISE_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        name: "title",
        label: "Title",
        kind: FieldKind::Text,
        rules: &[Rule::Required],
    },
    FieldSpec {
        name: "content",
        label: "Content",
        kind: FieldKind::TextArea,
        rules: &[Rule::Required],
    },
    FieldSpec {
        name: "mark",
        label: "Mark",
        kind: FieldKind::Integer,
        rules: &[Rule::Required, Rule::Min(0), Rule::Number],
    },
];

static EXERCISE_REFERENCES: [ReferenceSpec; 1] = [ReferenceSpec {
    name: "course",
    label: "Course",
    target: "course",
    display_field: "title",
    required: true,
}];

impl Entity for Exercise {
    const NAME: &'static str = "exercise";
    const RESOURCE: &'static str = "exercises";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn fields() -> &'static [FieldSpec] {
        &EXERCISE_FIELDS
    }

    fn references() -> &'static [ReferenceSpec] {
        &EXERCISE_REFERENCES
    }
}
