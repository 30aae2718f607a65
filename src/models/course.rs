use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Exercise;
use crate::models::entity::{Entity, FieldKind, FieldSpec, Rule};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Course {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<Exercise>>,
}

/// PATCH body: only present, non-null fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoursePatch {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: i64,
    pub title: String,
    pub content: String,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: Some(row.id),
            title: row.title,
            content: row.content,
            exercises: None,
        }
    }
}

static COURSE_FIELDS: [FieldSpec; 2] = [
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
];

impl Entity for Course {
    const NAME: &'static str = "course";
    const RESOURCE: &'static str = "courses";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn fields() -> &'static [FieldSpec] {
        &COURSE_FIELDS
    }
}
