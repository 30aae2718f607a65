use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Exercise;
use crate::models::entity::{Entity, FieldKind, FieldSpec, ReferenceSpec, Rule};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Correction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise: Option<Exercise>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionPatch {
    pub id: Option<i64>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CorrectionRow {
    pub id: i64,
    pub content: String,
    pub exercise_id: i64,
    pub exercise_title: String,
    pub exercise_content: String,
    pub exercise_mark: i32,
}

impl From<CorrectionRow> for Correction {
    fn from(row: CorrectionRow) -> Self {
        Self {
            id: Some(row.id),
            content: row.content,
            exercise: Some(Exercise {
                id: Some(row.exercise_id),
                title: row.exercise_title,
                content: row.exercise_content,
                mark: row.exercise_mark,
                course: None,
                correction: None,
            }),
        }
    }
}

static CORRECTION_FIELDS: [FieldSpec; 1] = [FieldSpec {
    name: "content",
    label: "Content",
    kind: FieldKind::TextArea,
    rules: &[Rule::Required],
}];

static CORRECTION_REFERENCES: [ReferenceSpec; 1] = [ReferenceSpec {
    name: "exercise",
    label: "Exercise",
    target: "exercise",
    display_field: "title",
    required: true,
}];

impl Entity for Correction {
    const NAME: &'static str = "correction";
    const RESOURCE: &'static str = "corrections";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn fields() -> &'static [FieldSpec] {
        &CORRECTION_FIELDS
    }

    fn references() -> &'static [ReferenceSpec] {
        &CORRECTION_REFERENCES
    }
}
