use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// How a scalar field is entered and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Integer,
}

/// Client-side validation rule attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Min(i64),
    Number,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub rules: &'static [Rule],
}

impl FieldSpec {
    pub fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }
}

/// A foreign-key field edited through a selection over a sibling collection.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceSpec {
    pub name: &'static str,
    pub label: &'static str,
    /// `Entity::NAME` of the referenced type.
    pub target: &'static str,
    /// Field of the referenced record shown in selections and detail rows.
    pub display_field: &'static str,
    pub required: bool,
}

/// Metadata every managed record type exposes so that a single generic
/// store, form, detail view and delete dialog can serve all of them.
pub trait Entity:
    Clone + Default + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Route segment, e.g. `course` for `/course/3/edit`.
    const NAME: &'static str;
    /// REST segment, e.g. `courses` for `/api/courses/3`.
    const RESOURCE: &'static str;

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: Option<i64>);

    fn fields() -> &'static [FieldSpec];

    fn references() -> &'static [ReferenceSpec] {
        &[]
    }

    fn list_path() -> String {
        format!("/{}", Self::NAME)
    }
}
