//! Protocol data model shared between the session core, the analysis engine,
//! and the transport layer.
//!
//! A [`ChangeSet`] is the atomic unit of recorded work: one applied
//! refactoring, or one undo/redo step. The orchestrator never interprets the
//! per-resource `description` text — it only surfaces it to clients — but the
//! edit payload carries enough structure for mechanical inversion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file or folder within the project, identified by project-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Project-relative path, '/'-separated
    pub path: String,
    /// Whether the resource is a folder
    pub is_folder: bool,
}

impl Resource {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_folder: false,
        }
    }

    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_folder: true,
        }
    }
}

/// The edit applied to a single resource, in a form the history can invert
/// without understanding its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditPayload {
    /// Replace the full contents of an existing resource
    Edit { old_text: String, new_text: String },
    /// Create a new resource with the given contents
    Create { text: String },
    /// Delete a resource (retaining its contents for inversion)
    Delete { text: String },
    /// Move/rename a resource to a new project-relative path
    Move { to: String },
}

/// One resource's contribution to a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceChange {
    /// Project-relative path of the affected resource
    pub path: String,
    /// Opaque textual description of the edit (diff or structural summary)
    pub description: String,
    /// The invertible edit payload
    pub payload: EditPayload,
}

impl ResourceChange {
    /// Produce the change that exactly reverses this one.
    pub fn inverted(&self) -> ResourceChange {
        match &self.payload {
            EditPayload::Edit { old_text, new_text } => ResourceChange {
                path: self.path.clone(),
                description: self.description.clone(),
                payload: EditPayload::Edit {
                    old_text: new_text.clone(),
                    new_text: old_text.clone(),
                },
            },
            EditPayload::Create { text } => ResourceChange {
                path: self.path.clone(),
                description: self.description.clone(),
                payload: EditPayload::Delete { text: text.clone() },
            },
            EditPayload::Delete { text } => ResourceChange {
                path: self.path.clone(),
                description: self.description.clone(),
                payload: EditPayload::Create { text: text.clone() },
            },
            EditPayload::Move { to } => ResourceChange {
                path: to.clone(),
                description: self.description.clone(),
                payload: EditPayload::Move {
                    to: self.path.clone(),
                },
            },
        }
    }
}

/// An atomic, recorded, invertible group of edits applied to one or more
/// resources. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    /// Human-readable description, e.g. "Rename parse to parse_module"
    pub description: String,
    /// Creation time of this change set
    pub timestamp: DateTime<Utc>,
    /// Ordered per-resource changes
    pub changes: Vec<ResourceChange>,
}

impl ChangeSet {
    pub fn new(description: impl Into<String>, changes: Vec<ResourceChange>) -> Self {
        Self {
            description: description.into(),
            timestamp: Utc::now(),
            changes,
        }
    }

    /// Build the inverse change set. Per-resource changes are inverted and
    /// applied in reverse order so that later edits are rolled back first.
    pub fn inverted(&self) -> ChangeSet {
        ChangeSet::new(
            self.description.clone(),
            self.changes.iter().rev().map(ResourceChange::inverted).collect(),
        )
    }

    /// Concatenated per-resource descriptions, the "full textual change"
    /// surfaced by history info queries.
    pub fn full_description(&self) -> String {
        self.changes
            .iter()
            .map(|c| c.description.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Paths of all affected resources, in change order.
    pub fn affected_paths(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.path.as_str()).collect()
    }
}

/// Full detail about one history entry, as surfaced by undo-info/redo-info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSetInfo {
    pub description: String,
    pub time: DateTime<Utc>,
    pub full_change: String,
    pub changes: Vec<ResourceChangeInfo>,
}

/// One resource's entry in a [`ChangeSetInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceChangeInfo {
    pub resource: String,
    pub change: String,
}

impl From<&ChangeSet> for ChangeSetInfo {
    fn from(change_set: &ChangeSet) -> Self {
        ChangeSetInfo {
            description: change_set.description.clone(),
            time: change_set.timestamp,
            full_change: change_set.full_description(),
            changes: change_set
                .changes
                .iter()
                .map(|c| ResourceChangeInfo {
                    resource: c.path.clone(),
                    change: c.description.clone(),
                })
                .collect(),
        }
    }
}

/// A single code-assist completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionCandidate {
    pub name: String,
    pub doc: Option<String>,
    pub scope: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Raw definition-lookup result as reported by an analysis engine.
///
/// `path: None` with `line: Some` means the definition lives in the resource
/// that was queried; the orchestrator substitutes the resolved path before
/// surfacing the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionLocation {
    pub path: Option<String>,
    pub line: Option<u32>,
}

impl DefinitionLocation {
    pub fn none() -> Self {
        Self {
            path: None,
            line: None,
        }
    }

    pub fn same_resource(line: u32) -> Self {
        Self {
            path: None,
            line: Some(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn edit(path: &str, old: &str, new: &str) -> ResourceChange {
        ResourceChange {
            path: path.to_string(),
            description: format!("--- {path}"),
            payload: EditPayload::Edit {
                old_text: old.to_string(),
                new_text: new.to_string(),
            },
        }
    }

    #[test]
    fn inverting_twice_restores_the_original_payloads() {
        let cs = ChangeSet::new(
            "Rename a to b",
            vec![edit("src/a.py", "a = 1", "b = 1"), edit("src/c.py", "use a", "use b")],
        );
        let back = cs.inverted().inverted();
        assert_eq!(back.changes, cs.changes);
        assert_eq!(back.description, cs.description);
    }

    #[test]
    fn inversion_reverses_change_order() {
        let cs = ChangeSet::new("multi", vec![edit("first", "x", "y"), edit("second", "p", "q")]);
        let inv = cs.inverted();
        assert_eq!(inv.changes[0].path, "second");
        assert_eq!(inv.changes[1].path, "first");
    }

    #[test]
    fn move_inversion_swaps_endpoints() {
        let change = ResourceChange {
            path: "old/name.py".to_string(),
            description: "Move old/name.py to new/name.py".to_string(),
            payload: EditPayload::Move {
                to: "new/name.py".to_string(),
            },
        };
        let inv = change.inverted();
        assert_eq!(inv.path, "new/name.py");
        assert_eq!(
            inv.payload,
            EditPayload::Move {
                to: "old/name.py".to_string()
            }
        );
    }

    #[test]
    fn create_inversion_is_delete() {
        let change = ResourceChange {
            path: "fresh.py".to_string(),
            description: "Create fresh.py".to_string(),
            payload: EditPayload::Create {
                text: "pass\n".to_string(),
            },
        };
        assert_eq!(
            change.inverted().payload,
            EditPayload::Delete {
                text: "pass\n".to_string()
            }
        );
    }

    #[test]
    fn info_projection_carries_full_change_text() {
        let cs = ChangeSet::new("Extract method helper", vec![edit("m.py", "a", "b")]);
        let info = ChangeSetInfo::from(&cs);
        assert_eq!(info.description, "Extract method helper");
        assert_eq!(info.full_change, "--- m.py");
        assert_eq!(info.changes.len(), 1);
        assert_eq!(info.changes[0].resource, "m.py");
    }

    #[test]
    fn completion_candidate_serializes_kind_as_type() {
        let candidate = CompletionCandidate {
            name: "parse".to_string(),
            doc: None,
            scope: "global".to_string(),
            kind: "function".to_string(),
        };
        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["type"], "function");
    }
}
