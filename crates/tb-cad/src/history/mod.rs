//! Edit History
//!
//! The drawing is stored as an append-only log of actions. The entity set is
//! never edited directly; it is re-derived by folding the log from an empty
//! state. Undo appends a marker that cancels the closest preceding action and
//! redo drops a trailing marker again.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::model::{Entity, EntityId, EntityKind, EntitySet};
use crate::validate::{self, ValidationError};

/// One entry in the edit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Add a new entity
    Create(Entity),
    /// Replace the stored payload of an existing entity
    Update(Entity),
    /// Remove an entity
    Delete {
        /// Kind of the removed entity
        entity: EntityKind,
        /// Id of the removed entity, stored as `value: { id }`
        #[serde(rename = "value", with = "id_value")]
        id: EntityId,
    },
    /// Cancel the closest preceding action that is still in effect
    Undo,
}

impl Action {
    /// Get the type name of this action
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Create(_) => "Create",
            Action::Update(_) => "Update",
            Action::Delete { .. } => "Delete",
            Action::Undo => "Undo",
        }
    }

    pub fn is_undo(&self) -> bool {
        matches!(self, Action::Undo)
    }
}

/// `{ "id": ... }` wrapper so deletes carry their payload under `value`
mod id_value {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::model::EntityId;

    #[derive(Serialize, Deserialize)]
    struct IdValue {
        id: EntityId,
    }

    pub fn serialize<S: Serializer>(id: &EntityId, serializer: S) -> Result<S::Ok, S::Error> {
        IdValue { id: *id }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntityId, D::Error> {
        Ok(IdValue::deserialize(deserializer)?.id)
    }
}

/// Actions still in effect once every undo marker has cancelled its target
pub fn effective_actions(actions: &[Action]) -> Vec<&Action> {
    let mut effective = Vec::with_capacity(actions.len());
    for action in actions {
        if action.is_undo() {
            if effective.pop().is_none() {
                tracing::debug!("Undo marker with nothing to undo ignored");
            }
        } else {
            effective.push(action);
        }
    }
    effective
}

/// Fold an action log into the entity set it describes
pub fn reduce(actions: &[Action]) -> EntitySet {
    let mut set = EntitySet::new();
    for action in effective_actions(actions) {
        apply(&mut set, action);
    }
    set
}

fn apply(set: &mut EntitySet, action: &Action) {
    match action {
        Action::Create(entity) => {
            if set.insert(entity.clone()).is_some() {
                tracing::warn!(
                    "Create for existing {} {} replaced it",
                    entity.kind(),
                    entity.id()
                );
            }
        }
        Action::Update(entity) => {
            if set.contains(entity.kind(), entity.id()) {
                set.insert(entity.clone());
            } else {
                tracing::warn!(
                    "Update for missing {} {} ignored",
                    entity.kind(),
                    entity.id()
                );
            }
        }
        Action::Delete { entity, id } => {
            if set.remove(*entity, *id).is_none() {
                tracing::warn!("Delete for missing {} {} ignored", entity, id);
            }
        }
        // Cancelled before folding
        Action::Undo => {}
    }
}

/// History-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum HistoryError {
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Action rejected: {0}")]
    Rejected(#[from] ValidationError),
}

/// Result type for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Immutable, append-only edit log
///
/// Every editing operation returns a new `History`; the receiver is left
/// untouched so callers can key caches on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    actions: Vec<Action>,
}

impl From<Vec<Action>> for History {
    fn from(actions: Vec<Action>) -> Self {
        Self { actions }
    }
}

impl History {
    /// Create a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of logged actions, undo markers included
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Get all logged actions
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Actions still in effect
    pub fn effective_actions(&self) -> Vec<&Action> {
        effective_actions(&self.actions)
    }

    /// Derive the current entity set
    pub fn reduce(&self) -> EntitySet {
        reduce(&self.actions)
    }

    /// History with `action` appended
    pub fn push(&self, action: Action) -> Self {
        let mut actions = self.actions.clone();
        actions.push(action);
        Self { actions }
    }

    /// Append `action` after checking it against the current model
    ///
    /// Creating a member, or updating one onto new end nodes, is rejected
    /// when the member would be degenerate; the returned error leaves the log
    /// unchanged.
    pub fn push_checked(&self, action: Action, config: &EngineConfig) -> HistoryResult<Self> {
        if let Action::Create(Entity::Member(member)) | Action::Update(Entity::Member(member)) =
            &action
        {
            let set = self.reduce();
            let (Some(node1), Some(node2)) =
                (set.node(member.node1.id), set.node(member.node2.id))
            else {
                tracing::debug!("Member {} references unknown nodes; allowing", member.id);
                return Ok(self.push(action));
            };
            validate::validate_new_member_with_config(node1, node2, &set, config)?;
        }
        Ok(self.push(action))
    }

    /// Whether there is an action left to undo
    pub fn can_undo(&self) -> bool {
        !self.effective_actions().is_empty()
    }

    /// Whether the log ends in an undo marker
    pub fn can_redo(&self) -> bool {
        self.actions.last().is_some_and(Action::is_undo)
    }

    /// History with an undo marker appended, or `None` if nothing is in effect
    pub fn undo(&self) -> Option<Self> {
        self.can_undo().then(|| self.push(Action::Undo))
    }

    /// History with the trailing undo marker removed, or `None` if the log
    /// does not end in one
    pub fn redo(&self) -> Option<Self> {
        if !self.can_redo() {
            return None;
        }
        let mut actions = self.actions.clone();
        actions.pop();
        Some(Self { actions })
    }

    /// Parse a history document (a JSON array of actions)
    pub fn from_json(content: &str) -> HistoryResult<Self> {
        serde_json::from_str(content).map_err(|e| HistoryError::Deserialize(e.to_string()))
    }

    /// Serialize to a history document
    pub fn to_json(&self) -> HistoryResult<String> {
        serde_json::to_string(self).map_err(|e| HistoryError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, Node};
    use uuid::Uuid;

    fn id(n: u128) -> EntityId {
        Uuid::from_u128(n)
    }

    fn sample() -> History {
        History::new()
            .push(Action::Create(Entity::Node(Node::at(id(1), 0.0, 0.0))))
            .push(Action::Create(Entity::Node(Node::at(id(2), 10.0, 0.0))))
            .push(Action::Create(Entity::Member(Member::new(
                id(10),
                id(1),
                id(2),
            ))))
    }

    #[test]
    fn test_create_update_delete() {
        let history = sample()
            .push(Action::Update(Entity::Node(Node::at(id(2), 20.0, 0.0))))
            .push(Action::Delete {
                entity: EntityKind::Member,
                id: id(10),
            });

        let set = history.reduce();
        assert_eq!(set.nodes.len(), 2);
        assert!(set.members.is_empty());
        assert_eq!(set.node(id(2)), Some(&Node::at(id(2), 20.0, 0.0)));
    }

    #[test]
    fn test_update_missing_is_ignored() {
        let history =
            History::new().push(Action::Update(Entity::Node(Node::at(id(1), 1.0, 1.0))));
        assert!(history.reduce().is_empty());
    }

    #[test]
    fn test_undo_cancels_last_action() {
        let history = sample();
        let undone = history.undo().unwrap();
        let expected: History = history.actions()[..2].to_vec().into();
        assert_eq!(undone.reduce(), expected.reduce());
        assert!(undone.can_redo());
    }

    #[test]
    fn test_repeated_undo_and_redo() {
        let history = sample();
        let twice = history.undo().unwrap().undo().unwrap();
        assert_eq!(twice.reduce().nodes.len(), 1);
        assert!(twice.reduce().members.is_empty());

        let once = twice.redo().unwrap();
        assert_eq!(once.reduce().nodes.len(), 2);
        let back = once.redo().unwrap();
        assert_eq!(back.reduce(), history.reduce());
        assert!(back.redo().is_none());
    }

    #[test]
    fn test_new_action_after_undo_keeps_undo() {
        let history = sample()
            .undo()
            .unwrap()
            .push(Action::Create(Entity::Node(Node::at(id(3), 5.0, 5.0))));
        assert!(!history.can_redo());
        let set = history.reduce();
        assert!(set.members.is_empty());
        assert_eq!(set.nodes.len(), 3);
    }

    #[test]
    fn test_undo_on_empty() {
        assert!(History::new().undo().is_none());
        let stray: History = vec![Action::Undo].into();
        assert!(stray.reduce().is_empty());
        assert!(!stray.can_undo());
    }

    #[test]
    fn test_push_checked_rejects_degenerate_member() {
        let history = History::new()
            .push(Action::Create(Entity::Node(Node::at(id(1), 0.0, 0.0))))
            .push(Action::Create(Entity::Node(Node::at(id(2), 0.5, 0.0))));
        let result = history.push_checked(
            Action::Create(Entity::Member(Member::new(id(10), id(1), id(2)))),
            &EngineConfig::default(),
        );
        assert!(matches!(
            result,
            Err(HistoryError::Rejected(ValidationError::TooShort { .. }))
        ));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_push_checked_rejects_degenerate_member_update() {
        let history = sample().push(Action::Create(Entity::Node(Node::at(id(3), 0.0, 0.0))));
        let config = EngineConfig::default();

        let self_loop = Action::Update(Entity::Member(Member::new(id(10), id(1), id(1))));
        assert!(matches!(
            history.push_checked(self_loop, &config),
            Err(HistoryError::Rejected(ValidationError::SameNode))
        ));

        let coincident = Action::Update(Entity::Member(Member::new(id(10), id(1), id(3))));
        assert!(matches!(
            history.push_checked(coincident, &config),
            Err(HistoryError::Rejected(ValidationError::TooShort { .. }))
        ));
        assert_eq!(history.len(), 4);

        let reversed = Action::Update(Entity::Member(Member::new(id(10), id(2), id(1))));
        let updated = history.push_checked(reversed, &config).unwrap();
        assert_eq!(updated.reduce().member(id(10)).unwrap().node1.id, id(2));
    }

    #[test]
    fn test_delete_document_shape() {
        let delete = Action::Delete {
            entity: EntityKind::Member,
            id: id(10),
        };
        let json = serde_json::to_value(&delete).unwrap();
        assert_eq!(json["type"], "Delete");
        assert_eq!(json["entity"], "Member");
        assert_eq!(json["value"]["id"], id(10).to_string());

        let create = serde_json::to_value(&sample().actions()[2]).unwrap();
        assert_eq!(create["entity"], "Member");
        assert_eq!(create["value"]["id"], id(10).to_string());

        let parsed: Action = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, delete);
    }

    #[test]
    fn test_json_document() {
        let history = sample().undo().unwrap();
        let json = history.to_json().unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains(r#"{"type":"Undo"}"#));

        let parsed = History::from_json(&json).unwrap();
        assert_eq!(parsed, history);
    }
}
