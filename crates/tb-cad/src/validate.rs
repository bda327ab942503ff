//! Validators
//!
//! Checks run by the editing session before it logs an action, plus the
//! completeness gate in front of the simulation service.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::geometry::{Point, distance};
use crate::model::{Entity, EntityId, EntityKind, EntitySet, Node};
use crate::resolve::{ResolvedEntitySet, Resolver};

/// Reasons an edit is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Member must connect two different nodes")]
    SameNode,

    #[error("Member length {length:.3} is below the minimum {min}")]
    TooShort { length: f64, min: f64 },
}

/// Result type for validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Reasons a drawing cannot be sent to the simulation service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawingIssue {
    #[error("The drawing has no members")]
    NoMembers,

    #[error("Member {member} is missing {missing}")]
    IncompleteMaterial {
        member: EntityId,
        missing: &'static str,
    },

    #[error("The drawing has no supports")]
    NoSupports,

    #[error("The drawing has no loads")]
    NoLoads,
}

/// A member that a node move would make degenerate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegenerateMember {
    pub member_id: EntityId,
    pub length: f64,
}

/// Check that two points are far enough apart to form a member
pub fn validate_member_length(p1: Point, p2: Point) -> ValidationResult<()> {
    validate_member_length_with_config(p1, p2, &EngineConfig::default())
}

pub fn validate_member_length_with_config(
    p1: Point,
    p2: Point,
    config: &EngineConfig,
) -> ValidationResult<()> {
    let length = distance(p1, p2);
    if length < config.min_member_length {
        return Err(ValidationError::TooShort {
            length,
            min: config.min_member_length,
        });
    }
    Ok(())
}

/// Check a member about to be created between `node1` and `node2`
///
/// The nodes may still be in the drawing stage, so they are overlaid on
/// `set` before resolving. If either endpoint cannot be resolved the member is
/// allowed: an intermediate editing state must not block the user.
pub fn validate_new_member(node1: &Node, node2: &Node, set: &EntitySet) -> ValidationResult<()> {
    validate_new_member_with_config(node1, node2, set, &EngineConfig::default())
}

pub fn validate_new_member_with_config(
    node1: &Node,
    node2: &Node,
    set: &EntitySet,
    config: &EngineConfig,
) -> ValidationResult<()> {
    if node1.id == node2.id {
        return Err(ValidationError::SameNode);
    }

    let mut overlay = set.clone();
    overlay.insert(Entity::Node(node1.clone()));
    overlay.insert(Entity::Node(node2.clone()));

    let mut resolver = Resolver::new(&overlay, config);
    let (Some(p1), Some(p2)) = (resolver.node(node1.id), resolver.node(node2.id)) else {
        return Ok(());
    };
    for id in [node1.id, node2.id] {
        if let Some(reason) = resolver.attention_for(EntityKind::Node, id) {
            tracing::debug!("Node {} unresolved ({}); allowing new member", id, reason);
            return Ok(());
        }
    }

    validate_member_length_with_config(p1, p2, config)
}

/// Members that would drop below the minimum length if `node_id` moved to
/// `new_position`
///
/// The caller decides whether to block the move.
pub fn validate_node_modification(
    node_id: EntityId,
    new_position: Point,
    resolved: &ResolvedEntitySet,
) -> Vec<DegenerateMember> {
    validate_node_modification_with_config(
        node_id,
        new_position,
        resolved,
        &EngineConfig::default(),
    )
}

pub fn validate_node_modification_with_config(
    node_id: EntityId,
    new_position: DVec2,
    resolved: &ResolvedEntitySet,
    config: &EngineConfig,
) -> Vec<DegenerateMember> {
    resolved
        .members
        .values()
        .filter_map(|member| {
            let other = member.entity.other_end(node_id)?;
            let other_position = if other == node_id {
                new_position
            } else {
                resolved.node_position(other)?
            };
            validate_member_length_with_config(new_position, other_position, config)
                .err()
                .map(|_| DegenerateMember {
                    member_id: member.entity.id,
                    length: distance(new_position, other_position),
                })
        })
        .collect()
}

/// Whole-drawing completeness gate
pub fn is_valid_drawing(set: &EntitySet) -> Result<(), DrawingIssue> {
    if set.members.is_empty() {
        return Err(DrawingIssue::NoMembers);
    }
    for member in set.members.values() {
        if let Some(missing) = member.memberprop.missing() {
            return Err(DrawingIssue::IncompleteMaterial {
                member: member.id,
                missing,
            });
        }
    }
    if set.supports.is_empty() {
        return Err(DrawingIssue::NoSupports);
    }
    if set.load_count() == 0 {
        return Err(DrawingIssue::NoLoads);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Constraint, Member};
    use crate::resolve::resolve;
    use uuid::Uuid;

    fn id(n: u128) -> EntityId {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_member_length_threshold() {
        let origin = DVec2::ZERO;
        assert!(validate_member_length(origin, DVec2::new(1.0, 0.0)).is_ok());
        assert!(validate_member_length(origin, DVec2::new(0.0, 25.0)).is_ok());
        assert!(matches!(
            validate_member_length(origin, DVec2::new(0.999, 0.0)),
            Err(ValidationError::TooShort { .. })
        ));
        assert!(validate_member_length(origin, origin).is_err());
    }

    #[test]
    fn test_new_member_same_node() {
        let node = Node::at(id(1), 0.0, 0.0);
        assert_eq!(
            validate_new_member(&node, &node, &EntitySet::new()),
            Err(ValidationError::SameNode)
        );
    }

    #[test]
    fn test_new_member_with_drawn_nodes() {
        let mut set = EntitySet::new();
        set.insert(Entity::Node(Node::at(id(1), 3.0, 4.0)));
        let existing = set.nodes[&id(1)].clone();

        let coincident = Node::new(id(2), Constraint::x(3.0), Constraint::y(4.0));
        assert!(validate_new_member(&existing, &coincident, &set).is_err());

        // Polar node referencing the existing one, not yet in the set
        let polar = Node::new(
            id(3),
            Constraint::angle(0.0, id(1)),
            Constraint::distance(1.0, id(1)),
        );
        assert!(validate_new_member(&existing, &polar, &set).is_ok());
    }

    #[test]
    fn test_new_member_fails_open() {
        let set = EntitySet::new();
        let a = Node::at(id(1), 0.0, 0.0);
        let dangling = Node::new(
            id(2),
            Constraint::on_member(0.5, id(99)),
            Constraint::x(0.0),
        );
        // The dangling node falls back onto `a`, but resolution failed
        assert!(validate_new_member(&a, &dangling, &set).is_ok());
    }

    #[test]
    fn test_node_modification() {
        let mut set = EntitySet::new();
        set.insert(Entity::Node(Node::at(id(1), 0.0, 0.0)));
        set.insert(Entity::Node(Node::at(id(2), 10.0, 0.0)));
        set.insert(Entity::Node(Node::at(id(3), 0.0, 10.0)));
        set.insert(Entity::Member(Member::new(id(10), id(1), id(2))));
        set.insert(Entity::Member(Member::new(id(11), id(3), id(1))));
        let resolved = resolve(&set);

        let affected = validate_node_modification(id(1), DVec2::new(10.0, 0.5), &resolved);
        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0].member_id, id(10));

        assert!(validate_node_modification(id(1), DVec2::new(5.0, 5.0), &resolved).is_empty());
        assert!(validate_node_modification(id(2), DVec2::new(0.0, 10.0), &resolved).is_empty());
    }

    #[test]
    fn test_drawing_issues_in_order() {
        let mut set = EntitySet::new();
        assert_eq!(is_valid_drawing(&set), Err(DrawingIssue::NoMembers));

        set.insert(Entity::Node(Node::at(id(1), 0.0, 0.0)));
        set.insert(Entity::Node(Node::at(id(2), 10.0, 0.0)));
        set.insert(Entity::Member(Member::new(id(10), id(1), id(2))));
        let issue = is_valid_drawing(&set).unwrap_err();
        assert!(issue.to_string().contains("material"));
    }
}
