//! Smart default constraint for attaching onto a member

use crate::config::EngineConfig;
use crate::geometry::{Line, Point};
use crate::model::{Constraint, ConstraintType, EntityId, EntitySet};
use crate::resolve::Resolver;

/// Axis along which a member runs furthest; ties go to `X`
pub fn dominant_axis(line: &Line) -> ConstraintType {
    let d = line.direction();
    if d.x.abs() >= d.y.abs() {
        ConstraintType::X
    } else {
        ConstraintType::Y
    }
}

/// Default free axis for something attached onto `member_id`
///
/// A mostly horizontal member is parametrized by x, a mostly vertical one by
/// y. Returns `None` when the member does not exist.
pub fn smart_default_constraint(member_id: EntityId, set: &EntitySet) -> Option<ConstraintType> {
    let config = EngineConfig::default();
    let line = Resolver::new(set, &config).member(member_id)?;
    Some(dominant_axis(&line))
}

/// Default offset constraint placing an attachment at `at` on `member_id`
pub fn smart_default_offset(
    member_id: EntityId,
    set: &EntitySet,
    at: Point,
) -> Option<Constraint> {
    Some(match smart_default_constraint(member_id, set)? {
        ConstraintType::Y => Constraint::y(at.y),
        _ => Constraint::x(at.x),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, Member, Node};
    use glam::DVec2;
    use uuid::Uuid;

    fn set_with_member(x2: f64, y2: f64) -> (EntitySet, EntityId) {
        let mut set = EntitySet::new();
        let member = Uuid::from_u128(10);
        set.insert(Entity::Node(Node::at(Uuid::from_u128(1), 0.0, 0.0)));
        set.insert(Entity::Node(Node::at(Uuid::from_u128(2), x2, y2)));
        set.insert(Entity::Member(Member::new(
            member,
            Uuid::from_u128(1),
            Uuid::from_u128(2),
        )));
        (set, member)
    }

    #[test]
    fn test_horizontal_member_defaults_to_x() {
        let (set, member) = set_with_member(10.0, 1.0);
        assert_eq!(
            smart_default_constraint(member, &set),
            Some(ConstraintType::X)
        );
        assert_eq!(
            smart_default_offset(member, &set, DVec2::new(4.0, 0.4)),
            Some(Constraint::x(4.0))
        );
    }

    #[test]
    fn test_vertical_member_defaults_to_y() {
        let (set, member) = set_with_member(1.0, 10.0);
        assert_eq!(
            smart_default_constraint(member, &set),
            Some(ConstraintType::Y)
        );
    }

    #[test]
    fn test_diagonal_tie_and_missing_member() {
        let (set, member) = set_with_member(-5.0, 5.0);
        assert_eq!(
            smart_default_constraint(member, &set),
            Some(ConstraintType::X)
        );
        assert_eq!(smart_default_constraint(Uuid::from_u128(99), &set), None);
    }
}
