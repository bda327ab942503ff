//! Placement Constraints
//!
//! A constraint fixes one degree of freedom of a node, or the offset of an
//! attachment along a member. Nodes carry exactly two of them.

use serde::{Deserialize, Serialize};

use super::EntityId;

/// Discriminant of a [`Constraint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    X,
    Y,
    Angle,
    Member,
    Distance,
}

/// A typed placement rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Constraint {
    /// Absolute x coordinate
    X {
        /// Coordinate value
        value: f64,
    },

    /// Absolute y coordinate
    Y {
        /// Coordinate value
        value: f64,
    },

    /// Direction from a context node
    Angle {
        /// Degrees from the positive x-axis
        value: f64,
        /// Node the angle is measured from
        context_node_id: EntityId,
    },

    /// Radial distance from a context node
    Distance {
        /// Distance in model units
        value: f64,
        /// Node the distance is measured from
        context_node_id: EntityId,
    },

    /// Position on a member's line
    Member {
        /// Parametric offset (0 = node1, 1 = node2)
        value: f64,
        /// Member the position lies on
        member_id: EntityId,
    },
}

impl Constraint {
    /// Get the discriminant of this constraint
    pub fn constraint_type(&self) -> ConstraintType {
        match self {
            Constraint::X { .. } => ConstraintType::X,
            Constraint::Y { .. } => ConstraintType::Y,
            Constraint::Angle { .. } => ConstraintType::Angle,
            Constraint::Member { .. } => ConstraintType::Member,
            Constraint::Distance { .. } => ConstraintType::Distance,
        }
    }

    /// Get the type name of this constraint
    pub fn type_name(&self) -> &'static str {
        match self {
            Constraint::X { .. } => "X",
            Constraint::Y { .. } => "Y",
            Constraint::Angle { .. } => "Angle",
            Constraint::Member { .. } => "Member",
            Constraint::Distance { .. } => "Distance",
        }
    }

    /// Get the numeric value carried by the constraint
    pub fn value(&self) -> f64 {
        match self {
            Constraint::X { value }
            | Constraint::Y { value }
            | Constraint::Angle { value, .. }
            | Constraint::Member { value, .. }
            | Constraint::Distance { value, .. } => *value,
        }
    }

    /// Same constraint with a different value
    pub fn with_value(self, new_value: f64) -> Self {
        match self {
            Constraint::X { .. } => Constraint::X { value: new_value },
            Constraint::Y { .. } => Constraint::Y { value: new_value },
            Constraint::Angle {
                context_node_id, ..
            } => Constraint::Angle {
                value: new_value,
                context_node_id,
            },
            Constraint::Member { member_id, .. } => Constraint::Member {
                value: new_value,
                member_id,
            },
            Constraint::Distance {
                context_node_id, ..
            } => Constraint::Distance {
                value: new_value,
                context_node_id,
            },
        }
    }

    /// Node this constraint is measured from, if any
    pub fn context_node(&self) -> Option<EntityId> {
        match self {
            Constraint::Angle {
                context_node_id, ..
            }
            | Constraint::Distance {
                context_node_id, ..
            } => Some(*context_node_id),
            _ => None,
        }
    }

    /// Member this constraint places onto, if any
    pub fn member(&self) -> Option<EntityId> {
        match self {
            Constraint::Member { member_id, .. } => Some(*member_id),
            _ => None,
        }
    }

    /// Check if this constraint references a specific entity
    pub fn references_entity(&self, id: EntityId) -> bool {
        self.context_node() == Some(id) || self.member() == Some(id)
    }

    // ============== Factory Methods ==============

    /// Create an x coordinate constraint
    pub fn x(value: f64) -> Self {
        Constraint::X { value }
    }

    /// Create a y coordinate constraint
    pub fn y(value: f64) -> Self {
        Constraint::Y { value }
    }

    /// Create an angle constraint measured from `context_node_id`
    pub fn angle(value: f64, context_node_id: EntityId) -> Self {
        Constraint::Angle {
            value,
            context_node_id,
        }
    }

    /// Create a distance constraint measured from `context_node_id`
    pub fn distance(value: f64, context_node_id: EntityId) -> Self {
        Constraint::Distance {
            value,
            context_node_id,
        }
    }

    /// Create a constraint at parametric offset `t` along `member_id`
    pub fn on_member(t: f64, member_id: EntityId) -> Self {
        Constraint::Member {
            value: t,
            member_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_references() {
        let node = Uuid::from_u128(1);
        let member = Uuid::from_u128(2);

        assert!(Constraint::angle(45.0, node).references_entity(node));
        assert!(Constraint::on_member(0.5, member).references_entity(member));
        assert!(!Constraint::x(3.0).references_entity(node));
    }

    #[test]
    fn test_with_value_keeps_reference() {
        let node = Uuid::from_u128(7);
        let c = Constraint::distance(10.0, node).with_value(12.5);
        assert_eq!(c.value(), 12.5);
        assert_eq!(c.context_node(), Some(node));
        assert_eq!(c.constraint_type(), ConstraintType::Distance);
    }

    #[test]
    fn test_json_shape() {
        let member = Uuid::from_u128(3);
        let json = serde_json::to_value(Constraint::on_member(0.25, member)).unwrap();
        assert_eq!(json["type"], "Member");
        assert_eq!(json["value"], 0.25);
        assert_eq!(json["memberId"], member.to_string());

        let parsed: Constraint = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, Constraint::on_member(0.25, member));
    }
}
