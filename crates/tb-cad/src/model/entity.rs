//! Drawing entities
//!
//! Nodes, members, loads and supports as stored in the edit log. None of them
//! carry geometry; positions come from their constraints.

use serde::{Deserialize, Serialize};

use super::{Constraint, EntityId};

/// A joint in the structure, placed by two constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: EntityId,
    pub constraint1: Constraint,
    pub constraint2: Constraint,
}

impl Node {
    /// Create a node from two constraints
    pub fn new(id: EntityId, constraint1: Constraint, constraint2: Constraint) -> Self {
        Self {
            id,
            constraint1,
            constraint2,
        }
    }

    /// Create a node fixed at absolute coordinates
    pub fn at(id: EntityId, x: f64, y: f64) -> Self {
        Self::new(id, Constraint::x(x), Constraint::y(y))
    }

    /// Both constraints in order
    pub fn constraints(&self) -> [&Constraint; 2] {
        [&self.constraint1, &self.constraint2]
    }

    /// Ids of nodes and members this node's constraints depend on
    pub fn referenced_entities(&self) -> Vec<EntityId> {
        self.constraints()
            .iter()
            .filter_map(|c| c.context_node().or(c.member()))
            .collect()
    }
}

/// How a member end connects to its node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Assembly {
    /// Free to rotate
    #[default]
    Hinged,
    /// Moment-resisting connection
    Locked,
}

/// One end of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEnd {
    /// Node the end sits on
    pub id: EntityId,
    /// Connection type
    #[serde(default)]
    pub assembly: Assembly,
}

impl MemberEnd {
    /// Hinged end on `id`
    pub fn hinged(id: EntityId) -> Self {
        Self {
            id,
            assembly: Assembly::Hinged,
        }
    }

    /// Locked end on `id`
    pub fn locked(id: EntityId) -> Self {
        Self {
            id,
            assembly: Assembly::Locked,
        }
    }
}

/// Cross-section and material of a member
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum MemberProp {
    /// Nothing chosen yet
    #[default]
    Unspecified,

    /// Rolled steel section
    Steel {
        /// Profile designation, e.g. "HEA200"
        #[serde(default)]
        profile: Option<String>,
    },

    /// Sawn timber section
    Wood {
        /// Strength class or species
        #[serde(default)]
        wood_type: Option<String>,
        /// Catalogue size, e.g. "45x195"
        #[serde(default)]
        standard_size: Option<String>,
        /// Explicit section width (mm)
        #[serde(default)]
        width: Option<f64>,
        /// Explicit section height (mm)
        #[serde(default)]
        height: Option<f64>,
    },
}

impl MemberProp {
    /// Steel member with a profile
    pub fn steel(profile: impl Into<String>) -> Self {
        MemberProp::Steel {
            profile: Some(profile.into()),
        }
    }

    /// Wood member with a catalogue size
    pub fn wood_standard(wood_type: impl Into<String>, size: impl Into<String>) -> Self {
        MemberProp::Wood {
            wood_type: Some(wood_type.into()),
            standard_size: Some(size.into()),
            width: None,
            height: None,
        }
    }

    /// Wood member with an explicit section
    pub fn wood_custom(wood_type: impl Into<String>, width: f64, height: f64) -> Self {
        MemberProp::Wood {
            wood_type: Some(wood_type.into()),
            standard_size: None,
            width: Some(width),
            height: Some(height),
        }
    }

    /// What is still missing for the specification to be usable in a
    /// simulation, or `None` when complete
    pub fn missing(&self) -> Option<&'static str> {
        match self {
            MemberProp::Unspecified => Some("material"),
            MemberProp::Steel { profile } => match profile.as_deref() {
                Some(p) if !p.trim().is_empty() => None,
                _ => Some("steel profile"),
            },
            MemberProp::Wood {
                wood_type,
                standard_size,
                width,
                height,
            } => {
                if wood_type.as_deref().is_none_or(|t| t.trim().is_empty()) {
                    return Some("wood type");
                }
                let has_standard = standard_size
                    .as_deref()
                    .is_some_and(|s| !s.trim().is_empty());
                let has_custom = matches!(
                    (width, height),
                    (Some(w), Some(h)) if *w > 0.0 && *h > 0.0
                );
                if has_standard || has_custom {
                    None
                } else {
                    Some("wood size (standard size or width and height)")
                }
            }
        }
    }

    /// Whether the specification is complete
    pub fn is_complete(&self) -> bool {
        self.missing().is_none()
    }
}

/// A structural member between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: EntityId,
    #[serde(default)]
    pub memberprop: MemberProp,
    pub node1: MemberEnd,
    pub node2: MemberEnd,
}

impl Member {
    /// Create a member with hinged ends and no material
    pub fn new(id: EntityId, node1: EntityId, node2: EntityId) -> Self {
        Self {
            id,
            memberprop: MemberProp::default(),
            node1: MemberEnd::hinged(node1),
            node2: MemberEnd::hinged(node2),
        }
    }

    /// Set the material
    pub fn with_prop(mut self, memberprop: MemberProp) -> Self {
        self.memberprop = memberprop;
        self
    }

    /// Check if either end sits on `node_id`
    pub fn connects(&self, node_id: EntityId) -> bool {
        self.node1.id == node_id || self.node2.id == node_id
    }

    /// The end opposite to `node_id`
    pub fn other_end(&self, node_id: EntityId) -> Option<EntityId> {
        if self.node1.id == node_id {
            Some(self.node2.id)
        } else if self.node2.id == node_id {
            Some(self.node1.id)
        } else {
            None
        }
    }

    pub fn referenced_entities(&self) -> Vec<EntityId> {
        vec![self.node1.id, self.node2.id]
    }
}

/// Where a point-like entity is attached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Attachment {
    /// Directly on a node
    OnNode {
        /// Node id
        id: EntityId,
    },
    /// Somewhere along a member
    OnMember {
        /// Member id
        id: EntityId,
        /// Offset along the member
        constraint: Constraint,
    },
}

impl Attachment {
    /// Attach to a node
    pub fn node(id: EntityId) -> Self {
        Attachment::OnNode { id }
    }

    /// Attach along a member
    pub fn member(id: EntityId, constraint: Constraint) -> Self {
        Attachment::OnMember { id, constraint }
    }

    pub fn referenced_entities(&self) -> Vec<EntityId> {
        match self {
            Attachment::OnNode { id } => vec![*id],
            Attachment::OnMember { id, constraint } => {
                let mut ids = vec![*id];
                ids.extend(constraint.context_node().or(constraint.member()));
                ids
            }
        }
    }
}

/// A span along a member bounded by two offsets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanAttachment {
    /// Member id
    pub id: EntityId,
    /// Offset where the span starts
    pub constraint_start: Constraint,
    /// Offset where the span ends
    pub constraint_end: Constraint,
}

impl SpanAttachment {
    pub fn referenced_entities(&self) -> Vec<EntityId> {
        let mut ids = vec![self.id];
        for c in [&self.constraint_start, &self.constraint_end] {
            ids.extend(c.context_node().or(c.member()));
        }
        ids
    }
}

/// A concentrated force
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    pub id: EntityId,
    pub attachment: Attachment,
    /// Force magnitude (kN)
    pub magnitude: f64,
    /// Direction in degrees from the positive x-axis
    #[serde(default)]
    pub angle: f64,
}

impl PointLoad {
    pub fn new(id: EntityId, attachment: Attachment, magnitude: f64, angle: f64) -> Self {
        Self {
            id,
            attachment,
            magnitude,
            angle,
        }
    }
}

/// A concentrated moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentLoad {
    pub id: EntityId,
    pub attachment: Attachment,
    /// Moment magnitude (kNm), counter-clockwise positive in model space
    pub magnitude: f64,
}

impl MomentLoad {
    pub fn new(id: EntityId, attachment: Attachment, magnitude: f64) -> Self {
        Self {
            id,
            attachment,
            magnitude,
        }
    }
}

/// A line load along part of a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributedLoad {
    pub id: EntityId,
    pub on_member: SpanAttachment,
    /// Intensity at the span start (kN/m)
    pub magnitude_start: f64,
    /// Intensity at the span end (kN/m)
    pub magnitude_end: f64,
    /// Direction in degrees from the positive x-axis
    #[serde(default)]
    pub angle: f64,
}

/// Support boundary condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SupportKind {
    /// Translation and rotation restrained
    Fixed,
    /// Translation restrained
    #[default]
    Pinned,
    /// Translation restrained normal to the rolling direction
    Roller,
}

/// A support restraining the structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub id: EntityId,
    pub attachment: Attachment,
    #[serde(default)]
    pub kind: SupportKind,
    /// Rotation in degrees
    #[serde(default)]
    pub angle: f64,
}

impl Support {
    pub fn new(id: EntityId, attachment: Attachment, kind: SupportKind) -> Self {
        Self {
            id,
            attachment,
            kind,
            angle: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_member_prop_completeness() {
        assert_eq!(MemberProp::Unspecified.missing(), Some("material"));
        assert!(MemberProp::steel("HEA200").is_complete());
        assert!(!MemberProp::Steel { profile: None }.is_complete());
        assert!(MemberProp::wood_standard("C24", "45x195").is_complete());
        assert!(MemberProp::wood_custom("C24", 45.0, 220.0).is_complete());

        let partial = MemberProp::Wood {
            wood_type: Some("C24".into()),
            standard_size: None,
            width: Some(45.0),
            height: None,
        };
        assert!(!partial.is_complete());

        let no_type = MemberProp::Wood {
            wood_type: None,
            standard_size: Some("45x195".into()),
            width: None,
            height: None,
        };
        assert_eq!(no_type.missing(), Some("wood type"));
    }

    #[test]
    fn test_member_other_end() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let member = Member::new(Uuid::from_u128(10), a, b);
        assert_eq!(member.other_end(a), Some(b));
        assert_eq!(member.other_end(b), Some(a));
        assert_eq!(member.other_end(Uuid::from_u128(3)), None);
    }

    #[test]
    fn test_attachment_references() {
        let member = Uuid::from_u128(10);
        let ctx = Uuid::from_u128(1);
        let att = Attachment::member(member, Constraint::distance(2.0, ctx));
        assert_eq!(att.referenced_entities(), vec![member, ctx]);
    }
}
