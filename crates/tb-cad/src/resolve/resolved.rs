//! Resolved entity types
//!
//! The resolver's output: every entity's stored data plus its computed
//! geometry and any recoverable problem found while computing it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Line, Point, flip_y};
use crate::model::{
    DistributedLoad, EntityId, EntityKind, Member, MomentLoad, Node, PointLoad, Support,
};

/// An entity together with its resolved geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolved<T, G> {
    /// Stored entity data
    #[serde(flatten)]
    pub entity: T,
    /// Computed geometry
    pub resolved: G,
    /// Entities whose placement depends on this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependants: Vec<EntityId>,
    /// Set when the constraints could not be fully resolved
    #[serde(default)]
    pub needs_attention: bool,
    /// Why the entity needs attention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attention_reason: Option<String>,
}

impl<T, G> Resolved<T, G> {
    pub(crate) fn new(
        entity: T,
        resolved: G,
        dependants: Vec<EntityId>,
        attention_reason: Option<String>,
    ) -> Self {
        Self {
            entity,
            resolved,
            dependants,
            needs_attention: attention_reason.is_some(),
            attention_reason,
        }
    }

    fn map_geometry(&self, f: impl Fn(&G) -> G) -> Self
    where
        T: Clone,
    {
        Self {
            entity: self.entity.clone(),
            resolved: f(&self.resolved),
            dependants: self.dependants.clone(),
            needs_attention: self.needs_attention,
            attention_reason: self.attention_reason.clone(),
        }
    }
}

pub type ResolvedNode = Resolved<Node, Point>;
pub type ResolvedMember = Resolved<Member, Line>;
pub type ResolvedPointLoad = Resolved<PointLoad, Point>;
pub type ResolvedDistributedLoad = Resolved<DistributedLoad, Line>;
pub type ResolvedMomentLoad = Resolved<MomentLoad, Point>;
pub type ResolvedSupport = Resolved<Support, Point>;

/// A flagged entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attention {
    pub kind: EntityKind,
    pub id: EntityId,
    pub reason: String,
}

/// Every entity of an [`EntitySet`](crate::model::EntitySet) with geometry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntitySet {
    pub nodes: BTreeMap<EntityId, ResolvedNode>,
    pub members: BTreeMap<EntityId, ResolvedMember>,
    pub point_loads: BTreeMap<EntityId, ResolvedPointLoad>,
    pub distributed_loads: BTreeMap<EntityId, ResolvedDistributedLoad>,
    pub moment_loads: BTreeMap<EntityId, ResolvedMomentLoad>,
    pub supports: BTreeMap<EntityId, ResolvedSupport>,
}

impl ResolvedEntitySet {
    /// Resolved position of a node
    pub fn node_position(&self, id: EntityId) -> Option<Point> {
        self.nodes.get(&id).map(|n| n.resolved)
    }

    /// Resolved line of a member
    pub fn member_line(&self, id: EntityId) -> Option<Line> {
        self.members.get(&id).map(|m| m.resolved)
    }

    /// Whether any entity is flagged
    pub fn has_attention(&self) -> bool {
        !self.attention().is_empty()
    }

    /// Every flagged entity, kinds in declaration order
    pub fn attention(&self) -> Vec<Attention> {
        fn collect<T, G>(
            kind: EntityKind,
            map: &BTreeMap<EntityId, Resolved<T, G>>,
            out: &mut Vec<Attention>,
        ) {
            for (id, entry) in map {
                if let Some(reason) = &entry.attention_reason {
                    out.push(Attention {
                        kind,
                        id: *id,
                        reason: reason.clone(),
                    });
                }
            }
        }

        let mut out = Vec::new();
        collect(EntityKind::Node, &self.nodes, &mut out);
        collect(EntityKind::Member, &self.members, &mut out);
        collect(EntityKind::PointLoad, &self.point_loads, &mut out);
        collect(EntityKind::DistributedLoad, &self.distributed_loads, &mut out);
        collect(EntityKind::MomentLoad, &self.moment_loads, &mut out);
        collect(EntityKind::Support, &self.supports, &mut out);
        out
    }

    /// Mirror the model about the x-axis
    ///
    /// Editing space has y pointing down the screen; the simulation service
    /// expects y up. Resolved geometry has its y negated, load and support
    /// directions are mirrored, and moments change sense. Stored constraint
    /// values are left as drawn.
    pub fn flipped_y(&self) -> Self {
        Self {
            nodes: self
                .nodes
                .iter()
                .map(|(id, n)| (*id, n.map_geometry(|p| flip_y(*p))))
                .collect(),
            members: self
                .members
                .iter()
                .map(|(id, m)| (*id, m.map_geometry(Line::flipped_y)))
                .collect(),
            point_loads: self
                .point_loads
                .iter()
                .map(|(id, l)| {
                    let mut flipped = l.map_geometry(|p| flip_y(*p));
                    flipped.entity.angle = -l.entity.angle;
                    (*id, flipped)
                })
                .collect(),
            distributed_loads: self
                .distributed_loads
                .iter()
                .map(|(id, l)| {
                    let mut flipped = l.map_geometry(Line::flipped_y);
                    flipped.entity.angle = -l.entity.angle;
                    (*id, flipped)
                })
                .collect(),
            moment_loads: self
                .moment_loads
                .iter()
                .map(|(id, l)| {
                    let mut flipped = l.map_geometry(|p| flip_y(*p));
                    flipped.entity.magnitude = -l.entity.magnitude;
                    (*id, flipped)
                })
                .collect(),
            supports: self
                .supports
                .iter()
                .map(|(id, s)| {
                    let mut flipped = s.map_geometry(|p| flip_y(*p));
                    flipped.entity.angle = -s.entity.angle;
                    (*id, flipped)
                })
                .collect(),
        }
    }
}
