//! Drawing model
//!
//! Entity schema and the [`EntitySet`] the edit log reduces into.

mod constraint;
mod entity;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use constraint::{Constraint, ConstraintType};
pub use entity::{
    Assembly, Attachment, DistributedLoad, Member, MemberEnd, MemberProp, MomentLoad, Node,
    PointLoad, SpanAttachment, Support, SupportKind,
};

/// Stable identifier of a drawing entity
pub type EntityId = Uuid;

/// The kind of a drawing entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Node,
    Member,
    PointLoad,
    DistributedLoad,
    MomentLoad,
    Support,
}

impl EntityKind {
    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Member => "member",
            EntityKind::PointLoad => "point load",
            EntityKind::DistributedLoad => "distributed load",
            EntityKind::MomentLoad => "moment load",
            EntityKind::Support => "support",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Any drawing entity, tagged with its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", content = "value")]
pub enum Entity {
    Node(Node),
    Member(Member),
    PointLoad(PointLoad),
    DistributedLoad(DistributedLoad),
    MomentLoad(MomentLoad),
    Support(Support),
}

impl Entity {
    /// Get the unique ID of this entity
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Node(e) => e.id,
            Entity::Member(e) => e.id,
            Entity::PointLoad(e) => e.id,
            Entity::DistributedLoad(e) => e.id,
            Entity::MomentLoad(e) => e.id,
            Entity::Support(e) => e.id,
        }
    }

    /// Get the kind of this entity
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Node(_) => EntityKind::Node,
            Entity::Member(_) => EntityKind::Member,
            Entity::PointLoad(_) => EntityKind::PointLoad,
            Entity::DistributedLoad(_) => EntityKind::DistributedLoad,
            Entity::MomentLoad(_) => EntityKind::MomentLoad,
            Entity::Support(_) => EntityKind::Support,
        }
    }

    /// Get all entity IDs this entity depends on
    pub fn referenced_entities(&self) -> Vec<EntityId> {
        match self {
            Entity::Node(e) => e.referenced_entities(),
            Entity::Member(e) => e.referenced_entities(),
            Entity::PointLoad(e) => e.attachment.referenced_entities(),
            Entity::DistributedLoad(e) => e.on_member.referenced_entities(),
            Entity::MomentLoad(e) => e.attachment.referenced_entities(),
            Entity::Support(e) => e.attachment.referenced_entities(),
        }
    }
}

/// All live entities at a point in history, keyed by id per kind
///
/// Ordered maps keep iteration (and therefore resolution and serialization)
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySet {
    pub nodes: BTreeMap<EntityId, Node>,
    pub members: BTreeMap<EntityId, Member>,
    pub point_loads: BTreeMap<EntityId, PointLoad>,
    pub distributed_loads: BTreeMap<EntityId, DistributedLoad>,
    pub moment_loads: BTreeMap<EntityId, MomentLoad>,
    pub supports: BTreeMap<EntityId, Support>,
}

impl EntitySet {
    /// Create a new empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entities
    pub fn len(&self) -> usize {
        self.nodes.len()
            + self.members.len()
            + self.point_loads.len()
            + self.distributed_loads.len()
            + self.moment_loads.len()
            + self.supports.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of loads of any kind
    pub fn load_count(&self) -> usize {
        self.point_loads.len() + self.distributed_loads.len() + self.moment_loads.len()
    }

    /// Insert an entity, replacing any entity of the same kind and id.
    /// Returns the replaced entity.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        match entity {
            Entity::Node(e) => self.nodes.insert(e.id, e).map(Entity::Node),
            Entity::Member(e) => self.members.insert(e.id, e).map(Entity::Member),
            Entity::PointLoad(e) => self.point_loads.insert(e.id, e).map(Entity::PointLoad),
            Entity::DistributedLoad(e) => self
                .distributed_loads
                .insert(e.id, e)
                .map(Entity::DistributedLoad),
            Entity::MomentLoad(e) => self.moment_loads.insert(e.id, e).map(Entity::MomentLoad),
            Entity::Support(e) => self.supports.insert(e.id, e).map(Entity::Support),
        }
    }

    /// Remove an entity by kind and id
    pub fn remove(&mut self, kind: EntityKind, id: EntityId) -> Option<Entity> {
        match kind {
            EntityKind::Node => self.nodes.remove(&id).map(Entity::Node),
            EntityKind::Member => self.members.remove(&id).map(Entity::Member),
            EntityKind::PointLoad => self.point_loads.remove(&id).map(Entity::PointLoad),
            EntityKind::DistributedLoad => self
                .distributed_loads
                .remove(&id)
                .map(Entity::DistributedLoad),
            EntityKind::MomentLoad => self.moment_loads.remove(&id).map(Entity::MomentLoad),
            EntityKind::Support => self.supports.remove(&id).map(Entity::Support),
        }
    }

    /// Check if an entity of the given kind exists
    pub fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        match kind {
            EntityKind::Node => self.nodes.contains_key(&id),
            EntityKind::Member => self.members.contains_key(&id),
            EntityKind::PointLoad => self.point_loads.contains_key(&id),
            EntityKind::DistributedLoad => self.distributed_loads.contains_key(&id),
            EntityKind::MomentLoad => self.moment_loads.contains_key(&id),
            EntityKind::Support => self.supports.contains_key(&id),
        }
    }

    /// Get a node by ID
    pub fn node(&self, id: EntityId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a member by ID
    pub fn member(&self, id: EntityId) -> Option<&Member> {
        self.members.get(&id)
    }

    /// Iterate over every entity, kinds in declaration order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.nodes
            .values()
            .cloned()
            .map(Entity::Node)
            .chain(self.members.values().cloned().map(Entity::Member))
            .chain(self.point_loads.values().cloned().map(Entity::PointLoad))
            .chain(
                self.distributed_loads
                    .values()
                    .cloned()
                    .map(Entity::DistributedLoad),
            )
            .chain(self.moment_loads.values().cloned().map(Entity::MomentLoad))
            .chain(self.supports.values().cloned().map(Entity::Support))
    }

    /// `(id, referenced ids)` for every entity, borrowing the maps
    fn references(&self) -> impl Iterator<Item = (EntityId, Vec<EntityId>)> + '_ {
        let nodes = self.nodes.values().map(|e| (e.id, e.referenced_entities()));
        let members = self.members.values().map(|e| (e.id, e.referenced_entities()));
        let point_loads = self
            .point_loads
            .values()
            .map(|e| (e.id, e.attachment.referenced_entities()));
        let distributed_loads = self
            .distributed_loads
            .values()
            .map(|e| (e.id, e.on_member.referenced_entities()));
        let moment_loads = self
            .moment_loads
            .values()
            .map(|e| (e.id, e.attachment.referenced_entities()));
        let supports = self
            .supports
            .values()
            .map(|e| (e.id, e.attachment.referenced_entities()));
        nodes
            .chain(members)
            .chain(point_loads)
            .chain(distributed_loads)
            .chain(moment_loads)
            .chain(supports)
    }

    /// Members with an end on `node_id`
    pub fn members_on_node(&self, node_id: EntityId) -> impl Iterator<Item = &Member> + '_ {
        self.members.values().filter(move |m| m.connects(node_id))
    }

    /// Ids of entities whose constraints or attachments reference `id`
    pub fn dependants_of(&self, id: EntityId) -> Vec<EntityId> {
        let mut dependants = BTreeSet::new();
        for (entity_id, referenced) in self.references() {
            if entity_id != id && referenced.contains(&id) {
                dependants.insert(entity_id);
            }
        }
        dependants.into_iter().collect()
    }

    /// Map of every referenced id to the ids of entities referencing it
    pub fn dependants_index(&self) -> BTreeMap<EntityId, Vec<EntityId>> {
        let mut index: BTreeMap<EntityId, BTreeSet<EntityId>> = BTreeMap::new();
        for (id, referenced) in self.references() {
            for referenced in referenced {
                if referenced != id {
                    index.entry(referenced).or_default().insert(id);
                }
            }
        }
        index
            .into_iter()
            .map(|(k, v)| (k, v.into_iter().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> EntityId {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_insert_and_remove() {
        let mut set = EntitySet::new();
        assert!(set.insert(Entity::Node(Node::at(id(1), 0.0, 0.0))).is_none());
        let replaced = set.insert(Entity::Node(Node::at(id(1), 5.0, 0.0)));
        assert!(matches!(replaced, Some(Entity::Node(_))));
        assert_eq!(set.len(), 1);

        assert!(set.remove(EntityKind::Member, id(1)).is_none());
        assert!(set.remove(EntityKind::Node, id(1)).is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn test_dependants() {
        let mut set = EntitySet::new();
        set.insert(Entity::Node(Node::at(id(1), 0.0, 0.0)));
        set.insert(Entity::Node(Node::at(id(2), 10.0, 0.0)));
        set.insert(Entity::Member(Member::new(id(10), id(1), id(2))));
        set.insert(Entity::Node(Node::new(
            id(3),
            Constraint::on_member(0.5, id(10)),
            Constraint::x(5.0),
        )));
        set.insert(Entity::Support(Support::new(
            id(20),
            Attachment::node(id(1)),
            SupportKind::Fixed,
        )));

        assert_eq!(set.dependants_of(id(1)), vec![id(10), id(20)]);
        assert_eq!(set.dependants_of(id(10)), vec![id(3)]);
        assert!(set.dependants_of(id(3)).is_empty());

        let index = set.dependants_index();
        assert_eq!(index.get(&id(2)), Some(&vec![id(10)]));
        assert_eq!(index.get(&id(10)), Some(&vec![id(3)]));

        // Both views agree with the owned entity listing
        for entity in set.entities() {
            for referenced in entity.referenced_entities() {
                assert!(set.dependants_of(referenced).contains(&entity.id()));
            }
        }
    }

    #[test]
    fn test_entity_json_shape() {
        let entity = Entity::Node(Node::at(id(1), 1.0, 2.0));
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["entity"], "Node");
        assert_eq!(json["value"]["constraint1"]["type"], "X");
        assert_eq!(json["value"]["constraint2"]["value"], 2.0);
    }
}
