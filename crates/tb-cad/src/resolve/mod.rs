//! Constraint Resolver
//!
//! Computes the geometry of every entity by following constraint references
//! through the entity set. Results are memoized per entity for the duration
//! of one pass; an in-progress stack detects cycles.
//!
//! Node constraint pairs are resolved as the intersection of two loci:
//! - `X` / `Y`: a vertical / horizontal line at the given coordinate
//! - `Angle`: the line through the context node at the given angle
//! - `Member`: the member's line
//! - `Distance`: only meaningful together with `Angle` (polar placement)
//!
//! When two line loci are parallel and one of them is a member, the member's
//! parametric offset is used instead; the node is flagged unless the two
//! lines coincide.
//!
//! Nothing here fails: dangling references, cycles and undetermined pairs
//! flag the entity and substitute the configured fallback position. Entities
//! placed relative to a flagged entity are flagged as well.

mod resolved;

use std::collections::{BTreeMap, HashMap, HashSet};

use glam::DVec2;

use crate::config::EngineConfig;
use crate::geometry::{Line, Point, direction_from_angle, intersect_lines, offset_point};
use crate::model::{Attachment, Constraint, EntityId, EntityKind, EntitySet, Node};

pub use resolved::{
    Attention, Resolved, ResolvedDistributedLoad, ResolvedEntitySet, ResolvedMember,
    ResolvedMomentLoad, ResolvedNode, ResolvedPointLoad, ResolvedSupport,
};

/// Resolve every entity with the default configuration
pub fn resolve(set: &EntitySet) -> ResolvedEntitySet {
    resolve_with_config(set, &EngineConfig::default())
}

/// Resolve every entity
pub fn resolve_with_config(set: &EntitySet, config: &EngineConfig) -> ResolvedEntitySet {
    Resolver::new(set, config).finish()
}

/// Memo key of one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }

    fn node(id: EntityId) -> Self {
        Self::new(EntityKind::Node, id)
    }

    fn member(id: EntityId) -> Self {
        Self::new(EntityKind::Member, id)
    }
}

/// A straight line a constraint confines a point to
struct Locus {
    origin: Point,
    direction: DVec2,
    /// Member line and offset for `Member` constraints
    member: Option<(Line, f64)>,
}

impl Locus {
    /// Perpendicular distance from `point` to this line
    fn offset_of(&self, point: Point) -> f64 {
        let direction = self.direction.normalize_or_zero();
        if direction == DVec2::ZERO {
            return point.distance(self.origin);
        }
        (point - self.origin).perp_dot(direction).abs()
    }
}

/// One resolution pass over an entity set
pub struct Resolver<'a> {
    set: &'a EntitySet,
    config: &'a EngineConfig,
    nodes: HashMap<EntityId, Point>,
    members: HashMap<EntityId, Line>,
    in_progress: Vec<EntityKey>,
    on_stack: HashSet<EntityKey>,
    attention: BTreeMap<EntityKey, String>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over `set`
    pub fn new(set: &'a EntitySet, config: &'a EngineConfig) -> Self {
        Self {
            set,
            config,
            nodes: HashMap::new(),
            members: HashMap::new(),
            in_progress: Vec::new(),
            on_stack: HashSet::new(),
            attention: BTreeMap::new(),
        }
    }

    /// Resolve a single node, or `None` if it does not exist
    pub fn node(&mut self, id: EntityId) -> Option<Point> {
        self.set.nodes.contains_key(&id).then(|| self.resolve_node(id))
    }

    /// Resolve a single member, or `None` if it does not exist
    pub fn member(&mut self, id: EntityId) -> Option<Line> {
        self.set
            .members
            .contains_key(&id)
            .then(|| self.resolve_member(id))
    }

    /// Reason an entity was flagged during this pass, if it was
    pub fn attention_for(&self, kind: EntityKind, id: EntityId) -> Option<&str> {
        self.attention
            .get(&EntityKey::new(kind, id))
            .map(String::as_str)
    }

    /// Resolve everything and build the output set
    pub fn finish(mut self) -> ResolvedEntitySet {
        let set = self.set;
        for id in set.nodes.keys() {
            self.resolve_node(*id);
        }
        for id in set.members.keys() {
            self.resolve_member(*id);
        }

        // Every node and member is cached from here on
        let mut out = ResolvedEntitySet::default();
        let mut dependants = set.dependants_index();

        for (id, load) in &set.point_loads {
            let key = EntityKey::new(EntityKind::PointLoad, *id);
            let point = self.resolve_attachment(key, &load.attachment);
            out.point_loads.insert(
                *id,
                Resolved::new(load.clone(), point, Vec::new(), self.reason(key)),
            );
        }
        for (id, load) in &set.moment_loads {
            let key = EntityKey::new(EntityKind::MomentLoad, *id);
            let point = self.resolve_attachment(key, &load.attachment);
            out.moment_loads.insert(
                *id,
                Resolved::new(load.clone(), point, Vec::new(), self.reason(key)),
            );
        }
        for (id, load) in &set.distributed_loads {
            let key = EntityKey::new(EntityKind::DistributedLoad, *id);
            let span = &load.on_member;
            let start = self.resolve_on_member(key, span.id, &span.constraint_start);
            let end = self.resolve_on_member(key, span.id, &span.constraint_end);
            out.distributed_loads.insert(
                *id,
                Resolved::new(
                    load.clone(),
                    Line::new(start, end),
                    Vec::new(),
                    self.reason(key),
                ),
            );
        }
        for (id, support) in &set.supports {
            let key = EntityKey::new(EntityKind::Support, *id);
            let point = self.resolve_attachment(key, &support.attachment);
            out.supports.insert(
                *id,
                Resolved::new(support.clone(), point, Vec::new(), self.reason(key)),
            );
        }

        for (id, node) in &set.nodes {
            let key = EntityKey::node(*id);
            let point = self.resolve_node(*id);
            out.nodes.insert(
                *id,
                Resolved::new(
                    node.clone(),
                    point,
                    dependants.remove(id).unwrap_or_default(),
                    self.reason(key),
                ),
            );
        }
        for (id, member) in &set.members {
            let key = EntityKey::member(*id);
            let line = self.resolve_member(*id);
            out.members.insert(
                *id,
                Resolved::new(
                    member.clone(),
                    line,
                    dependants.remove(id).unwrap_or_default(),
                    self.reason(key),
                ),
            );
        }

        out
    }

    fn reason(&self, key: EntityKey) -> Option<String> {
        self.attention.get(&key).cloned()
    }

    fn fallback(&self) -> Point {
        self.config.fallback()
    }

    /// Record a problem; the first reason for an entity wins
    fn flag(&mut self, key: EntityKey, reason: impl Into<String>) {
        self.attention.entry(key).or_insert_with(|| {
            let reason = reason.into();
            tracing::warn!("{} {} needs attention: {}", key.kind, key.id, reason);
            reason
        });
    }

    /// Flag every entity on the cycle closed by re-entering `key`
    fn flag_cycle(&mut self, key: EntityKey) {
        let start = self
            .in_progress
            .iter()
            .position(|k| *k == key)
            .unwrap_or(0);
        let cycle: Vec<EntityKey> = self.in_progress[start..].to_vec();
        let reason = format!(
            "Cyclic constraint dependency through {} {}",
            key.kind, key.id
        );
        for entry in cycle {
            self.flag(entry, reason.clone());
        }
    }

    fn enter(&mut self, key: EntityKey) {
        self.in_progress.push(key);
        self.on_stack.insert(key);
    }

    fn leave(&mut self) {
        if let Some(key) = self.in_progress.pop() {
            self.on_stack.remove(&key);
        }
    }

    fn resolve_node(&mut self, id: EntityId) -> Point {
        if let Some(point) = self.nodes.get(&id) {
            return *point;
        }
        let key = EntityKey::node(id);
        if self.on_stack.contains(&key) {
            self.flag_cycle(key);
            return self.fallback();
        }
        let set = self.set;
        let Some(node) = set.node(id) else {
            return self.fallback();
        };

        self.enter(key);
        let point = match self.place_node(node) {
            Ok(point) => point,
            Err(reason) => {
                self.flag(key, reason);
                self.fallback()
            }
        };
        self.leave();

        self.nodes.insert(id, point);
        point
    }

    fn resolve_member(&mut self, id: EntityId) -> Line {
        if let Some(line) = self.members.get(&id) {
            return *line;
        }
        let key = EntityKey::member(id);
        let fallback = Line::new(self.fallback(), self.fallback());
        if self.on_stack.contains(&key) {
            self.flag_cycle(key);
            return fallback;
        }
        let set = self.set;
        let Some(member) = set.member(id) else {
            return fallback;
        };

        self.enter(key);
        let mut ends = [fallback.point1, fallback.point2];
        for (end, node_id) in ends.iter_mut().zip([member.node1.id, member.node2.id]) {
            match self.node_ref(node_id) {
                Ok(point) => *end = point,
                Err(reason) => self.flag(key, reason),
            }
        }
        self.leave();

        let line = Line::new(ends[0], ends[1]);
        if line.length() < self.config.min_member_length {
            self.flag(
                key,
                format!(
                    "Member length {:.3} is below the minimum {}",
                    line.length(),
                    self.config.min_member_length
                ),
            );
        }
        self.members.insert(id, line);
        line
    }

    /// Resolve a node referenced by the entity on top of the stack
    fn node_ref(&mut self, id: EntityId) -> Result<Point, String> {
        if !self.set.nodes.contains_key(&id) {
            return Err(format!("References missing node {id}"));
        }
        let point = self.resolve_node(id);
        self.propagate(EntityKey::node(id));
        Ok(point)
    }

    /// Resolve a member referenced by the entity on top of the stack
    fn member_ref(&mut self, id: EntityId) -> Result<Line, String> {
        if !self.set.members.contains_key(&id) {
            return Err(format!("References missing member {id}"));
        }
        let line = self.resolve_member(id);
        self.propagate(EntityKey::member(id));
        Ok(line)
    }

    /// Flag the current entity if `dependency` is flagged
    fn propagate(&mut self, dependency: EntityKey) {
        if !self.attention.contains_key(&dependency) {
            return;
        }
        if let Some(current) = self.in_progress.last().copied()
            && current != dependency
        {
            self.flag(
                current,
                format!(
                    "Depends on {} {}, which needs attention",
                    dependency.kind, dependency.id
                ),
            );
        }
    }

    fn place_node(&mut self, node: &Node) -> Result<Point, String> {
        match (node.constraint1, node.constraint2) {
            (Constraint::X { value: x }, Constraint::Y { value: y })
            | (Constraint::Y { value: y }, Constraint::X { value: x }) => Ok(DVec2::new(x, y)),

            (
                Constraint::Angle {
                    value: angle,
                    context_node_id: from,
                },
                Constraint::Distance {
                    value: distance,
                    context_node_id: to,
                },
            )
            | (
                Constraint::Distance {
                    value: distance,
                    context_node_id: to,
                },
                Constraint::Angle {
                    value: angle,
                    context_node_id: from,
                },
            ) => {
                if from != to {
                    return Err(format!(
                        "Angle is measured from node {from} but distance from node {to}"
                    ));
                }
                let origin = self.node_ref(from)?;
                Ok(offset_point(origin, angle, distance))
            }

            (first, second) => {
                let a = self.locus(&first)?;
                let b = self.locus(&second)?;
                if let Some(point) = intersect_lines(a.origin, a.direction, b.origin, b.direction)
                {
                    return Ok(point);
                }
                let ((line, t), other) = match (a.member, b.member) {
                    (Some(on), _) => (on, b),
                    (None, Some(on)) => (on, a),
                    (None, None) => {
                        return Err(format!(
                            "{} and {} constraints do not determine a position",
                            first.type_name(),
                            second.type_name()
                        ));
                    }
                };
                let point = line.point_at(t);
                if other.offset_of(point) > self.config.coincident_tolerance {
                    self.flag(
                        EntityKey::node(node.id),
                        format!(
                            "{} and {} constraints contradict each other",
                            first.type_name(),
                            second.type_name()
                        ),
                    );
                }
                Ok(point)
            }
        }
    }

    fn locus(&mut self, constraint: &Constraint) -> Result<Locus, String> {
        match *constraint {
            Constraint::X { value } => Ok(Locus {
                origin: DVec2::new(value, 0.0),
                direction: DVec2::Y,
                member: None,
            }),
            Constraint::Y { value } => Ok(Locus {
                origin: DVec2::new(0.0, value),
                direction: DVec2::X,
                member: None,
            }),
            Constraint::Angle {
                value,
                context_node_id,
            } => Ok(Locus {
                origin: self.node_ref(context_node_id)?,
                direction: direction_from_angle(value),
                member: None,
            }),
            Constraint::Member { value, member_id } => {
                let line = self.member_ref(member_id)?;
                Ok(Locus {
                    origin: line.point1,
                    direction: line.direction(),
                    member: Some((line, value)),
                })
            }
            Constraint::Distance { .. } => {
                Err("Distance constraint must be paired with an Angle constraint".into())
            }
        }
    }

    fn resolve_attachment(&mut self, key: EntityKey, attachment: &Attachment) -> Point {
        match attachment {
            Attachment::OnNode { id } => {
                self.enter(key);
                let placed = self.node_ref(*id);
                self.leave();
                match placed {
                    Ok(point) => point,
                    Err(reason) => {
                        self.flag(key, reason);
                        self.fallback()
                    }
                }
            }
            Attachment::OnMember { id, constraint } => {
                self.resolve_on_member(key, *id, constraint)
            }
        }
    }

    fn resolve_on_member(
        &mut self,
        key: EntityKey,
        member_id: EntityId,
        constraint: &Constraint,
    ) -> Point {
        self.enter(key);
        let placed = self
            .member_ref(member_id)
            .and_then(|line| Ok((line, self.member_offset(member_id, &line, constraint)?)));
        self.leave();
        match placed {
            Ok((line, t)) => {
                let tolerance = self.config.on_member_tolerance;
                if !(-tolerance..=1.0 + tolerance).contains(&t) {
                    self.flag(key, format!("Lies outside member {member_id}"));
                }
                line.point_at(t)
            }
            Err(reason) => {
                self.flag(key, reason);
                self.fallback()
            }
        }
    }

    /// Parametric offset along `line` selected by `constraint`
    fn member_offset(
        &mut self,
        member_id: EntityId,
        line: &Line,
        constraint: &Constraint,
    ) -> Result<f64, String> {
        let dir = line.direction();
        match *constraint {
            Constraint::X { value } => {
                if dir.x == 0.0 {
                    return Err(format!("X offset cannot be used on vertical member {member_id}"));
                }
                Ok((value - line.point1.x) / dir.x)
            }
            Constraint::Y { value } => {
                if dir.y == 0.0 {
                    return Err(format!(
                        "Y offset cannot be used on horizontal member {member_id}"
                    ));
                }
                Ok((value - line.point1.y) / dir.y)
            }
            Constraint::Member {
                value,
                member_id: other,
            } => {
                if other != member_id {
                    return Err(format!(
                        "Offset refers to member {other} but is attached to member {member_id}"
                    ));
                }
                Ok(value)
            }
            Constraint::Distance {
                value,
                context_node_id,
            } => {
                let origin = self.node_ref(context_node_id)?;
                let length = line.length();
                let base = line
                    .parameter_of(origin)
                    .filter(|_| length > 0.0)
                    .ok_or_else(|| format!("Member {member_id} has zero length"))?;
                Ok(base + value / length)
            }
            Constraint::Angle { .. } => {
                Err("Angle constraint cannot place a point along a member".into())
            }
        }
    }
}
