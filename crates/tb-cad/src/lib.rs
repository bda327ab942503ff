//! Parametric constraint engine for the TrussBoard drawing board
//!
//! This crate provides:
//! - Geometry primitives over `glam::DVec2`
//! - The drawing model: nodes, members, loads and supports placed by constraints
//! - An append-only edit history reduced into the current entity set
//! - A memoizing, cycle-safe constraint resolver
//! - Validators for member length, node moves and drawing completeness
//! - The simulation payload builder (single y-axis flip)
//!
//! Every operation is a pure function over its inputs.

pub mod config;
pub mod constants;
pub mod geometry;
pub mod history;
pub mod model;
pub mod payload;
pub mod resolve;
pub mod smart_default;
pub mod validate;


// Re-exports for convenience
pub use config::{ConfigError, EngineConfig};
pub use geometry::{Line, Point};
pub use history::{Action, History, HistoryError, HistoryResult, reduce};
pub use model::{
    Assembly, Attachment, Constraint, ConstraintType, DistributedLoad, Entity, EntityId,
    EntityKind, EntitySet, Member, MemberEnd, MemberProp, MomentLoad, Node, PointLoad,
    SpanAttachment, Support, SupportKind,
};
pub use payload::{PayloadError, ProjectMetadata, SimulationPayload};
pub use resolve::{Attention, ResolvedEntitySet, Resolver, resolve, resolve_with_config};
pub use smart_default::{smart_default_constraint, smart_default_offset};
pub use validate::{
    DegenerateMember, DrawingIssue, ValidationError, is_valid_drawing, validate_member_length,
    validate_new_member, validate_node_modification,
};
