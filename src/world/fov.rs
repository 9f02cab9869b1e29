//! View-cone field of view with occlusion.

use std::collections::HashMap;

use super::{FieldOfView, LineOfSight};
use crate::core::geometry::cosine_between;
use crate::core::{AgentId, WorldPoint};

/// One agent's view cone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewCone {
    /// Eye position.
    pub position: WorldPoint,
    /// Heading in radians (CCW from +X).
    pub heading: f32,
    /// Viewing distance.
    pub radius: f32,
    /// Half of the cone's opening angle in radians (PI = full circle).
    pub half_angle: f32,
}

impl ViewCone {
    /// Create a view cone.
    pub fn new(position: WorldPoint, heading: f32, radius: f32, half_angle: f32) -> Self {
        Self {
            position,
            heading,
            radius,
            half_angle,
        }
    }

    /// Geometric containment, ignoring occlusion.
    pub fn covers(&self, point: WorldPoint) -> bool {
        let offset = point - self.position;
        if offset.length() > self.radius {
            return false;
        }
        if offset.length() < f32::EPSILON || self.half_angle >= std::f32::consts::PI {
            return true;
        }
        cosine_between(WorldPoint::from_angle(self.heading), offset) >= self.half_angle.cos()
    }
}

/// Field of view made of per-agent cones occluded by a [`LineOfSight`].
pub struct ConeFieldOfView<L> {
    cones: HashMap<AgentId, ViewCone>,
    sight: L,
}

impl<L: LineOfSight> ConeFieldOfView<L> {
    /// Create an empty field of view.
    pub fn new(sight: L) -> Self {
        Self {
            cones: HashMap::new(),
            sight,
        }
    }

    /// Set or replace an agent's cone.
    pub fn set_cone(&mut self, agent: AgentId, cone: ViewCone) {
        self.cones.insert(agent, cone);
    }

    /// Remove an agent's cone.
    pub fn remove(&mut self, agent: AgentId) {
        self.cones.remove(&agent);
    }

    /// Get an agent's cone.
    pub fn cone(&self, agent: AgentId) -> Option<&ViewCone> {
        self.cones.get(&agent)
    }
}

impl<L: LineOfSight> FieldOfView for ConeFieldOfView<L> {
    fn contains(&self, agent: AgentId, point: WorldPoint) -> bool {
        self.cones.get(&agent).is_some_and(|cone| {
            cone.covers(point) && self.sight.has_line_of_sight(cone.position, point)
        })
    }
}
