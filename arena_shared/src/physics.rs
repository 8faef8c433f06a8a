//! Physics bodies and the entity position registry.
//!
//! A character's root object is not the object that moves through the world. The
//! moving part is a [`PhysicsBody`], and other systems find it through the
//! [`PhysicsRegistry`] by network object id.
//!
//! Mutation of the registry is confined to spawn/despawn/destroy hooks; per-frame
//! code only reads. The map sits behind a short-lived `RwLock` so lifecycle hooks of
//! unrelated entities can interleave with lookups from other threads.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    entity::NetworkObjectId,
    math::{Quat, Vec3},
};

/// Position, rotation, and scale of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Facing direction of the body.
    pub fn forward(&self) -> Vec3 {
        self.rotation.rotate(Vec3::FORWARD)
    }
}

/// Collision volume used for damage hits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    Capsule { radius: f32, height: f32 },
    Sphere { radius: f32 },
}

impl Default for Collider {
    fn default() -> Self {
        Collider::Capsule {
            radius: 0.5,
            height: 2.0,
        }
    }
}

/// The independently moving part of a character.
#[derive(Debug, Default)]
pub struct PhysicsBody {
    transform: RwLock<Transform>,
    damage_collider: Collider,
}

/// Shared handle to a body. The registry and the owning character both hold one.
pub type BodyHandle = Arc<PhysicsBody>;

impl PhysicsBody {
    pub fn new(transform: Transform, damage_collider: Collider) -> BodyHandle {
        Arc::new(Self {
            transform: RwLock::new(transform),
            damage_collider,
        })
    }

    /// Current pose.
    pub fn transform(&self) -> Transform {
        *self.transform.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn position(&self) -> Vec3 {
        self.transform().position
    }

    pub fn rotation(&self) -> Quat {
        self.transform().rotation
    }

    pub fn set_pose(&self, position: Vec3, rotation: Quat) {
        let mut t = self.transform.write().unwrap_or_else(PoisonError::into_inner);
        t.position = position;
        t.rotation = rotation;
    }

    pub fn set_position(&self, position: Vec3) {
        self.transform
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .position = position;
    }

    pub fn damage_collider(&self) -> Collider {
        self.damage_collider
    }
}

/// Registry errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The id already maps to a body. The existing mapping is kept.
    #[error("network object {0} already has a registered body")]
    AlreadyRegistered(NetworkObjectId),
}

/// Process-scoped lookup from network object id to physics body.
///
/// Cloning yields another handle onto the same store.
#[derive(Debug, Clone, Default)]
pub struct PhysicsRegistry {
    bodies: Arc<RwLock<HashMap<NetworkObjectId, BodyHandle>>>,
}

impl PhysicsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<NetworkObjectId, BodyHandle>> {
        self.bodies.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<NetworkObjectId, BodyHandle>> {
        self.bodies.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a body. Rejects ids that are already present.
    pub fn register(&self, id: NetworkObjectId, body: BodyHandle) -> Result<(), RegistryError> {
        let mut bodies = self.write();
        if bodies.contains_key(&id) {
            warn!(entity = %id, "Duplicate body registration rejected");
            return Err(RegistryError::AlreadyRegistered(id));
        }
        bodies.insert(id, body);
        debug!(entity = %id, "Body registered");
        Ok(())
    }

    /// Removes a body. Returns whether anything was removed; absent ids are a no-op.
    pub fn unregister(&self, id: NetworkObjectId) -> bool {
        let removed = self.write().remove(&id).is_some();
        if removed {
            debug!(entity = %id, "Body unregistered");
        }
        removed
    }

    pub fn try_get(&self, id: NetworkObjectId) -> Option<BodyHandle> {
        self.read().get(&id).cloned()
    }

    pub fn contains(&self, id: NetworkObjectId) -> bool {
        self.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
