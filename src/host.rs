//! The shared renderable object that simulations attach to.
//!
//! The [`Host`] stands in for the scene object every era is composited onto.
//! It owns:
//!
//! - the host parameter block (`u_colorA`, `u_disp`, `u_mix`, ...)
//! - the shader variant name and transform (scale, Euler rotation, auto-rotation)
//! - named flags a simulation may toggle while it is active
//! - a registry of attached visual layers
//!
//! Simulations never hold a reference to the host between calls. They get
//! `&mut Host` in `initialize` / `teardown` and a read-only [`FrameContext`]
//! in `advance`.

use crate::palette::Palette;
use crate::uniforms::{ParamMap, ParameterBlock, U_COLOR_A, U_COLOR_B, U_DISP};
use crate::visuals::ParticleShape;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Identifier returned by [`Host::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

#[derive(Debug, Clone)]
struct Layer {
    id: LayerId,
    label: &'static str,
    handles: usize,
}

/// Scale and orientation of the host object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    /// Euler angles in radians.
    pub rotation: Vec3,
    /// Rotation rate per axis in rad/s.
    pub auto_rotate: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: Vec3::ZERO,
            auto_rotate: Vec3::ZERO,
        }
    }
}

impl Transform {
    /// Apply auto-rotation for `dt` seconds.
    #[inline]
    pub fn spin(&mut self, dt: f32) {
        self.rotation += self.auto_rotate * dt;
    }
}

/// Everything [`Engine::configure_host`](crate::Engine::configure_host) needs.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    pub shader: String,
    pub parameters: ParamMap,
    /// Optional swatch image to read the palette from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette_image: Option<PathBuf>,
    #[serde(skip)]
    pub transform: Transform,
}

/// A visual handle as seen by a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub position: Vec3,
    pub color: Vec3,
    pub opacity: f32,
    pub scale: f32,
    pub shape: ParticleShape,
    pub visible: bool,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            opacity: 1.0,
            scale: 1.0,
            shape: ParticleShape::Sprite,
            visible: true,
        }
    }
}

impl Sprite {
    pub fn new(position: Vec3, color: Vec3, scale: f32) -> Self {
        Self {
            position,
            color,
            scale,
            ..Default::default()
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_shape(mut self, shape: ParticleShape) -> Self {
        self.shape = shape;
        self
    }

    /// A sprite that starts invisible (unclaimed pool slot).
    pub fn hidden() -> Self {
        Self {
            visible: false,
            opacity: 0.0,
            ..Default::default()
        }
    }
}

/// Read-only per-frame input to [`Simulation::advance`](crate::Simulation::advance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Seconds since the engine started.
    pub t: f32,
    /// Shared displacement scalar (`u_disp`).
    pub displacement: f32,
    pub palette: Palette,
}

impl FrameContext {
    pub fn new(dt: f32, t: f32) -> Self {
        Self {
            dt,
            t,
            displacement: 0.0,
            palette: Palette::FALLBACK,
        }
    }
}

/// The shared render object.
#[derive(Debug, Clone)]
pub struct Host {
    params: ParameterBlock,
    shader: String,
    transform: Transform,
    flags: BTreeMap<String, f32>,
    layers: Vec<Layer>,
    next_layer: u64,
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    pub fn new() -> Self {
        Self {
            params: ParameterBlock::new(),
            shader: "base".to_string(),
            transform: Transform::default(),
            flags: BTreeMap::new(),
            layers: Vec::new(),
            next_layer: 0,
        }
    }

    pub fn params(&self) -> &ParameterBlock {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParameterBlock {
        &mut self.params
    }

    pub fn shader(&self) -> &str {
        &self.shader
    }

    pub fn set_shader(&mut self, shader: impl Into<String>) {
        self.shader = shader.into();
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Palette read from `u_colorA` / `u_colorB`, falling back per color.
    pub fn palette(&self) -> Palette {
        Palette {
            primary: self.params.color(U_COLOR_A).unwrap_or(Palette::FALLBACK.primary),
            secondary: self
                .params
                .color(U_COLOR_B)
                .unwrap_or(Palette::FALLBACK.secondary),
        }
    }

    pub fn displacement(&self) -> f32 {
        self.params.scalar(U_DISP).unwrap_or(0.0)
    }

    // ========== Flags ==========

    pub fn set_flag(&mut self, name: &str, value: f32) {
        self.flags.insert(name.to_string(), value);
    }

    /// Value of a flag, `0.0` when never set.
    pub fn flag(&self, name: &str) -> f32 {
        self.flags.get(name).copied().unwrap_or(0.0)
    }

    // ========== Layers ==========

    /// Register a layer of `handles` visual handles.
    pub fn attach(&mut self, label: &'static str, handles: usize) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        self.layers.push(Layer { id, label, handles });
        tracing::trace!(label, handles, "layer attached");
        id
    }

    /// Remove a layer. Returns `false` if it was not attached.
    pub fn detach(&mut self, id: LayerId) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        self.layers.len() != before
    }

    pub fn is_attached(&self, id: LayerId) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    /// Total handles across all attached layers.
    pub fn attached_handles(&self) -> usize {
        self.layers.iter().map(|l| l.handles).sum()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.layers.iter().map(|l| l.label)
    }

    /// Drop every layer and flag.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.flags.clear();
    }

    /// Per-frame context for the active simulation.
    pub fn frame_context(&self, dt: f32, t: f32) -> FrameContext {
        FrameContext {
            dt,
            t,
            displacement: self.displacement(),
            palette: self.palette(),
        }
    }
}
