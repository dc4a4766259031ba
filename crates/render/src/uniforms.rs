//! The named-uniform contract between the host and the bound shader.
//!
//! Shaders are opaque collaborators: the host only promises to publish a
//! fixed set of names each frame. The layout those names map to is
//! reflected from the shader's own WGSL source, so a shader that omits a
//! name simply never receives it.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

/// Viewport width and height in pixels. Set once at startup.
pub const U_RESOLUTION: &str = "u_resolution";
/// Elapsed seconds since render start, monotonically increasing.
pub const U_TIME: &str = "u_time";
/// Current camera position `(x, y, z)`.
pub const U_CAMERA_POS: &str = "u_camera_pos";
/// Camera rotation pair `(cos(radians(lat)) * lat, lon)`.
pub const U_CAMERA_ROT: &str = "u_camera_rot";

/// A value crossing the host/shader boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    F32(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    UVec2([u32; 2]),
}

impl UniformValue {
    /// Raw bytes as the shader-side member expects them.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            UniformValue::F32(v) => bytemuck::bytes_of(v),
            UniformValue::Vec2(v) => bytemuck::bytes_of(v),
            UniformValue::Vec3(v) => bytemuck::bytes_of(v),
            UniformValue::UVec2(v) => bytemuck::bytes_of(v),
        }
    }
}

/// Publish failure for a single named uniform. Never fatal; the publisher
/// downgrades either variant to log-once-then-skip.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UniformError {
    #[error("uniform `{0}` is not declared by the bound shader")]
    NotDeclared(String),
    #[error("uniform `{0}` is declared with a different size by the bound shader")]
    SizeMismatch(String),
}

/// Errors loading or reflecting a shader. Fatal at startup.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to parse WGSL: {0}")]
    Parse(String),
    #[error("shader declares no uniform struct in bind group 0")]
    NoUniformBlock,
}

/// Anything that can receive a named uniform. Implemented by the
/// reflected [`UniformBlock`]; mocked in tests.
pub trait UniformSink {
    fn set(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError>;
}

/// Per-session suppression of uniform names the bound shader rejected.
///
/// The first failed publish for a name logs a diagnostic and records the
/// name; every later frame skips it without touching the sink.
#[derive(Debug, Default)]
pub struct UniformPublisher {
    skipped: HashSet<&'static str>,
}

impl UniformPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, sink: &mut dyn UniformSink, name: &'static str, value: UniformValue) {
        if self.skipped.contains(name) {
            return;
        }
        if let Err(err) = sink.set(name, value) {
            tracing::warn!("{err}; disabling for this session");
            self.skipped.insert(name);
        }
    }

    /// Whether a name has been permanently suppressed.
    pub fn is_skipped(&self, name: &str) -> bool {
        self.skipped.contains(name)
    }
}

#[derive(Debug, Clone, Copy)]
struct Field {
    offset: u32,
    size: u32,
}

/// CPU staging image of the shader's uniform struct, with a name-to-offset
/// map reflected from the WGSL source via naga.
///
/// GPU-free by construction: the frame driver flushes [`Self::bytes`]
/// through the queue when [`Self::take_dirty`] reports a change.
#[derive(Debug)]
pub struct UniformBlock {
    fields: BTreeMap<String, Field>,
    binding: u32,
    data: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    /// Reflect the first uniform-address-space struct bound in group 0.
    pub fn from_wgsl(source: &str) -> Result<Self, ShaderError> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|err| ShaderError::Parse(err.to_string()))?;
        let gctx = module.to_ctx();

        for (_, var) in module.global_variables.iter() {
            if var.space != naga::AddressSpace::Uniform {
                continue;
            }
            let binding = match &var.binding {
                Some(b) if b.group == 0 => b.binding,
                _ => continue,
            };
            if let naga::TypeInner::Struct { members, span } = &module.types[var.ty].inner {
                let mut fields = BTreeMap::new();
                for member in members {
                    let Some(name) = member.name.clone() else {
                        continue;
                    };
                    let size = module.types[member.ty].inner.size(gctx);
                    fields.insert(
                        name,
                        Field {
                            offset: member.offset,
                            size,
                        },
                    );
                }
                return Ok(Self {
                    fields,
                    binding,
                    data: vec![0; *span as usize],
                    dirty: false,
                });
            }
        }
        Err(ShaderError::NoUniformBlock)
    }

    /// Bind-group slot the shader declared for the struct.
    pub fn binding(&self) -> u32 {
        self.binding
    }

    pub fn byte_size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// True if a set() landed since the last call; resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Member names the shader declares, for diagnostics.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl UniformSink for UniformBlock {
    fn set(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        let field = self
            .fields
            .get(name)
            .copied()
            .ok_or_else(|| UniformError::NotDeclared(name.to_owned()))?;
        let src = value.as_bytes();
        if src.len() != field.size as usize {
            return Err(UniformError::SizeMismatch(name.to_owned()));
        }
        let start = field.offset as usize;
        self.data[start..start + src.len()].copy_from_slice(src);
        self.dirty = true;
        Ok(())
    }
}
