use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use parking_lot::{RwLock, RwLockReadGuard};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(0);

/// Per-instance data read by the mesh shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceAttributes {
    /// Object to world transform.
    pub transform: Mat4,
}

impl Default for InstanceAttributes {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
        }
    }
}

#[derive(Debug)]
pub struct InstanceData {
    id: u64,
    label: String,
    version: AtomicU64,
    data: RwLock<Vec<InstanceAttributes>>,
}

/// Shared handle to the instance-attribute array of a loaded scene.
///
/// The array is owned by the asset and uploaded by the graphics backend;
/// scene graphics bindings write individual slots through this handle. Its
/// length is fixed at creation so slot indices stay valid for the whole
/// scene. Every write bumps [`version`](Self::version), which the backend
/// compares to decide whether to re-upload.
#[derive(Debug, Clone)]
pub struct InstanceBuffer(Arc<InstanceData>);

impl PartialEq for InstanceBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for InstanceBuffer {}

impl std::hash::Hash for InstanceBuffer {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl InstanceBuffer {
    #[must_use]
    pub fn new(data: Vec<InstanceAttributes>, label: Option<&str>) -> Self {
        Self(Arc::new(InstanceData {
            id: NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed),
            label: label.unwrap_or("InstanceBuffer").to_string(),
            version: AtomicU64::new(0),
            data: RwLock::new(data),
        }))
    }

    /// `len` identity transforms.
    #[must_use]
    pub fn with_len(len: usize, label: Option<&str>) -> Self {
        Self::new(vec![InstanceAttributes::default(); len], label)
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.0.version.load(Ordering::Relaxed)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.0.label
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.data.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<InstanceAttributes> {
        self.0.data.read().get(slot).copied()
    }

    /// Mutates one slot in place. Out-of-range slots are ignored and return
    /// `false`.
    pub fn write(&self, slot: usize, f: impl FnOnce(&mut InstanceAttributes)) -> bool {
        let mut data = self.0.data.write();
        let Some(attrs) = data.get_mut(slot) else {
            return false;
        };
        f(attrs);
        drop(data);
        self.0.version.fetch_add(1, Ordering::Relaxed);
        true
    }

    pub fn read_data(&self) -> RwLockReadGuard<'_, Vec<InstanceAttributes>> {
        self.0.data.read()
    }

    /// Copy of the array as raw bytes for upload.
    #[must_use]
    pub fn as_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(self.read_data().as_slice()).to_vec()
    }
}

impl Default for InstanceBuffer {
    fn default() -> Self {
        Self::empty()
    }
}
