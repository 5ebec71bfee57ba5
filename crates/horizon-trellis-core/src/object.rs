//! Object model for Horizon Trellis.
//!
//! Provides the base object system with:
//! - Unique object identifiers via arena-based storage
//! - Parent-child ownership relationships with cascade destruction
//! - Retained ownership: a parent can hold the owning handle of a child
//! - Destroyed notifications
//! - Object naming, lookup and dynamic properties
//!
//! # Key Types
//!
//! - [`Object`] - Base trait that all objects implement
//! - [`ObjectBase`] - Helper struct for implementing [`Object`]
//! - [`ObjectId`] - Unique stable identifier for each object
//! - [`ObjectRegistry`] - Central registry managing all objects
//! - [`SharedObjectRegistry`] - Thread-safe wrapper around [`ObjectRegistry`]
//!
//! # Ownership
//!
//! Objects are normally owned by whoever created them. Calling
//! [`SharedObjectRegistry::adopt`] hands an owning handle to the registry entry
//! of the object itself; the handle is then released when the object (or any
//! of its ancestors) is destroyed. This gives the retained tree the same
//! "parent deletes children" semantics that widget toolkits rely on.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;
use crate::variant::Variant;

new_key_type! {
    /// A unique identifier for an object in the registry.
    ///
    /// `ObjectId`s are stable handles that remain valid even as the object tree changes.
    /// They become invalid when the object is destroyed; a destroyed id is never reused
    /// for a different object.
    pub struct ObjectId;
}

impl ObjectId {
    /// Convert the ObjectId to a raw u64 value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create an ObjectId from a raw u64 value.
    ///
    /// This does not check if the ObjectId exists in the registry.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Errors that can occur during object operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// The object ID is invalid or has been destroyed.
    InvalidObjectId,
    /// Attempted to set an object as its own parent/ancestor.
    CircularParentage,
    /// The object registry is not initialized.
    RegistryNotInitialized,
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidObjectId => write!(f, "Invalid or destroyed object ID"),
            Self::CircularParentage => {
                write!(f, "Cannot set an object as its own parent or ancestor")
            }
            Self::RegistryNotInitialized => write!(f, "Object registry not initialized"),
        }
    }
}

impl std::error::Error for ObjectError {}

/// Result type for object operations.
pub type ObjectResult<T> = std::result::Result<T, ObjectError>;

/// Callback invoked after an object has been removed from the registry.
pub type DestroyedCallback = Box<dyn FnOnce(ObjectId) + Send + Sync>;

/// Internal data stored in the registry for each object.
struct ObjectData {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    dynamic_properties: HashMap<String, Variant>,
    /// Owning handle held on behalf of the parent (retained tree).
    owned: Option<Arc<dyn Any + Send + Sync>>,
    destroyed_callbacks: Vec<DestroyedCallback>,
}

impl ObjectData {
    fn new(type_id: TypeId, type_name: &'static str) -> Self {
        Self {
            name: String::new(),
            type_id,
            type_name,
            parent: None,
            children: Vec::new(),
            dynamic_properties: HashMap::new(),
            owned: None,
            destroyed_callbacks: Vec::new(),
        }
    }
}

/// Everything released by a destroy operation.
///
/// Produced while the registry is locked and finalized after the lock is
/// released, so that callbacks and drop glue may re-enter the registry.
#[must_use = "a destroyed tree must be finalized to run callbacks and release handles"]
pub struct DestroyedTree {
    /// Destroyed ids, children before parents.
    ids: Vec<ObjectId>,
    callbacks: Vec<(ObjectId, DestroyedCallback)>,
    handles: Vec<Arc<dyn Any + Send + Sync>>,
}

impl DestroyedTree {
    /// The destroyed ids, children before parents.
    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    /// Run destroyed callbacks (child-first) and drop owned handles.
    pub fn finalize(self) {
        for (id, callback) in self.callbacks {
            callback(id);
        }
        drop(self.handles);
    }
}

/// The central registry that manages all objects and their relationships.
///
/// Uses arena-based storage via SlotMap for stable object IDs and efficient
/// parent-child relationship management.
pub struct ObjectRegistry {
    objects: SlotMap<ObjectId, ObjectData>,
}

impl ObjectRegistry {
    /// Create a new empty object registry.
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
        }
    }

    /// Register a new object and return its ID.
    pub fn register<T: 'static>(&mut self) -> ObjectId {
        let type_name = std::any::type_name::<T>();
        let id = self.objects.insert(ObjectData::new(TypeId::of::<T>(), type_name));
        tracing::trace!(target: targets::OBJECT, ?id, type_name, "registered object");
        id
    }

    /// Remove an object and all its descendants from the registry.
    ///
    /// The returned [`DestroyedTree`] must be finalized once the registry lock
    /// has been released.
    #[tracing::instrument(skip(self), target = "horizon_trellis_core::object", level = "trace")]
    pub fn destroy(&mut self, id: ObjectId) -> ObjectResult<DestroyedTree> {
        let mut ids = self.collect_descendants(id)?;
        ids.push(id);
        tracing::trace!(target: targets::OBJECT, ?id, count = ids.len(), "destroying object tree");

        if let Some(parent_id) = self.objects.get(id).and_then(|d| d.parent) {
            if let Some(parent_data) = self.objects.get_mut(parent_id) {
                parent_data.children.retain(|&child| child != id);
            }
        }

        let mut callbacks = Vec::new();
        let mut handles = Vec::new();
        for &victim in &ids {
            if let Some(mut data) = self.objects.remove(victim) {
                callbacks.extend(data.destroyed_callbacks.drain(..).map(|cb| (victim, cb)));
                if let Some(handle) = data.owned.take() {
                    handles.push(handle);
                }
            }
        }

        Ok(DestroyedTree {
            ids,
            callbacks,
            handles,
        })
    }

    /// Collect all descendant IDs in depth-first order (children before parents).
    fn collect_descendants(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        let mut result = Vec::new();
        self.collect_descendants_recursive(id, &mut result)?;
        Ok(result)
    }

    fn collect_descendants_recursive(
        &self,
        id: ObjectId,
        result: &mut Vec<ObjectId>,
    ) -> ObjectResult<()> {
        let data = self.objects.get(id).ok_or(ObjectError::InvalidObjectId)?;
        for &child_id in &data.children {
            self.collect_descendants_recursive(child_id, result)?;
            result.push(child_id);
        }
        Ok(())
    }

    /// Check if an object exists in the registry.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Set the parent of an object.
    ///
    /// Passing `None` makes the object a root object.
    pub fn set_parent(&mut self, id: ObjectId, new_parent: Option<ObjectId>) -> ObjectResult<()> {
        if !self.objects.contains_key(id) {
            return Err(ObjectError::InvalidObjectId);
        }

        if let Some(parent_id) = new_parent {
            if !self.objects.contains_key(parent_id) {
                return Err(ObjectError::InvalidObjectId);
            }
            if self.is_ancestor_of(id, parent_id) {
                return Err(ObjectError::CircularParentage);
            }
        }

        let old_parent = self.objects.get(id).and_then(|d| d.parent);
        if let Some(old_parent_id) = old_parent {
            if let Some(parent_data) = self.objects.get_mut(old_parent_id) {
                parent_data.children.retain(|&child| child != id);
            }
        }

        if let Some(data) = self.objects.get_mut(id) {
            data.parent = new_parent;
        }

        if let Some(parent_id) = new_parent {
            if let Some(parent_data) = self.objects.get_mut(parent_id) {
                parent_data.children.push(id);
            }
        }

        Ok(())
    }

    /// Check if `potential_ancestor` is `id` or one of its ancestors.
    fn is_ancestor_of(&self, potential_ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == potential_ancestor {
                return true;
            }
            current = self.objects.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    /// Get the parent of an object.
    pub fn parent(&self, id: ObjectId) -> ObjectResult<Option<ObjectId>> {
        self.objects
            .get(id)
            .map(|d| d.parent)
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Get the children of an object.
    pub fn children(&self, id: ObjectId) -> ObjectResult<&[ObjectId]> {
        self.objects
            .get(id)
            .map(|d| d.children.as_slice())
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Get the object's name.
    pub fn object_name(&self, id: ObjectId) -> ObjectResult<&str> {
        self.objects
            .get(id)
            .map(|d| d.name.as_str())
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Set the object's name.
    pub fn set_object_name(&mut self, id: ObjectId, name: String) -> ObjectResult<()> {
        self.objects
            .get_mut(id)
            .map(|d| d.name = name)
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Get the type ID of an object.
    pub fn type_id(&self, id: ObjectId) -> ObjectResult<TypeId> {
        self.objects
            .get(id)
            .map(|d| d.type_id)
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Get the type name of an object.
    pub fn type_name(&self, id: ObjectId) -> ObjectResult<&'static str> {
        self.objects
            .get(id)
            .map(|d| d.type_name)
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Find a child by name (direct children only).
    pub fn find_child_by_name(&self, id: ObjectId, name: &str) -> ObjectResult<Option<ObjectId>> {
        let children = self.children(id)?;
        Ok(children
            .iter()
            .copied()
            .find(|&child| self.objects.get(child).is_some_and(|d| d.name == name)))
    }

    /// Recursively find all descendants with the given name, in pre-order.
    pub fn find_descendants_by_name(&self, id: ObjectId, name: &str) -> ObjectResult<Vec<ObjectId>> {
        let mut result = Vec::new();
        self.find_descendants_by_name_recursive(id, name, &mut result)?;
        Ok(result)
    }

    fn find_descendants_by_name_recursive(
        &self,
        id: ObjectId,
        name: &str,
        result: &mut Vec<ObjectId>,
    ) -> ObjectResult<()> {
        let children = self.children(id)?;
        for &child_id in children {
            if self.objects.get(child_id).is_some_and(|d| d.name == name) {
                result.push(child_id);
            }
            self.find_descendants_by_name_recursive(child_id, name, result)?;
        }
        Ok(())
    }

    /// Set a dynamic property on an object.
    pub fn set_dynamic_property(
        &mut self,
        id: ObjectId,
        name: impl Into<String>,
        value: Variant,
    ) -> ObjectResult<()> {
        let data = self.objects.get_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        data.dynamic_properties.insert(name.into(), value);
        Ok(())
    }

    /// Get a dynamic property from an object.
    pub fn dynamic_property(&self, id: ObjectId, name: &str) -> ObjectResult<Option<&Variant>> {
        let data = self.objects.get(id).ok_or(ObjectError::InvalidObjectId)?;
        Ok(data.dynamic_properties.get(name))
    }

    /// Remove a dynamic property, returning its previous value.
    pub fn remove_dynamic_property(
        &mut self,
        id: ObjectId,
        name: &str,
    ) -> ObjectResult<Option<Variant>> {
        let data = self.objects.get_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        Ok(data.dynamic_properties.remove(name))
    }

    /// Names of all dynamic properties set on an object.
    pub fn dynamic_property_names(&self, id: ObjectId) -> ObjectResult<Vec<String>> {
        let data = self.objects.get(id).ok_or(ObjectError::InvalidObjectId)?;
        let mut names: Vec<String> = data.dynamic_properties.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Hand the owning handle of an object to the registry.
    ///
    /// Returns the previously adopted handle, if any.
    pub fn adopt(
        &mut self,
        id: ObjectId,
        handle: Arc<dyn Any + Send + Sync>,
    ) -> ObjectResult<Option<Arc<dyn Any + Send + Sync>>> {
        let data = self.objects.get_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        Ok(data.owned.replace(handle))
    }

    /// Take the owning handle back from the registry.
    pub fn release(&mut self, id: ObjectId) -> ObjectResult<Option<Arc<dyn Any + Send + Sync>>> {
        let data = self.objects.get_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        Ok(data.owned.take())
    }

    /// Whether the registry currently holds the owning handle of an object.
    pub fn is_adopted(&self, id: ObjectId) -> bool {
        self.objects.get(id).is_some_and(|d| d.owned.is_some())
    }

    /// Register a callback to run after the object is destroyed.
    pub fn on_destroyed(&mut self, id: ObjectId, callback: DestroyedCallback) -> ObjectResult<()> {
        let data = self.objects.get_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        data.destroyed_callbacks.push(callback);
        Ok(())
    }

    /// Get the total number of objects in the registry.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Get all objects without a parent.
    pub fn root_objects(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|(_, d)| d.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Get all ancestors from immediate parent to root.
    pub fn ancestors(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        let mut result = Vec::new();
        let mut current = self.parent(id)?;
        while let Some(parent_id) = current {
            result.push(parent_id);
            current = self.objects.get(parent_id).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// Get the object and its descendants in depth-first pre-order.
    pub fn depth_first_preorder(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        if !self.contains(id) {
            return Err(ObjectError::InvalidObjectId);
        }
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(data) = self.objects.get(current) {
                stack.extend(data.children.iter().rev().copied());
            }
        }
        Ok(result)
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper around [`ObjectRegistry`].
///
/// All mutating calls that can release objects (`destroy`, `release`) finalize
/// their work after the write lock is dropped.
pub struct SharedObjectRegistry {
    inner: RwLock<ObjectRegistry>,
}

impl SharedObjectRegistry {
    /// Create a new shared registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ObjectRegistry::new()),
        }
    }

    /// Register a new object.
    pub fn register<T: 'static>(&self) -> ObjectId {
        self.inner.write().register::<T>()
    }

    /// Destroy an object and its descendants, then run destroyed callbacks.
    pub fn destroy(&self, id: ObjectId) -> ObjectResult<()> {
        let tree = self.inner.write().destroy(id)?;
        tree.finalize();
        Ok(())
    }

    /// Check if an object exists.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.inner.read().contains(id)
    }

    /// Set the parent of an object.
    pub fn set_parent(&self, id: ObjectId, parent: Option<ObjectId>) -> ObjectResult<()> {
        self.inner.write().set_parent(id, parent)
    }

    /// Get the parent of an object.
    pub fn parent(&self, id: ObjectId) -> ObjectResult<Option<ObjectId>> {
        self.inner.read().parent(id)
    }

    /// Get the children of an object.
    pub fn children(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        self.inner.read().children(id).map(|c| c.to_vec())
    }

    /// Get the object's name.
    pub fn object_name(&self, id: ObjectId) -> ObjectResult<String> {
        self.inner.read().object_name(id).map(|s| s.to_string())
    }

    /// Set the object's name.
    pub fn set_object_name(&self, id: ObjectId, name: String) -> ObjectResult<()> {
        self.inner.write().set_object_name(id, name)
    }

    /// Get the type name of an object.
    pub fn type_name(&self, id: ObjectId) -> ObjectResult<&'static str> {
        self.inner.read().type_name(id)
    }

    /// Find a direct child by name.
    pub fn find_child_by_name(&self, id: ObjectId, name: &str) -> ObjectResult<Option<ObjectId>> {
        self.inner.read().find_child_by_name(id, name)
    }

    /// Find all descendants with the given name.
    pub fn find_descendants_by_name(&self, id: ObjectId, name: &str) -> ObjectResult<Vec<ObjectId>> {
        self.inner.read().find_descendants_by_name(id, name)
    }

    /// Set a dynamic property.
    pub fn set_dynamic_property(
        &self,
        id: ObjectId,
        name: impl Into<String>,
        value: Variant,
    ) -> ObjectResult<()> {
        self.inner.write().set_dynamic_property(id, name, value)
    }

    /// Get a copy of a dynamic property.
    pub fn dynamic_property(&self, id: ObjectId, name: &str) -> ObjectResult<Option<Variant>> {
        self.inner.read().dynamic_property(id, name).map(|v| v.cloned())
    }

    /// Remove a dynamic property.
    pub fn remove_dynamic_property(&self, id: ObjectId, name: &str) -> ObjectResult<Option<Variant>> {
        self.inner.write().remove_dynamic_property(id, name)
    }

    /// Names of all dynamic properties of an object.
    pub fn dynamic_property_names(&self, id: ObjectId) -> ObjectResult<Vec<String>> {
        self.inner.read().dynamic_property_names(id)
    }

    /// Hand an owning handle to the registry; any replaced handle is dropped
    /// after the lock is released.
    pub fn adopt(&self, id: ObjectId, handle: Arc<dyn Any + Send + Sync>) -> ObjectResult<()> {
        let previous = self.inner.write().adopt(id, handle)?;
        drop(previous);
        Ok(())
    }

    /// Take an owning handle back from the registry.
    pub fn release(&self, id: ObjectId) -> ObjectResult<Option<Arc<dyn Any + Send + Sync>>> {
        self.inner.write().release(id)
    }

    /// Whether the registry holds the owning handle of an object.
    pub fn is_adopted(&self, id: ObjectId) -> bool {
        self.inner.read().is_adopted(id)
    }

    /// Register a destroyed callback.
    ///
    /// If the object is already gone the callback runs immediately.
    pub fn on_destroyed<F>(&self, id: ObjectId, callback: F)
    where
        F: FnOnce(ObjectId) + Send + Sync + 'static,
    {
        let mut callback: Option<DestroyedCallback> = Some(Box::new(callback));
        {
            let mut registry = self.inner.write();
            if registry.contains(id) {
                if let Some(cb) = callback.take() {
                    let _ = registry.on_destroyed(id, cb);
                }
            }
        }
        if let Some(cb) = callback {
            cb(id);
        }
    }

    /// Get the total number of objects.
    pub fn object_count(&self) -> usize {
        self.inner.read().object_count()
    }

    /// Get all objects without a parent.
    pub fn root_objects(&self) -> Vec<ObjectId> {
        self.inner.read().root_objects()
    }

    /// Get all ancestors from immediate parent to root.
    pub fn ancestors(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        self.inner.read().ancestors(id)
    }

    /// Get the object and its descendants in depth-first pre-order.
    pub fn depth_first_preorder(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        self.inner.read().depth_first_preorder(id)
    }

    /// Run a closure with read access to the registry.
    pub fn with_read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ObjectRegistry) -> R,
    {
        f(&self.inner.read())
    }
}

impl Default for SharedObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(SharedObjectRegistry: Send, Sync);

/// Global object registry.
static GLOBAL_REGISTRY: OnceLock<SharedObjectRegistry> = OnceLock::new();

/// Initialize the global object registry.
///
/// This is called automatically by [`Application::init`](crate::Application::init).
/// Calling it more than once has no effect.
pub fn init_global_registry() {
    GLOBAL_REGISTRY.get_or_init(SharedObjectRegistry::new);
}

/// Get a reference to the global object registry.
///
/// Returns an error if the registry hasn't been initialized.
pub fn global_registry() -> ObjectResult<&'static SharedObjectRegistry> {
    GLOBAL_REGISTRY.get().ok_or(ObjectError::RegistryNotInitialized)
}

/// The base trait that all objects implement.
pub trait Object: Any + Send + Sync {
    /// Get this object's unique identifier.
    fn object_id(&self) -> ObjectId;
}

/// Helper struct for implementing [`Object`].
///
/// Registers the object on construction and destroys it (and its descendants)
/// when dropped.
pub struct ObjectBase {
    id: ObjectId,
}

impl ObjectBase {
    /// Create a new ObjectBase, registering the object in the global registry.
    pub fn new<T: 'static>() -> ObjectResult<Self> {
        let id = global_registry()?.register::<T>();
        Ok(Self { id })
    }

    /// Get the object's ID.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Get the object's name from the registry.
    pub fn name(&self) -> String {
        global_registry()
            .and_then(|r| r.object_name(self.id))
            .unwrap_or_default()
    }

    /// Set the object's name in the registry.
    pub fn set_name(&self, name: impl Into<String>) {
        if let Ok(registry) = global_registry() {
            let _ = registry.set_object_name(self.id, name.into());
        }
    }

    /// Get the parent object ID.
    pub fn parent(&self) -> Option<ObjectId> {
        global_registry()
            .and_then(|r| r.parent(self.id))
            .ok()
            .flatten()
    }

    /// Set the parent object.
    pub fn set_parent(&self, parent: Option<ObjectId>) -> ObjectResult<()> {
        global_registry()?.set_parent(self.id, parent)
    }

    /// Get child object IDs.
    pub fn children(&self) -> Vec<ObjectId> {
        global_registry()
            .and_then(|r| r.children(self.id))
            .unwrap_or_default()
    }

    /// Whether the object is still registered.
    pub fn is_alive(&self) -> bool {
        global_registry().is_ok_and(|r| r.contains(self.id))
    }
}

impl Drop for ObjectBase {
    fn drop(&mut self) {
        if let Ok(registry) = global_registry() {
            // Already destroyed through a parent: nothing left to do.
            let _ = registry.destroy(self.id);
        }
    }
}

impl fmt::Debug for ObjectBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBase").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Node;

    #[test]
    fn test_register_and_destroy_cascade() {
        let mut registry = ObjectRegistry::new();
        let root = registry.register::<Node>();
        let child = registry.register::<Node>();
        let grandchild = registry.register::<Node>();
        registry.set_parent(child, Some(root)).unwrap();
        registry.set_parent(grandchild, Some(child)).unwrap();

        let tree = registry.destroy(root).unwrap();
        assert_eq!(tree.ids(), &[grandchild, child, root]);
        tree.finalize();

        assert!(!registry.contains(root));
        assert!(!registry.contains(child));
        assert!(!registry.contains(grandchild));
    }

    #[test]
    fn test_destroy_child_detaches_from_parent() {
        let mut registry = ObjectRegistry::new();
        let root = registry.register::<Node>();
        let child = registry.register::<Node>();
        registry.set_parent(child, Some(root)).unwrap();

        registry.destroy(child).unwrap().finalize();
        assert!(registry.children(root).unwrap().is_empty());
    }

    #[test]
    fn test_circular_parentage_rejected() {
        let mut registry = ObjectRegistry::new();
        let a = registry.register::<Node>();
        let b = registry.register::<Node>();
        registry.set_parent(b, Some(a)).unwrap();

        assert_eq!(registry.set_parent(a, Some(b)), Err(ObjectError::CircularParentage));
        assert_eq!(registry.set_parent(a, Some(a)), Err(ObjectError::CircularParentage));
    }

    #[test]
    fn test_reparent_moves_child() {
        let mut registry = ObjectRegistry::new();
        let a = registry.register::<Node>();
        let b = registry.register::<Node>();
        let c = registry.register::<Node>();
        registry.set_parent(c, Some(a)).unwrap();
        registry.set_parent(c, Some(b)).unwrap();

        assert!(registry.children(a).unwrap().is_empty());
        assert_eq!(registry.children(b).unwrap(), &[c]);
        assert_eq!(registry.parent(c).unwrap(), Some(b));
    }

    #[test]
    fn test_find_descendants_by_name() {
        let mut registry = ObjectRegistry::new();
        let root = registry.register::<Node>();
        let a = registry.register::<Node>();
        let b = registry.register::<Node>();
        registry.set_parent(a, Some(root)).unwrap();
        registry.set_parent(b, Some(a)).unwrap();
        registry.set_object_name(a, "email".into()).unwrap();
        registry.set_object_name(b, "email".into()).unwrap();

        assert_eq!(registry.find_child_by_name(root, "email").unwrap(), Some(a));
        assert_eq!(registry.find_descendants_by_name(root, "email").unwrap(), vec![a, b]);
        assert_eq!(registry.depth_first_preorder(root).unwrap(), vec![root, a, b]);
    }

    #[test]
    fn test_dynamic_properties() {
        let mut registry = ObjectRegistry::new();
        let id = registry.register::<Node>();

        registry.set_dynamic_property(id, "answer", Variant::Int(42)).unwrap();
        assert_eq!(registry.dynamic_property(id, "answer").unwrap(), Some(&Variant::Int(42)));
        assert_eq!(registry.dynamic_property_names(id).unwrap(), vec!["answer".to_string()]);
        assert_eq!(
            registry.remove_dynamic_property(id, "answer").unwrap(),
            Some(Variant::Int(42))
        );
        assert_eq!(registry.dynamic_property(id, "answer").unwrap(), None);
    }

    #[test]
    fn test_adopted_handles_released_on_destroy() {
        let registry = SharedObjectRegistry::new();
        let parent = registry.register::<Node>();
        let child = registry.register::<Node>();
        registry.set_parent(child, Some(parent)).unwrap();

        let payload = Arc::new(7u32);
        registry.adopt(child, payload.clone()).unwrap();
        assert_eq!(Arc::strong_count(&payload), 2);
        assert!(registry.is_adopted(child));

        registry.destroy(parent).unwrap();
        assert_eq!(Arc::strong_count(&payload), 1);
    }

    #[test]
    fn test_destroyed_callbacks_run_child_first() {
        let registry = SharedObjectRegistry::new();
        let parent = registry.register::<Node>();
        let child = registry.register::<Node>();
        registry.set_parent(child, Some(parent)).unwrap();

        let order = Arc::new(Mutex::new(Vec::new()));
        for id in [parent, child] {
            let order = order.clone();
            registry.on_destroyed(id, move |destroyed| order.lock().push(destroyed));
        }

        registry.destroy(parent).unwrap();
        assert_eq!(*order.lock(), vec![child, parent]);
    }

    #[test]
    fn test_on_destroyed_for_dead_object_runs_immediately() {
        let registry = SharedObjectRegistry::new();
        let id = registry.register::<Node>();
        registry.destroy(id).unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        registry.on_destroyed(id, move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_object_base_drop_destroys() {
        init_global_registry();
        let base = ObjectBase::new::<Node>().unwrap();
        let id = base.id();
        base.set_name("temp");
        assert_eq!(base.name(), "temp");
        assert!(base.is_alive());

        drop(base);
        assert!(!global_registry().unwrap().contains(id));
    }

    #[test]
    fn test_object_id_raw_roundtrip() {
        let mut registry = ObjectRegistry::new();
        let id = registry.register::<Node>();
        assert_eq!(ObjectId::from_raw(id.as_raw()), id);
    }
}
