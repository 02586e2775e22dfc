//! # Interest Types
//!
//! Type tags and the *is-instance-of* predicate the registry resolves against.
//!
//! Rust has no runtime inheritance, so "supertype" interests are declared
//! explicitly: an [`Interest<T>`] lists the concrete value types it accepts,
//! each with a view function turning the concrete value into `&T`.
//!
//! ```rust
//! use blackboard::Interest;
//! use std::fmt::Display;
//!
//! // Accepts only `String` values
//! let exact = Interest::<String>::exact();
//! assert_eq!(exact.accepted_types(), vec!["alloc::string::String"]);
//!
//! // Accepts integers of two widths, viewed through `dyn Display`
//! let wide = Interest::<dyn Display + Send + Sync>::new()
//!     .include::<i32>(|v| v)
//!     .include::<i64>(|v| v);
//! assert!(wide.accepts(std::any::TypeId::of::<i64>()));
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A published value with its concrete type erased
pub type AnyValue = dyn Any + Send + Sync;

/// Erased view from a published value to the interest type
pub(crate) type View<T> = Arc<dyn Fn(&AnyValue) -> Option<&T> + Send + Sync>;

/// Stable, comparable tag identifying a registry key or a published value's type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

struct Member<T: ?Sized + 'static> {
    name: &'static str,
    view: View<T>,
}

impl<T: ?Sized + 'static> Clone for Member<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            view: Arc::clone(&self.view),
        }
    }
}

/// The set of concrete value types a subscriber of `T` is interested in
pub struct Interest<T: ?Sized + 'static> {
    members: HashMap<TypeId, Member<T>>,
    /// Insertion order of `members`, for stable diagnostics
    order: Vec<TypeId>,
}

fn identity<T>(value: &T) -> &T {
    value
}

// Pins the closure to a higher-ranked signature so the returned reference
// borrows from the argument.
fn erase_view<T: ?Sized, F>(f: F) -> F
where
    F: Fn(&AnyValue) -> Option<&T> + Send + Sync + 'static,
{
    f
}

impl<T: ?Sized + 'static> Interest<T> {
    /// An interest that accepts nothing until types are added with [`include`](Self::include).
    ///
    /// The dispatcher refuses to register an interest that is still empty.
    pub fn new() -> Self {
        Self {
            members: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Accept values of concrete type `V`, viewed as `&T` through `view`.
    ///
    /// Including the same `V` twice keeps the first view.
    pub fn include<V>(mut self, view: fn(&V) -> &T) -> Self
    where
        V: Any + Send + Sync,
    {
        let id = TypeId::of::<V>();
        if !self.members.contains_key(&id) {
            let erased = erase_view::<T, _>(move |value| value.downcast_ref::<V>().map(view));
            self.members.insert(
                id,
                Member {
                    name: type_name::<V>(),
                    view: Arc::new(erased),
                },
            );
            self.order.push(id);
        }
        self
    }

    /// Registry key for this interest
    pub fn key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    /// Whether a value whose runtime type is `value_type` is an instance of this interest
    pub fn accepts(&self, value_type: TypeId) -> bool {
        self.members.contains_key(&value_type)
    }

    /// Names of accepted value types, in the order they were included
    pub fn accepted_types(&self) -> Vec<&'static str> {
        self.order
            .iter()
            .filter_map(|id| self.members.get(id).map(|m| m.name))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Adds every accepted type of `other` that this interest does not know yet
    pub(crate) fn merge(&mut self, other: Interest<T>) {
        let Interest { mut members, order } = other;
        for id in order {
            if self.members.contains_key(&id) {
                continue;
            }
            if let Some(member) = members.remove(&id) {
                self.members.insert(id, member);
                self.order.push(id);
            }
        }
    }

    pub(crate) fn view_for(&self, value_type: TypeId) -> Option<View<T>> {
        self.members.get(&value_type).map(|m| Arc::clone(&m.view))
    }
}

impl<T: Any + Send + Sync> Interest<T> {
    /// An interest in exactly `T`
    pub fn exact() -> Self {
        Self::new().include::<T>(identity::<T>)
    }
}

impl<T: ?Sized + 'static> Default for Interest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> Clone for Interest<T> {
    fn clone(&self) -> Self {
        Self {
            members: self.members.clone(),
            order: self.order.clone(),
        }
    }
}

impl<T: ?Sized + 'static> fmt::Debug for Interest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interest")
            .field("key", &self.key().name())
            .field("accepts", &self.accepted_types())
            .finish()
    }
}
