//! # Subscriber Registry
//!
//! Insertion-ordered map from interest type to subscriber handles, with the
//! resolution rules the dispatcher delivers by.
//!
//! ## Resolution
//!
//! For a value of runtime type `V`:
//!
//! 1. the key equal to `V` is used when it exists and accepts `V`;
//! 2. otherwise keys are scanned in the order they were first introduced and
//!    the first one whose interest accepts `V` wins;
//! 3. otherwise resolution fails with [`DispatchError::NoSubscriber`].
//!
//! The scan is first-registered-wins, not most-specific-wins.
//!
//! ## Concurrency
//!
//! The map sits behind a `parking_lot::RwLock`. Resolution clones the matched
//! handles while holding the read lock and releases it before any subscriber
//! runs, so a subscriber may register further subscribers without deadlock.

use super::interest::{AnyValue, Interest, TypeKey};
use super::subscriber::Subscriber;
use crate::error::{DispatchError, DispatchResult, SubscriberResult};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Invoke = Arc<dyn Fn(&AnyValue) -> SubscriberResult + Send + Sync>;

/// One subscriber bound to the view needed for one published value type
#[derive(Clone)]
pub(crate) struct Delivery {
    subscriber: Arc<str>,
    invoke: Invoke,
}

impl Delivery {
    pub(crate) fn subscriber(&self) -> &str {
        &self.subscriber
    }

    pub(crate) fn invoke(&self, value: &AnyValue) -> SubscriberResult {
        (self.invoke)(value)
    }
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("subscriber", &self.subscriber)
            .finish()
    }
}

/// Subscribers matched for a published value, in delivery order
#[derive(Debug)]
pub(crate) struct Resolution {
    pub(crate) key: TypeKey,
    pub(crate) deliveries: Vec<Delivery>,
}

/// Where an `insert` landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    pub(crate) key: TypeKey,
    pub(crate) created: bool,
    pub(crate) position: usize,
}

trait Slot: Send + Sync {
    fn key(&self) -> TypeKey;
    fn accepts(&self, value_type: TypeId) -> bool;
    fn len(&self) -> usize;
    fn bind(&self, value_type: TypeId) -> Vec<Delivery>;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedSlot<T: ?Sized + 'static> {
    interest: Interest<T>,
    subscribers: Vec<Arc<dyn Subscriber<Value = T>>>,
}

impl<T: ?Sized + 'static> Slot for TypedSlot<T> {
    fn key(&self) -> TypeKey {
        self.interest.key()
    }

    fn accepts(&self, value_type: TypeId) -> bool {
        self.interest.accepts(value_type)
    }

    fn len(&self) -> usize {
        self.subscribers.len()
    }

    fn bind(&self, value_type: TypeId) -> Vec<Delivery> {
        let Some(view) = self.interest.view_for(value_type) else {
            return Vec::new();
        };

        self.subscribers
            .iter()
            .map(|subscriber| {
                let subscriber = Arc::clone(subscriber);
                let view = Arc::clone(&view);
                let name: Arc<str> = Arc::from(subscriber.name());
                let invoke: Invoke = Arc::new(move |value: &AnyValue| match view(value) {
                    Some(projected) => subscriber.receive(projected),
                    None => Err(anyhow::anyhow!(
                        "published value does not match the view registered for it"
                    )),
                });
                Delivery {
                    subscriber: name,
                    invoke,
                }
            })
            .collect()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Default)]
struct RegistryInner {
    /// Slots in key insertion order
    slots: Vec<Box<dyn Slot>>,
    /// Key → position in `slots`
    index: HashMap<TypeId, usize>,
}

impl RegistryInner {
    fn find(&self, value_type: TypeId) -> Option<&dyn Slot> {
        if let Some(&position) = self.index.get(&value_type) {
            let slot = self.slots[position].as_ref();
            if slot.accepts(value_type) {
                return Some(slot);
            }
        }

        self.slots
            .iter()
            .map(|slot| slot.as_ref())
            .find(|slot| slot.accepts(value_type))
    }
}

/// Registry for type-keyed subscriber handles
#[derive(Default)]
pub struct SubscriberRegistry {
    inner: RwLock<RegistryInner>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `subscriber` under `interest`'s key, creating the key on first use.
    /// An existing key absorbs any value types `interest` accepts that it did not.
    pub(crate) fn insert<T: ?Sized + 'static>(
        &self,
        subscriber: Arc<dyn Subscriber<Value = T>>,
        interest: Interest<T>,
    ) -> Placement {
        let key = interest.key();
        let mut inner = self.inner.write();

        if let Some(&position) = inner.index.get(&key.id()) {
            let slot = match inner.slots[position]
                .as_any_mut()
                .downcast_mut::<TypedSlot<T>>()
            {
                Some(slot) => slot,
                None => unreachable!("slot for {key} holds a different value type"),
            };
            slot.interest.merge(interest);
            slot.subscribers.push(subscriber);
            return Placement {
                key,
                created: false,
                position: slot.subscribers.len() - 1,
            };
        }

        let position = inner.slots.len();
        inner.slots.push(Box::new(TypedSlot {
            interest,
            subscribers: vec![subscriber],
        }));
        inner.index.insert(key.id(), position);

        Placement {
            key,
            created: true,
            position: 0,
        }
    }

    /// Resolve the subscribers for a value of runtime type `value_type`
    pub(crate) fn resolve(
        &self,
        value_type: TypeId,
        type_name: &'static str,
    ) -> DispatchResult<Resolution> {
        let inner = self.inner.read();
        match inner.find(value_type) {
            Some(slot) => Ok(Resolution {
                key: slot.key(),
                deliveries: slot.bind(value_type),
            }),
            None => Err(DispatchError::NoSubscriber { type_name }),
        }
    }

    /// Whether a value of runtime type `value_type` would resolve
    pub fn accepts(&self, value_type: TypeId) -> bool {
        self.inner.read().find(value_type).is_some()
    }

    /// Subscribers registered under exactly `key`
    pub fn subscriber_count(&self, key: TypeKey) -> usize {
        let inner = self.inner.read();
        inner
            .index
            .get(&key.id())
            .map(|&position| inner.slots[position].len())
            .unwrap_or(0)
    }

    /// Registered keys in the order they were introduced
    pub fn keys(&self) -> Vec<TypeKey> {
        self.inner.read().slots.iter().map(|s| s.key()).collect()
    }

    pub fn total_subscribers(&self) -> usize {
        self.inner.read().slots.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().slots.is_empty()
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("keys", &self.keys())
            .field("total_subscribers", &self.total_subscribers())
            .finish()
    }
}
