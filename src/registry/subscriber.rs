//! # Subscribers
//!
//! The receive capability the dispatcher invokes, a closure adapter, and the
//! type-erased [`Registration`] used for batch registration.

use super::interest::{AnyValue, Interest, TypeKey};
use super::subscriber_registry::{Placement, SubscriberRegistry};
use crate::error::{DispatchError, SubscriberResult};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A receiver of published values of one declared type
pub trait Subscriber: Send + Sync {
    /// The declared interest type. May be unsized (`dyn Trait`) when the
    /// subscriber is registered with an explicit [`Interest`].
    type Value: ?Sized + 'static;

    /// Handle one published value
    fn receive(&self, value: &Self::Value) -> SubscriberResult;

    /// Subscriber name for identification in logs and errors
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Subscriber backed by a closure
pub struct FnSubscriber<T: ?Sized, F> {
    name: String,
    f: F,
    _value: PhantomData<fn(&T)>,
}

/// Build a subscriber from a closure.
///
/// ```rust
/// use blackboard::{subscriber_fn, Subscriber};
///
/// let greeter = subscriber_fn::<String, _>("greeter", |name| {
///     println!("hello {name}");
///     Ok(())
/// });
/// assert_eq!(greeter.name(), "greeter");
/// ```
pub fn subscriber_fn<T, F>(name: impl Into<String>, f: F) -> FnSubscriber<T, F>
where
    T: ?Sized + 'static,
    F: Fn(&T) -> SubscriberResult + Send + Sync,
{
    FnSubscriber {
        name: name.into(),
        f,
        _value: PhantomData,
    }
}

impl<T, F> Subscriber for FnSubscriber<T, F>
where
    T: ?Sized + 'static,
    F: Fn(&T) -> SubscriberResult + Send + Sync,
{
    type Value = T;

    fn receive(&self, value: &T) -> SubscriberResult {
        (self.f)(value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T: ?Sized, F> fmt::Debug for FnSubscriber<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSubscriber")
            .field("name", &self.name)
            .finish()
    }
}

type Binding = Box<dyn FnOnce(&SubscriberRegistry) -> Placement + Send>;

/// A subscriber packaged for [`Dispatcher::register`](crate::Dispatcher::register)
/// and [`Dispatcher::set_subscribers`](crate::Dispatcher::set_subscribers).
///
/// The interest type is recovered when the registration is built. Subscribers
/// that receive `&dyn Any` declare no concrete type, so a registration made
/// with [`Registration::erased`] carries no interest and is refused with
/// [`DispatchError::AmbiguousSubscriberType`]. An interest that accepts no
/// type is refused with [`DispatchError::EmptyInterest`].
pub struct Registration {
    subscriber: String,
    declared: Option<TypeKey>,
    binding: Result<Binding, DispatchError>,
}

impl Registration {
    /// Register under the subscriber's declared value type
    pub fn of<S>(subscriber: Arc<S>) -> Self
    where
        S: Subscriber + 'static,
        S::Value: Any + Send + Sync + Sized,
    {
        let subscriber: Arc<dyn Subscriber<Value = S::Value>> = subscriber;
        Self::with_interest(subscriber, Interest::<S::Value>::exact())
    }

    /// Register under an explicit interest
    pub fn with_interest<T: ?Sized + 'static>(
        subscriber: Arc<dyn Subscriber<Value = T>>,
        interest: Interest<T>,
    ) -> Self {
        let name = subscriber.name().to_string();
        let key = interest.key();
        let binding: Result<Binding, DispatchError> = if interest.is_empty() {
            Err(DispatchError::EmptyInterest {
                subscriber: name.clone(),
                key: key.name(),
            })
        } else {
            Ok(Box::new(move |registry: &SubscriberRegistry| {
                registry.insert(subscriber, interest)
            }))
        };
        Self {
            subscriber: name,
            declared: Some(key),
            binding,
        }
    }

    /// A subscriber over type-erased values. Its interest cannot be
    /// recovered; register it with `Dispatcher::subscribe_with` instead.
    pub fn erased(subscriber: Arc<dyn Subscriber<Value = AnyValue>>) -> Self {
        let name = subscriber.name().to_string();
        Self {
            subscriber: name.clone(),
            declared: None,
            binding: Err(DispatchError::AmbiguousSubscriberType { subscriber: name }),
        }
    }

    pub fn subscriber(&self) -> &str {
        &self.subscriber
    }

    /// The interest type recovered for this subscriber, if any
    pub fn declared_type(&self) -> Option<TypeKey> {
        self.declared
    }

    pub(crate) fn into_binding(self) -> Result<Binding, DispatchError> {
        self.binding
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("subscriber", &self.subscriber)
            .field("declared", &self.declared.map(|k| k.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named;

    impl Subscriber for Named {
        type Value = u8;

        fn receive(&self, _value: &u8) -> SubscriberResult {
            Ok(())
        }
    }

    #[test]
    fn test_default_name_is_type_name() {
        assert!(Named.name().ends_with("Named"));
    }

    #[test]
    fn test_fn_subscriber_invokes_closure() {
        let sub = subscriber_fn::<str, _>("len-check", |s| {
            anyhow::ensure!(!s.is_empty(), "empty input");
            Ok(())
        });
        assert!(sub.receive("abc").is_ok());
        assert!(sub.receive("").is_err());
        assert_eq!(sub.name(), "len-check");
    }

    #[test]
    fn test_registration_recovers_declared_type() {
        let registration = Registration::of(Arc::new(Named));
        assert_eq!(registration.declared_type(), Some(TypeKey::of::<u8>()));
        assert!(registration.into_binding().is_ok());
    }

    #[test]
    fn test_erased_registration_has_no_declared_type() {
        let erased: Arc<dyn Subscriber<Value = AnyValue>> =
            Arc::new(subscriber_fn::<AnyValue, _>("anything", |_| Ok(())));
        let registration = Registration::erased(erased);
        assert_eq!(registration.declared_type(), None);
        assert!(matches!(
            registration.into_binding(),
            Err(DispatchError::AmbiguousSubscriberType { ref subscriber }) if subscriber == "anything"
        ));
    }

    #[test]
    fn test_registration_with_empty_interest_is_refused() {
        let subscriber: Arc<dyn Subscriber<Value = u8>> = Arc::new(Named);
        let registration = Registration::with_interest(subscriber, Interest::new());
        assert_eq!(registration.declared_type(), Some(TypeKey::of::<u8>()));
        assert!(matches!(
            registration.into_binding(),
            Err(DispatchError::EmptyInterest { key, .. }) if key == "u8"
        ));
    }
}
