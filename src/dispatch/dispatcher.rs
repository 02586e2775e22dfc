//! # Dispatcher
//!
//! Routes published values to subscribers by runtime type.
//!
//! A value of type `V` is delivered to every subscriber registered under the
//! single key the registry resolves for `V`, in registration order. The same
//! shared value reaches every subscriber; nothing is copied per delivery.
//!
//! ## Delivery modes
//!
//! - [`Dispatcher::publish`] runs every subscriber on the calling thread and
//!   returns after the last one. Failures follow the configured
//!   [`FailurePolicy`]; panics propagate to the caller.
//! - [`Dispatcher::async_publish`] submits one task per subscriber to the
//!   executor and returns once all are accepted. Task failures, including
//!   panics, are logged, counted and passed to the failure hook. So is a
//!   task the executor evicts before it runs.
//!
//! ```rust
//! use blackboard::{subscriber_fn, Dispatcher};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), blackboard::DispatchError> {
//! let dispatcher = Dispatcher::new()?;
//! dispatcher.subscribe(Arc::new(subscriber_fn::<String, _>("print", |s| {
//!     println!("{s}");
//!     Ok(())
//! })));
//! dispatcher.publish("hello".to_string())?;
//! # Ok(())
//! # }
//! ```

use super::builder::DispatcherBuilder;
use super::stats::{DispatchCounters, DispatcherStats};
use crate::config::FailurePolicy;
use crate::constants::DISPATCHER_ID_PREFIX;
use crate::error::{
    panic_message, DeliveryFailure, DispatchError, DispatchResult, FailureCause,
};
use crate::executor::{Task, TaskExecutor};
use crate::logging::log_dispatch_operation;
use crate::registry::subscriber_registry::{Delivery, Placement, Resolution};
use crate::registry::{AnyValue, Interest, Registration, Subscriber, SubscriberRegistry, TypeKey};
use std::any::{type_name, Any, TypeId};
use std::fmt::{self, Debug};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Callback for failed async deliveries
pub type FailureHook = Arc<dyn Fn(&DeliveryFailure) + Send + Sync>;

pub struct Dispatcher {
    id: Arc<str>,
    registry: SubscriberRegistry,
    executor: Arc<dyn TaskExecutor>,
    failure_policy: FailurePolicy,
    log_published_values: bool,
    failure_hook: Option<FailureHook>,
    counters: Arc<DispatchCounters>,
}

impl Dispatcher {
    /// Dispatcher with default configuration and its own worker pool
    pub fn new() -> DispatchResult<Self> {
        Self::builder().build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub(crate) fn assemble(
        executor: Arc<dyn TaskExecutor>,
        failure_policy: FailurePolicy,
        log_published_values: bool,
        failure_hook: Option<FailureHook>,
    ) -> Self {
        let id: Arc<str> = generate_dispatcher_id().into();
        info!(
            dispatcher_id = %id,
            executor = executor.name(),
            failure_policy = ?failure_policy,
            "🚀 DISPATCHER: Created"
        );

        Self {
            id,
            registry: SubscriberRegistry::new(),
            executor,
            failure_policy,
            log_published_values,
            failure_hook,
            counters: Arc::new(DispatchCounters::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register `subscriber` under the type it declares
    pub fn subscribe<S>(&self, subscriber: Arc<S>) -> TypeKey
    where
        S: Subscriber + 'static,
        S::Value: Any + Send + Sync + Sized,
    {
        let subscriber: Arc<dyn Subscriber<Value = S::Value>> = subscriber;
        self.place(subscriber, Interest::exact())
    }

    /// Register `subscriber` under an explicit interest.
    ///
    /// Registering the same handle twice delivers to it twice. An interest
    /// that accepts no type is refused with [`DispatchError::EmptyInterest`]
    /// and nothing is registered.
    pub fn subscribe_with<T: ?Sized + 'static>(
        &self,
        subscriber: Arc<dyn Subscriber<Value = T>>,
        interest: Interest<T>,
    ) -> DispatchResult<TypeKey> {
        if interest.is_empty() {
            let error = DispatchError::EmptyInterest {
                subscriber: subscriber.name().to_string(),
                key: interest.key().name(),
            };
            self.log_refusal(&error);
            return Err(error);
        }
        Ok(self.place(subscriber, interest))
    }

    fn place<T: ?Sized + 'static>(
        &self,
        subscriber: Arc<dyn Subscriber<Value = T>>,
        interest: Interest<T>,
    ) -> TypeKey {
        let name = subscriber.name().to_string();
        let placement = self.registry.insert(subscriber, interest);
        self.log_registration(&name, &placement);
        placement.key
    }

    /// Register a packaged subscriber under its recovered interest type
    pub fn register(&self, registration: Registration) -> DispatchResult<TypeKey> {
        let name = registration.subscriber().to_string();
        let binding = registration.into_binding().map_err(|error| {
            self.log_refusal(&error);
            error
        })?;

        let placement = binding(&self.registry);
        self.log_registration(&name, &placement);
        Ok(placement.key)
    }

    /// Register each subscriber in order.
    ///
    /// Stops at the first refused registration; subscribers before it stay
    /// registered. Returns how many were registered.
    pub fn set_subscribers<I>(&self, registrations: I) -> DispatchResult<usize>
    where
        I: IntoIterator<Item = Registration>,
    {
        let mut registered = 0;
        for registration in registrations {
            self.register(registration)?;
            registered += 1;
        }
        Ok(registered)
    }

    fn log_refusal(&self, error: &DispatchError) {
        warn!(
            dispatcher_id = %self.id,
            error = %error,
            "⚠️ DISPATCHER: Registration refused"
        );
    }

    fn log_registration(&self, subscriber: &str, placement: &Placement) {
        debug!(
            dispatcher_id = %self.id,
            subscriber = subscriber,
            key = placement.key.name(),
            position = placement.position,
            "Subscriber registered"
        );
        log_dispatch_operation(
            "subscribe",
            &self.id,
            placement.key.name(),
            placement.position + 1,
            if placement.created { "key_created" } else { "appended" },
            Some(subscriber),
        );
    }

    // =========================================================================
    // Publication
    // =========================================================================

    /// Deliver `value` to its subscribers on the calling thread
    pub fn publish<V>(&self, value: V) -> DispatchResult<()>
    where
        V: Any + Send + Sync + Debug,
    {
        self.publish_shared(Arc::new(value))
    }

    /// Deliver an already shared value on the calling thread
    #[instrument(level = "debug", skip_all, fields(dispatcher_id = %self.id, value_type = type_name::<V>()))]
    pub fn publish_shared<V>(&self, value: Arc<V>) -> DispatchResult<()>
    where
        V: Any + Send + Sync + Debug,
    {
        let resolution = self.resolve::<V>(&value, "sync")?;
        let value: Arc<AnyValue> = value;
        self.deliver_sync(type_name::<V>(), &resolution, &*value)
    }

    /// Deliver `value` to its subscribers on the executor
    pub fn async_publish<V>(&self, value: V) -> DispatchResult<()>
    where
        V: Any + Send + Sync + Debug,
    {
        self.async_publish_shared(Arc::new(value))
    }

    /// Deliver an already shared value on the executor.
    ///
    /// Returns once every delivery task has been accepted. If the executor
    /// refuses one, the remaining subscribers are skipped and the refusal is
    /// returned; tasks already accepted still run.
    #[instrument(level = "debug", skip_all, fields(dispatcher_id = %self.id, value_type = type_name::<V>()))]
    pub fn async_publish_shared<V>(&self, value: Arc<V>) -> DispatchResult<()>
    where
        V: Any + Send + Sync + Debug,
    {
        let resolution = self.resolve::<V>(&value, "async")?;
        let value: Arc<AnyValue> = value;
        let value_type = type_name::<V>();

        for delivery in resolution.deliveries {
            let subscriber = delivery.subscriber().to_string();
            let task = self.delivery_task(delivery, Arc::clone(&value), value_type);
            if let Err(e) = self.executor.submit(task) {
                self.counters.record_refused();
                warn!(
                    dispatcher_id = %self.id,
                    subscriber = %subscriber,
                    value_type = value_type,
                    error = %e,
                    "⚠️ DISPATCHER: Executor refused delivery"
                );
                return Err(e);
            }
            self.counters.record_submitted();
        }
        Ok(())
    }

    fn resolve<V>(&self, value: &V, mode: &'static str) -> DispatchResult<Resolution>
    where
        V: Any + Debug,
    {
        self.counters.record_publish();
        let outcome = self.registry.resolve(TypeId::of::<V>(), type_name::<V>());
        if outcome.is_err() {
            self.counters.record_unresolved();
        }

        // One record per publish; `key` is absent when nothing accepts the value
        let key = outcome.as_ref().ok().map(|r| r.key.name());
        let subscribers = outcome.as_ref().map_or(0, |r| r.deliveries.len());
        if self.log_published_values {
            debug!(
                mode = mode,
                value = ?value,
                key = key,
                subscribers = subscribers,
                "Published"
            );
        } else {
            debug!(mode = mode, key = key, subscribers = subscribers, "Published");
        }
        outcome
    }

    fn deliver_sync(
        &self,
        value_type: &'static str,
        resolution: &Resolution,
        value: &AnyValue,
    ) -> DispatchResult<()> {
        match self.failure_policy {
            FailurePolicy::FailFast => {
                for delivery in &resolution.deliveries {
                    if let Err(source) = delivery.invoke(value) {
                        self.counters.record_failed();
                        warn!(
                            subscriber = delivery.subscriber(),
                            error = %source,
                            "Subscriber failed, remaining deliveries skipped"
                        );
                        return Err(DispatchError::SubscriberFailed {
                            subscriber: delivery.subscriber().to_string(),
                            type_name: value_type,
                            source,
                        });
                    }
                    self.counters.record_delivered();
                }
                Ok(())
            }
            FailurePolicy::CollectAll => {
                let failures: Vec<DeliveryFailure> = resolution
                    .deliveries
                    .iter()
                    .filter_map(|delivery| match delivery.invoke(value) {
                        Ok(()) => {
                            self.counters.record_delivered();
                            None
                        }
                        Err(e) => {
                            self.counters.record_failed();
                            warn!(subscriber = delivery.subscriber(), error = %e, "Subscriber failed");
                            Some(DeliveryFailure {
                                subscriber: delivery.subscriber().to_string(),
                                type_name: value_type,
                                cause: FailureCause::Error(e),
                            })
                        }
                    })
                    .collect();

                if failures.is_empty() {
                    Ok(())
                } else {
                    Err(DispatchError::DeliveryFailed {
                        type_name: value_type,
                        failures,
                    })
                }
            }
        }
    }

    fn delivery_task(
        &self,
        delivery: Delivery,
        value: Arc<AnyValue>,
        value_type: &'static str,
    ) -> Task {
        let outcome = DeliveryOutcome {
            dispatcher_id: Arc::clone(&self.id),
            counters: Arc::clone(&self.counters),
            hook: self.failure_hook.clone(),
            subscriber: delivery.subscriber().to_string(),
            value_type,
        };
        let on_discard = outcome.clone();
        let label = format!("{value_type} -> {}", delivery.subscriber());

        Task::new(label, move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| delivery.invoke(&*value)));
            match result {
                Ok(Ok(())) => outcome.counters.record_delivered(),
                Ok(Err(e)) => outcome.failed(FailureCause::Error(e)),
                Err(payload) => {
                    outcome.failed(FailureCause::Panicked(panic_message(payload.as_ref())))
                }
            }
        })
        .on_discard(move || on_discard.discarded())
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Subscribers registered under exactly the key for `T`
    pub fn subscriber_count<T: ?Sized + 'static>(&self) -> usize {
        self.registry.subscriber_count(TypeKey::of::<T>())
    }

    /// Registered interest types in the order they were introduced
    pub fn registered_types(&self) -> Vec<TypeKey> {
        self.registry.keys()
    }

    /// Whether publishing a `V` would find subscribers
    pub fn has_subscribers_for<V: Any>(&self) -> bool {
        self.registry.accepts(TypeId::of::<V>())
    }

    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats::collect(
            &self.id,
            self.executor.name(),
            self.registry.keys().iter().map(TypeKey::name).collect(),
            self.registry.total_subscribers(),
            &self.counters,
        )
    }

    /// Stop the executor from accepting async deliveries.
    ///
    /// Synchronous publish keeps working. A shared executor is shut down for
    /// all of its owners.
    pub fn shutdown(&self) {
        info!(dispatcher_id = %self.id, "🛑 DISPATCHER: Shutting down executor");
        self.executor.shutdown();
    }
}

/// Reports how one async delivery ended
#[derive(Clone)]
struct DeliveryOutcome {
    dispatcher_id: Arc<str>,
    counters: Arc<DispatchCounters>,
    hook: Option<FailureHook>,
    subscriber: String,
    value_type: &'static str,
}

impl DeliveryOutcome {
    fn failed(&self, cause: FailureCause) {
        self.counters.record_failed();
        let failure = self.failure(cause);
        error!(
            dispatcher_id = %self.dispatcher_id,
            subscriber = %failure.subscriber,
            value_type = self.value_type,
            panicked = failure.is_panic(),
            error = %failure.cause,
            "❌ DISPATCHER: Async delivery failed"
        );
        self.notify(&failure);
    }

    fn discarded(&self) {
        self.counters.record_discarded();
        warn!(
            dispatcher_id = %self.dispatcher_id,
            subscriber = %self.subscriber,
            value_type = self.value_type,
            "⚠️ DISPATCHER: Async delivery discarded before running"
        );
        self.notify(&self.failure(FailureCause::Discarded));
    }

    fn failure(&self, cause: FailureCause) -> DeliveryFailure {
        DeliveryFailure {
            subscriber: self.subscriber.clone(),
            type_name: self.value_type,
            cause,
        }
    }

    fn notify(&self, failure: &DeliveryFailure) {
        if let Some(hook) = &self.hook {
            hook(failure);
        }
    }
}

impl Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("id", &self.id)
            .field("executor", &self.executor.name())
            .field("failure_policy", &self.failure_policy)
            .field("registry", &self.registry)
            .finish()
    }
}

fn generate_dispatcher_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{}{}", DISPATCHER_ID_PREFIX, &uuid[..8])
}
