//! Test subscribers that record what they receive.

#![allow(dead_code)]

use anyhow::anyhow;
use blackboard::{Interest, Subscriber, SubscriberResult};
use crossbeam::channel::Sender;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Collects clones of every value it receives, plus the value's address
pub struct CollectingSubscriber<T> {
    name: String,
    values: Mutex<Vec<T>>,
    addresses: Mutex<Vec<usize>>,
}

impl<T: Clone> CollectingSubscriber<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: Mutex::new(Vec::new()),
            addresses: Mutex::new(Vec::new()),
        }
    }

    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }

    pub fn addresses(&self) -> Vec<usize> {
        self.addresses.lock().clone()
    }

    pub fn received(&self) -> usize {
        self.values.lock().len()
    }
}

impl<T> Subscriber for CollectingSubscriber<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Value = T;

    fn receive(&self, value: &T) -> SubscriberResult {
        self.values.lock().push(value.clone());
        self.addresses.lock().push(value as *const T as usize);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Shared ordered log of `tag:value` entries across subscribers
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// Appends `tag:{value:?}` to a shared log
pub struct TaggingSubscriber<T: ?Sized> {
    tag: String,
    log: EventLog,
    _value: PhantomData<fn(&T)>,
}

impl<T: ?Sized> TaggingSubscriber<T> {
    pub fn new(tag: &str, log: &EventLog) -> Self {
        Self {
            tag: tag.to_string(),
            log: Arc::clone(log),
            _value: PhantomData,
        }
    }
}

impl<T> Subscriber for TaggingSubscriber<T>
where
    T: Debug + ?Sized + 'static,
{
    type Value = T;

    fn receive(&self, value: &T) -> SubscriberResult {
        self.log.lock().push(format!("{}:{:?}", self.tag, value));
        Ok(())
    }

    fn name(&self) -> &str {
        &self.tag
    }
}

/// Forwards `(name, value)` to a channel
pub struct ChannelSubscriber<T> {
    name: String,
    sender: Sender<(String, T)>,
}

impl<T> ChannelSubscriber<T> {
    pub fn new(name: &str, sender: Sender<(String, T)>) -> Self {
        Self {
            name: name.to_string(),
            sender,
        }
    }
}

impl<T> Subscriber for ChannelSubscriber<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Value = T;

    fn receive(&self, value: &T) -> SubscriberResult {
        self.sender.send((self.name.clone(), value.clone()))?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Always returns an error, counting its invocations
pub struct FailingSubscriber<T> {
    name: String,
    calls: AtomicUsize,
    _value: PhantomData<fn(&T)>,
}

impl<T> FailingSubscriber<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
            _value: PhantomData,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T: 'static> Subscriber for FailingSubscriber<T> {
    type Value = T;

    fn receive(&self, _value: &T) -> SubscriberResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("{} refused the value", self.name))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Panics on every value
pub struct PanickingSubscriber<T> {
    name: String,
    _value: PhantomData<fn(&T)>,
}

impl<T> PanickingSubscriber<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            _value: PhantomData,
        }
    }
}

impl<T: 'static> Subscriber for PanickingSubscriber<T> {
    type Value = T;

    fn receive(&self, _value: &T) -> SubscriberResult {
        panic!("{} cannot cope", self.name);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Numeric "supertype" of the integer widths used in tests
pub trait Number: Send + Sync {
    fn as_i128(&self) -> i128;
}

impl Number for i32 {
    fn as_i128(&self) -> i128 {
        i128::from(*self)
    }
}

impl Number for i64 {
    fn as_i128(&self) -> i128 {
        i128::from(*self)
    }
}

pub fn numbers() -> Interest<dyn Number> {
    Interest::<dyn Number>::new()
        .include::<i32>(|v| v)
        .include::<i64>(|v| v)
}

/// Receives any [`Number`] and records it widened
#[derive(Default)]
pub struct NumberCollector {
    values: Mutex<Vec<i128>>,
}

impl NumberCollector {
    pub fn values(&self) -> Vec<i128> {
        self.values.lock().clone()
    }
}

impl Subscriber for NumberCollector {
    type Value = dyn Number;

    fn receive(&self, value: &Self::Value) -> SubscriberResult {
        self.values.lock().push(value.as_i128());
        Ok(())
    }

    fn name(&self) -> &str {
        "numbers"
    }
}
