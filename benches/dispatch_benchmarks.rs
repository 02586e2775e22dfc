use blackboard::{subscriber_fn, Dispatcher, Interest, Subscriber};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

trait Metric: Send + Sync {
    fn value(&self) -> u64;
}

impl Metric for u32 {
    fn value(&self) -> u64 {
        u64::from(*self)
    }
}

impl Metric for u64 {
    fn value(&self) -> u64 {
        *self
    }
}

/// Uninhabited key type, distinct per `N`
enum Unrelated<const N: usize> {}

fn subscribe_unrelated<const N: usize>(dispatcher: &Dispatcher) {
    dispatcher.subscribe(Arc::new(subscriber_fn::<Unrelated<N>, _>(
        format!("unrelated-{N}"),
        |_| Ok(()),
    )));
}

macro_rules! unrelated_keys {
    ($dispatcher:expr; $($n:literal),*) => {
        $( subscribe_unrelated::<$n>($dispatcher); )*
    };
}

fn counting_dispatcher(subscribers: usize) -> (Dispatcher, Arc<AtomicU64>) {
    let dispatcher = Dispatcher::builder()
        .log_published_values(false)
        .build()
        .expect("dispatcher");
    let total = Arc::new(AtomicU64::new(0));
    for i in 0..subscribers {
        let total = Arc::clone(&total);
        dispatcher.subscribe(Arc::new(subscriber_fn::<u64, _>(format!("count-{i}"), move |v| {
            total.fetch_add(*v, Ordering::Relaxed);
            Ok(())
        })));
    }
    (dispatcher, total)
}

fn benchmark_exact_publish(c: &mut Criterion) {
    let (dispatcher, _) = counting_dispatcher(4);
    c.bench_function("publish_exact_4_subscribers", |b| {
        b.iter(|| dispatcher.publish(black_box(1_u64)))
    });
}

fn benchmark_supertype_publish(c: &mut Criterion) {
    let dispatcher = Dispatcher::builder()
        .log_published_values(false)
        .build()
        .expect("dispatcher");
    // Sixteen unrelated keys ahead of the supertype lengthen the scan
    unrelated_keys!(
        &dispatcher;
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15
    );
    assert_eq!(dispatcher.registered_types().len(), 16);
    let total = Arc::new(AtomicU64::new(0));
    let sink = Arc::clone(&total);
    let metrics: Arc<dyn Subscriber<Value = dyn Metric>> =
        Arc::new(subscriber_fn::<dyn Metric, _>("metrics", move |m| {
            sink.fetch_add(m.value(), Ordering::Relaxed);
            Ok(())
        }));
    dispatcher.subscribe_with(
        metrics,
        Interest::<dyn Metric>::new()
            .include::<u32>(|v| v)
            .include::<u64>(|v| v),
    )
    .unwrap();

    c.bench_function("publish_supertype_scan", |b| {
        b.iter(|| dispatcher.publish(black_box(7_u32)))
    });
}

fn benchmark_async_publish(c: &mut Criterion) {
    let (dispatcher, _) = counting_dispatcher(4);
    c.bench_function("async_publish_4_subscribers", |b| {
        b.iter(|| dispatcher.async_publish(black_box(1_u64)))
    });
}

criterion_group!(
    benches,
    benchmark_exact_publish,
    benchmark_supertype_publish,
    benchmark_async_publish
);
criterion_main!(benches);
