mod common;

use blackboard::{Dispatcher, Subscriber};
use common::strategies::*;
use common::*;
use proptest::prelude::*;
use std::sync::Arc;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: every subscriber under one type sees every payload, in publish order
    #[test]
    fn all_subscribers_receive_all_payloads(
        count in subscriber_count_strategy(8),
        payloads in payloads_strategy(),
    ) {
        let dispatcher = Dispatcher::new().unwrap();
        let collectors: Vec<_> = (0..count)
            .map(|i| Arc::new(CollectingSubscriber::<String>::new(&format!("c{i}"))))
            .collect();
        for collector in &collectors {
            dispatcher.subscribe(Arc::clone(collector));
        }

        for payload in &payloads {
            dispatcher.publish(payload.clone()).unwrap();
        }

        for collector in &collectors {
            prop_assert_eq!(collector.values(), payloads.clone());
        }
    }

    /// Property: delivery order within one publish equals registration order
    #[test]
    fn delivery_order_matches_registration_order(count in subscriber_count_strategy(12)) {
        let dispatcher = Dispatcher::new().unwrap();
        let log = EventLog::default();
        let tags: Vec<String> = (0..count).map(|i| format!("t{i}")).collect();
        for tag in &tags {
            dispatcher.subscribe(Arc::new(TaggingSubscriber::<u8>::new(tag, &log)));
        }

        dispatcher.publish(0_u8).unwrap();

        let expected: Vec<String> = tags.iter().map(|t| format!("{t}:0")).collect();
        prop_assert_eq!(log.lock().clone(), expected);
    }

    /// Property: integer values of either width reach the numeric supertype,
    /// text never does, and unresolved publishes are counted
    #[test]
    fn numeric_supertype_routing(published in published_strategy()) {
        let dispatcher = Dispatcher::new().unwrap();
        let numbers_sub = Arc::new(NumberCollector::default());
        dispatcher.subscribe_with(
            Arc::clone(&numbers_sub) as Arc<dyn Subscriber<Value = dyn Number>>,
            numbers(),
        )
        .unwrap();

        let mut expected = Vec::new();
        let mut unresolved = 0_u64;
        for item in &published {
            match *item {
                Published::Int(v) => {
                    dispatcher.publish(v).unwrap();
                    expected.push(i128::from(v));
                }
                Published::Long(v) => {
                    dispatcher.publish(v).unwrap();
                    expected.push(i128::from(v));
                }
                Published::Text => {
                    prop_assert!(dispatcher.publish("text".to_string()).is_err());
                    unresolved += 1;
                }
            }
        }

        prop_assert_eq!(numbers_sub.values(), expected);
        let stats = dispatcher.stats();
        prop_assert_eq!(stats.unresolved, unresolved);
        prop_assert_eq!(stats.published, published.len() as u64);
    }
}
