
use std::error::Error as _;
use std::time::{Duration, Instant};

use stride_events::broker::InMemoryBroker;
use stride_events::{
    BrokerError, DomainEvent, Event, EventHeader, EventKind, EventPublisher, EventSerializer,
    PartitionKeys, PublishFailure, PublishState, PublisherSettings, SerializationError,
    TaskCreated, TaskEvent, TopicResolver, UserCreated, UserEvent,
};
use serde_json::Value;
use widget::{GaugeRead, WidgetCreated, WidgetRetired};

fn user_created() -> UserEvent {
    UserCreated::new(
        EventHeader::new("req-1").unwrap(),
        "u1",
        "o1",
        "ada@example.com",
        "Ada Lovelace",
    )
    .into()
}

fn publisher(broker: &InMemoryBroker, settings: &PublisherSettings) -> EventPublisher<InMemoryBroker> {
    EventPublisher::from_current(broker.clone(), settings).unwrap()
}

#[tokio::test]
async fn user_created_lands_on_user_events() {
    let broker = InMemoryBroker::new();
    let publisher = publisher(&broker, &PublisherSettings::default());
    let event = user_created();

    let receipt = publisher.publish(&event).await.unwrap();

    assert_eq!(receipt.topic, "stride.local.user-events");
    assert!(receipt.key.starts_with("UserCreatedEvent-"));

    let records = broker.records_for("stride.local.user-events");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].offset, receipt.offset);

    let decoded: UserEvent = EventSerializer::new()
        .deserialize_as(records[0].payload_str().unwrap(), EventKind::USER_CREATED)
        .unwrap();
    assert_eq!(decoded, event);
}

#[tokio::test]
async fn prefix_and_environment_shape_the_topic() {
    let broker = InMemoryBroker::new();
    let settings = PublisherSettings::default()
        .with_topic_prefix("acme")
        .with_environment("staging");
    let publisher = publisher(&broker, &settings);

    let receipt = publisher.publish(&user_created()).await.unwrap();
    assert_eq!(receipt.topic, "acme.staging.user-events");
}

#[tokio::test]
async fn every_family_variant_shares_its_family_topic() {
    let broker = InMemoryBroker::new();
    let publisher = publisher(&broker, &PublisherSettings::default());

    let task: DomainEvent = TaskEvent::from(TaskCreated {
        header: EventHeader::root(),
        task_id: "t1".into(),
        team_id: "team1".into(),
        project_id: "p1".into(),
        title: "Write docs".into(),
        assigned_to: None,
        created_by: "u1".into(),
        organization_id: "o1".into(),
    })
    .into();
    let user: DomainEvent = user_created().into();

    assert_eq!(publisher.publish(&task).await.unwrap().topic, "stride.local.task-events");
    assert_eq!(publisher.publish(&user).await.unwrap().topic, "stride.local.user-events");
    assert_eq!(broker.topics(), vec!["stride.local.task-events", "stride.local.user-events"]);
}

#[tokio::test]
async fn unmapped_family_uses_derived_topic_end_to_end() {
    let broker = InMemoryBroker::new();
    let publisher = publisher(&broker, &PublisherSettings::default());

    let first = publisher.publish(&WidgetCreated::new("w1")).await.unwrap();
    let second = publisher.publish(&WidgetCreated::new("w2")).await.unwrap();

    assert_eq!(first.topic, "stride.local.widget-events");
    assert_eq!(second.topic, first.topic);
    assert!(first.key.starts_with("WidgetEvent-"));
}

#[tokio::test]
async fn untagged_external_event_gets_its_discriminator_on_the_wire() {
    let broker = InMemoryBroker::new();
    let publisher = publisher(&broker, &PublisherSettings::default());
    let event = WidgetRetired {
        header: EventHeader::root(),
        widget_id: "w9".into(),
    };

    let receipt = publisher.publish(&event).await.unwrap();

    let records = broker.records_for(&receipt.topic);
    let payload: Value = serde_json::from_slice(&records[0].payload).unwrap();
    assert_eq!(payload["eventType"], "WIDGET_RETIRED");
    assert_eq!(payload["widgetId"], "w9");
    assert_eq!(payload["eventId"], event.event_id());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn publish_returns_before_the_broker_acknowledges() {
    let broker = InMemoryBroker::new().with_latency(Duration::from_millis(300));
    let publisher = publisher(&broker, &PublisherSettings::default());

    let started = Instant::now();
    let handle = publisher.publish(&user_created());
    let returned_after = started.elapsed();

    assert!(returned_after < Duration::from_millis(100), "publish blocked for {returned_after:?}");
    assert!(!handle.is_finished());
    assert_eq!(handle.state(), PublishState::Dispatched);

    let receipt = handle.await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(receipt.offset, 0);
}

#[test]
fn blocking_publish_waits_for_the_acknowledgement() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let broker = InMemoryBroker::new().with_latency(Duration::from_millis(20));
    let publisher =
        EventPublisher::new(broker.clone(), &PublisherSettings::default(), runtime.handle().clone()).unwrap();

    let receipt = publisher.publish_blocking(&user_created()).unwrap();

    assert_eq!(receipt.topic, "stride.local.user-events");
    assert_eq!(broker.len(), 1);
}

#[test]
fn blocking_publish_times_out_with_outcome_unknown() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let broker = InMemoryBroker::new().with_latency(Duration::from_millis(500));
    let settings = PublisherSettings::default().with_publish_timeout(Duration::from_millis(50));
    let publisher = EventPublisher::new(broker.clone(), &settings, runtime.handle().clone()).unwrap();

    let started = Instant::now();
    let err = publisher.publish_blocking(&user_created()).unwrap_err();

    assert!(started.elapsed() < Duration::from_millis(400));
    assert!(err.is_timeout());
    assert_eq!(err.topic(), "stride.local.user-events");
    assert_eq!(err.event_type(), "UserCreatedEvent");

    // The send is not cancelled and still lands.
    std::thread::sleep(Duration::from_millis(700));
    assert_eq!(broker.len(), 1);
}

#[tokio::test]
async fn publish_and_wait_times_out_without_blocking_the_runtime() {
    let broker = InMemoryBroker::new().with_latency(Duration::from_millis(500));
    let settings = PublisherSettings::default().with_publish_timeout(Duration::from_millis(50));
    let publisher = publisher(&broker, &settings);

    let err = publisher.publish_and_wait(&user_created()).await.unwrap_err();

    assert!(matches!(err.cause(), PublishFailure::TimedOut(t) if *t == Duration::from_millis(50)));
}

#[test]
fn broker_failure_surfaces_the_same_cause_on_both_paths() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let broker = InMemoryBroker::new().failing_with(|| BrokerError::Unavailable("broker down".to_string()));
    let publisher =
        EventPublisher::new(broker.clone(), &PublisherSettings::default(), runtime.handle().clone()).unwrap();
    let event = user_created();

    let handle = publisher.publish(&event);
    let async_err = runtime.block_on(handle).unwrap_err();
    let blocking_err = publisher.publish_blocking(&event).unwrap_err();

    for err in [&async_err, &blocking_err] {
        assert!(matches!(
            err.cause(),
            PublishFailure::Broker(BrokerError::Unavailable(msg)) if msg == "broker down"
        ));
        assert_eq!(err.topic(), "stride.local.user-events");
        assert_eq!(err.error_code(), "EVENT_PUBLISH_FAILED");
        assert!(err.source().is_some());
    }
    assert!(broker.is_empty());
}

#[tokio::test]
async fn failed_send_ends_in_failed_state() {
    let broker = InMemoryBroker::new().failing_with(|| BrokerError::Rejected("record too large".to_string()));
    let publisher = publisher(&broker, &PublisherSettings::default());

    let mut handle = publisher.publish(&user_created());
    let result = (&mut handle).await;

    assert!(result.is_err());
    assert_eq!(handle.state(), PublishState::Failed);
}

#[tokio::test]
async fn serialization_failure_never_reaches_the_broker() {
    let broker = InMemoryBroker::new();
    let publisher = publisher(&broker, &PublisherSettings::default());
    let event = GaugeRead {
        header: EventHeader::root(),
        gauge_id: "g1".into(),
    };

    let handle = publisher.publish(&event);
    assert!(handle.is_finished());
    assert_eq!(handle.state(), PublishState::Failed);

    let err = handle.await.unwrap_err();
    assert!(matches!(
        err.cause(),
        PublishFailure::Serialization(SerializationError::Encode { kind: "GaugeReadEvent", .. })
    ));
    assert_eq!(err.topic(), "stride.local.gaugeread-events");
    assert!(broker.is_empty());
}

#[tokio::test]
async fn explicit_topic_and_key_override_resolution() {
    let broker = InMemoryBroker::new();
    let publisher = publisher(&broker, &PublisherSettings::default());
    let event = user_created();

    let to = publisher.publish_to("audit.users", &event).await.unwrap();
    let keyed = publisher.publish_with_key("audit.users", "org-o1", &event).await.unwrap();

    assert_eq!(to.topic, "audit.users");
    assert!(to.key.starts_with("UserCreatedEvent-"));
    assert_eq!(keyed.key, "org-o1");
    assert_eq!(broker.records_for("audit.users").len(), 2);
}

#[tokio::test]
async fn derived_keys_are_stable_and_bounded() {
    let broker = InMemoryBroker::new();
    let settings = PublisherSettings::default().with_partition_buckets(8);
    let publisher = publisher(&broker, &settings);
    let event = user_created();

    let first = publisher.publish(&event).await.unwrap();
    let second = publisher.publish(&event).await.unwrap();
    assert_eq!(first.key, second.key);

    for _ in 0..20 {
        let receipt = publisher.publish(&user_created()).await.unwrap();
        let bucket: u32 = receipt
            .key
            .strip_prefix("UserCreatedEvent-")
            .unwrap()
            .parse()
            .unwrap();
        assert!(bucket < 8);
    }

    let payload = EventSerializer::new().serialize_bytes(&event).unwrap();
    assert_eq!(first.key, PartitionKeys::new(8).derive(event.kind(), &payload));
}

#[tokio::test]
async fn custom_resolver_routes_new_families() {
    let broker = InMemoryBroker::new();
    let settings = PublisherSettings::default();
    let resolver = TopicResolver::builder(&settings)
        .mapping(stride_events::TopicMapping::defaults())
        .map_family("WidgetEvent", "inventory-events")
        .register_kinds(DomainEvent::KINDS)
        .register_kind(widget::WIDGET_CREATED)
        .build()
        .unwrap();
    let publisher = EventPublisher::with_resolver(
        broker.clone(),
        resolver,
        &settings,
        tokio::runtime::Handle::current(),
    )
    .unwrap();

    let receipt = publisher.publish(&WidgetCreated::new("w1")).await.unwrap();
    assert_eq!(receipt.topic, "stride.local.inventory-events");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_publishers_do_not_interfere() {
    let broker = InMemoryBroker::new();
    let publisher = publisher(&broker, &PublisherSettings::default());

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let publisher = publisher.clone();
            tokio::spawn(async move { publisher.publish(&user_created()).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let mut offsets: Vec<i64> = broker.records().iter().map(|r| r.offset).collect();
    offsets.sort();
    assert_eq!(offsets, (0..16).collect::<Vec<_>>());
}
