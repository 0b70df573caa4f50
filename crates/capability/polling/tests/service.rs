use std::sync::Arc;

use domain::{AddressRegion, DataPointDefinition, PointValue, ScalarKind, TypedTag, ValueKind};
use plc_codec::{ScalarValue, TagValue};
use plc_polling::{DataPointService, PollingError};
use plc_protocol::{GateConfig, MemoryDevice, MemoryTransport, TransportGate};
use plc_storage::{CacheStore, InMemoryCacheStore, InMemoryRegistryStore};

struct Harness {
    device: MemoryDevice,
    cache: Arc<InMemoryCacheStore>,
    service: DataPointService,
}

fn harness() -> Harness {
    let device = MemoryDevice::new();
    let cache = Arc::new(InMemoryCacheStore::new());
    let gate = Arc::new(TransportGate::new(
        Box::new(MemoryTransport::new(device.clone())),
        GateConfig::default(),
    ));
    let service = DataPointService::new(
        Arc::new(InMemoryRegistryStore::new()),
        cache.clone(),
        gate,
        100,
    );
    Harness {
        device,
        cache,
        service,
    }
}

fn point(key: &str, kind: ValueKind, address: u16, length: u16) -> DataPointDefinition {
    DataPointDefinition {
        key: key.to_string(),
        region: AddressRegion::D,
        address,
        length,
        bit_position: (kind == ValueKind::Bool).then_some(0),
        value_kind: kind,
        poll_interval_ms: 500,
        description: None,
    }
}

#[tokio::test]
async fn interval_below_floor_is_rejected() {
    let h = harness();
    let mut definition = point("temp", ValueKind::NumberArray, 100, 2);
    definition.poll_interval_ms = 99;
    let err = h
        .service
        .register_data_point(definition)
        .await
        .expect_err("below floor");
    assert!(matches!(err, PollingError::Validation(_)));
    assert!(h.service.list_data_points().await.expect("list").is_empty());
}

#[tokio::test]
async fn duplicate_key_is_a_validation_error() {
    let h = harness();
    h.service
        .register_data_point(point("temp", ValueKind::NumberArray, 100, 2))
        .await
        .expect("register");
    let err = h
        .service
        .register_data_point(point("temp", ValueKind::Text, 200, 4))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, PollingError::Validation(_)));
}

#[tokio::test]
async fn unknown_keys_are_not_found() {
    let h = harness();
    assert!(matches!(
        h.service.unregister_data_point("ghost").await,
        Err(PollingError::NotFound(_))
    ));
    assert!(matches!(
        h.service.read_cached_value("ghost").await,
        Err(PollingError::NotFound(_))
    ));
    assert!(matches!(
        h.service
            .write_value("ghost", PointValue::Words(vec![1]))
            .await,
        Err(PollingError::NotFound(_))
    ));
}

#[tokio::test]
async fn bool_write_to_number_array_leaves_cache_unchanged() {
    let h = harness();
    h.service
        .register_data_point(point("temp", ValueKind::NumberArray, 100, 2))
        .await
        .expect("register");
    let previous = h
        .service
        .write_value("temp", PointValue::Words(vec![10, 20]))
        .await
        .expect("write words");

    let err = h
        .service
        .write_value("temp", PointValue::Bool(true))
        .await
        .expect_err("kind mismatch");
    assert!(matches!(err, PollingError::Validation(_)));
    assert_eq!(
        h.service.read_cached_value("temp").await.expect("cached"),
        previous
    );
    assert_eq!(h.device.words(AddressRegion::D, 100, 2), vec![10, 20]);
}

#[tokio::test]
async fn failed_write_keeps_previous_entry() {
    let h = harness();
    h.service
        .register_data_point(point("temp", ValueKind::NumberArray, 100, 2))
        .await
        .expect("register");
    let previous = h
        .service
        .write_value("temp", PointValue::Words(vec![1, 2]))
        .await
        .expect("write");

    h.device.fail_next(1);
    let err = h
        .service
        .write_value("temp", PointValue::Words(vec![3, 4]))
        .await
        .expect_err("transport failure");
    assert!(matches!(err, PollingError::Transport(_)));
    assert_eq!(
        h.service.read_cached_value("temp").await.expect("cached"),
        previous
    );
    assert_eq!(h.device.words(AddressRegion::D, 100, 2), vec![1, 2]);
}

#[tokio::test]
async fn bool_write_uses_single_bit() {
    let h = harness();
    let mut definition = point("pump", ValueKind::Bool, 40, 1);
    definition.bit_position = Some(4);
    h.service
        .register_data_point(definition)
        .await
        .expect("register");
    h.device.set_words(AddressRegion::D, 40, &[0b1000_0001]);

    let entry = h
        .service
        .write_value("pump", PointValue::Bool(true))
        .await
        .expect("write bit");
    assert_eq!(entry.value, PointValue::Bool(true));
    assert_eq!(h.device.words(AddressRegion::D, 40, 1), vec![0b1001_0001]);
}

#[tokio::test]
async fn text_write_validates_length_and_pads() {
    let h = harness();
    h.service
        .register_data_point(point("label", ValueKind::Text, 500, 3))
        .await
        .expect("register");
    h.device.set_words(AddressRegion::D, 500, &[0x5858, 0x5858, 0x5858]);

    let err = h
        .service
        .write_value("label", PointValue::Text("TOOLONG".to_string()))
        .await
        .expect_err("too long");
    assert!(matches!(err, PollingError::Validation(_)));
    assert_eq!(h.cache.len(), 0);

    h.service
        .write_value("label", PointValue::Text("ABC".to_string()))
        .await
        .expect("write text");
    assert_eq!(
        h.device.words(AddressRegion::D, 500, 3),
        vec![0x4241, 0x0043, 0]
    );
    let cached = h.service.read_cached_value("label").await.expect("cached");
    assert_eq!(cached.value, PointValue::Text("ABC".to_string()));
}

#[tokio::test]
async fn tags_project_from_cached_block() {
    let h = harness();
    h.service
        .register_data_point(point("block", ValueKind::NumberArray, 0, 4))
        .await
        .expect("register");
    h.service
        .write_value("block", PointValue::Words(vec![0xFFFE, 0x0000, 0x0001, 0b100]))
        .await
        .expect("seed");

    let tags = vec![
        TypedTag::new("speed", 0, ScalarKind::Int16),
        TypedTag::new("total", 1, ScalarKind::Int32),
        TypedTag::bit("alarm", 3, 2),
        TypedTag::new("beyond", 3, ScalarKind::Real32),
    ];
    let readings = h.service.read_tags("block", &tags).await.expect("tags");
    assert_eq!(readings[0].value, TagValue::Value(ScalarValue::Int16(-2)));
    assert_eq!(readings[1].value, TagValue::Value(ScalarValue::Int32(65_536)));
    assert_eq!(readings[2].value, TagValue::Value(ScalarValue::Bool(true)));
    assert_eq!(readings[3].value, TagValue::NotAvailable);
}

#[tokio::test]
async fn tag_write_preserves_sibling_words() {
    let h = harness();
    h.service
        .register_data_point(point("block", ValueKind::NumberArray, 0, 4))
        .await
        .expect("register");
    // 设备上的值比缓存新，读改写必须以设备为准
    h.device.set_words(AddressRegion::D, 0, &[7, 0, 0, 0b1]);

    let entry = h
        .service
        .write_tag("block", &TypedTag::new("total", 1, ScalarKind::Int32), ScalarValue::Int32(-1))
        .await
        .expect("write tag");
    assert_eq!(entry.value, PointValue::Words(vec![7, 0xFFFF, 0xFFFF, 0b1]));
    assert_eq!(
        h.device.words(AddressRegion::D, 0, 4),
        vec![7, 0xFFFF, 0xFFFF, 0b1]
    );

    h.service
        .write_tag("block", &TypedTag::bit("alarm", 3, 3), ScalarValue::Bool(true))
        .await
        .expect("write bit tag");
    assert_eq!(h.device.words(AddressRegion::D, 3, 1), vec![0b1001]);

    let cached = h.cache.find_one("block").await.expect("find").expect("entry");
    assert_eq!(cached.value, PointValue::Words(vec![7, 0xFFFF, 0xFFFF, 0b1001]));
}

#[tokio::test]
async fn tag_write_rejects_mismatch_before_touching_device() {
    let h = harness();
    h.service
        .register_data_point(point("block", ValueKind::NumberArray, 0, 2))
        .await
        .expect("register");
    h.service
        .register_data_point(point("label", ValueKind::Text, 10, 2))
        .await
        .expect("register");

    let before = h.device.operations();
    let mismatch = h
        .service
        .write_tag("block", &TypedTag::new("speed", 0, ScalarKind::Int16), ScalarValue::Bool(true))
        .await;
    assert!(matches!(mismatch, Err(PollingError::Validation(_))));
    let overflow = h
        .service
        .write_tag("block", &TypedTag::new("total", 1, ScalarKind::Int32), ScalarValue::Int32(1))
        .await;
    assert!(matches!(overflow, Err(PollingError::Validation(_))));
    let wrong_kind = h
        .service
        .write_tag("label", &TypedTag::new("speed", 0, ScalarKind::Int16), ScalarValue::Int16(1))
        .await;
    assert!(matches!(wrong_kind, Err(PollingError::Validation(_))));
    assert_eq!(h.device.operations(), before);
}

#[tokio::test]
async fn malformed_tags_are_rejected_without_device_io() {
    let h = harness();
    h.service
        .register_data_point(point("block", ValueKind::NumberArray, 0, 4))
        .await
        .expect("register");
    let before = h.device.operations();

    let mut narrow = TypedTag::new("speed", 1, ScalarKind::Int16);
    narrow.word_length = 0;
    let result = h
        .service
        .write_tag("block", &narrow, ScalarValue::Int16(5))
        .await;
    assert!(matches!(result, Err(PollingError::Validation(_))));

    let result = h
        .service
        .write_tag(
            "block",
            &TypedTag::new("flow", 0, ScalarKind::Real32),
            ScalarValue::Real32(1e40),
        )
        .await;
    assert!(matches!(result, Err(PollingError::Validation(_))));

    assert_eq!(h.device.operations(), before);
    assert!(h.cache.is_empty());
}
