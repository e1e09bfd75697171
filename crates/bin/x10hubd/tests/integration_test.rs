//! End-to-end tests driving the bridge through the virtual transport.

use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;

use x10hub_app::controller::{BridgeConfig, BridgeController, BridgeHandle};
use x10hub_domain::address::{DeviceId, HouseCode, UnitCode, X10Address};
use x10hub_domain::module::ModuleDescriptor;
use x10hub_domain::property::{DimDirection, PropertyName, PropertyValue};
use x10hub_domain::status::{StatusEvent, X10Function};
use x10hub_transport_virtual::{IssuedCommand, VirtualPowerLine};

fn module(house: char, unit: u8, module_type: &str) -> ModuleDescriptor {
    ModuleDescriptor {
        house_code: HouseCode::new(house).unwrap(),
        unit_code: UnitCode::new(unit).unwrap(),
        module_type: module_type.to_string(),
    }
}

fn addr(s: &str) -> X10Address {
    s.parse().unwrap()
}

fn id(s: &str) -> DeviceId {
    addr(s).device_id()
}

async fn bridge_with(modules: Vec<ModuleDescriptor>) -> (VirtualPowerLine, BridgeHandle) {
    let (transport, events) = VirtualPowerLine::new();
    let config = BridgeConfig {
        device_path: "/dev/virtual".to_string(),
        clock_resync_interval: Duration::from_secs(3600),
    };
    let (controller, handle) =
        BridgeController::start(transport.clone(), events, modules, config)
            .await
            .unwrap();
    tokio::spawn(controller.run());
    (transport, handle)
}

async fn recv_notification(
    rx: &mut tokio::sync::broadcast::Receiver<x10hub_app::notifications::PropertyChanged>,
) -> x10hub_app::notifications::PropertyChanged {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("notification expected")
        .unwrap()
}

#[tokio::test]
async fn should_turn_on_switch_with_single_command_and_notification() {
    let (transport, bridge) = bridge_with(vec![module('A', 2, "On/Off Switch")]).await;
    let mut notifications = bridge.subscribe();

    let resolved = bridge
        .set_property(id("A2"), PropertyName::On, PropertyValue::Bool(true))
        .await
        .unwrap();
    assert_eq!(resolved, PropertyValue::Bool(true));

    assert_eq!(
        transport.issued(),
        vec![IssuedCommand::TurnOn(vec![addr("A2")])]
    );

    let notification = recv_notification(&mut notifications).await;
    assert_eq!(notification.device_id, id("A2"));
    assert_eq!(notification.property, PropertyName::On);
    assert!(matches!(notifications.try_recv(), Err(TryRecvError::Empty)));

    let device = bridge.device(id("A2")).await.unwrap().unwrap();
    assert_eq!(
        device.property(PropertyName::On).unwrap().value(),
        PropertyValue::Bool(true)
    );
}

#[tokio::test]
async fn should_dim_lit_dimmer_by_computed_steps() {
    let (transport, bridge) = bridge_with(vec![module('B', 5, "Dimmer Switch")]).await;

    bridge
        .set_property(id("B5"), PropertyName::On, PropertyValue::Bool(true))
        .await
        .unwrap();
    transport.clear_issued();

    // Level starts at 100; writing 50 is an 11-step dim.
    bridge
        .set_property(id("B5"), PropertyName::Level, PropertyValue::Percent(50))
        .await
        .unwrap();

    assert_eq!(
        transport.issued(),
        vec![IssuedCommand::Dim(vec![addr("B5")], 11)]
    );

    let device = bridge.device(id("B5")).await.unwrap().unwrap();
    let adjust = device.property(PropertyName::Level).unwrap().adjust().unwrap();
    assert_eq!(adjust.direction, DimDirection::Dim);
    assert_eq!(adjust.amount, 11);
}

#[tokio::test]
async fn should_compensate_dim_level_when_turning_on() {
    let (transport, bridge) = bridge_with(vec![module('C', 3, "Lamp Module")]).await;

    bridge
        .set_property(id("C3"), PropertyName::Level, PropertyValue::Percent(50))
        .await
        .unwrap();
    transport.clear_issued();

    bridge
        .set_property(id("C3"), PropertyName::On, PropertyValue::Bool(true))
        .await
        .unwrap();

    assert_eq!(
        transport.issued(),
        vec![
            IssuedCommand::TurnOn(vec![addr("C3")]),
            IssuedCommand::Dim(vec![addr("C3")], 11),
        ]
    );
}

#[tokio::test]
async fn should_record_level_write_while_off_without_commands() {
    let (transport, bridge) = bridge_with(vec![module('B', 5, "Dimmer Switch")]).await;
    let mut notifications = bridge.subscribe();

    bridge
        .set_property(id("B5"), PropertyName::Level, PropertyValue::Percent(30))
        .await
        .unwrap();

    assert!(transport.issued().is_empty());
    // The write still notifies (outbound path is fire-and-forget).
    let notification = recv_notification(&mut notifications).await;
    assert_eq!(notification.value, PropertyValue::Percent(30));
}

#[tokio::test]
async fn should_apply_inbound_bright_and_notify_once() {
    let (transport, bridge) = bridge_with(vec![module('B', 5, "Dimmer Switch")]).await;

    bridge
        .set_property(id("B5"), PropertyName::Level, PropertyValue::Percent(40))
        .await
        .unwrap();
    transport.clear_issued();
    let mut notifications = bridge.subscribe();

    transport
        .inject_status(StatusEvent {
            function: X10Function::Bright,
            units: vec![addr("B5")],
            magnitude: 5,
        })
        .await
        .unwrap();

    let notification = recv_notification(&mut notifications).await;
    assert_eq!(notification.property, PropertyName::Level);
    assert_eq!(notification.value, PropertyValue::Percent(45));

    // No command must come back out of an inbound update.
    assert!(transport.issued().is_empty());
}

#[tokio::test]
async fn should_suppress_notification_for_clamped_noop_update() {
    let (transport, bridge) = bridge_with(vec![module('B', 5, "Dimmer Switch")]).await;
    let mut notifications = bridge.subscribe();

    // Level is already 100; BRIGHT clamps back to 100 — no change, no noise.
    transport
        .inject_status(StatusEvent {
            function: X10Function::Bright,
            units: vec![addr("B5")],
            magnitude: 5,
        })
        .await
        .unwrap();

    // Give the dispatch loop a moment, then confirm silence.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(matches!(notifications.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn should_ignore_unrecognized_status_function() {
    let (transport, bridge) = bridge_with(vec![module('A', 2, "On/Off Switch")]).await;
    let mut notifications = bridge.subscribe();

    transport
        .inject_status(StatusEvent {
            function: X10Function::Unrecognized("ALL_LIGHTS_ON".to_string()),
            units: vec![addr("A2")],
            magnitude: 0,
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(matches!(notifications.try_recv(), Err(TryRecvError::Empty)));

    let device = bridge.device(id("A2")).await.unwrap().unwrap();
    assert_eq!(
        device.property(PropertyName::On).unwrap().value(),
        PropertyValue::Bool(false)
    );
}

#[tokio::test]
async fn should_skip_status_for_unmodelled_units() {
    let (transport, bridge) = bridge_with(vec![module('A', 2, "On/Off Switch")]).await;
    let mut notifications = bridge.subscribe();

    // C9 is not modelled locally; only A2 produces a notification.
    transport
        .inject_status(StatusEvent {
            function: X10Function::On,
            units: vec![addr("C9"), addr("A2")],
            magnitude: 0,
        })
        .await
        .unwrap();

    let notification = recv_notification(&mut notifications).await;
    assert_eq!(notification.device_id, id("A2"));
    assert_eq!(notification.value, PropertyValue::Bool(true));
    assert!(matches!(notifications.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn should_update_sensor_from_line_without_commands() {
    let (transport, bridge) = bridge_with(vec![module('D', 4, "On/Off Sensor")]).await;
    let mut notifications = bridge.subscribe();

    transport
        .inject_status(StatusEvent {
            function: X10Function::On,
            units: vec![addr("D4")],
            magnitude: 0,
        })
        .await
        .unwrap();

    let notification = recv_notification(&mut notifications).await;
    assert_eq!(notification.value, PropertyValue::Bool(true));
    assert!(transport.issued().is_empty());
}

#[tokio::test]
async fn should_add_no_duplicates_on_pairing_rescan() {
    let (_transport, bridge) = bridge_with(vec![
        module('A', 2, "On/Off Switch"),
        module('B', 5, "Dimmer Switch"),
    ])
    .await;

    let added = bridge.start_pairing().await.unwrap();
    assert_eq!(added, 0);
    assert_eq!(bridge.devices().await.unwrap().len(), 2);
}

#[tokio::test]
async fn should_shut_down_in_order_on_unload() {
    let (transport, bridge) = bridge_with(vec![module('A', 2, "On/Off Switch")]).await;

    bridge.unload().await.unwrap();

    assert!(!transport.is_running());
    // The dispatch loop is gone; the handle reports it.
    assert!(bridge.devices().await.is_err());
}
