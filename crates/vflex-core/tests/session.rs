use std::time::Duration;

use vflex_core::{
    GET_SERIAL_NUMBER_SEQUENCE, GET_VOLTAGE_SEQUENCE, LedState, MidiPort, SessionConfig,
    SessionError, SessionState, SimulatedDevice, TransportConfig, VFlex,
};

fn config(safe_adjust: bool) -> SessionConfig {
    SessionConfig {
        safe_adjust,
        transport: TransportConfig {
            pause: Duration::ZERO,
            drain_window: Duration::from_millis(5),
            poll_interval: Duration::from_millis(1),
        },
    }
}

fn session(device: SimulatedDevice, safe_adjust: bool) -> VFlex<SimulatedDevice> {
    VFlex::new(device, config(safe_adjust))
}

fn sent(device: &SimulatedDevice) -> Vec<[u8; 3]> {
    device
        .received()
        .iter()
        .map(|raw| [raw[0], raw[1], raw[2]])
        .collect()
}

#[test]
fn wake_up_queries_serial_then_voltage() {
    let mut vflex = session(SimulatedDevice::new("12345678", 9_000), true);
    vflex.wake_up().expect("handshake");
    assert_eq!(vflex.state(), SessionState::Ready);
    assert_eq!(vflex.serial_number().expect("serial"), "12345678");
    assert_eq!(vflex.cached().millivolts, Some(9_000));

    let expected: Vec<[u8; 3]> = GET_SERIAL_NUMBER_SEQUENCE
        .iter()
        .chain(GET_VOLTAGE_SEQUENCE.iter())
        .map(|triplet| triplet.to_bytes())
        .collect();
    assert_eq!(sent(vflex.port()), expected);
}

#[test]
fn every_operation_runs_a_fresh_handshake() {
    let mut vflex = session(SimulatedDevice::default(), true);
    vflex.get_voltage().expect("voltage");
    // Handshake (serial + voltage) followed by the voltage query itself.
    assert_eq!(vflex.port().received().len(), 3 * 4);
    vflex.get_led_state().expect("led");
    assert_eq!(vflex.port().received().len(), 6 * 4);
}

#[test]
fn set_voltage_reports_new_value() {
    let mut vflex = session(SimulatedDevice::new("12345678", 5_000), true);
    assert_eq!(vflex.set_voltage(20_000).expect("set"), 20_000);
    assert_eq!(vflex.port().millivolts(), 20_000);
    assert_eq!(vflex.get_voltage().expect("get"), 20_000);
}

#[test]
fn set_voltage_volts_rounds_input() {
    let mut vflex = session(SimulatedDevice::default(), true);
    assert_eq!(vflex.set_voltage_volts(12.014).expect("set"), 12_010);
    assert!(matches!(
        vflex.set_voltage_volts(60.0),
        Err(SessionError::VoltageInput(_))
    ));
}

#[test]
fn set_voltage_above_limit_is_refused_before_sending() {
    let mut vflex = session(SimulatedDevice::default(), true);
    let err = vflex.set_voltage(50_000).unwrap_err();
    assert!(matches!(err, SessionError::Protocol(_)));
    assert_eq!(vflex.port().millivolts(), 5_000);
}

#[test]
fn set_led_state_reads_back_new_state() {
    let mut vflex = session(SimulatedDevice::default(), true);
    assert_eq!(vflex.set_led_state(LedState::On).expect("set"), LedState::On);
    assert_eq!(vflex.port().led_state(), LedState::On);
    assert_eq!(vflex.cached().led_state, Some(LedState::On));
    assert_eq!(vflex.set_led_state(LedState::Off).expect("set"), LedState::Off);
}

#[test]
fn read_state_returns_full_snapshot() {
    let device = SimulatedDevice::new("ABCDEFGH", 15_000).with_led_state(LedState::On);
    let mut vflex = session(device, true);
    let snapshot = vflex.read_state().expect("read");
    assert_eq!(snapshot.serial_number, "ABCDEFGH");
    assert_eq!(snapshot.millivolts, 15_000);
    assert_eq!(snapshot.led_state, LedState::On);
    assert_eq!(vflex.snapshot().expect("snapshot"), snapshot);
}

#[test]
fn swapped_adapter_trips_serial_guard() {
    let mut vflex = session(SimulatedDevice::new("AAAAAAAA", 5_000), true);
    vflex.wake_up().expect("handshake");
    vflex.port_mut().set_serial_number("BBBBBBBB");

    let err = vflex.set_voltage(12_000).unwrap_err();
    match err {
        SessionError::SerialNumberMismatch { old, new } => {
            assert_eq!(old, "AAAAAAAA");
            assert_eq!(new, "BBBBBBBB");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(vflex.state(), SessionState::Unconnected);
    assert_eq!(vflex.cached().serial_number, None);
    assert_eq!(vflex.port().millivolts(), 5_000);

    // The cache was invalidated, so the next handshake adopts the new adapter.
    vflex.wake_up().expect("handshake");
    assert_eq!(vflex.serial_number().expect("serial"), "BBBBBBBB");
}

#[test]
fn external_voltage_change_trips_voltage_guard() {
    let mut vflex = session(SimulatedDevice::default(), true);
    vflex.wake_up().expect("handshake");
    vflex.port_mut().set_millivolts(9_000);

    let err = vflex.set_voltage(12_000).unwrap_err();
    assert!(matches!(
        err,
        SessionError::VoltageMismatch {
            stored: 5_000,
            current: 9_000
        }
    ));
    assert_eq!(vflex.state(), SessionState::Unconnected);
    assert_eq!(vflex.port().millivolts(), 9_000);
}

#[test]
fn unsafe_mode_skips_guards() {
    let mut vflex = session(SimulatedDevice::new("AAAAAAAA", 5_000), false);
    vflex.wake_up().expect("handshake");
    vflex.port_mut().set_serial_number("BBBBBBBB");
    vflex.port_mut().set_millivolts(9_000);
    assert_eq!(vflex.set_voltage(12_000).expect("set"), 12_000);
    assert_eq!(vflex.serial_number().expect("serial"), "BBBBBBBB");
}

#[test]
fn silent_port_fails_handshake() {
    struct SilentPort;

    impl MidiPort for SilentPort {
        fn send(&mut self, _message: &[u8]) -> Result<(), vflex_core::TransportError> {
            Ok(())
        }

        fn poll(&mut self) -> Result<Vec<Vec<u8>>, vflex_core::TransportError> {
            Ok(Vec::new())
        }
    }

    let mut vflex = VFlex::new(SilentPort, config(true));
    let err = vflex.get_voltage().unwrap_err();
    assert!(matches!(err, SessionError::Protocol(_)));
    assert_eq!(vflex.state(), SessionState::Unconnected);
}

#[test]
fn boxed_ports_work_as_sessions() {
    let port: Box<dyn MidiPort> = Box::new(SimulatedDevice::default());
    let mut vflex = VFlex::new(port, config(true));
    assert_eq!(vflex.get_voltage().expect("voltage"), 5_000);
}
