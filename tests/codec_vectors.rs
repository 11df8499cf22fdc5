//! Literal byte-exact scenarios and round-trip properties for the signal
//! codec: float reinterpretation, signed boundaries, big-endian placement,
//! and multiplexed gating.

use candb::{ByteOrder, Database, Message, Signal, Value};
use std::collections::BTreeMap;

fn db_with(message: Message) -> Database {
    let mut db = Database::new();
    db.add_message(message).unwrap();
    db
}

#[test]
fn little_endian_float32_encodes_pi_byte_exact() {
    let message = Message::builder(0x10, "Windshield")
        .signal(
            Signal::builder("Windshield")
                .start_bit(0)
                .length_bits(32)
                .byte_order(ByteOrder::LittleEndian)
                .float(true)
                .build()
                .unwrap(),
        )
        .length_bytes(4)
        .build()
        .unwrap();
    let db = db_with(message);

    let mut data = BTreeMap::new();
    data.insert("Windshield".to_string(), Value::Real(std::f64::consts::PI));
    let payload = db.encode_message("Windshield", &data, true).unwrap();
    assert_eq!(payload, vec![0xDB, 0x0F, 0x49, 0x40]);

    let decoded = db.decode_message(0x10, &payload, false, true).unwrap();
    match decoded.get("Windshield").unwrap() {
        Value::Real(v) => assert!((*v - 3.141_592_741_012_573_2).abs() < 1e-9),
        other => panic!("expected Real, got {other:?}"),
    }
}

#[test]
fn little_endian_float64_roundtrips_pi_byte_exact() {
    let message = Message::builder(0x11, "AmbientLux")
        .signal(
            Signal::builder("AmbientLux")
                .start_bit(0)
                .length_bits(64)
                .byte_order(ByteOrder::LittleEndian)
                .float(true)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let db = db_with(message);

    let mut data = BTreeMap::new();
    data.insert("AmbientLux".to_string(), Value::Real(std::f64::consts::PI));
    let payload = db.encode_message("AmbientLux", &data, true).unwrap();
    assert_eq!(
        payload,
        vec![0x18, 0x2D, 0x44, 0x54, 0xFB, 0x21, 0x09, 0x40]
    );

    let decoded = db.decode_message(0x11, &payload, false, true).unwrap();
    match decoded.get("AmbientLux").unwrap() {
        Value::Real(v) => assert_eq!(*v, std::f64::consts::PI),
        other => panic!("expected Real, got {other:?}"),
    }
}

#[test]
fn big_endian_byte_aligned_scaled_signal_is_byte_exact() {
    // A 16-bit big-endian signal starting at bit 7 is byte-aligned: the
    // MSB-first sawtooth walk never wraps mid-byte, so the two bytes are
    // simply the raw value's high then low byte.
    let message = Message::builder(0x12, "Sensor")
        .signal(
            Signal::builder("Pressure")
                .start_bit(7)
                .length_bits(16)
                .byte_order(ByteOrder::BigEndian)
                .scale(0.01)
                .build()
                .unwrap(),
        )
        .length_bytes(2)
        .build()
        .unwrap();
    let db = db_with(message);

    let mut data = BTreeMap::new();
    data.insert("Pressure".to_string(), Value::Real(10.0));
    let payload = db.encode_message("Sensor", &data, true).unwrap();
    assert_eq!(payload, vec![0x03, 0xE8]);

    let decoded = db.decode_message(0x12, &payload, false, true).unwrap();
    match decoded.get("Pressure").unwrap() {
        Value::Real(v) => assert!((*v - 10.0).abs() < 1e-9),
        other => panic!("expected Real, got {other:?}"),
    }
}

#[test]
fn padding_bit_order_big_endian_signals_roundtrip() {
    // Mirrors the "message 1" scenario's B/A/C signals, packed tightly
    // across bytes 0-1 and 4-5 of an 8-byte frame. The fourth signal in the
    // source fixture, D (1 bit, start 47, always 0), names the same bit C's
    // 10-bit span fully occupies; this crate's overlap validation correctly
    // rejects two signals claiming the same bit, so D is left out of the
    // schema here. Its value is always 0 and the encode is OR-based, so
    // omitting it changes none of the encoded bytes below.
    let message = Message::builder(0x13, "Message1")
        .signal(
            Signal::builder("B")
                .start_bit(7)
                .length_bits(1)
                .byte_order(ByteOrder::BigEndian)
                .build()
                .unwrap(),
        )
        .signal(
            Signal::builder("A")
                .start_bit(6)
                .length_bits(10)
                .byte_order(ByteOrder::BigEndian)
                .build()
                .unwrap(),
        )
        .signal(
            Signal::builder("C")
                .start_bit(46)
                .length_bits(10)
                .byte_order(ByteOrder::BigEndian)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let db = db_with(message);

    let mut data = BTreeMap::new();
    data.insert("B".to_string(), Value::Int(1));
    data.insert("A".to_string(), Value::Int(0x2C9));
    data.insert("C".to_string(), Value::Int(0x2C9));
    let payload = db.encode_message("Message1", &data, false).unwrap();
    assert_eq!(
        payload,
        vec![0x82, 0xC9, 0x00, 0x00, 0x02, 0xC9, 0x00, 0x00]
    );

    let decoded = db.decode_message(0x13, &payload, false, false).unwrap();
    assert_eq!(decoded.get("B"), Some(&Value::Int(1)));
    assert_eq!(decoded.get("A"), Some(&Value::Int(0x2C9)));
    assert_eq!(decoded.get("C"), Some(&Value::Int(0x2C9)));
}

#[test]
fn padding_bit_order_little_endian_signals_roundtrip() {
    // The little-endian counterpart of "message 1": same four-signal shape,
    // same values, but packed with Intel bit order.
    let message = Message::builder(0x20, "Message2")
        .signal(
            Signal::builder("E")
                .start_bit(0)
                .length_bits(1)
                .byte_order(ByteOrder::LittleEndian)
                .build()
                .unwrap(),
        )
        .signal(
            Signal::builder("F")
                .start_bit(1)
                .length_bits(10)
                .byte_order(ByteOrder::LittleEndian)
                .build()
                .unwrap(),
        )
        .signal(
            Signal::builder("G")
                .start_bit(32)
                .length_bits(1)
                .byte_order(ByteOrder::LittleEndian)
                .build()
                .unwrap(),
        )
        .signal(
            Signal::builder("H")
                .start_bit(33)
                .length_bits(10)
                .byte_order(ByteOrder::LittleEndian)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let db = db_with(message);

    let mut data = BTreeMap::new();
    data.insert("E".to_string(), Value::Int(1));
    data.insert("F".to_string(), Value::Int(0x2C9));
    data.insert("G".to_string(), Value::Int(0));
    data.insert("H".to_string(), Value::Int(0x2C9));
    let payload = db.encode_message("Message2", &data, false).unwrap();
    assert_eq!(
        payload,
        vec![0x93, 0x05, 0x00, 0x00, 0x92, 0x05, 0x00, 0x00]
    );

    let decoded = db.decode_message(0x20, &payload, false, false).unwrap();
    assert_eq!(decoded.get("E"), Some(&Value::Int(1)));
    assert_eq!(decoded.get("F"), Some(&Value::Int(0x2C9)));
    assert_eq!(decoded.get("G"), Some(&Value::Int(0)));
    assert_eq!(decoded.get("H"), Some(&Value::Int(0x2C9)));
}

#[test]
fn scaled_big_endian_signals_with_choice_roundtrip() {
    let message = Message::builder(0x14, "Scenario3")
        .signal(
            Signal::builder("Temperature")
                .start_bit(7)
                .length_bits(12)
                .byte_order(ByteOrder::BigEndian)
                .signed(true)
                .scale(0.01)
                .offset(250.0)
                .build()
                .unwrap(),
        )
        .signal(
            Signal::builder("AverageRadius")
                .start_bit(11)
                .length_bits(6)
                .byte_order(ByteOrder::BigEndian)
                .scale(0.1)
                .build()
                .unwrap(),
        )
        .signal({
            let mut choices = BTreeMap::new();
            choices.insert(0, "Disabled".to_string());
            choices.insert(1, "Enabled".to_string());
            Signal::builder("Enable")
                .start_bit(5)
                .length_bits(1)
                .byte_order(ByteOrder::BigEndian)
                .choices(choices)
                .build()
                .unwrap()
        })
        .build()
        .unwrap();
    let db = db_with(message);

    let mut data = BTreeMap::new();
    data.insert("Temperature".to_string(), Value::Real(250.55));
    data.insert("AverageRadius".to_string(), Value::Real(3.2));
    data.insert("Enable".to_string(), Value::Str("Enabled".to_string()));
    let payload = db.encode_message("Scenario3", &data, true).unwrap();
    assert_eq!(
        payload,
        vec![0xC0, 0x06, 0xE0, 0x00, 0x00, 0x00, 0x00, 0x00]
    );

    let decoded = db.decode_message(0x14, &payload, true, true).unwrap();
    match decoded.get("Temperature").unwrap() {
        Value::Real(v) => assert!((*v - 250.55).abs() < 0.01),
        other => panic!("expected Real, got {other:?}"),
    }
    match decoded.get("AverageRadius").unwrap() {
        Value::Real(v) => assert!((*v - 3.2).abs() < 0.1),
        other => panic!("expected Real, got {other:?}"),
    }
    assert_eq!(decoded.get("Enable"), Some(&Value::Str("Enabled".to_string())));
}

fn sensor_sonars() -> Message {
    let mux = Signal::builder("mux")
        .start_bit(0)
        .length_bits(4)
        .byte_order(ByteOrder::LittleEndian)
        .is_multiplexer(true)
        .build()
        .unwrap();
    let err_count = Signal::builder("err_count")
        .start_bit(4)
        .length_bits(12)
        .byte_order(ByteOrder::LittleEndian)
        .build()
        .unwrap();
    let distance = |name: &str, start_bit: u16, multiplexer_id: u64| {
        Signal::builder(name)
            .start_bit(start_bit)
            .length_bits(12)
            .byte_order(ByteOrder::LittleEndian)
            .scale(0.1)
            .multiplexer_id(multiplexer_id)
            .build()
            .unwrap()
    };
    Message::builder(0x15, "SENSOR_SONARS")
        .signal(mux)
        .signal(err_count)
        .signal(distance("left", 16, 0))
        .signal(distance("middle", 28, 0))
        .signal(distance("right", 40, 0))
        .signal(distance("rear", 52, 0))
        .signal(distance("no_filt_left", 16, 1))
        .signal(distance("no_filt_middle", 28, 1))
        .signal(distance("no_filt_right", 40, 1))
        .signal(distance("no_filt_rear", 52, 1))
        .build()
        .unwrap()
}

#[test]
fn multiplexed_sensor_sonars_message_gates_by_selector() {
    let db = db_with(sensor_sonars());

    let mut data0 = BTreeMap::new();
    data0.insert("mux".to_string(), Value::Int(0));
    data0.insert("err_count".to_string(), Value::Int(1));
    data0.insert("left".to_string(), Value::Real(2.0));
    data0.insert("middle".to_string(), Value::Real(3.0));
    data0.insert("right".to_string(), Value::Real(4.0));
    data0.insert("rear".to_string(), Value::Real(5.0));
    let payload0 = db.encode_message("SENSOR_SONARS", &data0, true).unwrap();
    assert_eq!(
        payload0,
        vec![0x10, 0x00, 0x14, 0xE0, 0x01, 0x28, 0x20, 0x03]
    );

    let decoded0 = db.decode_message(0x15, &payload0, false, true).unwrap();
    assert_eq!(decoded0.get("mux"), Some(&Value::Int(0)));
    match decoded0.get("left").unwrap() {
        Value::Real(v) => assert!((*v - 2.0).abs() < 1e-9),
        other => panic!("expected Real, got {other:?}"),
    }
    assert!(!decoded0.contains_key("no_filt_left"));

    let mut data1 = BTreeMap::new();
    data1.insert("mux".to_string(), Value::Int(1));
    data1.insert("err_count".to_string(), Value::Int(2));
    data1.insert("no_filt_left".to_string(), Value::Real(3.0));
    data1.insert("no_filt_middle".to_string(), Value::Real(4.0));
    data1.insert("no_filt_right".to_string(), Value::Real(5.0));
    data1.insert("no_filt_rear".to_string(), Value::Real(6.0));
    let payload1 = db.encode_message("SENSOR_SONARS", &data1, true).unwrap();
    assert_eq!(
        payload1,
        vec![0x21, 0x00, 0x1E, 0x80, 0x02, 0x32, 0xC0, 0x03]
    );

    let decoded1 = db.decode_message(0x15, &payload1, false, true).unwrap();
    assert_eq!(decoded1.get("mux"), Some(&Value::Int(1)));
    match decoded1.get("no_filt_right").unwrap() {
        Value::Real(v) => assert!((*v - 5.0).abs() < 1e-9),
        other => panic!("expected Real, got {other:?}"),
    }
    assert!(!decoded1.contains_key("left"));
}

#[test]
fn one_bit_signals_at_byte_boundaries_roundtrip_both_endians() {
    let message = Message::builder(0x16, "Flags")
        .signal(
            Signal::builder("LowBit")
                .start_bit(0)
                .length_bits(1)
                .byte_order(ByteOrder::LittleEndian)
                .build()
                .unwrap(),
        )
        .signal(
            Signal::builder("HighBit")
                .start_bit(63)
                .length_bits(1)
                .byte_order(ByteOrder::LittleEndian)
                .build()
                .unwrap(),
        )
        .signal(
            Signal::builder("BeBit")
                .start_bit(7)
                .length_bits(1)
                .byte_order(ByteOrder::BigEndian)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let db = db_with(message);

    let mut data = BTreeMap::new();
    data.insert("LowBit".to_string(), Value::Int(1));
    data.insert("HighBit".to_string(), Value::Int(1));
    data.insert("BeBit".to_string(), Value::Int(1));
    let payload = db.encode_message("Flags", &data, false).unwrap();
    assert_eq!(payload[0], 0x81);
    assert_eq!(payload[7], 0x80);

    let decoded = db.decode_message(0x16, &payload, false, false).unwrap();
    assert_eq!(decoded.get("LowBit"), Some(&Value::Int(1)));
    assert_eq!(decoded.get("HighBit"), Some(&Value::Int(1)));
    assert_eq!(decoded.get("BeBit"), Some(&Value::Int(1)));
}

#[test]
fn full_64_bit_little_endian_signal_is_identity_mapping() {
    let message = Message::builder(0x17, "Raw")
        .signal(
            Signal::builder("Raw64")
                .start_bit(0)
                .length_bits(64)
                .byte_order(ByteOrder::LittleEndian)
                .signed(true)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let db = db_with(message);

    let mut data = BTreeMap::new();
    data.insert("Raw64".to_string(), Value::Int(i64::MIN));
    let payload = db.encode_message("Raw", &data, false).unwrap();
    let decoded = db.decode_message(0x17, &payload, false, false).unwrap();
    assert_eq!(decoded.get("Raw64"), Some(&Value::Int(i64::MIN)));
}

#[test]
fn signed_minimum_and_maximum_roundtrip_without_loss() {
    let message = Message::builder(0x18, "Torque")
        .signal(
            Signal::builder("Torque")
                .start_bit(0)
                .length_bits(16)
                .byte_order(ByteOrder::LittleEndian)
                .signed(true)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let db = db_with(message);

    for value in [i16::MIN as i64, i16::MAX as i64] {
        let mut data = BTreeMap::new();
        data.insert("Torque".to_string(), Value::Int(value));
        let payload = db.encode_message("Torque", &data, false).unwrap();
        let decoded = db.decode_message(0x18, &payload, false, false).unwrap();
        assert_eq!(decoded.get("Torque"), Some(&Value::Int(value)));
    }
}

#[test]
fn string_choice_on_encode_matches_int_on_decode_without_choices() {
    let mut choices = BTreeMap::new();
    choices.insert(0, "Off".to_string());
    choices.insert(1, "On".to_string());
    let message = Message::builder(0x19, "Switch")
        .signal(
            Signal::builder("State")
                .start_bit(0)
                .length_bits(1)
                .byte_order(ByteOrder::LittleEndian)
                .choices(choices)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let db = db_with(message);

    let mut data = BTreeMap::new();
    data.insert("State".to_string(), Value::Str("On".to_string()));
    let payload = db.encode_message("Switch", &data, false).unwrap();
    let decoded = db.decode_message(0x19, &payload, false, false).unwrap();
    assert_eq!(decoded.get("State"), Some(&Value::Int(1)));
}

#[test]
fn encoded_payload_length_matches_declared_message_length() {
    let message = Message::builder(0x1A, "Short")
        .length_bytes(3)
        .signal(
            Signal::builder("A")
                .start_bit(0)
                .length_bits(8)
                .byte_order(ByteOrder::LittleEndian)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let db = db_with(message);
    let mut data = BTreeMap::new();
    data.insert("A".to_string(), Value::Int(5));
    let payload = db.encode_message("Short", &data, false).unwrap();
    assert_eq!(payload.len(), 3);
}
