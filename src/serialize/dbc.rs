//! DBC text writer, grounded on the shape of the teacher's `dbc/encode.rs`
//! (one method per statement kind, emitted in the DBC's canonical section
//! order: `VERSION`, `BU_`, `BO_`/`SG_`, `CM_`, `BA_`, `VAL_`).

use std::fmt::Write as _;

use crate::attribute::AttributeValue;
use crate::byte_order::ByteOrder;
use crate::database::Database;
use crate::message::Message;
use crate::signal::Signal;

/// Emit `database` as DBC text.
pub fn write(database: &Database) -> String {
    let mut out = String::new();
    writeln!(out, "VERSION \"{}\"", database.version().unwrap_or("")).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "NS_ :").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "BS_:").unwrap();
    writeln!(out).unwrap();

    let node_names: Vec<&str> = database.nodes().iter().map(|n| n.name()).collect();
    writeln!(out, "BU_: {}", node_names.join(" ")).unwrap();
    writeln!(out).unwrap();

    for message in database.messages() {
        write_message(&mut out, message);
        writeln!(out).unwrap();
    }

    for message in database.messages() {
        if let Some(comment) = message.comment() {
            writeln!(out, "CM_ BO_ {} \"{comment}\";", message.frame_id()).unwrap();
        }
        for signal in message.signals() {
            if let Some(comment) = signal.comment() {
                writeln!(
                    out,
                    "CM_ SG_ {} {} \"{comment}\";",
                    message.frame_id(),
                    signal.name()
                )
                .unwrap();
            }
        }
    }

    for message in database.messages() {
        for (attr_name, value) in message.attributes() {
            write_attribute_value(&mut out, message.frame_id(), attr_name, value);
        }
    }

    for message in database.messages() {
        for signal in message.signals() {
            if let Some(choices) = signal.choices() {
                write_value_table(&mut out, message.frame_id(), signal, choices);
            }
        }
    }

    out
}

fn write_message(out: &mut String, message: &Message) {
    let frame_id = if message.is_extended_frame() {
        message.frame_id() | 0x8000_0000
    } else {
        message.frame_id()
    };
    let sender = message.senders().first().map(String::as_str).unwrap_or("Vector__XXX");
    writeln!(
        out,
        "BO_ {frame_id} {}: {} {sender}",
        message.name(),
        message.length_bytes()
    )
    .unwrap();
    for signal in message.signals() {
        write_signal(out, signal);
    }
}

fn write_signal(out: &mut String, signal: &Signal) {
    let marker = if signal.is_multiplexer() {
        " M".to_string()
    } else if let Some(id) = signal.multiplexer_id() {
        format!(" m{id}")
    } else {
        String::new()
    };
    let order = match signal.byte_order() {
        ByteOrder::LittleEndian => '1',
        ByteOrder::BigEndian => '0',
    };
    let sign = if signal.is_signed() { '-' } else { '+' };
    let receivers = if signal.receivers().is_empty() {
        "Vector__XXX".to_string()
    } else {
        signal.receivers().join(",")
    };
    writeln!(
        out,
        " SG_ {}{marker} : {}|{}@{order}{sign} ({},{}) [{}|{}] \"{}\" {receivers}",
        signal.name(),
        signal.start_bit(),
        signal.length_bits(),
        signal.scale(),
        signal.offset(),
        signal.minimum().unwrap_or(0.0),
        signal.maximum().unwrap_or(0.0),
        signal.unit().unwrap_or(""),
    )
    .unwrap();
}

fn write_attribute_value(out: &mut String, frame_id: u32, attr_name: &str, value: &AttributeValue) {
    match value {
        AttributeValue::Int(v) => writeln!(out, "BA_ \"{attr_name}\" BO_ {frame_id} {v};").unwrap(),
        AttributeValue::Float(v) => writeln!(out, "BA_ \"{attr_name}\" BO_ {frame_id} {v};").unwrap(),
        AttributeValue::String(v) => {
            writeln!(out, "BA_ \"{attr_name}\" BO_ {frame_id} \"{v}\";").unwrap()
        }
    }
}

fn write_value_table(
    out: &mut String,
    frame_id: u32,
    signal: &Signal,
    choices: &std::collections::BTreeMap<i64, String>,
) {
    write!(out, "VAL_ {frame_id} {}", signal.name()).unwrap();
    for (raw, label) in choices {
        write!(out, " {raw} \"{label}\"").unwrap();
    }
    writeln!(out, " ;").unwrap();
}
