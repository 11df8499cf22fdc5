//! A DBC grammar parser.
//!
//! Grounded on the teacher's keyword-dispatch loop (`dbc/parse.rs`): walk
//! the file line by line, switch on the leading keyword, and hand each
//! statement's body to a small per-keyword parser. Rewritten against
//! `std::collections`/`String` instead of the teacher's fixed-capacity
//! `heapless::Vec` buffers, since this crate targets `std`.

use std::collections::BTreeMap;

use crate::attribute::{AttributeMap, AttributeValue};
use crate::bus::Bus;
use crate::byte_order::ByteOrder;
use crate::database::Database;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::node::Node;
use crate::signal::Signal;

struct SignalHeader {
    name: String,
    is_multiplexer: bool,
    multiplexer_id: Option<u64>,
    start_bit: u16,
    length_bits: u8,
    byte_order: ByteOrder,
    is_signed: bool,
    scale: f64,
    offset: f64,
    minimum: f64,
    maximum: f64,
    unit: String,
    receivers: Vec<String>,
}

/// Parse a complete DBC file into a [`Database`].
pub fn parse(source: &str) -> Result<Database> {
    let mut database = Database::new();
    let mut node_names: Vec<String> = Vec::new();
    let mut message_comments: BTreeMap<u32, String> = BTreeMap::new();
    let mut signal_comments: BTreeMap<(u32, String), String> = BTreeMap::new();
    let mut choices: BTreeMap<(u32, String), BTreeMap<i64, String>> = BTreeMap::new();
    let mut message_attrs: BTreeMap<u32, AttributeMap> = BTreeMap::new();

    // (frame_id, name, sender, is_extended, length_bytes, headers)
    let mut pending: Vec<(u32, String, String, bool, u8, Vec<SignalHeader>)> = Vec::new();

    let lines: Vec<&str> = source.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            i += 1;
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("VERSION") {
            let version = parse_quoted(rest.trim()).unwrap_or_default();
            database.set_version(version);
            i += 1;
        } else if let Some(rest) = trimmed.strip_prefix("BU_:") {
            for name in rest.split_whitespace() {
                node_names.push(name.to_string());
            }
            i += 1;
        } else if let Some(rest) = trimmed.strip_prefix("BO_ ") {
            let (frame_id, name, length_bytes, sender) = parse_message_header(rest)?;
            let mut headers = Vec::new();
            i += 1;
            while i < lines.len() {
                let sig_line = lines[i].trim();
                if let Some(sig_rest) = sig_line.strip_prefix("SG_ ") {
                    headers.push(parse_signal_header(sig_rest)?);
                    i += 1;
                } else {
                    break;
                }
            }
            let is_extended = frame_id & 0x8000_0000 != 0;
            let frame_id = frame_id & 0x1FFF_FFFF;
            pending.push((frame_id, name, sender, is_extended, length_bytes, headers));
        } else if let Some(rest) = trimmed.strip_prefix("CM_ BO_ ") {
            if let Some((id, comment)) = parse_message_comment(rest) {
                message_comments.insert(id, comment);
            }
            i += 1;
        } else if let Some(rest) = trimmed.strip_prefix("CM_ SG_ ") {
            if let Some((id, signal, comment)) = parse_signal_comment(rest) {
                signal_comments.insert((id, signal), comment);
            }
            i += 1;
        } else if let Some(rest) = trimmed.strip_prefix("VAL_ ") {
            if let Some((id, signal, map)) = parse_value_table(rest) {
                choices.insert((id, signal), map);
            }
            i += 1;
        } else if let Some(rest) = trimmed.strip_prefix("BA_ ") {
            if let Some((id, attr_name, value)) = parse_attribute_value(rest) {
                message_attrs.entry(id).or_default().insert(attr_name, value);
            }
            i += 1;
        } else {
            // NS_, BS_, CM_ (network), BA_DEF_, BA_DEF_DEF_, VAL_TABLE_,
            // SIG_GROUP_, EV_: recognized but carried only as opaque text in
            // this core, per the parser contract boundary.
            i += 1;
        }
    }

    for name in &node_names {
        database.add_node(Node::new(name.clone()));
    }
    database.add_bus(Bus::new("default"));

    for (frame_id, name, sender, is_extended, length_bytes, headers) in pending {
        let mut builder = Message::builder(frame_id, name.clone())
            .extended(is_extended)
            .length_bytes(length_bytes)
            .senders(vec![sender]);
        if let Some(comment) = message_comments.get(&frame_id) {
            builder = builder.comment(comment.clone());
        }
        if let Some(attrs) = message_attrs.get(&frame_id) {
            builder = builder.attributes(attrs.clone());
        }
        for header in headers {
            let mut sig_builder = Signal::builder(header.name.clone())
                .start_bit(header.start_bit)
                .length_bits(header.length_bits)
                .byte_order(header.byte_order)
                .signed(header.is_signed)
                .scale(header.scale)
                .offset(header.offset)
                .range(header.minimum, header.maximum)
                .unit(header.unit)
                .receivers(header.receivers)
                .is_multiplexer(header.is_multiplexer);
            if let Some(mux_id) = header.multiplexer_id {
                sig_builder = sig_builder.multiplexer_id(mux_id);
            }
            if let Some(comment) = signal_comments.get(&(frame_id, header.name.clone())) {
                sig_builder = sig_builder.comment(comment.clone());
            }
            if let Some(map) = choices.get(&(frame_id, header.name.clone())) {
                sig_builder = sig_builder.choices(map.clone());
            }
            builder = builder.signal(sig_builder.build()?);
        }
        database.add_message(builder.build()?)?;
    }

    Ok(database)
}

fn parse_quoted(s: &str) -> Option<String> {
    let s = s.trim().trim_end_matches(';');
    let s = s.trim();
    let inner = s.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.to_string())
}

fn parse_message_header(rest: &str) -> Result<(u32, String, u8, String)> {
    // "<id> <name> : <dlc> <sender>"
    let (head, sender) = rest
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| Error::parse_bare("malformed BO_ line"))?;
    let (head, dlc) = head
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| Error::parse_bare("malformed BO_ line"))?;
    let dlc: u8 = dlc
        .trim()
        .parse()
        .map_err(|_| Error::parse_bare("malformed DLC in BO_ line"))?;
    let head = head.trim_end_matches(':').trim();
    let mut parts = head.splitn(2, char::is_whitespace);
    let id: u32 = parts
        .next()
        .ok_or_else(|| Error::parse_bare("missing frame id in BO_ line"))?
        .parse()
        .map_err(|_| Error::parse_bare("malformed frame id in BO_ line"))?;
    let name = parts
        .next()
        .ok_or_else(|| Error::parse_bare("missing message name in BO_ line"))?
        .trim()
        .to_string();
    Ok((id, name, dlc, sender.trim().to_string()))
}

fn parse_signal_header(rest: &str) -> Result<SignalHeader> {
    // "<name> [M|mN] : <start>|<len>@<order><sign> (<scale>,<offset>) [<min>|<max>] "<unit>" <receivers>"
    let (name_part, layout) = rest
        .split_once(':')
        .ok_or_else(|| Error::parse_bare("malformed SG_ line: missing ':'"))?;
    let name_part = name_part.trim();
    let (name, is_multiplexer, multiplexer_id) = match name_part.split_once(char::is_whitespace) {
        Some((name, marker)) => {
            let marker = marker.trim();
            if marker == "M" {
                (name, true, None)
            } else if let Some(digits) = marker.strip_prefix('m') {
                let id: u64 = digits
                    .parse()
                    .map_err(|_| Error::parse_bare("malformed multiplexer indicator"))?;
                (name, false, Some(id))
            } else {
                (name_part, false, None)
            }
        }
        None => (name_part, false, None),
    };

    let layout = layout.trim();
    let (bitspec, rest) = layout
        .split_once('(')
        .ok_or_else(|| Error::parse_bare("malformed SG_ line: missing '('"))?;
    let (start_len, order_sign) = bitspec
        .trim()
        .split_once('@')
        .ok_or_else(|| Error::parse_bare("malformed SG_ line: missing '@'"))?;
    let (start_bit, length_bits) = start_len
        .split_once('|')
        .ok_or_else(|| Error::parse_bare("malformed SG_ line: missing '|'"))?;
    let start_bit: u16 = start_bit
        .trim()
        .parse()
        .map_err(|_| Error::parse_bare("malformed start bit"))?;
    let length_bits: u8 = length_bits
        .trim()
        .parse()
        .map_err(|_| Error::parse_bare("malformed signal length"))?;
    let order_sign = order_sign.trim();
    let (order_char, sign_char) = order_sign
        .split_at(order_sign.len().saturating_sub(1));
    let byte_order = match order_char {
        "0" => ByteOrder::BigEndian,
        "1" => ByteOrder::LittleEndian,
        _ => return Err(Error::parse_bare("malformed byte order indicator")),
    };
    let is_signed = sign_char == "-";

    let (factor_offset, rest) = rest
        .split_once(')')
        .ok_or_else(|| Error::parse_bare("malformed SG_ line: missing ')'"))?;
    let (scale, offset) = factor_offset
        .split_once(',')
        .ok_or_else(|| Error::parse_bare("malformed scale/offset"))?;
    let scale: f64 = scale
        .trim()
        .parse()
        .map_err(|_| Error::parse_bare("malformed scale"))?;
    let offset: f64 = offset
        .trim()
        .parse()
        .map_err(|_| Error::parse_bare("malformed offset"))?;

    let rest = rest.trim();
    let (range, rest) = rest
        .split_once(']')
        .ok_or_else(|| Error::parse_bare("malformed SG_ line: missing ']'"))?;
    let range = range
        .trim_start()
        .strip_prefix('[')
        .ok_or_else(|| Error::parse_bare("malformed SG_ line: missing '['"))?;
    let (minimum, maximum) = range
        .split_once('|')
        .ok_or_else(|| Error::parse_bare("malformed signal range"))?;
    let minimum: f64 = minimum
        .trim()
        .parse()
        .map_err(|_| Error::parse_bare("malformed minimum"))?;
    let maximum: f64 = maximum
        .trim()
        .parse()
        .map_err(|_| Error::parse_bare("malformed maximum"))?;

    let rest = rest.trim();
    let (unit, receivers) = rest
        .strip_prefix('"')
        .and_then(|r| r.split_once('"'))
        .ok_or_else(|| Error::parse_bare("malformed SG_ line: missing unit string"))?;
    let receivers = receivers
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty() && *s != "Vector__XXX")
        .map(str::to_string)
        .collect();

    Ok(SignalHeader {
        name: name.trim().to_string(),
        is_multiplexer,
        multiplexer_id,
        start_bit,
        length_bits,
        byte_order,
        is_signed,
        scale,
        offset,
        minimum,
        maximum,
        unit: unit.to_string(),
        receivers,
    })
}

fn parse_message_comment(rest: &str) -> Option<(u32, String)> {
    let rest = rest.trim();
    let (id, comment) = rest.split_once(char::is_whitespace)?;
    let id: u32 = id.trim().parse().ok()?;
    let comment = parse_quoted(comment)?;
    Some((id, comment))
}

fn parse_signal_comment(rest: &str) -> Option<(u32, String, String)> {
    let rest = rest.trim();
    let (id, rest) = rest.split_once(char::is_whitespace)?;
    let id: u32 = id.trim().parse().ok()?;
    let rest = rest.trim();
    let (signal, comment) = rest.split_once(char::is_whitespace)?;
    let comment = parse_quoted(comment)?;
    Some((id, signal.to_string(), comment))
}

fn parse_value_table(rest: &str) -> Option<(u32, String, BTreeMap<i64, String>)> {
    let rest = rest.trim().trim_end_matches(';').trim();
    let (id, rest) = rest.split_once(char::is_whitespace)?;
    let id: u32 = id.trim().parse().ok()?;
    let rest = rest.trim();
    let (signal, rest) = rest.split_once(char::is_whitespace)?;
    let mut map = BTreeMap::new();
    let mut remaining = rest.trim();
    while !remaining.is_empty() {
        let (value, after_value) = remaining.split_once(char::is_whitespace)?;
        let value: i64 = value.trim().parse().ok()?;
        let after_value = after_value.trim_start();
        let after_value = after_value.strip_prefix('"')?;
        let (label, after_label) = after_value.split_once('"')?;
        map.insert(value, label.to_string());
        remaining = after_label.trim_start();
    }
    Some((id, signal.to_string(), map))
}

fn parse_attribute_value(rest: &str) -> Option<(u32, String, AttributeValue)> {
    let rest = rest.trim().trim_end_matches(';').trim();
    let rest = rest.strip_prefix('"')?;
    let (attr_name, rest) = rest.split_once('"')?;
    let rest = rest.trim();
    let rest = rest.strip_prefix("BO_")?;
    let rest = rest.trim();
    let (id, value) = rest.split_once(char::is_whitespace)?;
    let id: u32 = id.trim().parse().ok()?;
    let value = value.trim();
    let attribute_value = if let Some(inner) = value.strip_prefix('"') {
        AttributeValue::String(inner.trim_end_matches('"').to_string())
    } else if let Ok(i) = value.parse::<i64>() {
        AttributeValue::Int(i)
    } else {
        AttributeValue::Float(value.parse().ok()?)
    };
    Some((id, attr_name.to_string(), attribute_value))
}
