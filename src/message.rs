//! A CAN message: a frame id, a payload length, and the signals packed
//! inside it.

use std::collections::BTreeMap;

use crate::attribute::AttributeMap;
use crate::error::{Error, Result};
use crate::signal::Signal;
use crate::value::Value;

pub const MAX_STANDARD_ID: u32 = 0x7FF;
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    frame_id: u32,
    name: String,
    is_extended_frame: bool,
    length_bytes: u8,
    signals: Vec<Signal>,
    senders: Vec<String>,
    comment: Option<String>,
    send_type: Option<String>,
    cycle_time: Option<u32>,
    bus_name: Option<String>,
    attributes: AttributeMap,
}

impl Message {
    fn validate(
        name: &str,
        frame_id: u32,
        is_extended_frame: bool,
        length_bytes: u8,
        signals: &[Signal],
    ) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::InvalidSchema("message name is empty".into()));
        }
        if length_bytes > 8 {
            return Err(Error::InvalidSchema(format!(
                "message '{name}' declares length {length_bytes}, max is 8"
            )));
        }
        let max_id = if is_extended_frame {
            MAX_EXTENDED_ID
        } else {
            MAX_STANDARD_ID
        };
        if frame_id > max_id {
            return Err(Error::InvalidSchema(format!(
                "message '{name}' frame id 0x{frame_id:x} exceeds the {} range",
                if is_extended_frame { "extended" } else { "standard" }
            )));
        }
        for signal in signals {
            let needed = crate::bitlayout::highest_byte(
                signal.start_bit(),
                u16::from(signal.length_bits()),
                signal.byte_order(),
            ) + 1;
            if needed > length_bytes as usize {
                return Err(Error::InvalidSchema(format!(
                    "signal '{}' in message '{name}' extends beyond the declared {length_bytes}-byte payload",
                    signal.name()
                )));
            }
        }
        check_no_overlap(name, signals)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        frame_id: u32,
        name: impl Into<String>,
        is_extended_frame: bool,
        length_bytes: u8,
        signals: Vec<Signal>,
        senders: Vec<String>,
        comment: Option<String>,
        send_type: Option<String>,
        cycle_time: Option<u32>,
        bus_name: Option<String>,
        attributes: AttributeMap,
    ) -> Result<Self> {
        let name = name.into();
        Self::validate(&name, frame_id, is_extended_frame, length_bytes, &signals)?;
        Ok(Self {
            frame_id,
            name,
            is_extended_frame,
            length_bytes,
            signals,
            senders,
            comment,
            send_type,
            cycle_time,
            bus_name,
            attributes,
        })
    }

    #[must_use]
    pub fn builder(frame_id: u32, name: impl Into<String>) -> MessageBuilder {
        MessageBuilder::new(frame_id, name)
    }

    #[inline]
    #[must_use]
    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn is_extended_frame(&self) -> bool {
        self.is_extended_frame
    }

    #[inline]
    #[must_use]
    pub fn length_bytes(&self) -> u8 {
        self.length_bytes
    }

    #[inline]
    #[must_use]
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    #[inline]
    #[must_use]
    pub fn senders(&self) -> &[String] {
        &self.senders
    }

    #[inline]
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn send_type(&self) -> Option<&str> {
        self.send_type.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn cycle_time(&self) -> Option<u32> {
        self.cycle_time
    }

    #[inline]
    #[must_use]
    pub fn bus_name(&self) -> Option<&str> {
        self.bus_name.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    #[must_use]
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name() == name)
    }

    /// Whether any signal in this message gates on a multiplexer selector.
    #[must_use]
    pub fn is_multiplexed(&self) -> bool {
        self.signals.iter().any(|s| s.is_multiplexer())
    }

    /// The name of the signal that selects between multiplexed alternatives,
    /// if this message has one.
    #[must_use]
    pub fn multiplexer_signal_name(&self) -> Option<&str> {
        self.signals
            .iter()
            .find(|s| s.is_multiplexer())
            .map(Signal::name)
    }

    /// Signals that are active when the multiplexer selector equals
    /// `mux_id`: every non-multiplexed signal, plus the selector itself,
    /// plus any signal gated specifically on this `mux_id`.
    #[must_use]
    pub fn signals_for_multiplexer_id(&self, mux_id: u64) -> Vec<&Signal> {
        self.signals
            .iter()
            .filter(|s| {
                s.is_multiplexer()
                    || s.multiplexer_id().is_none()
                    || s.multiplexer_id() == Some(mux_id)
            })
            .collect()
    }

    /// Signals selected for encode/decode given the chosen multiplexer
    /// value, or all signals if this message isn't multiplexed.
    pub(crate) fn active_signals(&self, mux_sel: Option<u64>) -> Vec<&Signal> {
        match mux_sel {
            Some(sel) => self.signals_for_multiplexer_id(sel),
            None => self.signals.iter().collect(),
        }
    }

    /// Encode `data` into a payload sized to this message's declared
    /// length. `strict` requires every active signal to be present in
    /// `data`; otherwise missing signals are left zeroed.
    pub(crate) fn encode(
        &self,
        data: &BTreeMap<String, Value>,
        scaling: bool,
        strict: bool,
    ) -> Result<Vec<u8>> {
        let mux_sel = self.multiplexer_selector(data)?;
        let active = self.active_signals(mux_sel);
        let mut payload = vec![0u8; self.length_bytes as usize];
        for signal in &active {
            match data.get(signal.name()) {
                Some(value) => signal.pack(value, &mut payload, scaling)?,
                None if strict => {
                    return Err(Error::MissingSignal(signal.name().to_string()));
                }
                None => {}
            }
        }
        Ok(payload)
    }

    /// Decode `payload` into a name-to-value map of the signals active for
    /// the multiplexer selector found in the payload, if any.
    pub(crate) fn decode(
        &self,
        payload: &[u8],
        decode_choices: bool,
        scaling: bool,
    ) -> Result<BTreeMap<String, Value>> {
        if payload.len() < self.length_bytes as usize {
            return Err(Error::PayloadTooShort {
                needed: self.length_bytes as usize,
                got: payload.len(),
            });
        }
        let mux_sel = self.decode_multiplexer_selector(payload)?;
        let active = self.active_signals(mux_sel);
        let mut out = BTreeMap::new();
        for signal in active {
            let value = signal.unpack(payload, decode_choices, scaling)?;
            out.insert(signal.name().to_string(), value);
        }
        Ok(out)
    }

    fn multiplexer_selector(&self, data: &BTreeMap<String, Value>) -> Result<Option<u64>> {
        let Some(name) = self.multiplexer_signal_name() else {
            return Ok(None);
        };
        match data.get(name) {
            Some(value) => value
                .as_f64()
                .map(|v| Some(v as u64))
                .ok_or_else(|| Error::InvalidSchema(format!("multiplexer '{name}' needs a value"))),
            None => Ok(None),
        }
    }

    fn decode_multiplexer_selector(&self, payload: &[u8]) -> Result<Option<u64>> {
        let Some(signal) = self.signals.iter().find(|s| s.is_multiplexer()) else {
            return Ok(None);
        };
        match signal.unpack(payload, false, false)? {
            Value::Int(v) => Ok(Some(v as u64)),
            Value::Real(v) => Ok(Some(v as u64)),
            Value::Str(_) => Ok(None),
        }
    }
}

fn check_no_overlap(message_name: &str, signals: &[Signal]) -> Result<()> {
    for (i, a) in signals.iter().enumerate() {
        for b in &signals[i + 1..] {
            if a.multiplexer_id().is_some()
                && b.multiplexer_id().is_some()
                && a.multiplexer_id() != b.multiplexer_id()
            {
                // Different mux alternatives are allowed to share bits.
                continue;
            }
            if bits_overlap(a, b) {
                return Err(Error::InvalidSchema(format!(
                    "signals '{}' and '{}' overlap in message '{message_name}'",
                    a.name(),
                    b.name()
                )));
            }
        }
    }
    Ok(())
}

fn bits_overlap(a: &Signal, b: &Signal) -> bool {
    use std::collections::HashSet;
    let a_positions: HashSet<_> =
        crate::bitlayout::bit_positions(a.start_bit(), u16::from(a.length_bits()), a.byte_order())
            .collect();
    crate::bitlayout::bit_positions(b.start_bit(), u16::from(b.length_bits()), b.byte_order())
        .any(|p| a_positions.contains(&p))
}

/// Builder for [`Message`].
pub struct MessageBuilder {
    frame_id: u32,
    name: String,
    is_extended_frame: bool,
    length_bytes: u8,
    signals: Vec<Signal>,
    senders: Vec<String>,
    comment: Option<String>,
    send_type: Option<String>,
    cycle_time: Option<u32>,
    bus_name: Option<String>,
    attributes: AttributeMap,
}

impl MessageBuilder {
    fn new(frame_id: u32, name: impl Into<String>) -> Self {
        Self {
            frame_id,
            name: name.into(),
            is_extended_frame: false,
            length_bytes: 8,
            signals: Vec::new(),
            senders: Vec::new(),
            comment: None,
            send_type: None,
            cycle_time: None,
            bus_name: None,
            attributes: AttributeMap::new(),
        }
    }

    #[must_use]
    pub fn extended(mut self, is_extended_frame: bool) -> Self {
        self.is_extended_frame = is_extended_frame;
        self
    }

    #[must_use]
    pub fn length_bytes(mut self, length_bytes: u8) -> Self {
        self.length_bytes = length_bytes;
        self
    }

    #[must_use]
    pub fn signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }

    #[must_use]
    pub fn senders(mut self, senders: Vec<String>) -> Self {
        self.senders = senders;
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn send_type(mut self, send_type: impl Into<String>) -> Self {
        self.send_type = Some(send_type.into());
        self
    }

    #[must_use]
    pub fn cycle_time(mut self, cycle_time: u32) -> Self {
        self.cycle_time = Some(cycle_time);
        self
    }

    #[must_use]
    pub fn bus_name(mut self, bus_name: impl Into<String>) -> Self {
        self.bus_name = Some(bus_name.into());
        self
    }

    #[must_use]
    pub fn attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn build(self) -> Result<Message> {
        Message::new(
            self.frame_id,
            self.name,
            self.is_extended_frame,
            self.length_bytes,
            self.signals,
            self.senders,
            self.comment,
            self.send_type,
            self.cycle_time,
            self.bus_name,
            self.attributes,
        )
    }
}
