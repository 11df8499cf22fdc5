//! A single signal packed inside a message payload.

use std::collections::BTreeMap;
use std::fmt;

use crate::bitlayout::{self, highest_byte};
use crate::byte_order::ByteOrder;
use crate::error::{Error, Result};
use crate::value::Value;

/// One signal: a bit range inside a message, plus the scaling and typing
/// rules that turn its raw bits into a physical [`Value`].
///
/// # Examples
///
/// ```
/// use candb::{Signal, ByteOrder};
///
/// let signal = Signal::builder("RPM")
///     .start_bit(0)
///     .length_bits(16)
///     .byte_order(ByteOrder::LittleEndian)
///     .scale(0.25)
///     .unit("rpm")
///     .build()?;
/// assert_eq!(signal.name(), "RPM");
/// # Ok::<(), candb::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    name: String,
    start_bit: u16,
    length_bits: u8,
    byte_order: ByteOrder,
    is_signed: bool,
    is_float: bool,
    scale: f64,
    offset: f64,
    minimum: Option<f64>,
    maximum: Option<f64>,
    unit: Option<String>,
    choices: Option<BTreeMap<i64, String>>,
    is_multiplexer: bool,
    multiplexer_id: Option<u64>,
    receivers: Vec<String>,
    comment: Option<String>,
}

impl Signal {
    fn validate(name: &str, start_bit: u16, length_bits: u8, is_float: bool) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::InvalidSchema("signal name is empty".into()));
        }
        if length_bits == 0 {
            return Err(Error::InvalidSchema(format!(
                "signal '{name}' has zero length"
            )));
        }
        if is_float && length_bits != 32 && length_bits != 64 {
            return Err(Error::InvalidSchema(format!(
                "float signal '{name}' must be 32 or 64 bits, got {length_bits}"
            )));
        }
        let end = highest_byte(start_bit, u16::from(length_bits), ByteOrder::LittleEndian);
        if end >= 8 && start_bit as usize + length_bits as usize > 64 {
            return Err(Error::InvalidSchema(format!(
                "signal '{name}' extends beyond an 8-byte payload"
            )));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: impl Into<String>,
        start_bit: u16,
        length_bits: u8,
        byte_order: ByteOrder,
        is_signed: bool,
        is_float: bool,
        scale: f64,
        offset: f64,
        minimum: Option<f64>,
        maximum: Option<f64>,
        unit: Option<String>,
        choices: Option<BTreeMap<i64, String>>,
        is_multiplexer: bool,
        multiplexer_id: Option<u64>,
        receivers: Vec<String>,
        comment: Option<String>,
    ) -> Result<Self> {
        let name = name.into();
        Self::validate(&name, start_bit, length_bits, is_float)?;
        Ok(Self {
            name,
            start_bit,
            length_bits,
            byte_order,
            is_signed,
            is_float,
            scale,
            offset,
            minimum,
            maximum,
            unit,
            choices,
            is_multiplexer,
            multiplexer_id,
            receivers,
            comment,
        })
    }

    #[must_use]
    pub fn builder(name: impl Into<String>) -> SignalBuilder {
        SignalBuilder::new(name)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn start_bit(&self) -> u16 {
        self.start_bit
    }

    #[inline]
    #[must_use]
    pub fn length_bits(&self) -> u8 {
        self.length_bits
    }

    #[inline]
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    #[inline]
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.is_signed
    }

    #[inline]
    #[must_use]
    pub fn is_float(&self) -> bool {
        self.is_float
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    #[inline]
    #[must_use]
    pub fn minimum(&self) -> Option<f64> {
        self.minimum
    }

    #[inline]
    #[must_use]
    pub fn maximum(&self) -> Option<f64> {
        self.maximum
    }

    #[inline]
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn choices(&self) -> Option<&BTreeMap<i64, String>> {
        self.choices.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_multiplexer(&self) -> bool {
        self.is_multiplexer
    }

    #[inline]
    #[must_use]
    pub fn multiplexer_id(&self) -> Option<u64> {
        self.multiplexer_id
    }

    #[inline]
    #[must_use]
    pub fn receivers(&self) -> &[String] {
        &self.receivers
    }

    #[inline]
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// True if this signal participates in multiplexing at all, either as
    /// the selector or as one of the gated alternatives.
    #[inline]
    #[must_use]
    pub fn participates_in_multiplexing(&self) -> bool {
        self.is_multiplexer || self.multiplexer_id.is_some()
    }

    fn mask(&self) -> u64 {
        if self.length_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.length_bits) - 1
        }
    }

    fn resolve_raw_for_encode(&self, value: &Value) -> Result<i64> {
        if let Value::Str(s) = value {
            let choices = self
                .choices
                .as_ref()
                .ok_or_else(|| Error::UnknownChoice {
                    signal: self.name.clone(),
                    value: s.clone(),
                })?;
            return choices
                .iter()
                .find(|(_, label)| label.as_str() == s.as_str())
                .map(|(raw, _)| *raw)
                .ok_or_else(|| Error::UnknownChoice {
                    signal: self.name.clone(),
                    value: s.clone(),
                });
        }
        value
            .as_f64()
            .map(|v| v as i64)
            .ok_or_else(|| Error::InvalidSchema(format!("signal '{}' needs a value", self.name)))
    }

    fn encode_to_raw_bits(&self, value: &Value, scaling: bool) -> Result<u64> {
        if let Value::Str(_) = value {
            let raw = self.resolve_raw_for_encode(value)?;
            return Ok((raw as u64) & self.mask());
        }

        if self.is_float {
            let physical = value
                .as_f64()
                .ok_or_else(|| Error::InvalidSchema(format!("signal '{}' needs a value", self.name)))?;
            let raw_float = if scaling && self.scale != 0.0 {
                (physical - self.offset) / self.scale
            } else {
                physical
            };
            return Ok(if self.length_bits == 32 {
                (raw_float as f32).to_bits() as u64
            } else {
                raw_float.to_bits()
            });
        }

        let physical = value
            .as_f64()
            .ok_or_else(|| Error::InvalidSchema(format!("signal '{}' needs a value", self.name)))?;
        let raw_signed = if scaling {
            if let (Some(min), Some(max)) = (self.minimum, self.maximum) {
                if physical < min || physical > max {
                    return Err(Error::RawOverflow {
                        signal: self.name.clone(),
                    });
                }
            }
            let raw_float = if self.scale != 0.0 {
                (physical - self.offset) / self.scale
            } else {
                0.0
            };
            round_half_away_from_zero(raw_float) as i64
        } else {
            round_half_away_from_zero(physical) as i64
        };

        if self.is_signed {
            let half_range = 1i64 << (self.length_bits - 1);
            if raw_signed < -half_range || raw_signed > half_range - 1 {
                return Err(Error::RawOverflow {
                    signal: self.name.clone(),
                });
            }
            Ok((raw_signed as u64) & self.mask())
        } else {
            if raw_signed < 0 || (raw_signed as u64) > self.mask() {
                return Err(Error::RawOverflow {
                    signal: self.name.clone(),
                });
            }
            Ok(raw_signed as u64)
        }
    }

    /// Write this signal's bits into `payload`, clearing its own bit range
    /// first so repeated packs of the same signal never leave stale bits.
    pub(crate) fn pack(&self, value: &Value, payload: &mut [u8], scaling: bool) -> Result<()> {
        let needed = highest_byte(self.start_bit, u16::from(self.length_bits), self.byte_order) + 1;
        if payload.len() < needed {
            return Err(Error::PayloadTooShort {
                needed,
                got: payload.len(),
            });
        }
        let raw = self.encode_to_raw_bits(value, scaling)?;
        for (i, (byte, bit_in_byte)) in bitlayout::bit_positions(
            self.start_bit,
            u16::from(self.length_bits),
            self.byte_order,
        )
        .enumerate()
        {
            let significance = self.significance_of(i);
            let bit_val = (raw >> significance) & 1;
            payload[byte] &= !(1u8 << bit_in_byte);
            payload[byte] |= (bit_val as u8) << bit_in_byte;
        }
        Ok(())
    }

    /// Read this signal's raw bits out of `payload` and turn them into a
    /// [`Value`], honoring `decode_choices` and `scaling`.
    pub(crate) fn unpack(&self, payload: &[u8], decode_choices: bool, scaling: bool) -> Result<Value> {
        let needed = highest_byte(self.start_bit, u16::from(self.length_bits), self.byte_order) + 1;
        if payload.len() < needed {
            return Err(Error::PayloadTooShort {
                needed,
                got: payload.len(),
            });
        }
        let mut raw: u64 = 0;
        for (i, (byte, bit_in_byte)) in bitlayout::bit_positions(
            self.start_bit,
            u16::from(self.length_bits),
            self.byte_order,
        )
        .enumerate()
        {
            let significance = self.significance_of(i);
            let bit_val = (payload[byte] >> bit_in_byte) & 1;
            raw |= (bit_val as u64) << significance;
        }

        if self.is_float {
            let physical = if self.length_bits == 32 {
                f32::from_bits(raw as u32) as f64
            } else {
                f64::from_bits(raw)
            };
            return Ok(Value::Real(physical));
        }

        let raw_signed = if self.is_signed {
            sign_extend(raw, self.length_bits)
        } else {
            raw as i64
        };

        if decode_choices {
            if let Some(choices) = &self.choices {
                if let Some(label) = choices.get(&raw_signed) {
                    return Ok(Value::Str(label.clone()));
                }
            }
        }

        if scaling {
            let physical = raw_signed as f64 * self.scale + self.offset;
            Ok(Value::Real(physical))
        } else {
            Ok(Value::Int(raw_signed))
        }
    }

    fn significance_of(&self, i: usize) -> usize {
        match self.byte_order {
            ByteOrder::LittleEndian => i,
            ByteOrder::BigEndian => (self.length_bits as usize - 1) - i,
        }
    }
}

fn round_half_away_from_zero(x: f64) -> f64 {
    if x >= 0.0 {
        (x + 0.5).floor()
    } else {
        (x - 0.5).ceil()
    }
}

fn sign_extend(raw: u64, length_bits: u8) -> i64 {
    if length_bits >= 64 {
        return raw as i64;
    }
    let shift = 64 - length_bits as u32;
    ((raw << shift) as i64) >> shift
}

/// Builder for [`Signal`].
#[derive(Debug, Clone)]
pub struct SignalBuilder {
    name: String,
    start_bit: u16,
    length_bits: u8,
    byte_order: ByteOrder,
    is_signed: bool,
    is_float: bool,
    scale: f64,
    offset: f64,
    minimum: Option<f64>,
    maximum: Option<f64>,
    unit: Option<String>,
    choices: Option<BTreeMap<i64, String>>,
    is_multiplexer: bool,
    multiplexer_id: Option<u64>,
    receivers: Vec<String>,
    comment: Option<String>,
}

impl SignalBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_bit: 0,
            length_bits: 1,
            byte_order: ByteOrder::LittleEndian,
            is_signed: false,
            is_float: false,
            scale: 1.0,
            offset: 0.0,
            minimum: None,
            maximum: None,
            unit: None,
            choices: None,
            is_multiplexer: false,
            multiplexer_id: None,
            receivers: Vec::new(),
            comment: None,
        }
    }

    #[must_use]
    pub fn start_bit(mut self, start_bit: u16) -> Self {
        self.start_bit = start_bit;
        self
    }

    #[must_use]
    pub fn length_bits(mut self, length_bits: u8) -> Self {
        self.length_bits = length_bits;
        self
    }

    #[must_use]
    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    #[must_use]
    pub fn signed(mut self, is_signed: bool) -> Self {
        self.is_signed = is_signed;
        self
    }

    #[must_use]
    pub fn float(mut self, is_float: bool) -> Self {
        self.is_float = is_float;
        self
    }

    #[must_use]
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn choices(mut self, choices: BTreeMap<i64, String>) -> Self {
        self.choices = Some(choices);
        self
    }

    #[must_use]
    pub fn is_multiplexer(mut self, is_multiplexer: bool) -> Self {
        self.is_multiplexer = is_multiplexer;
        self
    }

    #[must_use]
    pub fn multiplexer_id(mut self, multiplexer_id: u64) -> Self {
        self.multiplexer_id = Some(multiplexer_id);
        self
    }

    #[must_use]
    pub fn receivers(mut self, receivers: Vec<String>) -> Self {
        self.receivers = receivers;
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn build(self) -> Result<Signal> {
        Signal::new(
            self.name,
            self.start_bit,
            self.length_bits,
            self.byte_order,
            self.is_signed,
            self.is_float,
            self.scale,
            self.offset,
            self.minimum,
            self.maximum,
            self.unit,
            self.choices,
            self.is_multiplexer,
            self.multiplexer_id,
            self.receivers,
            self.comment,
        )
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}|{}@{:?}",
            self.name, self.start_bit, self.length_bits, self.byte_order
        )
    }
}
