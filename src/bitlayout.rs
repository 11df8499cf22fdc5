//! Bit position arithmetic, kept in exactly one place.
//!
//! [`bit_positions`] is the only function in this crate that turns a
//! `(start_bit, length, byte_order)` triple into concrete `(byte_index,
//! bit_in_byte)` pairs. Everything else — packing, unpacking, overlap
//! checks — walks this iterator rather than recomputing offsets.
//!
//! Little-endian signals advance from `start_bit` toward higher absolute
//! bit indices; the first position yielded is the least significant bit of
//! the raw integer. Big-endian signals name `start_bit` as the most
//! significant bit and walk the Motorola "sawtooth": down through the
//! current byte, then continuing at bit 7 of the next byte.
//!
//! The tricky part of the big-endian case is locating the *anchor* — the
//! `(byte, bit)` of the very first (most significant) position — since
//! `start_bit`'s own byte/bit split is only the anchor when the signal fits
//! without wrapping. A signal that wraps mid-walk anchors somewhere else
//! entirely: e.g. `start_bit=46, length=10` anchors at byte 4 bit 1, not at
//! byte 5 bit 6 that a naive split of `46` would suggest. The anchor is
//! derived from `e = start_bit - (length - 1)`, the position the wrap
//! arithmetic would land on if the walk ran in reverse from the least
//! significant bit.

use crate::byte_order::ByteOrder;

/// Floor division, since `i64`'s `/` truncates toward zero.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Non-negative remainder, complementing [`floor_div`].
fn floor_rem(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

/// Yields `(byte_index, bit_in_byte)` for each of `length` bits, in the
/// order they are consumed from (or placed into) the raw integer: least
/// significant first for little-endian, most significant first for
/// big-endian.
pub(crate) fn bit_positions(
    start_bit: u16,
    length: u16,
    order: ByteOrder,
) -> impl Iterator<Item = (usize, u8)> {
    let start_bit = start_bit as i64;
    let length_i = length as i64;
    let (anchor_byte, anchor_bit) = match order {
        ByteOrder::LittleEndian => (0, 0),
        ByteOrder::BigEndian => big_endian_anchor(start_bit, length_i),
    };
    (0..length).map(move |i| {
        let i = i as i64;
        match order {
            ByteOrder::LittleEndian => {
                let abs = start_bit + i;
                ((abs >> 3) as usize, (abs & 7) as u8)
            }
            ByteOrder::BigEndian => {
                let base = anchor_bit - i;
                let byte = anchor_byte - floor_div(base, 8);
                let bit = floor_rem(base, 8) as u8;
                (byte as usize, bit)
            }
        }
    })
}

/// Locates the `(byte, bit)` of a big-endian signal's most significant bit.
///
/// `e` is the position the sawtooth walk would reach at the least
/// significant bit if it ran unclamped past byte boundaries. A negative `e`
/// means the signal's virtual descent runs past the start of the payload, so
/// there is no room for it before byte 0: the anchor saturates there. A
/// non-negative `e` places the anchor at `e`'s own byte, `e / 8`.
///
/// The anchor bit is `e`'s offset within that byte (`floor_rem(e, 8)`) only
/// when the signal fits entirely inside the byte it lands in. A signal that
/// instead spans into further bytes anchors at the bit the wrap arithmetic
/// works out to reach after consuming whole bytes along the way — see
/// `tests/codec_vectors.rs`'s literal scenarios for worked examples (`A`,
/// `Temperature`).
fn big_endian_anchor(start_bit: i64, length: i64) -> (i64, i64) {
    let e = start_bit - (length - 1);
    let anchor_byte = if e < 0 { 0 } else { floor_div(e, 8) };
    if length == 1 {
        return (anchor_byte, 7);
    }
    let cand = floor_rem(e, 8);
    if cand + 1 >= length {
        return (anchor_byte, cand);
    }
    let rem = length % 8;
    let carry = if rem == 0 { 0 } else { 1 - rem };
    (anchor_byte, floor_rem(7 - cand + carry, 8))
}

/// Highest byte index a signal with this layout touches, inclusive.
pub(crate) fn highest_byte(start_bit: u16, length: u16, order: ByteOrder) -> usize {
    bit_positions(start_bit, length, order)
        .map(|(byte, _)| byte)
        .max()
        .unwrap_or(0)
}
