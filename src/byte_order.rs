/// How a signal's bits are laid out inside the payload.
///
/// Little-endian ("Intel") signals advance from `start_bit` toward higher
/// absolute bit indices; big-endian ("Motorola") signals name `start_bit` as
/// the most significant bit under the sawtooth convention (see
/// [`crate::bitlayout::bit_positions`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}
