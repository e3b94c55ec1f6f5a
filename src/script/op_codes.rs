//! Opcodes used when building standard scripts

/// Pushes an empty array onto the stack
pub const OP_0: u8 = 0;
/// Offset for the opcodes that push the next 1-75 bytes onto the stack
pub const OP_PUSH: u8 = 0;
/// The next byte is the number of bytes to push
pub const OP_PUSHDATA1: u8 = 76;
/// The next two bytes, little-endian, are the number of bytes to push
pub const OP_PUSHDATA2: u8 = 77;
/// The next four bytes, little-endian, are the number of bytes to push
pub const OP_PUSHDATA4: u8 = 78;
/// Pushes 1 onto the stack. OP_2 through OP_16 follow consecutively.
pub const OP_1: u8 = 81;
/// Pushes 16 onto the stack
pub const OP_16: u8 = 96;
/// Checks that m of the n signatures match the n public keys
pub const OP_CHECKMULTISIG: u8 = 174;
