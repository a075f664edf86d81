//! Command codes and argument expansion.
//!
//! A bridge command is an opaque 3-byte code; this module does not interpret
//! the bytes. [`expand`] flattens the heterogeneous arguments accepted by
//! [`Controller::send_commands`](crate::Controller::send_commands) into the
//! flat, ordered transmission list, replicated once per repeat iteration.

use std::fmt;

use crate::error::CommandError;

/// A single 3-byte command code for the receiving fixture.
///
/// The code is opaque to this crate; higher layers decide what the bytes
/// mean.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command([u8; 3]);

impl Command {
    /// Create a command from a fixed 3-byte code.
    pub const fn new(code: [u8; 3]) -> Self {
        Self(code)
    }

    /// Create a command from a dynamically sized slice.
    ///
    /// Fails unless the slice is exactly three bytes long.
    pub fn from_slice(code: &[u8]) -> Result<Self, CommandError> {
        match <[u8; 3]>::try_from(code) {
            Ok(code) => Ok(Self(code)),
            Err(_) => Err(CommandError::InvalidLength { len: code.len() }),
        }
    }

    /// The raw bytes of this code.
    pub const fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:02x} 0x{:02x} 0x{:02x}]", self.0[0], self.0[1], self.0[2])
    }
}

impl From<[u8; 3]> for Command {
    fn from(code: [u8; 3]) -> Self {
        Self(code)
    }
}

impl TryFrom<&[u8]> for Command {
    type Error = CommandError;

    fn try_from(code: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(code)
    }
}

/// One argument to `send_commands`: a single code or a batch of codes.
///
/// A batch is transmitted element by element in order; it is a grouping
/// convenience for callers, invisible on the wire. An empty batch is legal
/// and expands to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandArg {
    /// A single 3-byte code.
    Single(Command),
    /// An ordered batch of codes sent back to back.
    Batch(Vec<Command>),
}

impl CommandArg {
    /// Number of codes this argument expands to.
    pub fn len(&self) -> usize {
        match self {
            CommandArg::Single(_) => 1,
            CommandArg::Batch(codes) => codes.len(),
        }
    }

    /// Whether this argument expands to nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push_into(&self, out: &mut Vec<Command>) {
        match self {
            CommandArg::Single(code) => out.push(*code),
            CommandArg::Batch(codes) => out.extend_from_slice(codes),
        }
    }
}

impl From<Command> for CommandArg {
    fn from(code: Command) -> Self {
        CommandArg::Single(code)
    }
}

impl From<[u8; 3]> for CommandArg {
    fn from(code: [u8; 3]) -> Self {
        CommandArg::Single(Command::new(code))
    }
}

impl From<Vec<Command>> for CommandArg {
    fn from(codes: Vec<Command>) -> Self {
        CommandArg::Batch(codes)
    }
}

impl From<&[Command]> for CommandArg {
    fn from(codes: &[Command]) -> Self {
        CommandArg::Batch(codes.to_vec())
    }
}

impl<const N: usize> From<[[u8; 3]; N]> for CommandArg {
    fn from(codes: [[u8; 3]; N]) -> Self {
        CommandArg::Batch(codes.iter().copied().map(Command::new).collect())
    }
}

impl From<&[[u8; 3]]> for CommandArg {
    fn from(codes: &[[u8; 3]]) -> Self {
        CommandArg::Batch(codes.iter().copied().map(Command::new).collect())
    }
}

impl TryFrom<&[u8]> for CommandArg {
    type Error = CommandError;

    /// A dynamically sized byte slice is a single code and must be exactly
    /// three bytes.
    fn try_from(code: &[u8]) -> Result<Self, Self::Error> {
        Ok(CommandArg::Single(Command::from_slice(code)?))
    }
}

impl TryFrom<&[&[u8]]> for CommandArg {
    type Error = CommandError;

    /// A slice of byte slices is a batch; every element must be exactly
    /// three bytes.
    fn try_from(codes: &[&[u8]]) -> Result<Self, Self::Error> {
        codes
            .iter()
            .map(|code| Command::from_slice(code))
            .collect::<Result<Vec<_>, _>>()
            .map(CommandArg::Batch)
    }
}

/// Flatten `args` into the ordered transmission list, repeated `repeat`
/// times.
///
/// The whole argument list is repeated as a block: all of iteration 0's
/// codes, then all of iteration 1's, and so on. For arguments of total
/// expanded length `n` the result holds exactly `repeat * n` codes.
pub fn expand(repeat: u32, args: &[CommandArg]) -> Vec<Command> {
    let per_block: usize = args.iter().map(CommandArg::len).sum();
    let mut out = Vec::with_capacity(per_block * repeat as usize);
    for _ in 0..repeat {
        for arg in args {
            arg.push_into(&mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(a: u8, b: u8, c: u8) -> Command {
        Command::new([a, b, c])
    }

    #[test]
    fn expand_repeats_whole_argument_list_as_block() {
        let args = [CommandArg::from([1, 2, 3]), CommandArg::from([4, 5, 6])];
        let out = expand(2, &args);
        assert_eq!(
            out,
            vec![cmd(1, 2, 3), cmd(4, 5, 6), cmd(1, 2, 3), cmd(4, 5, 6)]
        );
    }

    #[test]
    fn expand_flattens_batches_in_order() {
        let args = [
            CommandArg::from([[1, 2, 3], [4, 5, 6]]),
            CommandArg::from([7, 8, 9]),
        ];
        let out = expand(1, &args);
        assert_eq!(out, vec![cmd(1, 2, 3), cmd(4, 5, 6), cmd(7, 8, 9)]);
    }

    #[test]
    fn expand_output_length_is_repeat_times_n() {
        let args = [
            CommandArg::from([[1, 2, 3], [4, 5, 6], [7, 8, 9]]),
            CommandArg::from([10, 11, 12]),
        ];
        assert_eq!(expand(3, &args).len(), 3 * 4);
        assert_eq!(expand(0, &args).len(), 0);
    }

    #[test]
    fn empty_batch_expands_to_nothing() {
        let args = [
            CommandArg::Batch(Vec::new()),
            CommandArg::from([1, 2, 3]),
        ];
        assert_eq!(expand(2, &args), vec![cmd(1, 2, 3), cmd(1, 2, 3)]);
    }

    #[test]
    fn short_code_is_rejected() {
        let err = Command::from_slice(&[1, 2]).unwrap_err();
        assert_eq!(err, CommandError::InvalidLength { len: 2 });
    }

    #[test]
    fn long_code_is_rejected() {
        let err = CommandArg::try_from(&[1u8, 2, 3, 4][..]).unwrap_err();
        assert_eq!(err, CommandError::InvalidLength { len: 4 });
    }

    #[test]
    fn batch_of_slices_validates_every_element() {
        let good: &[&[u8]] = &[&[1, 2, 3], &[4, 5, 6]];
        assert_eq!(
            CommandArg::try_from(good).unwrap(),
            CommandArg::from([[1, 2, 3], [4, 5, 6]])
        );

        let bad: &[&[u8]] = &[&[1, 2, 3], &[4, 5]];
        assert_eq!(
            CommandArg::try_from(bad).unwrap_err(),
            CommandError::InvalidLength { len: 2 }
        );
    }

    #[test]
    fn debug_formats_as_hex() {
        assert_eq!(format!("{:?}", cmd(0x42, 0x00, 0x55)), "[0x42 0x00 0x55]");
    }
}
