//! Parameter-count negotiation
//!
//! In the negotiated variant both ends agree on how many parameter bytes
//! each command carries, so the count never travels on the wire. The
//! agreement is a [`ParamLookup`] supplied when the link is built.

/// Maps a command to the number of parameter bytes it carries
pub trait ParamLookup {
    /// Expected parameter count, or `None` for an unknown command
    fn param_count(&self, command: u8) -> Option<u8>;

    /// Whether counts come from this lookup
    ///
    /// When `false` the caller supplies lengths and sends are not checked.
    fn negotiates(&self) -> bool {
        true
    }
}

/// Computed rule, e.g. a `match` in a plain function
impl<F> ParamLookup for F
where
    F: Fn(u8) -> Option<u8>,
{
    fn param_count(&self, command: u8) -> Option<u8> {
        self(command)
    }
}

/// No negotiation: the caller declares each frame's length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Declared;

impl ParamLookup for Declared {
    fn param_count(&self, _command: u8) -> Option<u8> {
        None
    }

    fn negotiates(&self) -> bool {
        false
    }
}

/// Every command carries the same number of parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCount(pub u8);

impl ParamLookup for FixedCount {
    fn param_count(&self, _command: u8) -> Option<u8> {
        Some(self.0)
    }
}

/// Fixed table of `(command, parameter count)` pairs
///
/// Suitable for a `static`:
///
/// ```
/// use uartlink_protocol::CommandTable;
///
/// static COMMANDS: CommandTable<'static> = CommandTable::new(&[(0x01, 2), (0x02, 3), (0x03, 1)]);
/// assert_eq!(COMMANDS.get(0x02), Some(3));
/// assert_eq!(COMMANDS.get(0x7F), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTable<'a> {
    entries: &'a [(u8, u8)],
}

impl<'a> CommandTable<'a> {
    /// First entry wins if a command is listed twice
    pub const fn new(entries: &'a [(u8, u8)]) -> Self {
        Self { entries }
    }

    pub fn get(&self, command: u8) -> Option<u8> {
        self.entries
            .iter()
            .find(|(cmd, _)| *cmd == command)
            .map(|&(_, count)| count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest parameter count in the table
    pub fn max_param_count(&self) -> Option<u8> {
        self.entries.iter().map(|&(_, count)| count).max()
    }
}

impl ParamLookup for CommandTable<'_> {
    fn param_count(&self, command: u8) -> Option<u8> {
        self.get(command)
    }
}
