use std::collections::BTreeMap;

use super::types::Command;

/// Commands to issue at given ticks, in insertion order within a tick.
#[derive(Debug, Default, Clone)]
pub struct CommandSchedule {
    commands: BTreeMap<u64, Vec<Command>>,
}

impl CommandSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command to run at the start of `tick`.
    pub fn push(&mut self, tick: u64, command: Command) {
        self.commands.entry(tick).or_default().push(command);
    }

    /// Builder-style [`CommandSchedule::push`].
    #[must_use]
    pub fn with(mut self, tick: u64, command: Command) -> Self {
        self.push(tick, command);
        self
    }

    /// Commands scheduled for `tick`, empty when none.
    pub fn at(&self, tick: u64) -> &[Command] {
        self.commands.get(&tick).map_or(&[][..], Vec::as_slice)
    }

    /// Total number of scheduled commands.
    pub fn len(&self) -> usize {
        self.commands.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
