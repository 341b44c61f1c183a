//! Mapping from key presses to navigation commands.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A command the browser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationCommand {
    /// Play the active sample.
    Play,
    /// Select the next sample, then play it.
    MoveDown,
    /// Select the previous sample, then play it.
    MoveUp,
    /// Show the next page.
    NextPage,
    /// Show the previous page.
    PreviousPage,
}

impl NavigationCommand {
    /// Whether the newly active sample is played after the command runs.
    #[must_use]
    pub const fn plays_after(self) -> bool {
        matches!(self, Self::MoveDown | Self::MoveUp)
    }
}

/// Keys bound to each command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Play the active sample.
    pub play: char,
    /// Move down and play.
    pub move_down: char,
    /// Move up and play.
    pub move_up: char,
    /// Next page.
    pub next_page: char,
    /// Previous page.
    pub previous_page: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            play: ' ',
            move_down: 'j',
            move_up: 'k',
            next_page: 'n',
            previous_page: 'p',
        }
    }
}

impl KeyBindings {
    fn table(&self) -> [(char, NavigationCommand); 5] {
        [
            (self.play, NavigationCommand::Play),
            (self.move_down, NavigationCommand::MoveDown),
            (self.move_up, NavigationCommand::MoveUp),
            (self.next_page, NavigationCommand::NextPage),
            (self.previous_page, NavigationCommand::PreviousPage),
        ]
    }

    /// Command bound to `key`, if any.
    #[must_use]
    pub fn command_for(&self, key: char) -> Option<NavigationCommand> {
        self.table()
            .into_iter()
            .find(|&(bound, _)| bound == key)
            .map(|(_, command)| command)
    }

    /// Reject bindings that put two commands on one key.
    pub fn validate(&self) -> Result<()> {
        let table = self.table();
        for (i, (key, command)) in table.iter().enumerate() {
            if let Some((_, other)) = table[i + 1..].iter().find(|(k, _)| k == key) {
                return Err(Error::Configuration(format!(
                    "Key {key:?} is bound to both {command:?} and {other:?}"
                )));
            }
        }
        Ok(())
    }
}
