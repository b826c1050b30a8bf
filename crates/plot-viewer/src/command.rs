use eframe::egui::{self, Key};
use serde::{Deserialize, Serialize};

/// Everything the viewer can be told to do by a key press or toolbar button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    ZoomIn,
    ZoomOut,
    Reset,
    ToggleFullscreen,
    Close,
    CopyImage,
}

pub const COMMAND_LIST: [(Command, &str); 6] = [
    (Command::ZoomIn, "Zoom in"),
    (Command::ZoomOut, "Zoom out"),
    (Command::Reset, "Fit to frame"),
    (Command::ToggleFullscreen, "Toggle fullscreen"),
    (Command::Close, "Close"),
    (Command::CopyImage, "Copy image"),
];

/// One key name per command, as stored in the config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub zoom_in: String,
    pub zoom_out: String,
    pub reset: String,
    pub toggle_fullscreen: String,
    pub close: String,
    pub copy_image: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            zoom_in: "I".to_owned(),
            zoom_out: "O".to_owned(),
            reset: "R".to_owned(),
            toggle_fullscreen: "F".to_owned(),
            close: "Q".to_owned(),
            copy_image: "C".to_owned(),
        }
    }
}

impl KeyBindings {
    pub fn key_name(&self, command: Command) -> &str {
        match command {
            Command::ZoomIn => &self.zoom_in,
            Command::ZoomOut => &self.zoom_out,
            Command::Reset => &self.reset,
            Command::ToggleFullscreen => &self.toggle_fullscreen,
            Command::Close => &self.close,
            Command::CopyImage => &self.copy_image,
        }
    }

    /// Resolve names into keys. Unknown names are logged and left unbound.
    pub fn resolve(&self) -> Keymap {
        let mut entries = Vec::with_capacity(COMMAND_LIST.len());

        for (command, label) in COMMAND_LIST {
            let name = self.key_name(command);
            match parse_key(name) {
                Some(key) => {
                    if let Some((_, other)) = entries.iter().find(|(k, _)| *k == key) {
                        log::warn!("key '{name}' is bound to both {other:?} and {command:?}, keeping {other:?}");
                        continue;
                    }
                    entries.push((key, command));
                }
                None => log::warn!("unknown key '{name}' for '{label}', command left unbound"),
            }
        }

        Keymap { entries }
    }
}

/// Key names are matched case-insensitively ("f", "F", "escape", "PageUp").
pub fn parse_key(name: &str) -> Option<Key> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Key::ALL
        .iter()
        .copied()
        .find(|key| key.name().eq_ignore_ascii_case(name))
        .or_else(|| Key::from_name(name))
}

#[derive(Clone, Debug, Default)]
pub struct Keymap {
    entries: Vec<(Key, Command)>,
}

impl Keymap {
    pub fn command_for(&self, key: Key) -> Option<Command> {
        self.entries
            .iter()
            .find_map(|(k, command)| (*k == key).then_some(*command))
    }

    pub fn key_for(&self, command: Command) -> Option<Key> {
        self.entries
            .iter()
            .find_map(|(key, c)| (*c == command).then_some(*key))
    }

    /// Commands whose key went down this frame, in press order.
    pub fn pressed(&self, input: &egui::InputState) -> Vec<Command> {
        input
            .events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    repeat,
                    ..
                } => {
                    let command = self.command_for(*key)?;
                    // Holding a zoom key keeps zooming; everything else fires once.
                    let repeatable = matches!(command, Command::ZoomIn | Command::ZoomOut);
                    (!*repeat || repeatable).then_some(command)
                }
                _ => None,
            })
            .collect()
    }

    /// Tooltip text such as "Zoom in (I)".
    pub fn describe(&self, command: Command) -> String {
        let label = COMMAND_LIST
            .iter()
            .find_map(|(c, label)| (*c == command).then_some(*label))
            .unwrap_or_default();
        match self.key_for(command) {
            Some(key) => format!("{label} ({})", key.name()),
            None => label.to_owned(),
        }
    }
}
