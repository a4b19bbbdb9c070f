//! Keyboard input: engine key events, filters and the listener registry.
//!
//! Raw `winit` keyboard input is translated into [`KeyEvent`]s tagged with a
//! [`KeyPhase`], then dispatched through a [`ListenerRegistry`].

mod filter;
mod registry;

pub use filter::KeyFilter;
pub use registry::{KeyCallback, ListenerRegistry};

use winit::event::ElementState;
use winit::keyboard::{Key, KeyCode, PhysicalKey};

/// The three stages a key stroke is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    /// A character was produced.
    Typed,
    Pressed,
    Released,
}

impl std::fmt::Display for KeyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            KeyPhase::Typed => "typed",
            KeyPhase::Pressed => "pressed",
            KeyPhase::Released => "released",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// Physical key, when the platform could identify it.
    pub code: Option<KeyCode>,
    /// Character the key resolves to under the current layout, if any.
    pub character: Option<char>,
    pub repeat: bool,
}

impl KeyEvent {
    pub fn char(character: char) -> Self {
        Self {
            character: Some(character),
            ..Self::default()
        }
    }

    pub fn code(code: KeyCode) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }
}

/// Translates one `winit` key event into the phases it should be dispatched as.
pub fn translate_winit_key(event: &winit::event::KeyEvent) -> Vec<(KeyPhase, KeyEvent)> {
    key_phases(
        event.state,
        event.physical_key,
        &event.logical_key,
        event.text.as_deref(),
        event.repeat,
    )
}

/// Splits a key stroke into phases.
///
/// A press yields `Pressed` followed by one `Typed` per character of `text`;
/// a release yields `Released`.
pub fn key_phases(
    state: ElementState,
    physical_key: PhysicalKey,
    logical_key: &Key,
    text: Option<&str>,
    repeat: bool,
) -> Vec<(KeyPhase, KeyEvent)> {
    let code = match physical_key {
        PhysicalKey::Code(code) => Some(code),
        PhysicalKey::Unidentified(_) => None,
    };
    let character = match logical_key {
        Key::Character(text) => text.chars().next(),
        _ => None,
    };
    let base = KeyEvent {
        code,
        character,
        repeat,
    };

    match state {
        ElementState::Released => vec![(KeyPhase::Released, base)],
        ElementState::Pressed => {
            let mut out = vec![(KeyPhase::Pressed, base)];
            if let Some(text) = text {
                out.extend(text.chars().map(|c| {
                    (
                        KeyPhase::Typed,
                        KeyEvent {
                            character: Some(c),
                            ..base
                        },
                    )
                }));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(KeyPhase::Typed.to_string(), "typed");
        assert_eq!(KeyPhase::Released.to_string(), "released");
    }

    #[test]
    fn test_constructors() {
        let event = KeyEvent::char('q');
        assert_eq!(event.character, Some('q'));
        assert_eq!(event.code, None);
        assert!(!event.repeat);

        let event = KeyEvent::code(KeyCode::Enter);
        assert_eq!(event.code, Some(KeyCode::Enter));
        assert_eq!(event.character, None);
    }

    #[test]
    fn test_press_yields_pressed_then_typed() {
        let phases = key_phases(
            ElementState::Pressed,
            PhysicalKey::Code(KeyCode::KeyA),
            &Key::Character("a".into()),
            Some("a"),
            false,
        );
        let a = KeyEvent {
            code: Some(KeyCode::KeyA),
            character: Some('a'),
            repeat: false,
        };
        assert_eq!(phases, vec![(KeyPhase::Pressed, a), (KeyPhase::Typed, a)]);
    }

    #[test]
    fn test_press_without_text_is_not_typed() {
        let phases = key_phases(
            ElementState::Pressed,
            PhysicalKey::Code(KeyCode::Escape),
            &Key::Named(winit::keyboard::NamedKey::Escape),
            None,
            true,
        );
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].0, KeyPhase::Pressed);
        assert_eq!(phases[0].1.code, Some(KeyCode::Escape));
        assert_eq!(phases[0].1.character, None);
        assert!(phases[0].1.repeat);
    }

    #[test]
    fn test_multi_char_text_types_each_char() {
        let phases = key_phases(
            ElementState::Pressed,
            PhysicalKey::Code(KeyCode::Quote),
            &Key::Character("e".into()),
            Some("\u{b4}e"),
            false,
        );
        let typed: Vec<_> = phases
            .iter()
            .filter(|(phase, _)| *phase == KeyPhase::Typed)
            .map(|(_, event)| event.character)
            .collect();
        assert_eq!(typed, vec![Some('\u{b4}'), Some('e')]);
        assert_eq!(phases[0].1.character, Some('e'));
    }

    #[test]
    fn test_release_yields_released_only() {
        let phases = key_phases(
            ElementState::Released,
            PhysicalKey::Code(KeyCode::KeyB),
            &Key::Character("b".into()),
            None,
            false,
        );
        let b = KeyEvent {
            code: Some(KeyCode::KeyB),
            character: Some('b'),
            repeat: false,
        };
        assert_eq!(phases, vec![(KeyPhase::Released, b)]);
    }
}
