use winit::keyboard::KeyCode;

use super::KeyEvent;

type Predicate = Box<dyn Fn(&KeyEvent) -> bool + Send + Sync>;

/// Decides whether a listener runs for a given key event.
///
/// Empty character or code sets are accepted and simply never match.
pub enum KeyFilter {
    Any,
    Chars(Vec<char>),
    Codes(Vec<KeyCode>),
    Custom(Predicate),
}

impl KeyFilter {
    pub fn custom(predicate: impl Fn(&KeyEvent) -> bool + Send + Sync + 'static) -> Self {
        KeyFilter::Custom(Box::new(predicate))
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        match self {
            KeyFilter::Any => true,
            KeyFilter::Chars(chars) => event.character.is_some_and(|c| chars.contains(&c)),
            KeyFilter::Codes(codes) => event.code.is_some_and(|code| codes.contains(&code)),
            KeyFilter::Custom(predicate) => predicate(event),
        }
    }
}

impl std::fmt::Debug for KeyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyFilter::Any => f.write_str("Any"),
            KeyFilter::Chars(chars) => f.debug_tuple("Chars").field(chars).finish(),
            KeyFilter::Codes(codes) => f.debug_tuple("Codes").field(codes).finish(),
            KeyFilter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<char> for KeyFilter {
    fn from(c: char) -> Self {
        KeyFilter::Chars(vec![c])
    }
}

impl From<Vec<char>> for KeyFilter {
    fn from(chars: Vec<char>) -> Self {
        KeyFilter::Chars(chars)
    }
}

impl<const N: usize> From<[char; N]> for KeyFilter {
    fn from(chars: [char; N]) -> Self {
        KeyFilter::Chars(chars.to_vec())
    }
}

impl From<KeyCode> for KeyFilter {
    fn from(code: KeyCode) -> Self {
        KeyFilter::Codes(vec![code])
    }
}

impl From<Vec<KeyCode>> for KeyFilter {
    fn from(codes: Vec<KeyCode>) -> Self {
        KeyFilter::Codes(codes)
    }
}

impl<const N: usize> From<[KeyCode; N]> for KeyFilter {
    fn from(codes: [KeyCode; N]) -> Self {
        KeyFilter::Codes(codes.to_vec())
    }
}
