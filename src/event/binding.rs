//! Key-match criteria and the key-handler registry.
//!
//! Handlers declared with `on_key` are registered here when their component
//! renders and removed when it is destroyed. Dispatch walks handlers in
//! registration order and runs every one whose [`KeyMatch`] accepts the event.

use std::rc::Rc;

use super::input::{Key, KeyEvent, KeyEventKind, Modifiers};
use crate::component::InstanceId;

// ---------------------------------------------------------------------------
// KeyMatch
// ---------------------------------------------------------------------------

/// Criteria a key event has to satisfy.
///
/// Unset criteria match anything. Modifiers are "at least" by default: a
/// match requiring `CTRL` also accepts `CTRL+SHIFT`. In strict mode the
/// modifier set has to be equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMatch {
    pub code: Option<Key>,
    pub character: Option<char>,
    pub modifiers: Modifiers,
    pub strict: bool,
    pub kind: KeyEventKind,
}

impl KeyMatch {
    /// Match any pressed key.
    pub fn any() -> Self {
        Self {
            code: None,
            character: None,
            modifiers: Modifiers::NONE,
            strict: false,
            kind: KeyEventKind::Press,
        }
    }

    /// Match a key code. Letters ignore case.
    pub fn code(key: Key) -> Self {
        Self {
            code: Some(key),
            ..Self::any()
        }
    }

    /// Match a typed character exactly.
    pub fn character(c: char) -> Self {
        Self {
            character: Some(c),
            ..Self::any()
        }
    }

    /// Require modifiers (builder).
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Require the exact modifier set (builder).
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Match a different event phase (builder).
    pub fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether `event` satisfies every criterion.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.kind != self.kind {
            return false;
        }
        if let Some(code) = self.code {
            if !code.same_code(event.code) {
                return false;
            }
        }
        if let Some(c) = self.character {
            if event.code.character() != Some(c) {
                return false;
            }
        }
        if self.strict {
            event.modifiers == self.modifiers
        } else {
            event.modifiers.contains(self.modifiers)
        }
    }
}

impl Default for KeyMatch {
    fn default() -> Self {
        Self::any()
    }
}

// ---------------------------------------------------------------------------
// KeyHandlerRegistry
// ---------------------------------------------------------------------------

/// Callback stored for a registered handler. Returns `false` when the owning
/// instance could not be reached.
pub type KeyCallback = Rc<dyn Fn(&KeyEvent) -> bool>;

struct RegisteredHandler {
    owner: InstanceId,
    owner_type: &'static str,
    member: String,
    matcher: KeyMatch,
    callback: KeyCallback,
}

/// A handler selected for dispatch.
pub struct MatchedHandler {
    pub owner_type: &'static str,
    pub member: String,
    pub callback: KeyCallback,
}

/// Handlers grouped by owning instance, in registration order.
#[derive(Default)]
pub struct KeyHandlerRegistry {
    handlers: Vec<RegisteredHandler>,
}

impl KeyHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `owner`.
    pub fn register(
        &mut self,
        owner: InstanceId,
        owner_type: &'static str,
        member: impl Into<String>,
        matcher: KeyMatch,
        callback: KeyCallback,
    ) {
        self.handlers.push(RegisteredHandler {
            owner,
            owner_type,
            member: member.into(),
            matcher,
            callback,
        });
    }

    /// Remove every handler of `owner`. Returns how many were removed.
    pub fn unregister(&mut self, owner: InstanceId) -> usize {
        let before = self.handlers.len();
        self.handlers.retain(|h| h.owner != owner);
        before - self.handlers.len()
    }

    /// Handlers accepting `event`, cloned out so callers can run them
    /// without holding the registry.
    pub fn matching(&self, event: &KeyEvent) -> Vec<MatchedHandler> {
        self.handlers
            .iter()
            .filter(|h| h.matcher.matches(event))
            .map(|h| MatchedHandler {
                owner_type: h.owner_type,
                member: h.member.clone(),
                callback: Rc::clone(&h.callback),
            })
            .collect()
    }

    /// Number of handlers registered for `owner`.
    pub fn count_for(&self, owner: InstanceId) -> usize {
        self.handlers.iter().filter(|h| h.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for KeyHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.handlers
                    .iter()
                    .map(|h| format!("{}::{} {:?}", h.owner_type, h.member, h.matcher)),
            )
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn press(key: Key, modifiers: Modifiers) -> KeyEvent {
        KeyEvent::new(key, modifiers)
    }

    // ── KeyMatch ─────────────────────────────────────────────────────

    #[test]
    fn any_matches_every_press() {
        let m = KeyMatch::any();
        assert!(m.matches(&press(Key::Enter, Modifiers::NONE)));
        assert!(m.matches(&press(Key::Char('x'), Modifiers::CTRL)));
    }

    #[test]
    fn kind_must_match() {
        let m = KeyMatch::code(Key::Enter);
        let release = press(Key::Enter, Modifiers::NONE).with_kind(KeyEventKind::Release);
        assert!(!m.matches(&release));
        assert!(m.with_kind(KeyEventKind::Release).matches(&release));
    }

    #[test]
    fn code_ignores_case_character_does_not() {
        let by_code = KeyMatch::code(Key::Char('a'));
        assert!(by_code.matches(&press(Key::Char('A'), Modifiers::SHIFT)));

        let by_char = KeyMatch::character('a');
        assert!(by_char.matches(&press(Key::Char('a'), Modifiers::NONE)));
        assert!(!by_char.matches(&press(Key::Char('A'), Modifiers::SHIFT)));
    }

    #[test]
    fn lenient_modifiers_accept_extras() {
        let m = KeyMatch::code(Key::Char('s')).with_modifiers(Modifiers::CTRL);
        assert!(m.matches(&press(Key::Char('s'), Modifiers::CTRL)));
        assert!(m.matches(&press(Key::Char('s'), Modifiers::CTRL | Modifiers::SHIFT)));
        assert!(!m.matches(&press(Key::Char('s'), Modifiers::NONE)));
    }

    #[test]
    fn strict_modifiers_require_equality() {
        let m = KeyMatch::code(Key::Char('s'))
            .with_modifiers(Modifiers::CTRL)
            .strict();
        assert!(m.matches(&press(Key::Char('s'), Modifiers::CTRL)));
        assert!(!m.matches(&press(Key::Char('s'), Modifiers::CTRL | Modifiers::SHIFT)));

        let bare = KeyMatch::code(Key::Enter).strict();
        assert!(!bare.matches(&press(Key::Enter, Modifiers::ALT)));
    }

    // ── Registry ─────────────────────────────────────────────────────

    #[test]
    fn register_match_unregister() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let owner = InstanceId::from_raw(7);

        let mut reg = KeyHandlerRegistry::new();
        reg.register(
            owner,
            "Editor",
            "save",
            KeyMatch::code(Key::Char('s')).with_modifiers(Modifiers::CTRL),
            Rc::new(move |_| {
                counter.set(counter.get() + 1);
                true
            }),
        );
        assert_eq!(reg.count_for(owner), 1);

        let matched = reg.matching(&press(Key::Char('s'), Modifiers::CTRL));
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].member, "save");
        (matched[0].callback)(&press(Key::Char('s'), Modifiers::CTRL));
        assert_eq!(hits.get(), 1);

        assert!(reg.matching(&press(Key::Char('s'), Modifiers::NONE)).is_empty());

        assert_eq!(reg.unregister(owner), 1);
        assert!(reg.is_empty());
    }

    #[test]
    fn unregister_only_touches_owner() {
        let mut reg = KeyHandlerRegistry::new();
        let a = InstanceId::from_raw(1);
        let b = InstanceId::from_raw(2);
        reg.register(a, "A", "x", KeyMatch::any(), Rc::new(|_| true));
        reg.register(b, "B", "y", KeyMatch::any(), Rc::new(|_| true));
        reg.register(a, "A", "z", KeyMatch::any(), Rc::new(|_| true));

        assert_eq!(reg.unregister(a), 2);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.count_for(b), 1);
    }
}
