//! View phase machine
//!
//! Every page moves through the same phases: `Loading` while a session
//! transition is being resolved, then either `Demo` (guest) or
//! `Authenticated` (live data). Demo and Authenticated never connect
//! directly; every transition passes back through Loading, which clears
//! the previous session's entities so they can never bleed across.

/// What a page is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPhase {
    /// Session transition in progress; nothing to render yet.
    #[default]
    Loading,
    /// Guest fallback: fixed read-only data.
    Demo,
    /// Live data for the signed-in user.
    Authenticated,
}

/// Phase plus the entities currently on screen.
#[derive(Debug, Clone, Default)]
pub struct ViewState<T> {
    phase: ViewPhase,
    entities: Vec<T>,
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self {
            phase: ViewPhase::Loading,
            entities: Vec::new(),
        }
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ViewPhase::Loading
    }

    pub fn entities(&self) -> &[T] {
        &self.entities
    }

    /// Enter `Loading`, dropping whatever was on screen.
    pub fn begin_loading(&mut self) {
        self.phase = ViewPhase::Loading;
        self.entities.clear();
    }

    /// Enter `Demo` with the guest dataset.
    pub fn show_demo(&mut self, entities: Vec<T>) {
        self.phase = ViewPhase::Demo;
        self.entities = entities;
    }

    /// Enter `Authenticated` with a live snapshot.
    pub fn show_authenticated(&mut self, entities: Vec<T>) {
        self.phase = ViewPhase::Authenticated;
        self.entities = entities;
    }

    /// Replace entities wholesale without changing phase.
    pub fn replace_entities(&mut self, entities: Vec<T>) {
        self.entities = entities;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_loading_and_empty() {
        let state: ViewState<u32> = ViewState::new();
        assert_eq!(state.phase(), ViewPhase::Loading);
        assert!(state.entities().is_empty());
    }

    #[test]
    fn test_loading_clears_entities() {
        let mut state = ViewState::new();
        state.show_demo(vec![1, 2, 3]);
        assert_eq!(state.phase(), ViewPhase::Demo);

        state.begin_loading();
        assert!(state.is_loading());
        assert!(state.entities().is_empty());
    }

    #[test]
    fn test_authenticated_snapshot_replaces_wholesale() {
        let mut state = ViewState::new();
        state.show_authenticated(vec![1, 2]);
        state.replace_entities(vec![9]);

        assert_eq!(state.phase(), ViewPhase::Authenticated);
        assert_eq!(state.entities(), &[9]);
    }
}
