// ABOUTME: Reading-mode state machine: Inactive or Active with a snapshot of the replaced page.
// ABOUTME: Entering stores the snapshot, exiting hands it back for restoration; extraction is not involved.

/// Whether reading mode is showing, and what it replaced.
///
/// `S` is whatever the host needs to restore the original view, usually the
/// page markup that the reading view was drawn over.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReadingMode<S> {
    #[default]
    Inactive,
    Active {
        snapshot: S,
    },
}

/// Outcome of [`ReadingMode::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<S> {
    Entered,
    /// Carries the snapshot to restore.
    Exited(S),
}

impl<S> ReadingMode<S> {
    pub fn new() -> Self {
        ReadingMode::Inactive
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ReadingMode::Active { .. })
    }

    /// The stored snapshot while active.
    pub fn snapshot(&self) -> Option<&S> {
        match self {
            ReadingMode::Active { snapshot } => Some(snapshot),
            ReadingMode::Inactive => None,
        }
    }

    /// Enter reading mode. Returns false, keeping the first snapshot, if already active.
    pub fn enter(&mut self, snapshot: S) -> bool {
        if self.is_active() {
            tracing::debug!("reading mode already active");
            return false;
        }
        *self = ReadingMode::Active { snapshot };
        true
    }

    /// Enter reading mode only if `render` succeeds.
    ///
    /// On error the state stays `Inactive` and the error is returned, so the
    /// original page is never replaced by a failed render. Returns `Ok(None)`
    /// without calling `render` when already active.
    pub fn try_enter<T, E, F>(&mut self, snapshot: S, render: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&S) -> Result<T, E>,
    {
        if self.is_active() {
            return Ok(None);
        }
        let view = render(&snapshot)?;
        *self = ReadingMode::Active { snapshot };
        Ok(Some(view))
    }

    /// Leave reading mode, returning the snapshot to restore. `None` if inactive.
    pub fn exit(&mut self) -> Option<S> {
        match std::mem::replace(self, ReadingMode::Inactive) {
            ReadingMode::Active { snapshot } => Some(snapshot),
            ReadingMode::Inactive => None,
        }
    }

    /// Enter with a freshly captured snapshot, or exit if already active.
    pub fn toggle<F>(&mut self, capture: F) -> Transition<S>
    where
        F: FnOnce() -> S,
    {
        match self.exit() {
            Some(snapshot) => Transition::Exited(snapshot),
            None => {
                *self = ReadingMode::Active { snapshot: capture() };
                Transition::Entered
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_enter_exit_restores_snapshot() {
        let mut mode = ReadingMode::new();
        assert!(!mode.is_active());
        assert!(mode.enter("<body>original</body>".to_string()));
        assert!(mode.is_active());
        assert_eq!(
            mode.snapshot().map(String::as_str),
            Some("<body>original</body>")
        );
        assert_eq!(mode.exit().as_deref(), Some("<body>original</body>"));
        assert_eq!(mode, ReadingMode::Inactive);
        assert_eq!(mode.exit(), None);
    }

    #[test]
    fn test_second_enter_keeps_first_snapshot() {
        let mut mode = ReadingMode::new();
        mode.enter(1);
        assert!(!mode.enter(2));
        assert_eq!(mode.exit(), Some(1));
    }

    #[test]
    fn test_failed_render_stays_inactive() {
        let mut mode: ReadingMode<String> = ReadingMode::new();
        let result: Result<Option<String>, &str> =
            mode.try_enter("page".to_string(), |_| Err("no content"));
        assert_eq!(result, Err("no content"));
        assert!(!mode.is_active());

        let view = mode
            .try_enter("page".to_string(), |s| Ok::<_, &str>(format!("reader for {}", s)))
            .unwrap();
        assert_eq!(view.as_deref(), Some("reader for page"));
        assert!(mode.is_active());

        let again = mode
            .try_enter("other".to_string(), |_| Ok::<_, &str>(String::new()))
            .unwrap();
        assert_eq!(again, None);
        assert_eq!(mode.snapshot().map(String::as_str), Some("page"));
    }

    #[test]
    fn test_toggle() {
        let mut mode = ReadingMode::new();
        assert_eq!(mode.toggle(|| "a"), Transition::Entered);
        assert_eq!(mode.toggle(|| "b"), Transition::Exited("a"));
        assert!(!mode.is_active());
    }
}
