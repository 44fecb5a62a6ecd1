//! Program lifecycle: `Uninitialized → Loaded → Rendering* → Closed`.
//!
//! The runtime consults this before every app callback so that load and
//! close each run exactly once and no frame is rendered outside
//! `Loaded`/`Rendering`.

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Stage {
    #[default]
    Uninitialized,
    Loaded,
    Rendering,
    Closed,
}

#[derive(Debug, Default)]
pub struct Lifecycle {
    stage: Stage,
    close_requests: u32,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Number of accepted close requests (0 or 1).
    pub fn close_requests(&self) -> u32 {
        self.close_requests
    }

    pub fn close_requested(&self) -> bool {
        self.close_requests > 0
    }

    /// `Uninitialized → Loaded`. Returns false from any other stage.
    pub fn mark_loaded(&mut self) -> bool {
        if self.stage != Stage::Uninitialized {
            return false;
        }
        self.stage = Stage::Loaded;
        true
    }

    /// Enters `Rendering`. Returns false when a frame must not run.
    pub fn begin_frame(&mut self) -> bool {
        match self.stage {
            Stage::Loaded | Stage::Rendering if !self.close_requested() => {
                self.stage = Stage::Rendering;
                true
            }
            _ => false,
        }
    }

    /// Records a close request. Only the first one counts.
    pub fn request_close(&mut self) -> bool {
        if self.close_requested() || self.stage == Stage::Closed {
            return false;
        }
        self.close_requests = 1;
        true
    }

    /// Enters the terminal `Closed` stage. Returns true exactly once.
    pub fn close(&mut self) -> bool {
        if self.stage == Stage::Closed {
            return false;
        }
        self.stage = Stage::Closed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_run() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.stage(), Stage::Uninitialized);
        assert!(!lc.begin_frame());

        assert!(lc.mark_loaded());
        assert_eq!(lc.stage(), Stage::Loaded);

        assert!(lc.begin_frame());
        assert!(lc.begin_frame());
        assert_eq!(lc.stage(), Stage::Rendering);

        assert!(lc.request_close());
        assert!(!lc.begin_frame());

        assert!(lc.close());
        assert_eq!(lc.stage(), Stage::Closed);
    }

    #[test]
    fn load_happens_once() {
        let mut lc = Lifecycle::new();
        assert!(lc.mark_loaded());
        assert!(!lc.mark_loaded());
        lc.begin_frame();
        assert!(!lc.mark_loaded());
    }

    #[test]
    fn close_is_terminal_and_once() {
        let mut lc = Lifecycle::new();
        lc.mark_loaded();
        assert!(lc.close());
        assert!(!lc.close());
        assert!(!lc.begin_frame());
        assert!(!lc.mark_loaded());
        assert!(!lc.request_close());
    }

    #[test]
    fn repeated_close_requests_count_once() {
        let mut lc = Lifecycle::new();
        lc.mark_loaded();
        assert!(lc.request_close());
        assert!(!lc.request_close());
        assert_eq!(lc.close_requests(), 1);
    }

    #[test]
    fn close_without_load_is_allowed() {
        let mut lc = Lifecycle::new();
        assert!(lc.close());
        assert_eq!(lc.stage(), Stage::Closed);
    }
}
