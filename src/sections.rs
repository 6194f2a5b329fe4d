//! Section catalogue and scroll-position tracking.
//!
//! The page is a fixed ordered sequence of named regions. Which one counts
//! as "active" is a pure function of viewport geometry, read through the
//! [`ViewportProbe`] seam so the algorithm can run against the DOM in the
//! browser and against fakes in tests.

/// Vertical scroll offset above which the header switches to its
/// scrolled styling. Exclusive lower bound.
pub const SCROLL_THRESHOLD_PX: f64 = 10.0;

/// Pixels reserved for the fixed header when scrolling to a section.
pub const HEADER_OFFSET_PX: f64 = 80.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SectionId {
    Hero,
    About,
    Experience,
    Projects,
    Contact,
}

impl SectionId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::About => "about",
            Self::Experience => "experience",
            Self::Projects => "projects",
            Self::Contact => "contact",
        }
    }
}

pub struct Section {
    pub id: SectionId,
    pub label: &'static str,
}

/// Page order. Identity is the id; the list never changes at runtime.
pub const SECTIONS: &[Section] = &[
    Section {
        id: SectionId::Hero,
        label: "Home",
    },
    Section {
        id: SectionId::About,
        label: "About",
    },
    Section {
        id: SectionId::Experience,
        label: "Experience",
    },
    Section {
        id: SectionId::Projects,
        label: "Projects",
    },
    Section {
        id: SectionId::Contact,
        label: "Contact",
    },
];

/// Sections offered in the header nav (the logo covers `Hero`).
pub fn nav_sections() -> impl Iterator<Item = &'static Section> {
    SECTIONS.iter().skip(1)
}

/// Read-only viewport geometry. The frontend backs this with the real
/// window and document; tests supply fixed offsets.
pub trait ViewportProbe {
    fn scroll_offset(&self) -> f64;
    fn viewport_height(&self) -> f64;
    /// Viewport-relative top of the section's element, `None` when the
    /// element is not in the document.
    fn section_top(&self, id: SectionId) -> Option<f64>;
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ViewportState {
    pub scrolled_past_threshold: bool,
    pub active_section: SectionId,
    pub pointer: (i32, i32),
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scrolled_past_threshold: false,
            active_section: SectionId::Hero,
            pointer: (0, 0),
        }
    }
}

impl ViewportState {
    /// Recompute the scroll-derived fields from the probe. Pointer data is
    /// carried over untouched; the mousemove handler owns it.
    pub fn on_scroll(self, probe: &impl ViewportProbe) -> Self {
        Self {
            scrolled_past_threshold: scrolled_past_threshold(probe.scroll_offset()),
            active_section: active_section(probe),
            pointer: self.pointer,
        }
    }

    pub fn on_pointer_move(self, x: i32, y: i32) -> Self {
        Self {
            pointer: (x, y),
            ..self
        }
    }
}

pub fn scrolled_past_threshold(offset: f64) -> bool {
    offset > SCROLL_THRESHOLD_PX
}

/// A section qualifies when its top edge sits above the vertical midpoint
/// of the viewport; the last qualifying section in page order wins. With
/// nothing qualifying (or nothing mounted) the answer falls back to the
/// first section, which is also the initial state.
pub fn active_section(probe: &impl ViewportProbe) -> SectionId {
    let midpoint = probe.viewport_height() / 2.0;
    let mut current = SectionId::Hero;
    for section in SECTIONS {
        if let Some(top) = probe.section_top(section.id) {
            if top < midpoint {
                current = section.id;
            }
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProbe {
        offset: f64,
        height: f64,
        tops: Vec<(SectionId, f64)>,
    }

    impl ViewportProbe for FakeProbe {
        fn scroll_offset(&self) -> f64 {
            self.offset
        }

        fn viewport_height(&self) -> f64 {
            self.height
        }

        fn section_top(&self, id: SectionId) -> Option<f64> {
            self.tops
                .iter()
                .find(|(candidate, _)| *candidate == id)
                .map(|(_, top)| *top)
        }
    }

    fn probe_with_tops(tops: Vec<(SectionId, f64)>) -> FakeProbe {
        FakeProbe {
            offset: 0.0,
            height: 800.0,
            tops,
        }
    }

    #[test]
    fn threshold_is_an_exclusive_lower_bound() {
        assert!(!scrolled_past_threshold(0.0));
        assert!(!scrolled_past_threshold(10.0));
        assert!(scrolled_past_threshold(10.5));
        assert!(scrolled_past_threshold(11.0));
    }

    #[test]
    fn last_qualifying_section_wins() {
        let probe = probe_with_tops(vec![
            (SectionId::Hero, -50.0),
            (SectionId::About, 200.0),
            (SectionId::Experience, 900.0),
            (SectionId::Projects, 1500.0),
            (SectionId::Contact, 2200.0),
        ]);

        assert_eq!(active_section(&probe), SectionId::About);
    }

    #[test]
    fn deep_scroll_activates_the_lowest_qualifying_section() {
        let probe = probe_with_tops(vec![
            (SectionId::Hero, -2100.0),
            (SectionId::About, -1800.0),
            (SectionId::Experience, -900.0),
            (SectionId::Projects, 150.0),
            (SectionId::Contact, 820.0),
        ]);

        assert_eq!(active_section(&probe), SectionId::Projects);
    }

    #[test]
    fn no_qualifying_section_falls_back_to_hero() {
        let probe = probe_with_tops(vec![
            (SectionId::Hero, 600.0),
            (SectionId::About, 1200.0),
        ]);

        assert_eq!(active_section(&probe), SectionId::Hero);
        // Evaluating again with unchanged geometry changes nothing.
        assert_eq!(active_section(&probe), SectionId::Hero);
    }

    #[test]
    fn missing_elements_do_not_qualify() {
        let probe = probe_with_tops(vec![(SectionId::Hero, -50.0)]);

        assert_eq!(active_section(&probe), SectionId::Hero);
    }

    #[test]
    fn scroll_update_preserves_pointer_position() {
        let probe = FakeProbe {
            offset: 120.0,
            height: 800.0,
            tops: vec![(SectionId::Hero, -120.0), (SectionId::About, 300.0)],
        };
        let state = ViewportState::default().on_pointer_move(42, 7);

        let state = state.on_scroll(&probe);

        assert!(state.scrolled_past_threshold);
        assert_eq!(state.active_section, SectionId::About);
        assert_eq!(state.pointer, (42, 7));
    }

    #[test]
    fn initial_state_starts_at_hero_and_unscrolled() {
        let state = ViewportState::default();

        assert_eq!(state.active_section, SectionId::Hero);
        assert!(!state.scrolled_past_threshold);
    }

    #[test]
    fn nav_skips_the_hero_section() {
        let ids: Vec<SectionId> = nav_sections().map(|section| section.id).collect();

        assert_eq!(
            ids,
            vec![
                SectionId::About,
                SectionId::Experience,
                SectionId::Projects,
                SectionId::Contact,
            ]
        );
    }
}
