//! Capture-phase click interception for the site's "download" affordance.
//!
//! Class names on the page are volatile; visible text and `aria-label` are not, so a
//! click qualifies when the target (or one of its nearest ancestors) is labeled with a
//! localized "download" verb. A qualifying click is suppressed and starts a short
//! debounce window that swallows the duplicate events fired for the same action.

use scraper::ElementRef;
use std::time::{Duration, Instant};

use crate::clock::SharedClock;
use crate::page::site::is_download_label;
use crate::page::text_content;

/// Levels inspected, the starting element included.
const MAX_DEPTH: usize = 5;

/// A click dispatched to the page, with the suppression flags a DOM event carries.
#[derive(Debug)]
pub struct ClickEvent<'a> {
    target: ElementRef<'a>,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl<'a> ClickEvent<'a> {
    pub fn new(target: ElementRef<'a>) -> Self {
        Self {
            target,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    pub fn target(&self) -> ElementRef<'a> {
        self.target
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.immediate_propagation_stopped = true;
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }

    /// True once every native handler has been cut off.
    pub fn is_suppressed(&self) -> bool {
        self.default_prevented && self.propagation_stopped && self.immediate_propagation_stopped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    /// Not a download affordance; the page handles the click.
    Ignored,
    /// A previous action is still in its debounce window; the page handles the click.
    Debounced,
    /// Suppressed; the caller owns the action now.
    Intercepted,
}

pub struct ClickInterceptor {
    debounce: Duration,
    clock: SharedClock,
    debounced_until: Option<Instant>,
}

impl ClickInterceptor {
    pub fn new(debounce: Duration, clock: SharedClock) -> Self {
        Self {
            debounce,
            clock,
            debounced_until: None,
        }
    }

    pub fn is_debounced(&self) -> bool {
        self.debounced_until
            .is_some_and(|until| self.clock.now() < until)
    }

    pub fn intercept(&mut self, event: &mut ClickEvent<'_>) -> Interception {
        if self.is_debounced() {
            return Interception::Debounced;
        }
        self.debounced_until = None;

        if !is_download_affordance(event.target()) {
            return Interception::Ignored;
        }

        event.prevent_default();
        event.stop_propagation();
        event.stop_immediate_propagation();
        self.debounced_until = Some(self.clock.now() + self.debounce);
        Interception::Intercepted
    }
}

fn is_clickable(el: ElementRef<'_>) -> bool {
    let value = el.value();
    matches!(value.name(), "button" | "a") || value.attr("role") == Some("button")
}

fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

/// Walks up at most [`MAX_DEPTH`] levels from the nearest clickable ancestor (or the
/// target itself) looking for a download label in text or `aria-label`.
pub fn is_download_affordance(target: ElementRef<'_>) -> bool {
    let start = std::iter::successors(Some(target), |el| parent_element(*el))
        .find(|el| is_clickable(*el))
        .unwrap_or(target);

    std::iter::successors(Some(start), |el| parent_element(*el))
        .take(MAX_DEPTH)
        .any(|el| {
            is_download_label(&text_content(el))
                || el.value().attr("aria-label").is_some_and(is_download_label)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::page::PageSnapshot;
    use std::sync::Arc;

    const PAGE: &str = r#"<html><body>
        <div data-test-id="closeup-actions">
          <button id="dl" class="x1a2b"><span><svg><path id="icon"/></svg></span><span>Download image</span></button>
          <button id="aria" aria-label="Bild herunterladen"><svg><path id="aria-icon"/></svg></button>
        </div>
        <div><div><div>
          <div id="menu">
            <div role="button" aria-label="More options"><svg><path id="dots"/></svg></div>
            <button id="downloads">Downloads</button>
          </div>
        </div></div></div>
        <section><div><div><div><div><div><span id="deep">far away</span></div></div></div></div></div>
          <p>Download</p></section>
      </body></html>"#;

    fn page() -> PageSnapshot {
        PageSnapshot::parse("https://www.pinterest.com/pin/1/", PAGE).unwrap()
    }

    #[test]
    fn nested_icon_inside_labeled_button_qualifies() {
        let p = page();
        assert!(is_download_affordance(p.find("#icon").unwrap()));
        assert!(is_download_affordance(p.find("#aria-icon").unwrap()));
    }

    #[test]
    fn unrelated_buttons_do_not_qualify() {
        let p = page();
        assert!(!is_download_affordance(p.find("#dots").unwrap()));
        assert!(!is_download_affordance(p.find("#downloads").unwrap()));
    }

    #[test]
    fn walk_is_bounded() {
        let p = page();
        assert!(!is_download_affordance(p.find("#deep").unwrap()));
    }

    #[test]
    fn intercept_suppresses_and_debounces() {
        let clock = ManualClock::new();
        let mut interceptor = ClickInterceptor::new(Duration::from_millis(500), Arc::new(clock.clone()));
        let p = page();
        let target = p.find("#icon").unwrap();

        let mut first = ClickEvent::new(target);
        assert_eq!(interceptor.intercept(&mut first), Interception::Intercepted);
        assert!(first.is_suppressed());

        clock.advance(Duration::from_millis(100));
        let mut second = ClickEvent::new(target);
        assert_eq!(interceptor.intercept(&mut second), Interception::Debounced);
        assert!(!second.default_prevented());
        assert!(!second.propagation_stopped());

        clock.advance(Duration::from_millis(500));
        let mut third = ClickEvent::new(target);
        assert_eq!(interceptor.intercept(&mut third), Interception::Intercepted);
        assert!(third.is_suppressed());
    }

    #[test]
    fn ignored_click_leaves_event_untouched() {
        let clock = ManualClock::new();
        let mut interceptor = ClickInterceptor::new(Duration::from_millis(500), Arc::new(clock));
        let p = page();
        let mut event = ClickEvent::new(p.find("#dots").unwrap());
        assert_eq!(interceptor.intercept(&mut event), Interception::Ignored);
        assert!(!event.default_prevented());
        assert!(!interceptor.is_debounced());
    }
}
