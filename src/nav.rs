use crate::component::{Component, Lifecycle};
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::page::Page;
use crate::state::{lock, Shared};

/// Makes `target` the only active section and link. An unknown target
/// leaves the page untouched; returns whether anything changed.
pub fn activate(page: &mut Page, target: &str) -> bool {
    if !page.has_section(target) {
        log(
            Level::Warn,
            Domain::Nav,
            "unknown_section",
            obj(&[("target", v_str(target))]),
        );
        return false;
    }
    for link in page.nav_links.iter_mut() {
        link.active = link.target == target;
    }
    for section in page.sections.iter_mut() {
        section.active = section.id == target;
    }
    log(
        Level::Debug,
        Domain::Nav,
        "section_activated",
        obj(&[("target", v_str(target))]),
    );
    true
}

pub struct Navigation {
    state: Shared,
    lifecycle: Lifecycle,
}

impl Navigation {
    pub fn new(state: Shared) -> Self {
        Self {
            state,
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn click(&self, target: &str) -> bool {
        if !self.lifecycle.accepts(Domain::Nav, self.name(), "click") {
            return false;
        }
        activate(&mut lock(&self.state).page, target)
    }
}

impl Component for Navigation {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn attach(&self) {
        self.lifecycle.attach();
    }

    fn dispose(&self) {
        self.lifecycle.dispose();
    }

    fn is_attached(&self) -> bool {
        self.lifecycle.is_attached()
    }
}
