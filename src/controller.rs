//! TV navigation controller
//!
//! Owns the surface, the focus arena and the focus state, and turns events
//! (keys, UI mutations, TV mode changes, timers, debug commands) into focus
//! movement. The controller is synchronous: anything that has to happen
//! later comes back as an [`Effect`] for the runtime to schedule.

use std::fmt::Write as _;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::carousel::{self, SlideLanding, SlideOutcome};
use crate::config::{Config, TimingConfig};
use crate::detection::TvModeEvent;
use crate::dropdown;
use crate::elements::FocusableElements;
use crate::focus::FocusManager;
use crate::keys::{self, KeyEvent, KeyEventKind, NavCommand};
use crate::navigator::{self, Direction, NavigationWeights};
use crate::surface::Surface;
use crate::tree::{NodeId, Tag, UiTree};

/// Lifecycle of remote navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// TV mode is off; keys pass through to the host
    Inactive,
    /// TV mode is on; waiting for the page to settle before the first focus
    Starting,
    /// Keys drive focus
    Active,
}

/// Deferred work, tagged with the generation it was scheduled under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    Startup { generation: u64 },
    Rebuild { generation: u64 },
    SlideLanding {
        generation: u64,
        carousel: NodeId,
        landing: SlideLanding,
    },
}

/// Manual controls, reachable from `Ctrl+Alt+T` and the host's debug hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugCommand {
    Start,
    Stop,
    ShowElements,
    FocusElement(usize),
}

/// Everything the controller reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(KeyEvent),
    /// The host reports that the UI changed
    Mutation,
    TvMode(TvModeEvent),
    Timer(Timer),
    Debug(DebugCommand),
}

/// Side effects for the runtime to perform
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Schedule { after: Duration, timer: Timer },
    Batch(Vec<Effect>),
}

/// Whether the host should suppress its default handling of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Handled,
    Ignored,
}

/// What activating an element does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Navigate(String),
    Click(NodeId),
}

/// Outcome of closing open menus before a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuClose {
    NothingOpen,
    Closed,
    /// Focus was inside a menu that closed and went back to its trigger
    Refocused,
}

pub struct NavigationController<S: Surface> {
    surface: S,
    state: ControllerState,
    elements: FocusableElements,
    focus: FocusManager,
    weights: NavigationWeights,
    timing: TimingConfig,
    startup_generation: u64,
    rebuild_generation: u64,
    slide_generation: u64,
    /// A slide transition is under way; rebuild fallbacks wait for the landing
    pending_slide: bool,
}

impl<S: Surface> NavigationController<S> {
    pub fn new(surface: S, config: &Config) -> Self {
        Self {
            surface,
            state: ControllerState::Inactive,
            elements: FocusableElements::new(),
            focus: FocusManager::new(config.focus.clone()),
            weights: config.navigation.clone(),
            timing: config.timing,
            startup_generation: 0,
            rebuild_generation: 0,
            slide_generation: 0,
            pending_slide: false,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ControllerState::Active
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access for hosts; report changes with [`Event::Mutation`]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn elements(&self) -> &FocusableElements {
        &self.elements
    }

    pub fn current_index(&self) -> Option<usize> {
        self.focus.current_index()
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.focus.current_node(&self.elements)
    }

    /// Route any event
    pub fn handle_event(&mut self, event: Event) -> Effect {
        match event {
            Event::Key(key) => self.handle_key(&key).1,
            Event::Mutation => self.on_mutation(),
            Event::TvMode(TvModeEvent::Ready { is_tv }) | Event::TvMode(TvModeEvent::Changed { is_tv }) => {
                self.set_tv_mode(is_tv)
            }
            Event::Timer(timer) => self.on_timer(timer),
            Event::Debug(command) => self.handle_debug(command),
        }
    }

    /// Examine a key event
    ///
    /// Recognized keys are reported as handled for every phase so the host
    /// suppresses its defaults; only key-down moves focus.
    pub fn handle_key(&mut self, event: &KeyEvent) -> (KeyDisposition, Effect) {
        if event.is_debug_toggle() {
            let effect = if event.kind == KeyEventKind::Down {
                if self.is_active() {
                    self.handle_debug(DebugCommand::Stop)
                } else {
                    self.handle_debug(DebugCommand::Start)
                }
            } else {
                Effect::None
            };
            return (KeyDisposition::Handled, effect);
        }

        if !self.is_active() {
            return (KeyDisposition::Ignored, Effect::None);
        }

        let Some(binding) = keys::normalize(event) else {
            return (KeyDisposition::Ignored, Effect::None);
        };
        if event.kind != KeyEventKind::Down {
            trace!("KEY: suppressing {:?} of {}", event.kind, binding.key.name());
            return (KeyDisposition::Handled, Effect::None);
        }

        debug!("KEY: {} ({})", binding.key.name(), binding.vendor.label());
        let effect = match binding.key.command() {
            Some(command) => self.process_navigation_command(command),
            None => Effect::None,
        };
        (KeyDisposition::Handled, effect)
    }

    /// Run a normalized command
    pub fn process_navigation_command(&mut self, command: NavCommand) -> Effect {
        match command {
            NavCommand::Move(direction) => self.navigate(direction),
            NavCommand::Activate => {
                self.activate_current();
                Effect::None
            }
            NavCommand::Back => {
                self.go_back();
                Effect::None
            }
            NavCommand::Media(media) => {
                debug!("KEY: forwarding {:?} to the player", media);
                self.surface.media_command(media);
                Effect::None
            }
        }
    }

    /// React to the resolved TV mode
    pub fn set_tv_mode(&mut self, is_tv: bool) -> Effect {
        match (is_tv, self.state) {
            (true, ControllerState::Inactive) => {
                self.state = ControllerState::Starting;
                self.startup_generation += 1;
                info!(
                    "NAV: TV mode on, starting in {}ms",
                    self.timing.startup_delay_ms
                );
                Effect::Schedule {
                    after: self.timing.startup_delay(),
                    timer: Timer::Startup {
                        generation: self.startup_generation,
                    },
                }
            }
            (true, _) => Effect::None,
            (false, ControllerState::Inactive) => Effect::None,
            (false, _) => {
                self.deactivate();
                Effect::None
            }
        }
    }

    fn on_timer(&mut self, timer: Timer) -> Effect {
        match timer {
            Timer::Startup { generation } => {
                if self.state == ControllerState::Starting && generation == self.startup_generation {
                    self.activate();
                } else {
                    trace!("NAV: stale startup timer {}", generation);
                }
            }
            Timer::Rebuild { generation } => {
                if self.is_active() && generation == self.rebuild_generation {
                    self.rebuild();
                } else {
                    trace!("NAV: skipping superseded rebuild {}", generation);
                }
            }
            Timer::SlideLanding {
                generation,
                carousel,
                landing,
            } => {
                if self.is_active() && generation == self.slide_generation {
                    self.land_on_slide(carousel, landing);
                } else {
                    trace!("CAROUSEL: stale landing {}", generation);
                }
            }
        }
        Effect::None
    }

    fn on_mutation(&mut self) -> Effect {
        if !self.is_active() {
            return Effect::None;
        }
        self.rebuild_generation += 1;
        trace!("NAV: mutation, rebuild {} scheduled", self.rebuild_generation);
        Effect::Schedule {
            after: self.timing.mutation_debounce(),
            timer: Timer::Rebuild {
                generation: self.rebuild_generation,
            },
        }
    }

    pub fn handle_debug(&mut self, command: DebugCommand) -> Effect {
        match command {
            DebugCommand::Start => {
                if !self.is_active() {
                    info!("NAV: started manually");
                    self.activate();
                }
            }
            DebugCommand::Stop => {
                if self.state != ControllerState::Inactive {
                    info!("NAV: stopped manually");
                    self.deactivate();
                }
            }
            DebugCommand::ShowElements => {
                self.show_elements();
            }
            DebugCommand::FocusElement(index) => {
                self.focus.set_focus(&self.elements, &mut self.surface, index);
            }
        }
        Effect::None
    }

    /// Table of the focus arena, also written to the log
    pub fn show_elements(&self) -> String {
        let mut table = String::new();
        let current = self.focus.current_index();
        for element in self.elements.iter() {
            let marker = if current == Some(element.index) { '*' } else { ' ' };
            let _ = writeln!(
                table,
                "{}{:>3} {:<9} ({:>6.0},{:>6.0} {:>5.0}x{:<5.0}) {}",
                marker,
                element.index,
                element.section.label(),
                element.rect.left,
                element.rect.top,
                element.rect.width,
                element.rect.height,
                element.label
            );
        }
        info!("NAV: {} focusable elements", self.elements.len());
        for line in table.lines() {
            info!("NAV: {}", line);
        }
        table
    }

    fn activate(&mut self) {
        self.state = ControllerState::Active;
        self.pending_slide = false;
        self.elements.update_focusable_elements(self.surface.tree());
        info!("NAV: active with {} elements", self.elements.len());
        if !self.elements.is_empty() {
            self.focus.set_focus(&self.elements, &mut self.surface, 0);
        }
    }

    fn deactivate(&mut self) {
        self.focus.blur(&self.elements, &mut self.surface);
        self.state = ControllerState::Inactive;
        self.pending_slide = false;
        // Invalidate everything in flight
        self.startup_generation += 1;
        self.rebuild_generation += 1;
        self.slide_generation += 1;
        info!("NAV: inactive");
    }

    /// Rebuild the arena and re-point focus at the same node
    pub fn rebuild(&mut self) {
        let previous = self.focus.current_node(&self.elements);
        self.elements.update_focusable_elements(self.surface.tree());

        match previous.and_then(|node| self.elements.index_of(node)) {
            Some(index) => self.focus.reindex(Some(index)),
            None if self.pending_slide => {
                trace!("NAV: focus lost during slide transition, waiting for landing");
                self.focus.reindex(None);
            }
            None if self.elements.is_empty() => {
                debug!("NAV: no focusable elements after rebuild");
                self.focus.reindex(None);
            }
            None => {
                debug!("NAV: focused element gone, falling back to 0");
                self.focus.set_focus(&self.elements, &mut self.surface, 0);
            }
        }
    }

    fn focus_index(&mut self, index: usize) -> bool {
        self.focus.set_focus(&self.elements, &mut self.surface, index)
    }

    fn navigate(&mut self, direction: Direction) -> Effect {
        if self.pending_slide {
            debug!("NAV: {} absorbed during slide transition", direction.label());
            return Effect::None;
        }
        let Some(mut current) = self.focus.current_index() else {
            if !self.elements.is_empty() {
                self.focus_index(0);
            }
            return Effect::None;
        };

        if !direction.is_vertical() {
            match self.close_open_menus() {
                MenuClose::Refocused => return Effect::None,
                MenuClose::Closed => match self.focus.current_index() {
                    Some(index) => current = index,
                    None => return Effect::None,
                },
                MenuClose::NothingOpen => {}
            }
        }

        if direction == Direction::Down && self.enter_open_menu(current) {
            return Effect::None;
        }

        if let Some(next) =
            navigator::find_next_in_direction(&self.elements, current, direction, &self.weights)
        {
            debug!("NAV: {} from {} to {}", direction.label(), current, next);
            self.focus_index(next);
            return Effect::None;
        }

        if direction.is_vertical() {
            debug!("NAV: nothing {} of {}", direction.label(), current);
            return Effect::None;
        }

        match carousel::navigate_carousel_slide(&mut self.surface, &self.elements, current, direction) {
            SlideOutcome::Transitioned(step) => {
                let Some(carousel) = self.elements.get(current).and_then(|e| e.carousel) else {
                    return Effect::None;
                };
                self.slide_generation += 1;
                self.pending_slide = true;
                Effect::Schedule {
                    after: self.timing.slide_delay(),
                    timer: Timer::SlideLanding {
                        generation: self.slide_generation,
                        carousel,
                        landing: step.landing(),
                    },
                }
            }
            SlideOutcome::Absorbed | SlideOutcome::NotApplicable => {
                debug!("NAV: nothing {} of {}", direction.label(), current);
                Effect::None
            }
        }
    }

    /// Down on the trigger of an open menu goes to the menu's first item
    fn enter_open_menu(&mut self, current: usize) -> bool {
        let Some(trigger) = self.elements.get(current).map(|e| e.node) else {
            return false;
        };
        let tree = self.surface.tree();
        if !tree.get(trigger).is_some_and(dropdown::is_dropdown_trigger) {
            return false;
        }
        let Some(menu) = dropdown::menu_for(tree, trigger) else {
            return false;
        };
        if !dropdown::is_open(tree, menu) {
            return false;
        }

        let first_item = |elements: &FocusableElements, tree: &UiTree| {
            elements
                .iter()
                .find(|e| tree.contains(menu, e.node))
                .map(|e| e.index)
        };
        let mut target = first_item(&self.elements, self.surface.tree());
        if target.is_none() {
            // Items show up on the next rebuild; do it now
            self.rebuild();
            target = first_item(&self.elements, self.surface.tree());
        }
        match target {
            Some(index) => {
                debug!("DROPDOWN: entering menu {} at {}", menu, index);
                self.focus_index(index)
            }
            None => false,
        }
    }

    fn close_open_menus(&mut self) -> MenuClose {
        let current = self.focus.current_node(&self.elements);
        let inside = current.and_then(|node| dropdown::enclosing_menu(self.surface.tree(), node));
        let closed = dropdown::close_all(&mut self.surface, &mut self.elements);
        if closed.is_empty() {
            return MenuClose::NothingOpen;
        }

        if let Some(index) = current.and_then(|node| self.elements.index_of(node)) {
            self.focus.reindex(Some(index));
            return MenuClose::Closed;
        }

        let trigger = inside
            .filter(|menu| closed.contains(menu))
            .and_then(|menu| dropdown::trigger_for(self.surface.tree(), menu))
            .and_then(|trigger| self.elements.index_of(trigger));
        match trigger {
            Some(index) => {
                self.focus_index(index);
                MenuClose::Refocused
            }
            None => {
                self.focus.reindex(None);
                if !self.elements.is_empty() {
                    self.focus_index(0);
                }
                MenuClose::Refocused
            }
        }
    }

    fn activate_current(&mut self) {
        let Some(node) = self.focus.current_node(&self.elements) else {
            warn!("NAV: activate with nothing focused");
            return;
        };

        if self.surface.tree().get(node).is_some_and(dropdown::is_dropdown_trigger) {
            if dropdown::toggle(&mut self.surface, &mut self.elements, node).is_some() {
                let index = self.elements.index_of(node);
                self.focus.reindex(index);
                return;
            }
        }

        match resolve_activation(self.surface.tree(), node) {
            Activation::Navigate(href) => {
                info!("NAV: navigating to {}", href);
                self.surface.navigate_to(&href);
            }
            Activation::Click(target) => {
                info!("NAV: clicking {}", target);
                self.surface.click(target);
            }
        }
    }

    fn go_back(&mut self) {
        match self.close_open_menus() {
            MenuClose::NothingOpen => {
                info!("NAV: history back");
                self.surface.history_back();
            }
            MenuClose::Closed | MenuClose::Refocused => {
                debug!("DROPDOWN: back closed open menus");
            }
        }
    }

    fn land_on_slide(&mut self, carousel: NodeId, landing: SlideLanding) {
        self.pending_slide = false;
        self.elements.update_focusable_elements(self.surface.tree());
        let target = carousel::landing_target(&self.elements, self.surface.tree(), carousel, landing);
        match target {
            Some(index) => {
                debug!("CAROUSEL: landing on {} ({:?})", index, landing);
                self.focus_index(index);
            }
            None => {
                warn!("CAROUSEL: nothing to land on in {}", carousel);
                let previous = self.focus.current_node(&self.elements);
                match previous.and_then(|node| self.elements.index_of(node)) {
                    Some(index) => self.focus.reindex(Some(index)),
                    None if !self.elements.is_empty() => {
                        self.focus_index(0);
                    }
                    None => self.focus.reindex(None),
                }
            }
        }
    }
}

/// Decide what activating `node` does
///
/// The element's own link wins, then the first link or button inside it.
/// Links that go nowhere (`#`, `javascript:`) are clicked instead.
pub fn resolve_activation(tree: &UiTree, node: NodeId) -> Activation {
    let candidates = std::iter::once(node).chain(tree.descendants(node));
    for id in candidates {
        let Some(n) = tree.get(id) else {
            continue;
        };
        match n.tag {
            Tag::A => {
                if let Some(href) = n.attr("href").filter(|h| is_real_link(h)) {
                    return Activation::Navigate(href.to_string());
                }
                if n.attr("href").is_some() {
                    return Activation::Click(id);
                }
            }
            Tag::Button => return Activation::Click(id),
            _ => {}
        }
    }
    Activation::Click(node)
}

fn is_real_link(href: &str) -> bool {
    let href = href.trim();
    !href.is_empty() && href != "#" && !href.to_ascii_lowercase().starts_with("javascript:")
}
