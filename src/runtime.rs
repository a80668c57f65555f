use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::controller::{Effect, Event, KeyDisposition, NavigationController};
use crate::detection::TvModeEvent;
use crate::keys::KeyEvent;
use crate::surface::Surface;

/// Event loop around a [`NavigationController`]
///
/// The Runtime is responsible for:
/// - Feeding events to the controller one at a time
/// - Executing the effects it returns (timers post back as events)
/// - Forwarding TV mode changes from detection into the event stream
pub struct Runtime<S: Surface> {
    controller: NavigationController<S>,

    /// Channel timers and watchers post events to
    event_tx: mpsc::UnboundedSender<Event>,
    event_rx: mpsc::UnboundedReceiver<Event>,
}

impl<S: Surface> Runtime<S> {
    pub fn new(controller: NavigationController<S>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            event_tx,
            event_rx,
        }
    }

    pub fn controller(&self) -> &NavigationController<S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut NavigationController<S> {
        &mut self.controller
    }

    /// Sender for hosts that report events from elsewhere (mutation observers)
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.event_tx.clone()
    }

    /// Run an event through the controller and execute the resulting effect
    pub fn dispatch(&mut self, event: Event) {
        trace!("EVENT: Dispatching {:?}", event);
        let effect = self.controller.handle_event(event);
        self.execute_effect(effect);
    }

    /// Dispatch a key and report whether the host should suppress it
    pub fn dispatch_key(&mut self, key: KeyEvent) -> KeyDisposition {
        trace!("EVENT: Dispatching key {:?}", key);
        let (disposition, effect) = self.controller.handle_key(&key);
        self.execute_effect(effect);
        disposition
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Schedule { after, timer } => {
                trace!("EFFECT: {:?} in {:?}", timer, after);
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    // Receiver gone means the runtime was dropped
                    let _ = tx.send(Event::Timer(timer));
                });
            }
            Effect::Batch(effects) => {
                for effect in effects {
                    self.execute_effect(effect);
                }
            }
        }
    }

    /// Dispatch every event already queued, without waiting
    ///
    /// Returns how many events were processed.
    pub fn process_events(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.dispatch(event);
            count += 1;
        }
        count
    }

    /// Wait for the next queued event
    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    /// Wait for one event and dispatch it
    pub async fn step(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Forward detection events into this runtime's queue
    pub fn watch_tv_mode(&self, mut events: broadcast::Receiver<TvModeEvent>) -> JoinHandle<()> {
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        debug!("DETECT: forwarding {:?}", event);
                        if tx.send(Event::TvMode(event)).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("DETECT: watcher lagged, {} events skipped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
