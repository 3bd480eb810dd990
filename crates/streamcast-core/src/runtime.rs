//! Tokio driver for the playback controller
//!
//! A single task owns the controller and handles events in order, so
//! handlers never interleave. Hide timers are sleeping tasks that report
//! their expiry on a channel of their own; the task stops and tears the
//! session down once every [`PlayerRuntime`] sender is gone.

use crate::{
    config::PlayerConfig,
    controller::{PlaybackController, PlayerSnapshot},
    event::PlayerEvent,
    host::{PlayerHost, Scheduler},
    types::{StreamLocator, TimerId},
    Error, Result,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// [`Scheduler`] backed by `tokio::time::sleep`
pub struct TokioScheduler {
    expired: mpsc::UnboundedSender<TimerId>,
    next_id: u64,
    timers: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(expired: mpsc::UnboundedSender<TimerId>) -> Self {
        Self {
            expired,
            next_id: 0,
            timers: HashMap::new(),
        }
    }

    /// Timers scheduled and not yet finished or cancelled
    pub fn pending(&self) -> usize {
        self.timers.values().filter(|h| !h.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let expired = self.expired.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = expired.send(id);
        });

        self.timers.retain(|_, h| !h.is_finished());
        self.timers.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.timers.remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

/// Handle to a running player task
pub struct PlayerRuntime<H: PlayerHost> {
    events: mpsc::UnboundedSender<PlayerEvent>,
    snapshots: watch::Receiver<PlayerSnapshot>,
    task: JoinHandle<PlaybackController<H, TokioScheduler>>,
}

impl<H> PlayerRuntime<H>
where
    H: PlayerHost + Send + 'static,
    H::Engine: Send + 'static,
{
    /// Mount a controller on `source` and start draining events
    pub fn start(host: H, config: PlayerConfig, source: Result<StreamLocator>) -> Self {
        let (events, queue) = mpsc::unbounded_channel();
        let (timers, expired) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(timers);

        let mut controller = PlaybackController::new(host, scheduler, config);
        controller.mount(source);

        let (publisher, snapshots) = watch::channel(controller.snapshot());
        let task = tokio::spawn(run(controller, queue, expired, publisher));

        info!("Player runtime started");

        Self {
            events,
            snapshots,
            task,
        }
    }

    /// Queue an event
    pub fn send(&self, event: PlayerEvent) -> Result<()> {
        self.events.send(event).map_err(|_| Error::RuntimeStopped)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receive every snapshot published after an event
    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshots.clone()
    }

    /// Unmount and wait for the task; returns the torn-down controller
    pub async fn shutdown(self) -> Result<PlaybackController<H, TokioScheduler>> {
        // The task may already be gone if it panicked
        let _ = self.events.send(PlayerEvent::Unmount);
        self.task.await.map_err(|_| Error::RuntimeStopped)
    }
}

async fn run<H: PlayerHost>(
    mut controller: PlaybackController<H, TokioScheduler>,
    mut queue: mpsc::UnboundedReceiver<PlayerEvent>,
    mut expired: mpsc::UnboundedReceiver<TimerId>,
    publisher: watch::Sender<PlayerSnapshot>,
) -> PlaybackController<H, TokioScheduler> {
    loop {
        let event = tokio::select! {
            biased;
            event = queue.recv() => match event {
                Some(event) => event,
                // Handle dropped without shutdown
                None => break,
            },
            Some(id) = expired.recv() => PlayerEvent::HideTimerFired(id),
        };

        let unmount = matches!(event, PlayerEvent::Unmount);
        controller.dispatch(event);
        publisher.send_replace(controller.snapshot());
        if unmount {
            break;
        }
    }

    controller.unmount();
    debug!("Player runtime stopped");
    controller
}
