//! Async driver for a carousel instance.
//!
//! One tokio task owns the `Carousel` and runs both timers: the
//! auto-advance interval and the wrap-around snap deadline. Navigation
//! requests arrive over a channel; every state change is published on a
//! `watch` channel. Dropping the handle (or calling `shutdown`) stops the
//! task, so no timer can touch the carousel after disposal.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::engine::{Carousel, CarouselSnapshot};
use crate::types::HubError;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Timer settings for a driven carousel. Both durations are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselTiming {
    autoplay_interval: Duration,
    transition: Duration,
}

impl CarouselTiming {
    pub fn new(autoplay_interval: Duration, transition: Duration) -> Result<Self, HubError> {
        if autoplay_interval.is_zero() {
            return Err(HubError::Config(
                "carousel autoplay interval must be greater than zero".into(),
            ));
        }
        if transition.is_zero() {
            return Err(HubError::Config(
                "carousel transition must be greater than zero".into(),
            ));
        }
        Ok(Self {
            autoplay_interval,
            transition,
        })
    }

    /// Period of the auto-advance timer.
    pub fn autoplay_interval(&self) -> Duration {
        self.autoplay_interval
    }

    /// Slide transition duration; the wrap-around snap fires this long
    /// after the last index change.
    pub fn transition(&self) -> Duration {
        self.transition
    }
}

impl Default for CarouselTiming {
    fn default() -> Self {
        Self {
            autoplay_interval: Duration::from_millis(4000),
            transition: Duration::from_millis(500),
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Command {
    Next,
    Prev,
    GoTo(usize),
    SetVisibleCount(usize),
}

type Reply = oneshot::Sender<Result<CarouselSnapshot, HubError>>;

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Owner-side handle to a running carousel task.
pub struct CarouselHandle {
    commands: mpsc::Sender<(Command, Reply)>,
    snapshots: watch::Receiver<CarouselSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl CarouselHandle {
    /// Spawn the driver task for `carousel`. Must be called inside a tokio
    /// runtime.
    pub fn spawn<T>(carousel: Carousel<T>, timing: CarouselTiming) -> Self
    where
        T: Clone + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (snap_tx, snap_rx) = watch::channel(carousel.snapshot());

        info!(
            slides = carousel.len(),
            visible = carousel.visible_count(),
            autoplay_ms = timing.autoplay_interval.as_millis() as u64,
            transition_ms = timing.transition.as_millis() as u64,
            "Carousel driver starting"
        );

        let task = tokio::spawn(run(carousel, timing, cmd_rx, snap_tx));
        Self {
            commands: cmd_tx,
            snapshots: snap_rx,
            task: Some(task),
        }
    }

    /// Latest published state.
    pub fn snapshot(&self) -> CarouselSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<CarouselSnapshot> {
        self.snapshots.clone()
    }

    pub async fn next(&self) -> Result<CarouselSnapshot, HubError> {
        self.send(Command::Next).await
    }

    pub async fn prev(&self) -> Result<CarouselSnapshot, HubError> {
        self.send(Command::Prev).await
    }

    pub async fn go_to(&self, slide: usize) -> Result<CarouselSnapshot, HubError> {
        self.send(Command::GoTo(slide)).await
    }

    pub async fn set_visible_count(&self, visible: usize) -> Result<CarouselSnapshot, HubError> {
        self.send(Command::SetVisibleCount(visible)).await
    }

    /// Stop the driver and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            debug!("Carousel driver stopped");
        }
    }

    async fn send(&self, command: Command) -> Result<CarouselSnapshot, HubError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send((command, reply_tx))
            .await
            .map_err(|_| HubError::Stopped("Carousel driver"))?;
        reply_rx
            .await
            .map_err(|_| HubError::Stopped("Carousel driver"))?
    }
}

impl Drop for CarouselHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Driver loop
// ---------------------------------------------------------------------------

async fn run<T: Clone>(
    mut carousel: Carousel<T>,
    timing: CarouselTiming,
    mut commands: mpsc::Receiver<(Command, Reply)>,
    snapshots: watch::Sender<CarouselSnapshot>,
) {
    let mut autoplay = tokio::time::interval_at(
        Instant::now() + timing.autoplay_interval,
        timing.autoplay_interval,
    );
    autoplay.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut snap_deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = autoplay.tick(), if carousel.is_auto_playing() => {
                carousel.advance();
                snap_deadline = schedule_snap(&carousel, timing);
            }
            _ = sleep_until(snap_deadline) => {
                snap_deadline = None;
                carousel.settle();
            }
            received = commands.recv() => {
                let Some((command, reply)) = received else {
                    debug!("Carousel handle dropped, driver exiting");
                    break;
                };
                let result = apply(&mut carousel, command);
                if result.is_ok() {
                    snap_deadline = schedule_snap(&carousel, timing);
                }
                let _ = snapshots.send(carousel.snapshot());
                let _ = reply.send(result.map(|()| carousel.snapshot()));
                continue;
            }
        }
        let _ = snapshots.send(carousel.snapshot());
    }
}

fn apply<T: Clone>(carousel: &mut Carousel<T>, command: Command) -> Result<(), HubError> {
    match command {
        Command::Next => carousel.next(),
        Command::Prev => carousel.prev(),
        Command::GoTo(slide) => carousel.go_to(slide)?,
        Command::SetVisibleCount(visible) => carousel.set_visible_count(visible)?,
    }
    Ok(())
}

/// Debounced snap: each index change pushes the deadline out by one
/// transition.
fn schedule_snap<T: Clone>(carousel: &Carousel<T>, timing: CarouselTiming) -> Option<Instant> {
    carousel
        .needs_correction()
        .map(|_| Instant::now() + timing.transition)
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
