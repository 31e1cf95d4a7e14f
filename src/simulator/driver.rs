//! Async driver for the demo showcase.
//!
//! Mirrors the carousel driver: one task owns the `DemoShowcase`, ticks the
//! player while it is playing, and answers commands sent over a channel.
//! The tick period restarts whenever playback starts or the speed changes.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::debug;

use super::{DemoShowcase, DemoSnapshot};
use crate::types::HubError;

#[derive(Debug, Clone, Copy)]
enum Command {
    Play(usize),
    Pause(usize),
    Reset(usize),
    SetSpeed(Duration),
}

type Reply = oneshot::Sender<Result<DemoSnapshot, HubError>>;

/// Owner-side handle to a running showcase task.
pub struct DemoPlayerHandle {
    commands: mpsc::Sender<(Command, Reply)>,
    snapshots: watch::Receiver<DemoSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl DemoPlayerHandle {
    /// Spawn the driver task. Must be called inside a tokio runtime.
    pub fn spawn(showcase: DemoShowcase) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (snap_tx, snap_rx) = watch::channel(showcase.snapshot());
        let task = tokio::spawn(run(showcase, cmd_rx, snap_tx));
        Self {
            commands: cmd_tx,
            snapshots: snap_rx,
            task: Some(task),
        }
    }

    pub fn snapshot(&self) -> DemoSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DemoSnapshot> {
        self.snapshots.clone()
    }

    /// Start playing demo `index`, switching to it first if needed.
    pub async fn play(&self, index: usize) -> Result<DemoSnapshot, HubError> {
        self.send(Command::Play(index)).await
    }

    pub async fn pause(&self, index: usize) -> Result<DemoSnapshot, HubError> {
        self.send(Command::Pause(index)).await
    }

    /// Stop and rewind demo `index`.
    pub async fn reset(&self, index: usize) -> Result<DemoSnapshot, HubError> {
        self.send(Command::Reset(index)).await
    }

    pub async fn set_speed(&self, speed: Duration) -> Result<DemoSnapshot, HubError> {
        self.send(Command::SetSpeed(speed)).await
    }

    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            debug!("Demo player stopped");
        }
    }

    async fn send(&self, command: Command) -> Result<DemoSnapshot, HubError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send((command, reply_tx))
            .await
            .map_err(|_| HubError::Stopped("Demo player"))?;
        reply_rx.await.map_err(|_| HubError::Stopped("Demo player"))?
    }
}

impl Drop for DemoPlayerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn run(
    mut showcase: DemoShowcase,
    mut commands: mpsc::Receiver<(Command, Reply)>,
    snapshots: watch::Sender<DemoSnapshot>,
) {
    let mut steps = ticker(showcase.player().speed());

    loop {
        tokio::select! {
            _ = steps.tick(), if showcase.player().is_playing() => {
                showcase.player_mut().tick();
            }
            received = commands.recv() => {
                let Some((command, reply)) = received else {
                    debug!("Demo player handle dropped, driver exiting");
                    break;
                };
                let was_playing = showcase.player().is_playing();
                let speed = showcase.player().speed();
                let result = apply(&mut showcase, command);
                let player = showcase.player();
                if player.speed() != speed || (player.is_playing() && !was_playing) {
                    steps = ticker(player.speed());
                }
                let _ = snapshots.send(showcase.snapshot());
                let _ = reply.send(result.map(|()| showcase.snapshot()));
                continue;
            }
        }
        let _ = snapshots.send(showcase.snapshot());
    }
}

fn apply(showcase: &mut DemoShowcase, command: Command) -> Result<(), HubError> {
    let index = match command {
        Command::Play(i) | Command::Pause(i) | Command::Reset(i) => i,
        Command::SetSpeed(speed) => return showcase.player_mut().set_speed(speed),
    };
    if index != showcase.current_index() {
        showcase.select_demo(index)?;
    }
    let player = showcase.player_mut();
    match command {
        Command::Play(_) => player.play(),
        Command::Pause(_) => player.pause(),
        Command::Reset(_) => player.reset(),
        Command::SetSpeed(_) => {}
    }
    debug!(demo = index, ?command, "Demo player command");
    Ok(())
}
