//! Coordination context
//!
//! [`PipelineRunner`] owns the [`LifecycleCoordinator`] and drives it from a
//! single tokio task: queued events in arrival order, plus a scheduled tick
//! for the latency tuner. Hosts talk to it through a cloneable
//! [`PipelineHandle`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::actor::{CaptureDevice, PipelineObserver, RendererFactory};
use crate::config::PipelineConfig;
use crate::coordinator::LifecycleCoordinator;
use crate::error::{PipelineError, Result};
use crate::events::{PipelineEvent, UserCommand};
use crate::types::DeviceId;

/// Host-side sender into a running pipeline
///
/// Sending never blocks. Every method fails with
/// [`PipelineError::QueueClosed`] once the runner is gone.
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    events: mpsc::UnboundedSender<PipelineEvent>,
}

impl PipelineHandle {
    /// Hand a discovered device to the pipeline
    pub fn device_found(&self, device: Box<dyn CaptureDevice>) -> Result<()> {
        self.send(PipelineEvent::DeviceFound(device))
    }

    /// Report a device as gone
    pub fn device_lost(&self, id: DeviceId) -> Result<()> {
        self.send(PipelineEvent::DeviceLost(id))
    }

    /// Send a user command
    pub fn send_command(&self, command: UserCommand) -> Result<()> {
        self.send(command.into())
    }

    /// Request teardown
    pub fn terminate(&self) -> Result<()> {
        self.send_command(UserCommand::Terminate)
    }

    fn send(&self, event: PipelineEvent) -> Result<()> {
        self.events.send(event).map_err(|_| PipelineError::QueueClosed)
    }
}

/// Single-task driver for the coordinator
///
/// # Examples
///
/// ```rust,ignore
/// let runner = PipelineRunner::new(PipelineConfig::default(), factory, observer)?;
/// let handle = runner.handle();
///
/// let task = tokio::spawn(runner.run());
/// handle.device_found(Box::new(device))?;
/// // ...
/// handle.terminate()?;
/// task.await??;
/// ```
pub struct PipelineRunner {
    coordinator: LifecycleCoordinator,
    events: mpsc::UnboundedReceiver<PipelineEvent>,
    sender: mpsc::UnboundedSender<PipelineEvent>,
    tick_interval: Duration,
}

impl PipelineRunner {
    /// Create a runner
    ///
    /// Fails with [`PipelineError::InvalidConfig`] if the configuration does
    /// not validate.
    pub fn new(
        config: PipelineConfig,
        factory: Box<dyn RendererFactory>,
        observer: Box<dyn PipelineObserver>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|issues| PipelineError::invalid_config(issues.join(", ")))?;

        let (sender, events) = mpsc::unbounded_channel();
        let tick_interval = Duration::from_millis(config.tick_interval_ms);
        let coordinator = LifecycleCoordinator::new(config, factory, observer, sender.clone());

        Ok(Self {
            coordinator,
            events,
            sender,
            tick_interval,
        })
    }

    /// Get a handle for sending events
    pub fn handle(&self) -> PipelineHandle {
        PipelineHandle {
            events: self.sender.clone(),
        }
    }

    /// Coordinator, for inspection before the runner starts
    pub fn coordinator(&self) -> &LifecycleCoordinator {
        &self.coordinator
    }

    /// Drain events and ticks until teardown completes
    ///
    /// Returns `Ok(())` after termination and the first invariant violation
    /// as `Err`.
    pub async fn run(self) -> Result<()> {
        let Self {
            mut coordinator,
            mut events,
            sender,
            tick_interval,
        } = self;
        // Sinks hold their own senders; the runner's copy is not needed
        drop(sender);

        let mut ticker = time::interval_at(Instant::now() + tick_interval, tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Pipeline runner started, tick every {:?}", tick_interval);

        loop {
            tokio::select! {
                biased;

                event = events.recv() => match event {
                    Some(event) => coordinator.handle_event(event)?,
                    None => return Err(PipelineError::QueueClosed),
                },
                _ = ticker.tick() => {
                    debug!("Tick");
                    coordinator.handle_event(PipelineEvent::Tick)?;
                }
            }

            if coordinator.is_terminated() {
                info!("Pipeline runner finished");
                return Ok(());
            }
        }
    }
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("coordinator", &self.coordinator)
            .field("tick_interval", &self.tick_interval)
            .finish_non_exhaustive()
    }
}
