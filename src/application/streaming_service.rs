// Streaming service - actor that owns the controller and serializes ticks and commands
use crate::application::controller::{CommandOutcome, ControllerSnapshot, StreamingController};
use crate::application::renderer::RendererAdapter;
use crate::application::sample_source::SampleSource;
use crate::application::scheduler::Tick;
use crate::domain::channel::ChannelId;
use crate::domain::error::ControllerError;
use crate::domain::viewport::Axis;
use crate::infrastructure::config::{ChannelSettings, StreamSettings};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

const COMMAND_QUEUE: usize = 64;
const TICK_QUEUE: usize = 8;

type Reply<T> = oneshot::Sender<Result<T, ControllerError>>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("streaming controller is no longer running")]
    Unavailable,
}

#[derive(Debug)]
pub enum ControllerCommand {
    ToggleSignal {
        channel: ChannelId,
        reply: Reply<CommandOutcome>,
    },
    SetZoom {
        axis: Axis,
        percent: f64,
        reply: Reply<CommandOutcome>,
    },
    SetPosition {
        axis: Axis,
        percent: f64,
        reply: Reply<CommandOutcome>,
    },
    ResetView {
        reply: Reply<CommandOutcome>,
    },
    ClearData {
        reply: Reply<CommandOutcome>,
    },
    Snapshot {
        reply: Reply<ControllerSnapshot>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

/// Cloneable handle to the controller task.
#[derive(Clone)]
pub struct StreamingService {
    commands: mpsc::Sender<ControllerCommand>,
}

impl StreamingService {
    /// Build the controller, start streaming, and run it on its own task.
    /// The join handle resolves once the controller shuts down, with the
    /// fatal error if one stopped it.
    pub fn spawn<R>(
        stream: StreamSettings,
        channels: &[ChannelSettings],
        source: Arc<dyn SampleSource>,
        renderer: R,
    ) -> Result<(Self, JoinHandle<Result<(), ControllerError>>), ControllerError>
    where
        R: RendererAdapter + 'static,
        R::Handle: 'static,
    {
        let (tick_tx, tick_rx) = mpsc::channel(TICK_QUEUE);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);

        let controller = StreamingController::new(stream, channels, source, renderer, tick_tx)?;
        let task = tokio::spawn(run(controller, tick_rx, command_rx));

        Ok((
            Self {
                commands: command_tx,
            },
            task,
        ))
    }

    pub async fn toggle_signal(&self, channel: ChannelId) -> Result<CommandOutcome, ServiceError> {
        self.request(|reply| ControllerCommand::ToggleSignal { channel, reply }).await
    }

    pub async fn set_zoom(&self, axis: Axis, percent: f64) -> Result<CommandOutcome, ServiceError> {
        self.request(|reply| ControllerCommand::SetZoom {
            axis,
            percent,
            reply,
        })
        .await
    }

    pub async fn set_position(
        &self,
        axis: Axis,
        percent: f64,
    ) -> Result<CommandOutcome, ServiceError> {
        self.request(|reply| ControllerCommand::SetPosition {
            axis,
            percent,
            reply,
        })
        .await
    }

    pub async fn reset_view(&self) -> Result<CommandOutcome, ServiceError> {
        self.request(|reply| ControllerCommand::ResetView { reply }).await
    }

    pub async fn clear_data(&self) -> Result<CommandOutcome, ServiceError> {
        self.request(|reply| ControllerCommand::ClearData { reply }).await
    }

    pub async fn snapshot(&self) -> Result<ControllerSnapshot, ServiceError> {
        self.request(|reply| ControllerCommand::Snapshot { reply }).await
    }

    /// Stop streaming and dispose the renderer.
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        self.request(|reply| ControllerCommand::Shutdown { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> ControllerCommand,
    ) -> Result<T, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| ServiceError::Unavailable)?;
        let result = response.await.map_err(|_| ServiceError::Unavailable)?;
        Ok(result?)
    }
}

async fn run<R: RendererAdapter>(
    mut controller: StreamingController<R>,
    mut ticks: mpsc::Receiver<Tick>,
    mut commands: mpsc::Receiver<ControllerCommand>,
) -> Result<(), ControllerError> {
    controller.start();

    loop {
        tokio::select! {
            // Commands first so user input is never starved by a busy stream
            biased;

            command = commands.recv() => {
                let Some(command) = command else {
                    tracing::debug!("All service handles dropped");
                    break;
                };
                if !handle_command(&mut controller, command) {
                    break;
                }
            }
            Some(tick) = ticks.recv() => {
                match controller.on_tick(tick) {
                    Ok(_) => {}
                    Err(e) if e.is_fatal() => {
                        tracing::error!("Fatal ingestion error, stopping controller: {}", e);
                        controller.dispose();
                        return Err(e);
                    }
                    Err(e) => tracing::warn!("Tick skipped: {}", e),
                }
            }
        }
    }

    controller.dispose();
    Ok(())
}

/// Apply one command. Returns `false` once the actor should exit.
fn handle_command<R: RendererAdapter>(
    controller: &mut StreamingController<R>,
    command: ControllerCommand,
) -> bool {
    // A dropped receiver only means the caller stopped waiting
    match command {
        ControllerCommand::ToggleSignal { channel, reply } => {
            let _ = reply.send(controller.toggle_signal(channel));
        }
        ControllerCommand::SetZoom {
            axis,
            percent,
            reply,
        } => {
            let _ = reply.send(controller.set_zoom(axis, percent));
        }
        ControllerCommand::SetPosition {
            axis,
            percent,
            reply,
        } => {
            let _ = reply.send(controller.set_position(axis, percent));
        }
        ControllerCommand::ResetView { reply } => {
            let _ = reply.send(Ok(controller.reset_view()));
        }
        ControllerCommand::ClearData { reply } => {
            let _ = reply.send(Ok(controller.clear_data()));
        }
        ControllerCommand::Snapshot { reply } => {
            let _ = reply.send(Ok(controller.snapshot()));
        }
        ControllerCommand::Shutdown { reply } => {
            controller.dispose();
            let _ = reply.send(Ok(()));
            return false;
        }
    }
    true
}
