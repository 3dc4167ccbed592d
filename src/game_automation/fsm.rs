// Finite state machine driving the capture -> match -> dispatch loop
use std::sync::Arc;
use std::time::Duration;

use image::GrayImage;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::sleep;

use super::decision::{Decision, decide};
use super::types::{AutomationCommand, AutomationEvent, RunState, Side};
use crate::capture::{FrameDump, FrameSource};
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::input::ActionSender;
use crate::matching::{TemplateSet, score};

/// Poll interval while no run is active.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// The decision loop. Owns `RunState` and `Side`; everything outside the
/// loop interacts with it only through the command and event channels.
pub struct ChopAutomation {
    state: RunState,
    side: Side,
    screen: Arc<FrameSource>,
    templates: Arc<TemplateSet>,
    actions: ActionSender,
    command_rx: mpsc::Receiver<AutomationCommand>,
    event_tx: mpsc::Sender<AutomationEvent>,
    config: AgentConfig,
    frame_dump: Option<FrameDump>,
    consecutive_errors: u32,
    should_exit: bool,
}

impl ChopAutomation {
    pub fn new(
        screen: Arc<FrameSource>,
        templates: Arc<TemplateSet>,
        actions: ActionSender,
        command_rx: mpsc::Receiver<AutomationCommand>,
        event_tx: mpsc::Sender<AutomationEvent>,
        config: AgentConfig,
        frame_dump: Option<FrameDump>,
    ) -> Self {
        Self {
            state: RunState::Idle,
            side: Side::Left,
            screen,
            templates,
            actions,
            command_rx,
            event_tx,
            config,
            frame_dump,
            consecutive_errors: 0,
            should_exit: false,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// The loop. Commands are observed once per cycle, so a stop takes
    /// effect at the next iteration boundary, never mid-capture.
    pub async fn run(&mut self) {
        debug!("🎮 automation loop started");

        loop {
            if let Ok(command) = self.command_rx.try_recv() {
                self.process_command(command).await;
            }

            match self.state {
                RunState::Idle | RunState::Stopped => {
                    sleep(IDLE_POLL).await;
                }
                RunState::Running => {
                    // Wait out the obstacle-transition animation before sampling
                    sleep(self.config.cycle_interval).await;

                    match self.run_iteration().await {
                        Ok(Decision::GameOver) => {
                            info!("🛑 end-of-game screen detected");
                            let _ = self.event_tx.send(AutomationEvent::GameOver).await;
                            self.finish_run().await;
                        }
                        Ok(Decision::Dodge) => {
                            debug!("🪓 twig on {:?}, dodging", self.side);
                            self.actions.enqueue(self.side.opposite());
                            self.side = self.side.opposite();
                            self.consecutive_errors = 0;
                        }
                        Ok(Decision::Advance) => {
                            self.actions.enqueue(self.side);
                            self.consecutive_errors = 0;
                        }
                        Err(error) => {
                            self.handle_iteration_error(error).await;
                        }
                    }
                }
            }

            if self.should_exit {
                break;
            }
        }

        debug!("🎮 automation loop ended");
    }

    async fn process_command(&mut self, command: AutomationCommand) {
        debug!("🤖 processing command: {:?}", command);
        match command {
            AutomationCommand::Start => {
                if self.state == RunState::Running {
                    debug!("🤖 already running, ignoring start command");
                    return;
                }
                self.start_run().await;
            }
            AutomationCommand::Stop => {
                if self.state == RunState::Running {
                    info!("⏹️ run stopped");
                    self.finish_run().await;
                }
            }
            AutomationCommand::Shutdown => {
                if self.state == RunState::Running {
                    self.finish_run().await;
                }
                self.should_exit = true;
            }
        }
    }

    /// Enter Running after the one-shot side calibration. Calibration
    /// failure aborts the run rather than being retried.
    async fn start_run(&mut self) {
        match self.calibrate().await {
            Ok(side) => {
                self.side = side;
                self.consecutive_errors = 0;
                info!("🌲 run started, active side: {side:?}");
                let _ = self
                    .event_tx
                    .send(AutomationEvent::SideCalibrated(side))
                    .await;
                self.change_state(RunState::Running).await;
            }
            Err(error) => {
                warn!("❌ calibration failed: {error}");
                let _ = self
                    .event_tx
                    .send(AutomationEvent::Error(format!(
                        "calibration failed: {error}"
                    )))
                    .await;
                self.finish_run().await;
            }
        }
    }

    /// Capture one frame and score it against `left_empty`: a confident
    /// match means the agent starts on the left lane.
    async fn calibrate(&self) -> AgentResult<Side> {
        let frame = self.grab_frame().await?;
        let left_empty = score(&frame, &self.templates.left_empty)?;
        debug!("calibration left_empty score: {left_empty:.3}");

        Ok(if left_empty > self.config.calibration_confidence {
            Side::Left
        } else {
            Side::Right
        })
    }

    /// One Running cycle: capture, score the active twig template, decide.
    async fn run_iteration(&mut self) -> AgentResult<Decision> {
        let frame = self.grab_frame().await?;

        if let Some(dump) = &self.frame_dump {
            // Observational only; a failed write must not disturb the loop
            if let Err(error) = dump.save(&frame).await {
                debug!("frame dump failed: {error}");
            }
        }

        let active_template = match self.side {
            Side::Left => &self.templates.left_twig,
            Side::Right => &self.templates.right_twig,
        };
        let twig_score = score(&frame, active_template)?;
        debug!("twig score on {:?}: {twig_score:.3}", self.side);

        decide(&self.config, twig_score, || {
            score(&frame, &self.templates.end)
        })
    }

    async fn grab_frame(&self) -> AgentResult<GrayImage> {
        let screen = Arc::clone(&self.screen);
        tokio::task::spawn_blocking(move || screen.grab()).await?
    }

    /// Transient-fault containment with a ceiling: one failed iteration is
    /// logged and backed off, a run of them aborts the run.
    async fn handle_iteration_error(&mut self, error: AgentError) {
        self.consecutive_errors += 1;
        warn!(
            "❌ iteration failed ({}/{}): {error}",
            self.consecutive_errors, self.config.max_consecutive_errors
        );

        if self.consecutive_errors >= self.config.max_consecutive_errors {
            let _ = self
                .event_tx
                .send(AutomationEvent::Error(format!(
                    "aborting run after {} consecutive failures: {error}",
                    self.consecutive_errors
                )))
                .await;
            self.finish_run().await;
        } else {
            sleep(self.config.error_backoff).await;
        }
    }

    /// Leave Running: capture handles are released before the state change
    /// is announced, so a stopped run never holds capture resources.
    async fn finish_run(&mut self) {
        let screen = Arc::clone(&self.screen);
        if let Err(error) = tokio::task::spawn_blocking(move || screen.release_all()).await {
            warn!("capture release task failed: {error}");
        }
        self.change_state(RunState::Stopped).await;
    }

    async fn change_state(&mut self, new_state: RunState) {
        if self.state != new_state {
            debug!("🎮 automation state: {:?} -> {:?}", self.state, new_state);
            self.state = new_state;
            let _ = self
                .event_tx
                .send(AutomationEvent::StateChanged(new_state))
                .await;
        }
    }
}
