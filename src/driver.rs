use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::app_types::{DriverCommand, DriverPhase};
use crate::error::StartupError;
use crate::optimizer::{RouteOptimizer, StepOutcome};
use crate::screen::RouteDisplay;

/// how long the driver naps between command checks while paused or completed
const IDLE_SLEEP: Duration = Duration::from_millis(10);

/// The running producer thread plus its command channel. Dropping it stops and joins the thread.
pub struct DriverThread {
    command_tx: mpsc::Sender<DriverCommand>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DriverThread {
    pub fn send(&self, command: DriverCommand) {
        // thread already gone: nothing left to control
        let _ = self.command_tx.send(command);
    }

    /// Stop the driver and wait for it to exit
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        let _ = self.command_tx.send(DriverCommand::Stop);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("route driver thread panicked");
            }
        }
    }
}

impl Drop for DriverThread {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

/// Spawn the background driver: steps the optimizer, publishes every improvement to the
/// screen, keeps the generation line current and flags completion once the optimizer stalls.
/// `repaint` is called after each published change (the app passes `ctx.request_repaint`).
pub fn spawn_driver<D, O, R>(
    screen: D,
    mut optimizer: O,
    autostart: bool,
    repaint: R,
) -> Result<DriverThread, StartupError>
where
    D: RouteDisplay + Send + 'static,
    O: RouteOptimizer + 'static,
    R: Fn() + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::channel();

    let handle = thread::Builder::new()
        .name("route-driver".to_owned())
        .spawn(move || {
            // initial route so the first frames have something to show
            screen.update_sequence(optimizer.best());
            screen.set_generation(optimizer.generation());
            repaint();

            let mut phase = if autostart {
                DriverPhase::Running
            } else {
                DriverPhase::Paused
            };
            tracing::info!(?phase, towns = optimizer.best().sequence().len(), "route driver started");

            loop {
                profiling::scope!("driver_thread_loop");

                // check for commands (non-blocking)
                match command_rx.try_recv() {
                    Ok(DriverCommand::Start) if phase == DriverPhase::Paused => {
                        phase = DriverPhase::Running;
                    }
                    Ok(DriverCommand::Pause) if phase == DriverPhase::Running => {
                        phase = DriverPhase::Paused;
                    }
                    Ok(DriverCommand::Stop) | Err(TryRecvError::Disconnected) => break,
                    Ok(_) | Err(TryRecvError::Empty) => {}
                }

                if phase != DriverPhase::Running {
                    // sleep a bit when paused to avoid busy-waiting
                    thread::sleep(IDLE_SLEEP);
                    continue;
                }

                match optimizer.step() {
                    StepOutcome::Improved => {
                        let best = optimizer.best();
                        tracing::debug!(
                            generation = optimizer.generation(),
                            distance = best.distance_fitness(),
                            time = best.time_fitness(),
                            "new best route"
                        );
                        screen.update_sequence(best);
                    }
                    StepOutcome::Unchanged => {}
                    StepOutcome::Stalled => {
                        screen.set_completed();
                        phase = DriverPhase::Completed;
                        let best = optimizer.best();
                        tracing::info!(
                            generation = optimizer.generation(),
                            distance = best.distance_fitness(),
                            time = best.time_fitness(),
                            "optimizer stopped improving"
                        );
                    }
                }
                screen.set_generation(optimizer.generation());
                repaint();
            }

            tracing::info!(generation = optimizer.generation(), "route driver stopped");
        })
        .map_err(StartupError::DriverSpawn)?;

    Ok(DriverThread {
        command_tx,
        handle: Some(handle),
    })
}
