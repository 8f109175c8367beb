// messages from UI to the route driver thread
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverCommand {
    Start,
    Pause,
    Stop,
}

/// Where the driver thread is in its run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DriverPhase {
    #[default]
    Paused,
    Running,
    /// optimizer stalled; summary is shown in the completed colour
    Completed,
}
