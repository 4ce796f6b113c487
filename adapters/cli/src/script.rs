use std::{error::Error, fmt, str::FromStr, time::Duration};

use hungry_worm_core::Direction;

/// Discrete player signal understood by the session controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Signal {
    /// Buffers a new heading.
    Turn(Direction),
    /// Toggles pause.
    Pause,
    /// Restarts from an overlay state.
    Restart,
    /// Reports level completion.
    Complete,
}

/// Signal delivered on the first frame at or after `at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScriptedInput {
    /// Driver time at which the signal becomes due.
    pub(crate) at: Duration,
    /// Signal to deliver.
    pub(crate) signal: Signal,
}

impl FromStr for ScriptedInput {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (time, signal) = value
            .split_once(':')
            .ok_or_else(|| ScriptError::MissingSeparator(value.to_owned()))?;

        let seconds: f64 = time
            .trim()
            .parse()
            .map_err(|_| ScriptError::InvalidTime(time.to_owned()))?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ScriptError::InvalidTime(time.to_owned()));
        }

        let signal = match signal.trim().to_ascii_lowercase().as_str() {
            "up" => Signal::Turn(Direction::Up),
            "down" => Signal::Turn(Direction::Down),
            "left" => Signal::Turn(Direction::Left),
            "right" => Signal::Turn(Direction::Right),
            "pause" => Signal::Pause,
            "restart" => Signal::Restart,
            "complete" => Signal::Complete,
            _ => return Err(ScriptError::UnknownSignal(signal.to_owned())),
        };

        Ok(Self {
            at: Duration::from_secs_f64(seconds),
            signal,
        })
    }
}

/// Errors produced while parsing a scripted input.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The value has no `time:signal` separator.
    MissingSeparator(String),
    /// The time is not a non-negative number of seconds.
    InvalidTime(String),
    /// The signal name is not recognised.
    UnknownSignal(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator(value) => {
                write!(f, "expected `time:signal`, received `{value}`")
            }
            Self::InvalidTime(value) => {
                write!(f, "`{value}` is not a non-negative number of seconds")
            }
            Self::UnknownSignal(value) => write!(
                f,
                "unknown signal `{value}` (expected up, down, left, right, pause, restart or complete)"
            ),
        }
    }
}

impl Error for ScriptError {}
