use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::cycles::Direction;
use super::error::CycleIndexError;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Cycle selection: which cycles of a dataset to show
// ---------------------------------------------------------------------------

/// A cycle choice as typed by the user.
///
/// Accepted forms (case-insensitive): empty or `all`, `5`, `discharge 3`,
/// `charge 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleSelection {
    #[default]
    All,
    /// A cycle number counted over every half-cycle (1-based).
    Cycle(usize),
    /// The n-th half-cycle running in the given direction (1-based).
    Directed(Direction, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid cycle format '{input}'. Use 'discharge X', 'charge X', a cycle number, or 'all'.")]
pub struct SelectionError {
    pub input: String,
}

impl FromStr for CycleSelection {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let err = || SelectionError {
            input: s.trim().to_string(),
        };

        if text.is_empty() || text == "all" {
            return Ok(CycleSelection::All);
        }

        let parts: Vec<&str> = text.split_whitespace().collect();
        match parts.as_slice() {
            [n] => n.parse().map(CycleSelection::Cycle).map_err(|_| err()),
            [kind, n] => {
                let direction = match *kind {
                    "discharge" => Direction::Discharge,
                    "charge" => Direction::Charge,
                    _ => return Err(err()),
                };
                let n = n.parse().map_err(|_| err())?;
                Ok(CycleSelection::Directed(direction, n))
            }
            _ => Err(err()),
        }
    }
}

impl fmt::Display for CycleSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleSelection::All => write!(f, "all"),
            CycleSelection::Cycle(n) => write!(f, "{n}"),
            CycleSelection::Directed(direction, n) => write!(f, "{direction} {n}"),
        }
    }
}

impl CycleSelection {
    /// Resolve to 1-based cycle numbers of `dataset`.
    pub fn resolve(&self, dataset: &Dataset) -> Result<Vec<usize>, CycleIndexError> {
        match *self {
            CycleSelection::All => Ok((1..=dataset.cycle_count()).collect()),
            CycleSelection::Cycle(n) => {
                dataset.extract_cycle(n)?;
                Ok(vec![n])
            }
            CycleSelection::Directed(direction, n) => {
                let cycles = dataset.cycles_in_direction(direction);
                if n == 0 || n > cycles.len() {
                    return Err(CycleIndexError {
                        kind: match direction {
                            Direction::Charge => "charge cycle",
                            Direction::Discharge => "discharge cycle",
                        },
                        requested: n,
                        available: cycles.len(),
                    });
                }
                Ok(vec![cycles[n - 1].index])
            }
        }
    }
}
