//! Core enums shared by the learning engine, the policy tables and routing.

use std::fmt;
use std::str::FromStr;

use super::error::ParseAlgorithmError;

/// Learning rule used to train a policy table.
///
/// Also the storage key separating tables trained with different rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Algorithm {
    #[default]
    QLearning,
    Sarsa,
}

impl Algorithm {
    /// Returns all algorithm variants in order.
    pub fn all() -> [Algorithm; 2] {
        [Algorithm::QLearning, Algorithm::Sarsa]
    }

    /// Lowercase name, used in storage paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::QLearning => "qlearning",
            Algorithm::Sarsa => "sarsa",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    /// Accepts `qlearning`, `q-learning`, `q_learning` and `sarsa`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qlearning" | "q-learning" | "q_learning" => Ok(Algorithm::QLearning),
            "sarsa" => Ok(Algorithm::Sarsa),
            _ => Err(ParseAlgorithmError(s.to_string())),
        }
    }
}

/// Action-selection strategy chosen through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionSelection {
    /// Uniform choice among outgoing edges.
    Random,
    /// Exploit with probability `1 - epsilon`, otherwise explore.
    EpsilonGreedy,
    /// Always exploit. Meant for evaluation, not training.
    Greedy,
}

impl fmt::Display for ActionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionSelection::Random => write!(f, "random"),
            ActionSelection::EpsilonGreedy => write!(f, "epsilon_greedy"),
            ActionSelection::Greedy => write!(f, "greedy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_parses_aliases() {
        assert_eq!("QLearning".parse::<Algorithm>(), Ok(Algorithm::QLearning));
        assert_eq!("q-learning".parse::<Algorithm>(), Ok(Algorithm::QLearning));
        assert_eq!(" Sarsa ".parse::<Algorithm>(), Ok(Algorithm::Sarsa));
    }

    #[test]
    fn algorithm_rejects_unknown() {
        let err = "astar".parse::<Algorithm>().unwrap_err();
        assert_eq!(err, ParseAlgorithmError("astar".into()));
    }

    #[test]
    fn algorithm_display_round_trips() {
        for algorithm in Algorithm::all() {
            assert_eq!(algorithm.to_string().parse::<Algorithm>(), Ok(algorithm));
        }
    }
}
