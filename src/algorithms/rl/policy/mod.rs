//! Action-selection policies.

pub mod epsilon_greedy;
pub mod greedy;
pub mod random;
pub mod selection;
pub mod trait_;

pub use epsilon_greedy::EpsilonGreedyPolicy;
pub use greedy::GreedyPolicy;
pub use random::RandomPolicy;
pub use selection::SelectionPolicy;
pub use trait_::ActionPolicy;
