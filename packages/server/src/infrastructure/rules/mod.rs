//! Concrete [`RulesEngine`](crate::domain::RulesEngine) implementations.

pub mod shakmaty;

pub use shakmaty::ShakmatyRules;
