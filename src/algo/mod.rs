/// Tabular agents
pub mod tabular;
