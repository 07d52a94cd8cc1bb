pub mod config;
pub mod dice;
pub mod error;
pub mod types;

pub use config::{Atmosphere, GameOptions, PlanetaryConditions};
pub use error::{Result, RulesError};
pub use types::{BoardId, PlayerId, Round, UnitId};
