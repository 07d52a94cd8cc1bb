//! Match configuration with documented options
//!
//! Optional rules and environmental conditions are collected here with
//! explanations of what they gate and how they interact.

use serde::{Deserialize, Serialize};

/// Optional rules toggled per match
///
/// These gate behavior inside damage resolution, deployment and the
/// end-of-round steps. Defaults reproduce the baseline rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameOptions {
    // === CREW SURVIVAL ===
    /// Whether crews attempt to eject when their unit is destroyed
    ///
    /// When off, center-torso and engine destruction kill the crew
    /// outright. When on, a conscious crew ejects instead and survives
    /// as a separate concern outside this core.
    pub auto_eject: bool,

    /// Whether ammunition explosions trigger ejection before resolution
    ///
    /// Only consulted when `auto_eject` is also on.
    pub eject_on_ammo_explosion: bool,

    // === DEPLOYMENT ===
    /// Allow tactical drops outside the owner's deployment zone
    ///
    /// A drop forces a fixed low altitude with the drop still in
    /// progress; only units rated for it qualify.
    pub tactical_drops: bool,

    /// Ceiling for the stacking-violation climb of airborne-capable
    /// ground vehicles, in elevation steps above the terrain
    pub stacking_climb_ceiling: i32,

    // === DAMAGE ===
    /// Divisor applied to conventional infantry damage after armor
    ///
    /// 1 means unarmored troops. Higher values model issued armor kits.
    pub infantry_armor_divisor: u32,

    /// Whether buildings roll a basement on first entry
    ///
    /// When off, every building is treated as having no basement.
    pub basement_rolls: bool,

    // === HEAT ===
    /// Heat at or above which a shutdown check is rolled at end of round
    pub shutdown_threshold: i32,

    /// Heat at or above which ammunition cook-off is checked
    ///
    /// Must be at least `shutdown_threshold`; cook-off is the rarer,
    /// more severe outcome.
    pub ammo_cookoff_threshold: i32,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            auto_eject: true,
            eject_on_ammo_explosion: false,
            tactical_drops: false,
            stacking_climb_ceiling: 4,
            infantry_armor_divisor: 1,
            basement_rolls: true,
            shutdown_threshold: 14,
            ammo_cookoff_threshold: 19,
        }
    }
}

impl GameOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate options for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.infantry_armor_divisor == 0 {
            return Err("infantry_armor_divisor must be at least 1".into());
        }

        if self.ammo_cookoff_threshold < self.shutdown_threshold {
            return Err(format!(
                "ammo_cookoff_threshold ({}) should be >= shutdown_threshold ({})",
                self.ammo_cookoff_threshold, self.shutdown_threshold
            ));
        }

        if self.stacking_climb_ceiling < 0 {
            return Err("stacking_climb_ceiling cannot be negative".into());
        }

        Ok(())
    }
}

/// Atmospheric density class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Atmosphere {
    Vacuum,
    Trace,
    Thin,
    #[default]
    Standard,
    Dense,
}

impl Atmosphere {
    /// Vacuum and trace atmospheres expose unsealed troops
    pub fn is_vacuum(&self) -> bool {
        matches!(self, Atmosphere::Vacuum | Atmosphere::Trace)
    }
}

/// Environmental conditions of the battlefield
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlanetaryConditions {
    pub atmosphere: Atmosphere,
    /// Wind strength, 0 = calm. Redetermined at end of round.
    pub wind_strength: u32,
    /// Ambient temperature in degrees C; extremes kill exposed infantry
    pub temperature: i32,
}

impl PlanetaryConditions {
    /// Can conventional infantry survive these conditions unprotected?
    pub fn habitable_for_infantry(&self) -> bool {
        !self.atmosphere.is_vacuum() && (-30..=50).contains(&self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_valid() {
        assert!(GameOptions::default().validate().is_ok());
    }

    #[test]
    fn test_zero_divisor_rejected() {
        let mut opts = GameOptions::default();
        opts.infantry_armor_divisor = 0;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_cookoff_below_shutdown_rejected() {
        let mut opts = GameOptions::default();
        opts.ammo_cookoff_threshold = opts.shutdown_threshold - 1;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_vacuum_classes() {
        assert!(Atmosphere::Vacuum.is_vacuum());
        assert!(Atmosphere::Trace.is_vacuum());
        assert!(!Atmosphere::Standard.is_vacuum());
    }

    #[test]
    fn test_infantry_habitability() {
        let mut cond = PlanetaryConditions::default();
        assert!(cond.habitable_for_infantry());

        cond.atmosphere = Atmosphere::Vacuum;
        assert!(!cond.habitable_for_infantry());

        cond.atmosphere = Atmosphere::Standard;
        cond.temperature = 80;
        assert!(!cond.habitable_for_infantry());
    }
}
