//! The effect catalog: which world effects exist, when they trigger,
//! and what they do to gameplay while active.
//!
//! Trigger thresholds and modifier values here are the shipped
//! defaults; durations and cooldowns can be retuned per effect through
//! [`EffectOverride`](crate::config::EffectOverride) entries in the
//! config file.

use rust_decimal::Decimal;
use turf_types::{
    EffectDefinition, EffectType, MetricKind, ModifierKey, ModifierSet, TriggerDirection,
};

use crate::config::EffectOverride;

/// One hour in seconds.
const HOUR: i64 = 3600;

/// The full set of effect definitions known to the trigger engine.
#[derive(Debug, Clone)]
pub struct EffectCatalog {
    definitions: Vec<EffectDefinition>,
}

impl Default for EffectCatalog {
    fn default() -> Self {
        Self {
            definitions: vec![
                crackdown(),
                gang_war(),
                economic_boom(),
                urban_decay(),
                street_festival(),
            ],
        }
    }
}

impl EffectCatalog {
    /// The default catalog with per-effect timing overrides applied.
    pub fn with_overrides(overrides: &[EffectOverride]) -> Self {
        let mut catalog = Self::default();
        for over in overrides {
            for def in &mut catalog.definitions {
                if def.effect_type == over.effect_type {
                    if let Some(duration) = over.duration_secs {
                        def.duration_secs = duration;
                    }
                    if let Some(cooldown) = over.cooldown_secs {
                        def.cooldown_secs = cooldown;
                    }
                }
            }
        }
        catalog
    }

    /// All definitions, in catalog order.
    pub fn definitions(&self) -> &[EffectDefinition] {
        &self.definitions
    }

    /// Look up the definition for one effect type.
    pub fn definition(&self, effect_type: EffectType) -> Option<&EffectDefinition> {
        self.definitions.iter().find(|d| d.effect_type == effect_type)
    }
}

fn modifiers(entries: &[(ModifierKey, Decimal)]) -> ModifierSet {
    entries.iter().copied().collect()
}

fn crackdown() -> EffectDefinition {
    EffectDefinition {
        effect_type: EffectType::PoliceCrackdown,
        metric: MetricKind::CrimeIndex,
        threshold: 70,
        direction: TriggerDirection::Above,
        modifiers: modifiers(&[
            (ModifierKey::CrimeSuccessRate, Decimal::new(60, 2)),
            (ModifierKey::CrimePayoutMult, Decimal::new(80, 2)),
            (ModifierKey::HeatGainMult, Decimal::new(150, 2)),
        ]),
        duration_secs: 6 * HOUR,
        cooldown_secs: 12 * HOUR,
    }
}

fn gang_war() -> EffectDefinition {
    EffectDefinition {
        effect_type: EffectType::GangWar,
        metric: MetricKind::CrewTension,
        threshold: 60,
        direction: TriggerDirection::Above,
        modifiers: modifiers(&[
            (ModifierKey::CrimeSuccessRate, Decimal::new(75, 2)),
            (ModifierKey::BusinessIncomeMult, Decimal::new(70, 2)),
            (ModifierKey::HeatGainMult, Decimal::new(125, 2)),
        ]),
        duration_secs: 12 * HOUR,
        cooldown_secs: 24 * HOUR,
    }
}

fn economic_boom() -> EffectDefinition {
    EffectDefinition {
        effect_type: EffectType::EconomicBoom,
        metric: MetricKind::BusinessHealth,
        threshold: 75,
        direction: TriggerDirection::Above,
        modifiers: modifiers(&[
            (ModifierKey::BusinessIncomeMult, Decimal::new(150, 2)),
            (ModifierKey::PropertyPriceMult, Decimal::new(125, 2)),
            (ModifierKey::CrimePayoutMult, Decimal::new(120, 2)),
        ]),
        duration_secs: 24 * HOUR,
        cooldown_secs: 48 * HOUR,
    }
}

fn urban_decay() -> EffectDefinition {
    EffectDefinition {
        effect_type: EffectType::UrbanDecay,
        metric: MetricKind::PropertyValues,
        threshold: 30,
        direction: TriggerDirection::Below,
        modifiers: modifiers(&[
            (ModifierKey::PropertyPriceMult, Decimal::new(70, 2)),
            (ModifierKey::BusinessIncomeMult, Decimal::new(80, 2)),
            (ModifierKey::CrimeSuccessRate, Decimal::new(115, 2)),
        ]),
        duration_secs: 24 * HOUR,
        cooldown_secs: 48 * HOUR,
    }
}

fn street_festival() -> EffectDefinition {
    EffectDefinition {
        effect_type: EffectType::StreetFestival,
        metric: MetricKind::StreetActivity,
        threshold: 80,
        direction: TriggerDirection::Above,
        modifiers: modifiers(&[
            (ModifierKey::CrimePayoutMult, Decimal::new(130, 2)),
            (ModifierKey::BusinessIncomeMult, Decimal::new(140, 2)),
            (ModifierKey::CrimeSuccessRate, Decimal::new(110, 2)),
        ]),
        duration_secs: 6 * HOUR,
        cooldown_secs: 72 * HOUR,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_covers_every_effect_type() {
        let catalog = EffectCatalog::default();
        for effect_type in EffectType::ALL {
            assert!(
                catalog.definition(effect_type).is_some(),
                "missing definition for {effect_type:?}"
            );
        }
        assert_eq!(catalog.definitions().len(), EffectType::ALL.len());
    }

    #[test]
    fn overrides_replace_only_named_timings() {
        let catalog = EffectCatalog::with_overrides(&[EffectOverride {
            effect_type: EffectType::GangWar,
            duration_secs: Some(HOUR),
            cooldown_secs: None,
        }]);
        let war = catalog.definition(EffectType::GangWar).unwrap();
        assert_eq!(war.duration_secs, HOUR);
        assert_eq!(war.cooldown_secs, 24 * HOUR);

        let crackdown = catalog.definition(EffectType::PoliceCrackdown).unwrap();
        assert_eq!(crackdown.duration_secs, 6 * HOUR);
    }
}
