use serde::{Deserialize, Serialize};

use crate::color::Rgb;

const TOTAL_SUPPLY: f64 = 21_000_000.0;
const HASHRATE_TARGET: f64 = 80e15;
const FALLBACK_MONTHLY_BURN: f64 = 25_000.0;

/// One point-in-time set of network metrics. A new snapshot replaces the old
/// one wholesale; the engine never mutates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkSnapshot {
    pub block_height: u64,
    /// Unix seconds of the best block.
    pub block_time: f64,
    pub ticket_price: f64,
    pub ticket_pool_size: f64,
    pub ticket_pool_target: f64,
    pub ticket_pool_value: f64,
    /// Percent of coin supply locked in tickets.
    pub stake_participation: f64,
    pub hashrate: f64,
    pub treasury_balance: f64,
    pub treasury_monthly_burn: f64,
    pub coin_supply: f64,
    pub mixed_percent: f64,
    pub price: f64,
    #[serde(rename = "priceChange24h")]
    pub price_change_24h: f64,
    pub market_cap: f64,
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,
    pub network_score: u32,
    pub is_live: bool,
    pub total_supply: f64,
    pub unmined_supply: f64,
    pub liquid_supply: f64,
}

impl Default for NetworkSnapshot {
    fn default() -> Self {
        Self::fallback()
    }
}

impl NetworkSnapshot {
    /// Values shown when nothing live is available.
    pub fn fallback() -> Self {
        let mut snapshot = Self {
            block_height: 841_250,
            block_time: 0.0,
            ticket_price: 248.5,
            ticket_pool_size: 41_200.0,
            ticket_pool_target: 40_960.0,
            ticket_pool_value: 10_234_000.0,
            stake_participation: 63.2,
            hashrate: 1.25e17,
            treasury_balance: 872_000.0,
            treasury_monthly_burn: 22_500.0,
            coin_supply: 16_150_000.0,
            mixed_percent: 62.5,
            price: 18.45,
            price_change_24h: 3.2,
            market_cap: 298_000_000.0,
            volume_24h: 4_200_000.0,
            network_score: 78,
            is_live: false,
            total_supply: TOTAL_SUPPLY,
            unmined_supply: 4_850_000.0,
            liquid_supply: 4_994_000.0,
        };
        snapshot.network_score = network_score(&snapshot);
        snapshot
    }

    /// Recompute the fields that follow from the raw measurements.
    pub fn derive(mut self) -> Self {
        if self.ticket_pool_value > 0.0 && self.coin_supply > 0.0 {
            self.stake_participation = self.ticket_pool_value / self.coin_supply * 100.0;
        }
        self.total_supply = TOTAL_SUPPLY;
        self.unmined_supply = (self.total_supply - self.coin_supply).max(0.0);
        self.liquid_supply =
            (self.coin_supply - self.ticket_pool_value - self.treasury_balance).max(0.0);
        self.network_score = network_score(&self);
        self
    }

    /// Treasury runway in whole months, if a burn rate is known.
    pub fn runway_months(&self) -> Option<u32> {
        (self.treasury_monthly_burn > 0.0)
            .then(|| (self.treasury_balance / self.treasury_monthly_burn).floor().max(0.0) as u32)
    }
}

/// Weighted 0..100 health score. Only components with data contribute; the
/// result is renormalised over their weights.
pub fn network_score(s: &NetworkSnapshot) -> u32 {
    let mut score = 0.0;
    let mut total_weight = 0.0;

    // Consensus: hashrate against an ~30 day average.
    if s.hashrate > 0.0 {
        let health = (s.hashrate / HASHRATE_TARGET).min(1.0);
        score += health * 100.0 * 0.30;
        total_weight += 0.30;
    }

    // Governance: pool size within 5% of target is fully healthy.
    if s.ticket_pool_size > 0.0 && s.ticket_pool_target > 0.0 {
        let gap = (1.0 - s.ticket_pool_size / s.ticket_pool_target).abs();
        let gov = (100.0 - (gap - 0.05).max(0.0) * 400.0).max(0.0);
        score += gov * 0.30;
        total_weight += 0.30;
    }

    // Treasury: 24 months of runway scores 100.
    if s.treasury_balance > 0.0 {
        let burn = if s.treasury_monthly_burn > 0.0 {
            s.treasury_monthly_burn
        } else {
            FALLBACK_MONTHLY_BURN
        };
        let runway = s.treasury_balance / burn;
        score += (runway / 24.0).min(1.0) * 100.0 * 0.20;
        total_weight += 0.20;
    }

    // DEX liquidity: 0.2% daily turnover, floored at 85.
    if s.volume_24h > 0.0 && s.market_cap > 0.0 {
        let turnover = s.volume_24h / s.market_cap;
        let dex = (turnover / 0.002).min(1.0) * 100.0;
        score += dex.max(85.0) * 0.20;
        total_weight += 0.20;
    }

    if total_weight > 0.0 {
        (score / total_weight).round().clamp(0.0, 100.0) as u32
    } else {
        60
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreTier {
    Sovereign,
    Fortified,
    Hardened,
    Stacking,
    Signal,
}

impl ScoreTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => ScoreTier::Sovereign,
            75..=89 => ScoreTier::Fortified,
            60..=74 => ScoreTier::Hardened,
            40..=59 => ScoreTier::Stacking,
            _ => ScoreTier::Signal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreTier::Sovereign => "SOVEREIGN",
            ScoreTier::Fortified => "FORTIFIED",
            ScoreTier::Hardened => "HARDENED",
            ScoreTier::Stacking => "STACKING",
            ScoreTier::Signal => "SIGNAL",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            ScoreTier::Sovereign => Rgb::new(0xf0, 0xb0, 0x40),
            ScoreTier::Fortified => Rgb::new(0x3b, 0xf0, 0xc0),
            ScoreTier::Hardened => Rgb::new(0x2e, 0xd6, 0xa1),
            ScoreTier::Stacking => Rgb::new(0x06, 0xb6, 0xd4),
            ScoreTier::Signal => Rgb::new(0xef, 0x44, 0x44),
        }
    }

    pub fn flavor(self) -> &'static str {
        match self {
            ScoreTier::Sovereign => "Self-funded. Self-governed. Not asking permission.",
            ScoreTier::Fortified => "The treasury builds. The stakeholders decide.",
            ScoreTier::Hardened => "Quietly compounding. The infrastructure doesn't sleep.",
            ScoreTier::Stacking => "Still here. Still building.",
            ScoreTier::Signal => "Maximum opportunity. The protocol has survived worse.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_fills_supplies_and_participation() {
        let s = NetworkSnapshot {
            ticket_pool_value: 8_000_000.0,
            coin_supply: 16_000_000.0,
            treasury_balance: 1_000_000.0,
            ..NetworkSnapshot::fallback()
        }
        .derive();
        assert!((s.stake_participation - 50.0).abs() < 1e-9);
        assert_eq!(s.unmined_supply, 5_000_000.0);
        assert_eq!(s.liquid_supply, 7_000_000.0);
    }

    #[test]
    fn supplies_never_go_negative() {
        let s = NetworkSnapshot {
            coin_supply: 30_000_000.0,
            ticket_pool_value: 40_000_000.0,
            ..NetworkSnapshot::fallback()
        }
        .derive();
        assert_eq!(s.unmined_supply, 0.0);
        assert_eq!(s.liquid_supply, 0.0);
    }

    #[test]
    fn score_defaults_to_sixty_without_data() {
        let s = NetworkSnapshot {
            hashrate: 0.0,
            ticket_pool_size: 0.0,
            treasury_balance: 0.0,
            volume_24h: 0.0,
            ..NetworkSnapshot::fallback()
        };
        assert_eq!(network_score(&s), 60);
    }

    #[test]
    fn healthy_network_scores_full_marks() {
        let s = NetworkSnapshot {
            hashrate: 1e17,
            ticket_pool_size: 40_960.0,
            ticket_pool_target: 40_960.0,
            treasury_balance: 1_000_000.0,
            treasury_monthly_burn: 10_000.0,
            volume_24h: 10_000_000.0,
            market_cap: 300_000_000.0,
            ..NetworkSnapshot::fallback()
        };
        assert_eq!(network_score(&s), 100);
    }

    #[test]
    fn pool_gap_beyond_band_is_penalised() {
        let mut s = NetworkSnapshot::fallback();
        s.hashrate = 0.0;
        s.treasury_balance = 0.0;
        s.volume_24h = 0.0;
        s.ticket_pool_target = 40_000.0;
        s.ticket_pool_size = 44_000.0; // 10% gap -> 100 - 0.05 * 400 = 80
        assert_eq!(network_score(&s), 80);
    }

    #[test]
    fn tiers_match_thresholds() {
        assert_eq!(ScoreTier::from_score(95).label(), "SOVEREIGN");
        assert_eq!(ScoreTier::from_score(75).label(), "FORTIFIED");
        assert_eq!(ScoreTier::from_score(60), ScoreTier::Hardened);
        assert_eq!(ScoreTier::from_score(40), ScoreTier::Stacking);
        assert_eq!(ScoreTier::from_score(39), ScoreTier::Signal);
    }

    #[test]
    fn json_uses_camel_case_and_fills_gaps_from_fallback() {
        let s: NetworkSnapshot =
            serde_json::from_str(r#"{ "blockHeight": 900000, "priceChange24h": -4.5 }"#).unwrap();
        assert_eq!(s.block_height, 900_000);
        assert_eq!(s.price_change_24h, -4.5);
        assert_eq!(s.ticket_pool_target, 40_960.0);
    }

    #[test]
    fn runway_requires_burn_rate() {
        let mut s = NetworkSnapshot::fallback();
        assert_eq!(s.runway_months(), Some(38));
        s.treasury_monthly_burn = 0.0;
        assert_eq!(s.runway_months(), None);
    }
}
