//! Risk score types and the numeric-to-letter grade mapping.
//!
//! # Scoring System
//!
//! Every asset receives four category sub-scores (crash, liquidity,
//! volatility, historical). The asset's overall score is the maximum of the
//! four. Assets that could not be scored carry [`SubScore::Unscored`] in every
//! field. A pool's overall score is the maximum over its scored assets.
//!
//! # Examples
//!
//! ```
//! use lendscore::domain::score::{Grade, SubScore};
//!
//! assert_eq!(Grade::from(SubScore::Scored(0)), Grade::A);
//! assert_eq!(Grade::from(SubScore::Scored(7)), Grade::F);
//! assert_eq!(Grade::from(SubScore::Unscored).to_string(), "unscored");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::id::{AssetAddress, PoolId};

/// Text used wherever an unscored value is rendered.
pub const UNSCORED: &str = "unscored";

/// A category or overall score: a non-negative integer, or unscored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubScore {
    Scored(u32),
    Unscored,
}

impl SubScore {
    #[must_use]
    pub const fn value(&self) -> Option<u32> {
        match self {
            Self::Scored(v) => Some(*v),
            Self::Unscored => None,
        }
    }

    #[must_use]
    pub const fn is_scored(&self) -> bool {
        matches!(self, Self::Scored(_))
    }

    /// Maximum over the scored values; unscored if none are scored.
    pub fn max_of(scores: impl IntoIterator<Item = Self>) -> Self {
        scores
            .into_iter()
            .filter_map(|s| s.value())
            .max()
            .map_or(Self::Unscored, Self::Scored)
    }
}

impl fmt::Display for SubScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scored(v) => write!(f, "{v}"),
            Self::Unscored => f.write_str(UNSCORED),
        }
    }
}

impl Serialize for SubScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scored(v) => serializer.serialize_u32(*v),
            Self::Unscored => serializer.serialize_str(UNSCORED),
        }
    }
}

/// Letter grade for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Grade {
    A,
    B,
    C,
    D,
    /// Lowest grade; also covers unexpected sub-score magnitudes.
    F,
    Unscored,
}

impl From<SubScore> for Grade {
    fn from(score: SubScore) -> Self {
        match score {
            SubScore::Scored(0) => Self::A,
            SubScore::Scored(1) => Self::B,
            SubScore::Scored(2) => Self::C,
            SubScore::Scored(3) => Self::D,
            SubScore::Scored(_) => Self::F,
            SubScore::Unscored => Self::Unscored,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
            Self::Unscored => UNSCORED,
        };
        f.write_str(s)
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The four category sub-scores and their maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub crash: SubScore,
    pub liquidity: SubScore,
    pub volatility: SubScore,
    pub historical: SubScore,
    pub overall: SubScore,
}

impl Score {
    /// Build a score from scored categories; `overall` is their maximum.
    #[must_use]
    pub fn from_categories(crash: u32, liquidity: u32, volatility: u32, historical: u32) -> Self {
        Self {
            crash: SubScore::Scored(crash),
            liquidity: SubScore::Scored(liquidity),
            volatility: SubScore::Scored(volatility),
            historical: SubScore::Scored(historical),
            overall: SubScore::Scored(crash.max(liquidity).max(volatility).max(historical)),
        }
    }

    /// All-zero score.
    #[must_use]
    pub fn safe() -> Self {
        Self::from_categories(0, 0, 0, 0)
    }

    /// Every field unscored.
    #[must_use]
    pub const fn unscored() -> Self {
        Self {
            crash: SubScore::Unscored,
            liquidity: SubScore::Unscored,
            volatility: SubScore::Unscored,
            historical: SubScore::Unscored,
            overall: SubScore::Unscored,
        }
    }

    #[must_use]
    pub fn grades(&self) -> ScoreGrades {
        ScoreGrades {
            crash: self.crash.into(),
            liquidity: self.liquidity.into(),
            volatility: self.volatility.into(),
            historical: self.historical.into(),
            overall: self.overall.into(),
        }
    }
}

/// Letter grades for every field of a [`Score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreGrades {
    pub crash: Grade,
    pub liquidity: Grade,
    pub volatility: Grade,
    pub historical: Grade,
    pub overall: Grade,
}

/// Inputs reported next to an asset's score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AssetInfo {
    pub collateral_factor: Option<f64>,
    pub token_down: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Score record for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetScore {
    pub address: AssetAddress,
    pub symbol: String,
    pub score: Score,
    pub info: AssetInfo,
}

impl AssetScore {
    /// Fixed all-zero record for the designated base asset.
    #[must_use]
    pub fn safe(address: AssetAddress, symbol: impl Into<String>) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            score: Score::safe(),
            info: AssetInfo {
                collateral_factor: Some(0.0),
                token_down: Some(0.0),
                market_cap: Some(0.0),
            },
        }
    }

    /// Record for an asset that could not be scored.
    #[must_use]
    pub fn unscored(address: AssetAddress, symbol: impl Into<String>) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            score: Score::unscored(),
            info: AssetInfo::default(),
        }
    }
}

/// Aggregated score for a lending pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolScore {
    pub pool_id: PoolId,
    /// Maximum over scored assets; unscored assets are excluded.
    pub overall: SubScore,
    pub multisig: bool,
    pub scores: Vec<AssetScore>,
    pub last_updated: DateTime<Utc>,
}

impl PoolScore {
    #[must_use]
    pub fn new(
        pool_id: PoolId,
        multisig: bool,
        scores: Vec<AssetScore>,
        last_updated: DateTime<Utc>,
    ) -> Self {
        let overall = SubScore::max_of(scores.iter().map(|s| s.score.overall));
        Self {
            pool_id,
            overall,
            multisig,
            scores,
            last_updated,
        }
    }

    /// Letter-grade view of the pool.
    #[must_use]
    pub fn grades(&self) -> PoolGrades {
        PoolGrades {
            pool_id: self.pool_id.clone(),
            overall: self.overall.into(),
            multisig: self.multisig,
            scores: self
                .scores
                .iter()
                .map(|s| (s.address.clone(), AssetGrades {
                    symbol: s.symbol.clone(),
                    grades: s.score.grades(),
                }))
                .collect(),
            last_updated: self.last_updated,
        }
    }
}

/// Letter grades for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetGrades {
    pub symbol: String,
    #[serde(flatten)]
    pub grades: ScoreGrades,
}

/// Letter-grade view of a [`PoolScore`], keyed by asset address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolGrades {
    pub pool_id: PoolId,
    pub overall: Grade,
    pub multisig: bool,
    pub scores: BTreeMap<AssetAddress, AssetGrades>,
    pub last_updated: DateTime<Utc>,
}
