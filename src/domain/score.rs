//! Numeric domain for node values and alpha/beta bounds.
//!
//! Infinities are ordinary values here: they seed accumulators and bounds and
//! must never be confused with a finite number when rendered or serialized.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A signed real value where `±∞` are first-class.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Score(f64);

impl Score {
    pub const INFINITY: Score = Score(f64::INFINITY);
    pub const NEG_INFINITY: Score = Score(f64::NEG_INFINITY);
    pub const ZERO: Score = Score(0.0);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Larger of the two; on a tie the receiver wins.
    pub fn max_first(self, other: Score) -> Score {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }

    /// Smaller of the two; on a tie the receiver wins.
    pub fn min_first(self, other: Score) -> Score {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<i32> for Score {
    fn from(value: i32) -> Self {
        Self(f64::from(value))
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == f64::INFINITY {
            write!(f, "∞")
        } else if self.0 == f64::NEG_INFINITY {
            write!(f, "-∞")
        } else {
            // -0.0 + 0.0 is +0.0
            write!(f, "{}", self.0 + 0.0)
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.serialize_str(&self.to_string())
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreRepr {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ScoreRepr::deserialize(deserializer)? {
            ScoreRepr::Number(n) => Ok(Score(n)),
            ScoreRepr::Text(s) => match s.trim() {
                "∞" | "+∞" | "inf" | "+inf" | "Infinity" | "+Infinity" => Ok(Score::INFINITY),
                "-∞" | "−∞" | "-inf" | "-Infinity" => Ok(Score::NEG_INFINITY),
                other => other
                    .parse::<f64>()
                    .map(Score)
                    .map_err(|_| serde::de::Error::custom(format!("invalid score: {other}"))),
            },
        }
    }
}
