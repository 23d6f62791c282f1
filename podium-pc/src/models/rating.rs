//! Self-evaluation rating categories and values
//!
//! The category set is fixed: every attempt is rated on exactly these
//! four axes, each on a 1-5 scale.

use podium_common::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Minimum accepted rating value
pub const MIN_RATING: u8 = 1;
/// Maximum accepted rating value
pub const MAX_RATING: u8 = 5;

/// Fixed self-evaluation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RatingCategory {
    EyeContact,
    Posture,
    Voice,
    Content,
}

impl RatingCategory {
    /// All categories, in display order
    pub const ALL: [RatingCategory; 4] = [
        RatingCategory::EyeContact,
        RatingCategory::Posture,
        RatingCategory::Voice,
        RatingCategory::Content,
    ];

    /// Wire name used in API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingCategory::EyeContact => "eyeContact",
            RatingCategory::Posture => "posture",
            RatingCategory::Voice => "voice",
            RatingCategory::Content => "content",
        }
    }
}

impl fmt::Display for RatingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatingCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eyeContact" => Ok(RatingCategory::EyeContact),
            "posture" => Ok(RatingCategory::Posture),
            "voice" => Ok(RatingCategory::Voice),
            "content" => Ok(RatingCategory::Content),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }
}

/// Validate a rating value against the 1-5 scale
pub fn validate_rating(value: i64) -> Result<u8, Error> {
    if (MIN_RATING as i64..=MAX_RATING as i64).contains(&value) {
        Ok(value as u8)
    } else {
        Err(Error::InvalidRating(value))
    }
}

/// Complete self-evaluation across all four categories
///
/// Only ever constructed whole, at commit time; partial rating state
/// lives in the collector until then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfEvaluation {
    pub eye_contact: u8,
    pub posture: u8,
    pub voice: u8,
    pub content: u8,
}

impl SelfEvaluation {
    /// Assemble from a rating buffer; None unless all four categories are set
    pub fn from_ratings(ratings: &HashMap<RatingCategory, u8>) -> Option<Self> {
        Some(Self {
            eye_contact: *ratings.get(&RatingCategory::EyeContact)?,
            posture: *ratings.get(&RatingCategory::Posture)?,
            voice: *ratings.get(&RatingCategory::Voice)?,
            content: *ratings.get(&RatingCategory::Content)?,
        })
    }

    /// Rating for a single category
    pub fn get(&self, category: RatingCategory) -> u8 {
        match category {
            RatingCategory::EyeContact => self.eye_contact,
            RatingCategory::Posture => self.posture,
            RatingCategory::Voice => self.voice,
            RatingCategory::Content => self.content,
        }
    }
}
