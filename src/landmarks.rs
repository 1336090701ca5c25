//! The closed set of sagittal landmarks and their validated container.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LandmarkError, Result};
use crate::frames::{Frame, Point2D};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LandmarkName {
    #[serde(rename = "L1_ant")]
    L1Ant,
    #[serde(rename = "L1_post")]
    L1Post,
    #[serde(rename = "S1_ant")]
    S1Ant,
    #[serde(rename = "S1_post")]
    S1Post,
    #[serde(rename = "FH")]
    FH,
}

/// Order in which missing names are reported.
pub const REQUIRED_KEYS: [LandmarkName; 5] = [
    LandmarkName::FH,
    LandmarkName::S1Ant,
    LandmarkName::S1Post,
    LandmarkName::L1Ant,
    LandmarkName::L1Post,
];

impl LandmarkName {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LandmarkName::L1Ant => "L1_ant",
            LandmarkName::L1Post => "L1_post",
            LandmarkName::S1Ant => "S1_ant",
            LandmarkName::S1Post => "S1_post",
            LandmarkName::FH => "FH",
        }
    }
}

impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkName {
    type Err = LandmarkError;

    /// Names must match byte-for-byte.
    fn from_str(s: &str) -> Result<Self> {
        REQUIRED_KEYS
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| LandmarkError::UnknownLandmark {
                name: s.to_string(),
            })
    }
}

/// Positional conventions for five-landmark sequences.
///
/// Points placed by hand arrive in `Placement` order; predictor channels come
/// out in `Decoder` order. Sequences are only ever turned into a
/// [`LandmarkSet`] through one of these, never by assuming the two match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkOrder {
    Placement,
    #[default]
    Decoder,
}

impl LandmarkOrder {
    pub const fn names(&self) -> [LandmarkName; 5] {
        match self {
            LandmarkOrder::Placement => [
                LandmarkName::L1Ant,
                LandmarkName::L1Post,
                LandmarkName::S1Ant,
                LandmarkName::S1Post,
                LandmarkName::FH,
            ],
            LandmarkOrder::Decoder => [
                LandmarkName::FH,
                LandmarkName::S1Ant,
                LandmarkName::S1Post,
                LandmarkName::L1Ant,
                LandmarkName::L1Post,
            ],
        }
    }
}

/// All five landmarks in a single frame. Holding one means the completeness
/// check has already passed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkSet<F: Frame> {
    pub l1_ant: Point2D<F>,
    pub l1_post: Point2D<F>,
    pub s1_ant: Point2D<F>,
    pub s1_post: Point2D<F>,
    pub fh: Point2D<F>,
}

impl<F: Frame> LandmarkSet<F> {
    pub fn get(&self, name: LandmarkName) -> Point2D<F> {
        match name {
            LandmarkName::L1Ant => self.l1_ant,
            LandmarkName::L1Post => self.l1_post,
            LandmarkName::S1Ant => self.s1_ant,
            LandmarkName::S1Post => self.s1_post,
            LandmarkName::FH => self.fh,
        }
    }

    /// Builds a set from a name-keyed map. Unknown keys are ignored; any
    /// missing required key fails with every missing name listed.
    pub fn from_map<K: AsRef<str>>(points: &HashMap<K, Point2D<F>>) -> Result<Self> {
        let lookup = |name: LandmarkName| {
            points
                .iter()
                .find(|(k, _)| k.as_ref() == name.as_str())
                .map(|(_, p)| *p)
        };

        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|name| lookup(**name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LandmarkError::MissingLandmarks { missing });
        }

        let get = |name: LandmarkName| {
            lookup(name).ok_or_else(|| LandmarkError::MissingLandmarks {
                missing: vec![name.to_string()],
            })
        };
        Ok(Self {
            l1_ant: get(LandmarkName::L1Ant)?,
            l1_post: get(LandmarkName::L1Post)?,
            s1_ant: get(LandmarkName::S1Ant)?,
            s1_post: get(LandmarkName::S1Post)?,
            fh: get(LandmarkName::FH)?,
        })
    }

    /// Labels a positional sequence using `order`.
    pub fn from_ordered(points: &[Point2D<F>], order: LandmarkOrder) -> Result<Self> {
        if points.len() != 5 {
            return Err(LandmarkError::ChannelCount {
                expected: 5,
                found: points.len(),
            });
        }
        let map: HashMap<&str, Point2D<F>> = order
            .names()
            .iter()
            .zip(points)
            .map(|(name, p)| (name.as_str(), *p))
            .collect();
        Self::from_map(&map)
    }

    /// Points laid out in `order`.
    pub fn to_ordered(&self, order: LandmarkOrder) -> [Point2D<F>; 5] {
        order.names().map(|name| self.get(name))
    }

    /// Applies `f` to every landmark, e.g. to move the set to another frame.
    pub fn map<G: Frame>(&self, mut f: impl FnMut(Point2D<F>) -> Point2D<G>) -> LandmarkSet<G> {
        LandmarkSet {
            l1_ant: f(self.l1_ant),
            l1_post: f(self.l1_post),
            s1_ant: f(self.s1_ant),
            s1_post: f(self.s1_post),
            fh: f(self.fh),
        }
    }

    /// Mirrors every point about x = 0.
    pub fn flip_x(&self) -> Self {
        self.map(|p| Point2D::new(-p.x, p.y))
    }

    pub fn try_map<G: Frame>(
        &self,
        mut f: impl FnMut(Point2D<F>) -> Result<Point2D<G>>,
    ) -> Result<LandmarkSet<G>> {
        Ok(LandmarkSet {
            l1_ant: f(self.l1_ant)?,
            l1_post: f(self.l1_post)?,
            s1_ant: f(self.s1_ant)?,
            s1_post: f(self.s1_post)?,
            fh: f(self.fh)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::WorldPoint;

    fn sample_map() -> HashMap<String, WorldPoint> {
        [
            ("FH", (0.5, 2.0)),
            ("S1_ant", (0.0, 0.0)),
            ("S1_post", (1.0, 1.0)),
            ("L1_ant", (0.0, 1.0)),
            ("L1_post", (1.0, 2.0)),
        ]
        .into_iter()
        .map(|(k, p)| (k.to_string(), WorldPoint::from(p)))
        .collect()
    }

    #[test]
    fn test_from_map_ignores_extra_keys() {
        let mut map = sample_map();
        map.insert("T12_ant".to_string(), WorldPoint::new(9.0, 9.0));
        let set = LandmarkSet::from_map(&map).unwrap();
        assert_eq!(set.fh, WorldPoint::new(0.5, 2.0));
        assert_eq!(set.get(LandmarkName::L1Post), WorldPoint::new(1.0, 2.0));
    }

    #[test]
    fn test_from_map_reports_all_missing() {
        let mut map = sample_map();
        map.remove("S1_post");
        map.remove("L1_ant");
        let err = LandmarkSet::from_map(&map).unwrap_err();
        assert_eq!(
            err,
            LandmarkError::MissingLandmarks {
                missing: vec!["S1_post".to_string(), "L1_ant".to_string()]
            }
        );
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_eq!("S1_ant".parse::<LandmarkName>().unwrap(), LandmarkName::S1Ant);
        assert_eq!(
            "s1_ant".parse::<LandmarkName>().unwrap_err(),
            LandmarkError::UnknownLandmark {
                name: "s1_ant".to_string()
            }
        );
        let mut map = sample_map();
        let fh = map.remove("FH").unwrap();
        map.insert("fh".to_string(), fh);
        assert!(LandmarkSet::from_map(&map).is_err());
    }

    #[test]
    fn test_orders_differ_and_round_trip() {
        assert_ne!(
            LandmarkOrder::Placement.names(),
            LandmarkOrder::Decoder.names()
        );
        let set = LandmarkSet::from_map(&sample_map()).unwrap();
        for order in [LandmarkOrder::Placement, LandmarkOrder::Decoder] {
            let seq = set.to_ordered(order);
            assert_eq!(LandmarkSet::from_ordered(&seq, order).unwrap(), set);
        }
        // reading a placement sequence as decoder order swaps identities
        let seq = set.to_ordered(LandmarkOrder::Placement);
        let wrong = LandmarkSet::from_ordered(&seq, LandmarkOrder::Decoder).unwrap();
        assert_eq!(wrong.fh, set.l1_ant);
    }

    #[test]
    fn test_from_ordered_rejects_wrong_length() {
        let pts = [WorldPoint::new(0.0, 0.0); 3];
        assert_eq!(
            LandmarkSet::from_ordered(&pts, LandmarkOrder::Decoder).unwrap_err(),
            LandmarkError::ChannelCount {
                expected: 5,
                found: 3
            }
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LandmarkName::S1Post).unwrap();
        assert_eq!(json, "\"S1_post\"");
        let order: LandmarkOrder = serde_json::from_str("\"placement\"").unwrap();
        assert_eq!(order, LandmarkOrder::Placement);
    }
}
