use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};

/// Normalized (0..1) box around a detected object, stored as
/// `"left,top,right,bottom"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.top, self.right, self.bottom)
    }
}

impl FromStr for BoundingBox {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f32>()
                    .map_err(|err| anyhow!("invalid bounding box value '{part}': {err}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (left, top, right, bottom) = match values.as_slice() {
            &[left, top, right, bottom] => (left, top, right, bottom),
            _ => bail!("bounding box needs 4 values, got {}", values.len()),
        };

        if [left, top, right, bottom]
            .iter()
            .any(|v| !(0.0..=1.0).contains(v))
        {
            bail!("bounding box '{s}' is not normalized");
        }
        if left > right || top > bottom {
            bail!("bounding box '{s}' has inverted edges");
        }

        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }
}
