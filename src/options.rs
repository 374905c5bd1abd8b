//! Remesher configuration and its string-keyed option set.

use std::collections::BTreeMap;

use super::F;
use super::error::{RemeshError, RemeshResult};
use super::scale::absolute_edge_length;

pub const REFINE_FEATURES: &str = "REMESHER_REFINE_FEATURES";
pub const COARSEN_FEATURES: &str = "REMESHER_COARSEN_FEATURES";
pub const FEATURE_THRESHOLD: &str = "REMESHER_FEATURE_THRESHOLD";
pub const MIN_EDGE_LENGTH: &str = "REMESHER_MIN_EDGE_LENGTH";
pub const MAX_EDGE_LENGTH: &str = "REMESHER_MAX_EDGE_LENGTH";
pub const TARGET_EDGE_LENGTH: &str = "REMESHER_TARGET_EDGE_LENGTH";
pub const RELATIVE_EDGE_ERROR: &str = "REMESHER_RELATIVE_EDGE_ERROR";
pub const ITERATIONS: &str = "REMESHER_ITERATIONS";

/// Ordered name -> value map consumed by [`crate::remesh`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemesherOptions(BTreeMap<String, String>);

impl RemesherOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Typed form of the remesher options.
#[derive(Debug, Clone, PartialEq)]
pub struct RemeshConfig {
    /// Allow splitting of feature edges.
    pub refine_features: bool,
    /// Allow collapsing of feature edges.
    pub coarsen_features: bool,
    /// Edges whose dihedral cosine is below this are features.
    pub feature_threshold: F,
    pub min_edge_length: F,
    pub max_edge_length: F,
    pub target_edge_length: F,
    /// Negative means absolute edge lengths are used.
    pub relative_edge_error: F,
    pub iterations: u32,
}

impl Default for RemeshConfig {
    fn default() -> Self {
        Self {
            refine_features: true,
            coarsen_features: true,
            feature_threshold: (45. as F).to_radians().cos(),
            min_edge_length: 1.,
            max_edge_length: 2.,
            target_edge_length: 1.,
            relative_edge_error: -1.,
            iterations: 10,
        }
    }
}

impl RemeshConfig {
    /// Derives absolute engine settings from the mesh extent and user input.
    pub fn assemble(extent: F, relative_size: F, feature_angle_deg: F, iterations: u32) -> Self {
        let edge_len = absolute_edge_length(relative_size, extent);
        Self {
            refine_features: true,
            coarsen_features: true,
            feature_threshold: feature_angle_deg.to_radians().cos(),
            min_edge_length: edge_len,
            max_edge_length: edge_len * 2.,
            target_edge_length: edge_len,
            relative_edge_error: -1.,
            iterations,
        }
    }

    pub fn to_options(&self) -> RemesherOptions {
        let flag = |b: bool| if b { "TRUE" } else { "FALSE" };
        let mut opts = RemesherOptions::new();
        opts.set(REFINE_FEATURES, flag(self.refine_features));
        opts.set(COARSEN_FEATURES, flag(self.coarsen_features));
        opts.set(FEATURE_THRESHOLD, self.feature_threshold);
        opts.set(MIN_EDGE_LENGTH, self.min_edge_length);
        opts.set(MAX_EDGE_LENGTH, self.max_edge_length);
        opts.set(TARGET_EDGE_LENGTH, self.target_edge_length);
        opts.set(RELATIVE_EDGE_ERROR, self.relative_edge_error);
        opts.set(ITERATIONS, self.iterations);
        opts
    }

    /// Parses an option set, missing keys keep their defaults.
    pub fn from_options(opts: &RemesherOptions) -> RemeshResult<Self> {
        let mut cfg = Self::default();
        for (key, value) in opts.iter() {
            let invalid = || RemeshError::InvalidOption {
                key: key.to_string(),
                value: value.to_string(),
            };
            let num = || value.trim().parse::<F>().map_err(|_| invalid());
            let flag = || match value.trim().to_ascii_uppercase().as_str() {
                "TRUE" | "1" => Ok(true),
                "FALSE" | "0" => Ok(false),
                _ => Err(invalid()),
            };
            match key {
                REFINE_FEATURES => cfg.refine_features = flag()?,
                COARSEN_FEATURES => cfg.coarsen_features = flag()?,
                FEATURE_THRESHOLD => cfg.feature_threshold = num()?,
                MIN_EDGE_LENGTH => cfg.min_edge_length = num()?,
                MAX_EDGE_LENGTH => cfg.max_edge_length = num()?,
                TARGET_EDGE_LENGTH => cfg.target_edge_length = num()?,
                RELATIVE_EDGE_ERROR => cfg.relative_edge_error = num()?,
                ITERATIONS => cfg.iterations = value.trim().parse().map_err(|_| invalid())?,
                _ => return Err(RemeshError::UnknownOption(key.to_string())),
            }
        }
        Ok(cfg)
    }
}
