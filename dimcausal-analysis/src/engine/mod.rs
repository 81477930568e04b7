//! Causality engine: orchestrates the pipeline over the four embedded
//! spaces and applies the decision rule.
//!
//! Stages run in order Embedding -> Neighbors -> Dimensions -> Trim ->
//! Aggregate -> Decide; a failure at any stage aborts the query with no
//! partial result. The four spaces are mutually independent, so the
//! expensive stages fan out across them with `rayon::join`; per-point
//! work inside each space is itself a parallel map. Every fold back into
//! results is sequential and ordered, so identical inputs produce
//! bit-identical output regardless of scheduling.

pub mod decision;

use dimcausal_core::cancel::CancelToken;
use dimcausal_core::config::CausalityConfig;
use dimcausal_core::errors::{CausalityError, CausalityResult as Result};
use dimcausal_core::result::{
    CausalDirection, CausalityResult, SweepEntry, SweepOutcome, TrimDiagnostics,
};
use dimcausal_core::series::TimeSeries;

use crate::dimension::{self, local_dimensions};
use crate::embedding::{EmbeddedSpace, EmbeddingSpec};
use crate::neighbors::NeighborTable;
use crate::statistics::aggregate;
use crate::trimming::trim;
use decision::SpaceStats;

/// Pipeline stages, in execution order. Cancellation is checked at each
/// boundary, never inside the per-point kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Embedding,
    Neighbors,
    Dimensions,
    Trim,
    Aggregate,
    Decide,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Stage::Embedding => "embedding",
            Stage::Neighbors => "neighbors",
            Stage::Dimensions => "dimensions",
            Stage::Trim => "trim",
            Stage::Aggregate => "aggregate",
            Stage::Decide => "decide",
        }
    }
}

/// The four embedded spaces of one query.
struct Spaces {
    x: EmbeddedSpace,
    y: EmbeddedSpace,
    joint: EmbeddedSpace,
    product: EmbeddedSpace,
}

/// Neighbor tables for the four spaces, computed once at the largest
/// neighbor count the query (or sweep) will read.
struct Tables {
    x: NeighborTable,
    y: NeighborTable,
    joint: NeighborTable,
    product: NeighborTable,
}

/// Dimensional-causality inference engine.
pub struct CausalityEngine {
    config: CausalityConfig,
    cancel: Option<CancelToken>,
}

impl CausalityEngine {
    /// Build an engine, validating the configuration up front.
    pub fn new(config: CausalityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, cancel: None })
    }

    /// Attach a cancellation token checked at stage boundaries.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &CausalityConfig {
        &self.config
    }

    /// Infer the causal direction between two series.
    pub fn infer(&self, x: &TimeSeries, y: &TimeSeries) -> Result<CausalityResult> {
        let k = self.config.neighbor_count;
        let spaces = self.build_spaces(x, y)?;
        let tables =
            self.build_tables(&spaces, dimension::required_neighbors(k, self.config.estimator))?;
        self.run_query(&spaces, &tables, k)
    }

    /// Explore a range of neighbor counts, reusing the neighbor tables
    /// computed once at the largest count. Reports per-k results plus a
    /// majority consensus (ties resolve to `Undetermined`).
    pub fn infer_sweep(
        &self,
        x: &TimeSeries,
        y: &TimeSeries,
        neighbor_counts: &[usize],
    ) -> Result<SweepOutcome> {
        if neighbor_counts.is_empty() {
            return Err(CausalityError::invalid("neighbor_counts", "sweep range must not be empty"));
        }
        if let Some(&bad) = neighbor_counts.iter().find(|&&k| k < 2) {
            return Err(CausalityError::invalid(
                "neighbor_counts",
                format!("every neighbor count must be >= 2, got {bad}"),
            ));
        }

        let k_max = *neighbor_counts.iter().max().unwrap_or(&2);
        let spaces = self.build_spaces(x, y)?;
        let tables = self
            .build_tables(&spaces, dimension::required_neighbors(k_max, self.config.estimator))?;

        let mut entries = Vec::with_capacity(neighbor_counts.len());
        for &k in neighbor_counts {
            let result = self.run_query(&spaces, &tables, k)?;
            entries.push(SweepEntry { neighbor_count: k, result });
        }
        let consensus = consensus(&entries);
        Ok(SweepOutcome { entries, consensus })
    }

    fn checkpoint(&self, stage: Stage) -> Result<()> {
        if let Some(token) = &self.cancel {
            if token.is_cancelled() {
                return Err(CausalityError::Cancelled { stage: stage.name() });
            }
        }
        Ok(())
    }

    fn build_spaces(&self, x: &TimeSeries, y: &TimeSeries) -> Result<Spaces> {
        self.checkpoint(Stage::Embedding)?;
        let spec = EmbeddingSpec::new(self.config.embedding_dim, self.config.time_delay);
        let x_space = EmbeddedSpace::delay_embed(x, spec)?;
        let y_space = EmbeddedSpace::delay_embed(y, spec)?;
        let joint = EmbeddedSpace::joint(&x_space, &y_space)?;
        let product = EmbeddedSpace::direct_product(&x_space, &y_space)?;

        let rate = self.config.downsample_rate;
        let spaces = Spaces {
            x: x_space.downsample(rate),
            y: y_space.downsample(rate),
            joint: joint.downsample(rate),
            product: product.downsample(rate),
        };
        tracing::debug!(
            x_points = spaces.x.len(),
            joint_points = spaces.joint.len(),
            "embedded manifolds"
        );
        Ok(spaces)
    }

    fn build_tables(&self, spaces: &Spaces, k_needed: usize) -> Result<Tables> {
        self.checkpoint(Stage::Neighbors)?;
        let ((x, y), (joint, product)) = rayon::join(
            || {
                rayon::join(
                    || NeighborTable::build(&spaces.x, k_needed),
                    || NeighborTable::build(&spaces.y, k_needed),
                )
            },
            || {
                rayon::join(
                    || NeighborTable::build(&spaces.joint, k_needed),
                    || NeighborTable::build(&spaces.product, k_needed),
                )
            },
        );
        Ok(Tables { x: x?, y: y?, joint: joint?, product: product? })
    }

    /// Dimensions through Decide for one neighbor count, over tables that
    /// hold at least the neighbors the estimator reads.
    fn run_query(&self, spaces: &Spaces, tables: &Tables, k: usize) -> Result<CausalityResult> {
        let estimator = self.config.estimator;

        self.checkpoint(Stage::Dimensions)?;
        let ((dims_x, dims_y), (dims_joint, dims_product)) = rayon::join(
            || {
                rayon::join(
                    || local_dimensions(&tables.x, k, estimator),
                    || local_dimensions(&tables.y, k, estimator),
                )
            },
            || {
                rayon::join(
                    || local_dimensions(&tables.joint, k, estimator),
                    || local_dimensions(&tables.product, k, estimator),
                )
            },
        );

        self.checkpoint(Stage::Trim)?;
        let sigma = self.config.trim_outlier_sigma;
        let trim_x = trim(&spaces.x, &dims_x, sigma);
        let trim_y = trim(&spaces.y, &dims_y, sigma);
        let trim_joint = trim(&spaces.joint, &dims_joint, sigma);
        let trim_product = trim(&spaces.product, &dims_product, sigma);
        let trimming = TrimDiagnostics {
            x: trim_x.report,
            y: trim_y.report,
            joint: trim_joint.report,
            product: trim_product.report,
        };

        self.checkpoint(Stage::Aggregate)?;
        let min = self.config.min_sample_size;
        let stats = SpaceStats {
            x: aggregate(&trim_x.estimates, k, min)?,
            y: aggregate(&trim_y.estimates, k, min)?,
            joint: aggregate(&trim_joint.estimates, k, min)?,
            product: aggregate(&trim_product.estimates, k, min)?,
        };

        self.checkpoint(Stage::Decide)?;
        let result = decision::decide(&self.config, stats, trimming);
        tracing::debug!(
            direction = ?result.direction,
            k,
            joint_dim = result.stats_joint.mean,
            "decision"
        );
        Ok(result)
    }
}

/// Majority direction across sweep entries; ties resolve to `Undetermined`.
fn consensus(entries: &[SweepEntry]) -> CausalDirection {
    const DIRECTIONS: [CausalDirection; 5] = [
        CausalDirection::XCausesY,
        CausalDirection::YCausesX,
        CausalDirection::Both,
        CausalDirection::None,
        CausalDirection::Undetermined,
    ];
    let mut best = CausalDirection::Undetermined;
    let mut best_count = 0;
    let mut tied = false;
    for direction in DIRECTIONS {
        let count = entries.iter().filter(|e| e.result.direction == direction).count();
        if count > best_count {
            best = direction;
            best_count = count;
            tied = false;
        } else if count == best_count && count > 0 {
            tied = true;
        }
    }
    if tied {
        CausalDirection::Undetermined
    } else {
        best
    }
}
