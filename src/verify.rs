/*!
# Store verification
Re-streams a score table and checks that every scored position decodes from the store within a tolerance.
Ambiguous references are resolved the same way as during the build, so dropped rows are not checked.
*/
use derive_builder::Builder;
use log::{debug, warn};
use serde::Serialize;

use crate::data_types::position_group::PositionGroup;
use crate::parsing::store_reader::ScoreStore;

/// Controls how a store is verified
#[derive(Builder, Clone, Copy, Debug, Serialize)]
#[builder(default)]
pub struct VerifyConfig {
    /// Maximum absolute difference allowed between the table and the decoded score
    tolerance: f64,
    /// Only every Nth position is checked
    step: u64,
    /// Mismatches past this count are counted but not logged
    max_reported: u64
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            // half a quantization step is ~0.0489
            tolerance: 0.05,
            step: 1,
            max_reported: 10
        }
    }
}

impl VerifyConfig {
    // getters
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn max_reported(&self) -> u64 {
        self.max_reported
    }
}

/// Results of a verification pass
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VerifySummary {
    /// Positions read from the table
    pub positions_seen: u64,
    /// Positions compared against the store
    pub positions_checked: u64,
    /// Individual base scores compared
    pub scores_checked: u64,
    /// Largest absolute difference observed
    pub max_abs_error: f64,
    /// Positions that failed a check
    pub mismatches: u64
}

impl VerifySummary {
    /// Returns true if no mismatches were found
    pub fn is_success(&self) -> bool {
        self.mismatches == 0
    }
}

/// Checks every `step`-th position group against the store.
/// # Arguments
/// * `groups` - the position groups from the source table
/// * `store` - the store built from that table
/// * `config` - tolerance and sampling settings
/// # Errors
/// * if reading the table fails or a group cannot be resolved
pub fn verify_store<I>(groups: I, store: &ScoreStore, config: VerifyConfig) -> anyhow::Result<VerifySummary>
where
    I: Iterator<Item = anyhow::Result<PositionGroup>>
{
    let step = config.step().max(1);
    let mut summary = VerifySummary::default();
    for (i, group) in groups.enumerate() {
        let group = group?;
        summary.positions_seen += 1;
        if (i as u64) % step != 0 {
            continue;
        }

        let expected = group.resolve_quad()?;
        summary.positions_checked += 1;

        let failure = match store.scores(group.chrom(), group.position()) {
            Ok(stored) => {
                let mut failure = None;
                if stored.missing_base() != expected.missing_base() {
                    failure = Some(format!(
                        "reference base {:?} stored as {:?}", expected.missing_base(), stored.missing_base()
                    ));
                }
                for (base, score) in expected.present() {
                    let decoded = stored.get(base).unwrap_or(0.0);
                    let diff = (decoded - score).abs();
                    summary.scores_checked += 1;
                    summary.max_abs_error = summary.max_abs_error.max(diff);
                    if diff > config.tolerance() && failure.is_none() {
                        failure = Some(format!("{base}: expected {score}, decoded {decoded:.3}"));
                    }
                }
                failure
            },
            Err(e) => Some(e.to_string())
        };

        if let Some(reason) = failure {
            summary.mismatches += 1;
            if summary.mismatches <= config.max_reported() {
                warn!("Mismatch at {}:{}: {reason}", group.chrom(), group.position());
            } else {
                debug!("Mismatch at {}:{}: {reason}", group.chrom(), group.position());
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::data_types::bases::Base;
    use crate::data_types::position_group::ScoreRow;
    use crate::parsing::score_table::ScoreTableReader;
    use crate::writers::score_store::{store_paths, StoreWriter};

    const TABLE_FN: &str = "test_data/scores_small.tsv";

    fn build_store(prefix: &Path) -> ScoreStore {
        let mut writer = StoreWriter::from_prefix(prefix).unwrap();
        for group in ScoreTableReader::from_path(Path::new(TABLE_FN)).unwrap() {
            writer.add_group(&group.unwrap()).unwrap();
        }
        writer.finish().unwrap();
        let (_bin_fn, idx_fn) = store_paths(prefix);
        ScoreStore::open(&idx_fn).unwrap()
    }

    #[test]
    fn test_verify_clean() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = build_store(&tmp_dir.path().join("example"));

        let groups = ScoreTableReader::from_path(Path::new(TABLE_FN)).unwrap();
        let summary = verify_store(groups, &store, VerifyConfig::default()).unwrap();
        assert!(summary.is_success());
        assert_eq!(summary.positions_seen, 6);
        assert_eq!(summary.positions_checked, 6);
        assert_eq!(summary.scores_checked, 18);
        assert!(summary.max_abs_error <= 0.5 / crate::codec::SCALE_FACTOR + 1e-9);
    }

    #[test]
    fn test_verify_step() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = build_store(&tmp_dir.path().join("example"));

        let config = VerifyConfigBuilder::default()
            .step(4)
            .build().unwrap();
        let groups = ScoreTableReader::from_path(Path::new(TABLE_FN)).unwrap();
        let summary = verify_store(groups, &store, config).unwrap();
        assert_eq!(summary.positions_seen, 6);
        assert_eq!(summary.positions_checked, 2);
        assert!(summary.is_success());
    }

    #[test]
    fn test_verify_mismatches() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = build_store(&tmp_dir.path().join("example"));

        let row = |alternate, score| ScoreRow { alternate, score };
        let groups = vec![
            // score is off by 1.0
            PositionGroup::new("1".to_string(), 1, "A".to_string(), vec![
                row(Base::C, 11.0), row(Base::G, 20.0), row(Base::T, 30.0)
            ]),
            // wrong reference base
            PositionGroup::new("1".to_string(), 3, "T".to_string(), vec![
                row(Base::A, 5.0), row(Base::C, 15.0), row(Base::G, 25.0)
            ]),
            // not in the store
            PositionGroup::new("7".to_string(), 1, "A".to_string(), vec![
                row(Base::C, 1.0), row(Base::G, 2.0), row(Base::T, 3.0)
            ]),
            // correct
            PositionGroup::new("X".to_string(), 7, "C".to_string(), vec![
                row(Base::A, 99.9), row(Base::G, 0.0), row(Base::T, 50.5)
            ]),
        ];

        let config = VerifyConfigBuilder::default()
            .max_reported(1)
            .build().unwrap();
        let summary = verify_store(groups.into_iter().map(Ok), &store, config).unwrap();
        assert_eq!(summary.positions_checked, 4);
        assert_eq!(summary.mismatches, 3);
        assert!(!summary.is_success());
        assert!(summary.max_abs_error > 0.9);
    }
}
