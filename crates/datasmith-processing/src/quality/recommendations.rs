//! Rule-based advice derived from the summary, missing and outlier reports.

use crate::config::AnalysisConfig;
use crate::types::{DatasetSummary, MissingReport, OutlierReport, percentage};

const HIGH_MISSING: &str =
    "High missing data detected. Consider dropping columns or using advanced imputation methods.";
const MODERATE_MISSING: &str =
    "Moderate missing data detected. Consider mean/median imputation for numeric columns.";
const LOOKS_GOOD: &str = "Data quality looks good! Ready for analysis and modeling.";

/// Turns report figures into ordered, human-readable recommendations.
pub struct RecommendationEngine<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Produce the recommendation list. The result is never empty.
    ///
    /// Rules are evaluated in order: missing data (high or moderate, at most
    /// one), duplicates, then IQR outliers. Outlier percentage is relative to
    /// `rows * numeric_columns`.
    pub fn recommend(
        &self,
        summary: &DatasetSummary,
        missing: &MissingReport,
        iqr_outliers: &OutlierReport,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        let missing_pct = percentage(missing.total_missing, summary.rows * summary.columns);
        if missing_pct > self.config.high_missing_threshold {
            recommendations.push(HIGH_MISSING.to_string());
        } else if missing_pct > self.config.moderate_missing_threshold {
            recommendations.push(MODERATE_MISSING.to_string());
        }

        if summary.duplicate_percentage > self.config.duplicate_threshold {
            recommendations.push(format!(
                "Found {} duplicate rows ({:.1}%). Consider removing them.",
                summary.duplicates, summary.duplicate_percentage
            ));
        }

        let outlier_pct = percentage(
            iqr_outliers.total_outliers,
            summary.rows * summary.numeric_column_count(),
        );
        if outlier_pct > self.config.outlier_threshold {
            recommendations.push(format!(
                "Significant outliers detected ({:.1}%). Review and handle them appropriately.",
                outlier_pct
            ));
        }

        if recommendations.is_empty() {
            recommendations.push(LOOKS_GOOD.to_string());
        }

        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnKind, ColumnProfile, OutlierMethod};
    use pretty_assertions::assert_eq;

    fn summary(rows: usize, numeric: usize, text: usize, duplicates: usize) -> DatasetSummary {
        let column_types: Vec<ColumnProfile> = (0..numeric)
            .map(|i| (format!("n{i}"), ColumnKind::Numeric))
            .chain((0..text).map(|i| (format!("t{i}"), ColumnKind::Text)))
            .map(|(name, kind)| ColumnProfile {
                name,
                dtype: String::new(),
                kind,
                non_missing: rows,
            })
            .collect();

        DatasetSummary {
            rows,
            columns: numeric + text,
            column_names: column_types.iter().map(|c| c.name.clone()).collect(),
            column_types,
            memory_usage: 0.0,
            duplicates,
            duplicate_percentage: percentage(duplicates, rows),
        }
    }

    fn missing(total_missing: usize, total_cells: usize) -> MissingReport {
        MissingReport {
            columns: Vec::new(),
            total_missing,
            total_cells,
        }
    }

    fn outliers(total: usize) -> OutlierReport {
        OutlierReport {
            method: OutlierMethod::Iqr,
            columns: Vec::new(),
            total_outliers: total,
        }
    }

    #[test]
    fn test_clean_dataset_looks_good() {
        let config = AnalysisConfig::default();
        let recs = RecommendationEngine::new(&config).recommend(
            &summary(100, 2, 1, 0),
            &missing(0, 300),
            &outliers(0),
        );
        assert_eq!(recs, vec![LOOKS_GOOD.to_string()]);
    }

    #[test]
    fn test_high_missing_suppresses_moderate() {
        let config = AnalysisConfig::default();
        let recs = RecommendationEngine::new(&config).recommend(
            &summary(10, 1, 0, 0),
            &missing(4, 10),
            &outliers(0),
        );
        assert_eq!(recs, vec![HIGH_MISSING.to_string()]);
    }

    #[test]
    fn test_moderate_missing() {
        let config = AnalysisConfig::default();
        let recs = RecommendationEngine::new(&config).recommend(
            &summary(10, 1, 0, 0),
            &missing(2, 10),
            &outliers(0),
        );
        assert_eq!(recs, vec![MODERATE_MISSING.to_string()]);
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let config = AnalysisConfig::default();
        let recs = RecommendationEngine::new(&config).recommend(
            &summary(100, 2, 0, 10),
            &missing(80, 200),
            &outliers(20),
        );
        assert_eq!(
            recs,
            vec![
                HIGH_MISSING.to_string(),
                "Found 10 duplicate rows (10.0%). Consider removing them.".to_string(),
                "Significant outliers detected (10.0%). Review and handle them appropriately."
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        let config = AnalysisConfig::default();
        // exactly 10% missing, 5% duplicates, 5% outliers: nothing fires
        let recs = RecommendationEngine::new(&config).recommend(
            &summary(100, 1, 0, 5),
            &missing(10, 100),
            &outliers(5),
        );
        assert_eq!(recs, vec![LOOKS_GOOD.to_string()]);
    }

    #[test]
    fn test_no_numeric_columns_means_no_outlier_advice() {
        let config = AnalysisConfig::default();
        let recs = RecommendationEngine::new(&config).recommend(
            &summary(0, 0, 3, 0),
            &missing(0, 0),
            &outliers(0),
        );
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn test_custom_threshold() {
        let config = AnalysisConfig::builder()
            .duplicate_threshold(1.0)
            .build()
            .unwrap();
        let recs = RecommendationEngine::new(&config).recommend(
            &summary(100, 1, 0, 2),
            &missing(0, 100),
            &outliers(0),
        );
        assert_eq!(
            recs,
            vec!["Found 2 duplicate rows (2.0%). Consider removing them.".to_string()]
        );
    }
}
