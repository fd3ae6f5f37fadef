//! One-hot encoding of categorical employer columns.
//!
//! Levels are enumerated in lexicographic order and the first level is the
//! dropped baseline, so a column with `N` observed levels contributes `N - 1`
//! indicator columns. Missing values encode as all zeros, the same shape the
//! baseline takes.

use std::collections::BTreeSet;

use super::records::LabeledEmployer;

type ValueAccessor = fn(&LabeledEmployer) -> Option<&str>;

/// Indicator layout for a single categorical source column.
#[derive(Debug, Clone)]
pub struct EncodedColumn {
    /// Source column name.
    pub column: String,
    /// Dropped baseline level, when the column has at least one level.
    pub baseline: Option<String>,
    /// Levels that received an indicator column, in lexicographic order.
    pub levels: Vec<String>,
    accessor: ValueAccessor,
}

/// One-hot encoder fitted on the cleaned dataset.
///
/// One-shot fit/transform: the encoder is rebuilt from data on every run and
/// is not part of the persisted model. The resulting feature names are, which
/// lets evaluation detect a level-set drift between runs.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    columns: Vec<EncodedColumn>,
}

impl OneHotEncoder {
    /// Fit indicator layouts for the sector and location columns.
    pub fn fit(rows: &[LabeledEmployer]) -> Self {
        let columns = vec![
            fit_column("secteur_activite", rows, |row| {
                row.secteur_activite.as_deref()
            }),
            fit_column("localisation", rows, |row| row.localisation.as_deref()),
        ];
        Self { columns }
    }

    /// Fitted column layouts, in feature order.
    pub fn columns(&self) -> &[EncodedColumn] {
        &self.columns
    }

    /// One `"column=level"` name per indicator, in encoding order.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|column| {
                column
                    .levels
                    .iter()
                    .map(move |level| format!("{}={}", column.column, level))
            })
            .collect()
    }

    /// Total number of indicator columns.
    pub fn indicator_len(&self) -> usize {
        self.columns.iter().map(|column| column.levels.len()).sum()
    }

    /// Encode one row into indicator values.
    pub fn encode_row(&self, row: &LabeledEmployer) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.indicator_len());
        for column in &self.columns {
            let value = (column.accessor)(row);
            for level in &column.levels {
                let hit = value.is_some_and(|v| v == level.as_str());
                out.push(if hit { 1.0 } else { 0.0 });
            }
        }
        out
    }

    /// Recover the level a column's indicator slice represents.
    ///
    /// Returns the matching level, or the baseline when every indicator is
    /// zero. `None` means the column had no observed levels at fit time.
    pub fn decode(&self, column_index: usize, indicators: &[f32]) -> Option<&str> {
        let column = self.columns.get(column_index)?;
        for (level, &value) in column.levels.iter().zip(indicators) {
            if value != 0.0 {
                return Some(level.as_str());
            }
        }
        column.baseline.as_deref()
    }
}

fn fit_column(name: &str, rows: &[LabeledEmployer], accessor: ValueAccessor) -> EncodedColumn {
    let observed: BTreeSet<String> = rows
        .iter()
        .filter_map(|row| accessor(row).map(str::to_string))
        .collect();
    let mut levels: Vec<String> = observed.into_iter().collect();
    let baseline = if levels.is_empty() {
        None
    } else {
        Some(levels.remove(0))
    };
    EncodedColumn {
        column: name.to_string(),
        baseline,
        levels,
        accessor,
    }
}
