use std::collections::BTreeSet;

use serde::Serialize;

use super::ComponentLabel;

// ---------------------------------------------------------------------------
// CompositionMatrix: consumption category × price component
// ---------------------------------------------------------------------------

/// Signed component values for one country and year.
///
/// Rows are consumption categories in lexical order, columns are components
/// in declaration order. Absent cells are `None` and read as zero by the
/// column and row helpers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionMatrix {
    pub country: String,
    pub year: String,
    pub categories: Vec<String>,
    pub components: Vec<ComponentLabel>,
    cells: Vec<Vec<Option<f64>>>,
}

impl CompositionMatrix {
    /// Pivot `(category, component, value)` triples into a matrix.
    ///
    /// The first pass collects both axes, the second places every value.
    /// A repeated cell keeps the last value seen.
    pub fn from_cells<I>(country: &str, year: &str, cells: I) -> Self
    where
        I: IntoIterator<Item = (String, ComponentLabel, f64)>,
    {
        let cells: Vec<_> = cells.into_iter().collect();

        let categories: Vec<String> = cells
            .iter()
            .map(|(c, _, _)| c.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let components: Vec<ComponentLabel> = cells
            .iter()
            .map(|(_, p, _)| *p)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut grid = vec![vec![None; components.len()]; categories.len()];
        for (category, component, value) in cells {
            let row = categories.binary_search(&category);
            let col = components.binary_search(&component);
            if let (Ok(r), Ok(c)) = (row, col) {
                grid[r][c] = Some(value);
            }
        }

        Self {
            country: country.to_string(),
            year: year.to_string(),
            categories,
            components,
            cells: grid,
        }
    }

    pub fn get(&self, category: &str, component: ComponentLabel) -> Option<f64> {
        let r = self.categories.iter().position(|c| c == category)?;
        let c = self.components.iter().position(|p| *p == component)?;
        self.cells[r][c]
    }

    /// Values of one component across all categories, missing cells as zero.
    pub fn column(&self, component: ComponentLabel) -> Vec<f64> {
        match self.components.iter().position(|p| *p == component) {
            Some(c) => self.cells.iter().map(|row| row[c].unwrap_or(0.0)).collect(),
            None => vec![0.0; self.categories.len()],
        }
    }

    /// Per-category sum over every component (the reconciliation total).
    pub fn row_totals(&self) -> Vec<f64> {
        self.row_sums(|_| true)
    }

    /// Per-category sum over the components accepted by `include`.
    pub fn row_sums<F>(&self, include: F) -> Vec<f64>
    where
        F: Fn(ComponentLabel) -> bool,
    {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.components)
                    .filter(|(_, p)| include(**p))
                    .map(|(v, _)| v.unwrap_or(0.0))
                    .sum()
            })
            .collect()
    }
}
