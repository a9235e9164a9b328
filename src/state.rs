use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::color::ColorMap;
use crate::data::filter::{
    compute_callouts, filter_indices, parse_identifiers, round2, validate_query, Callout,
    MatchMode,
};
use crate::data::loader::load_file;
use crate::data::model::{IndexRecord, IndexTable};

// ---------------------------------------------------------------------------
// Small UI-facing value types
// ---------------------------------------------------------------------------

/// Single-year lookup or multi-year trend, mirroring the two query styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearMode {
    Single,
    Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

/// Status line shown in the top bar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: StatusKind::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Which result-table column drives the sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Year,
    Code,
    Company,
    Index,
}

/// Result-table sort state. Clicking the active column flips direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSort {
    pub column: SortColumn,
    pub ascending: bool,
}

impl Default for TableSort {
    fn default() -> Self {
        TableSort {
            column: SortColumn::Year,
            ascending: true,
        }
    }
}

impl TableSort {
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.ascending = !self.ascending;
        } else {
            self.column = column;
            self.ascending = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub table: Option<IndexTable>,
    /// Path the table came from; reload re-reads it.
    pub source_path: Option<PathBuf>,

    // -- query form --
    /// Comma-separated stock codes or company names.
    pub identifier_input: String,
    pub match_mode: MatchMode,
    pub year_mode: YearMode,
    pub single_year: Option<i32>,
    pub trend_years: BTreeSet<i32>,
    /// Annotate the target year's points with value callouts.
    pub show_callouts: bool,

    // -- last query result --
    /// Indices into the table, sorted by (year, company_name).
    pub results: Vec<usize>,
    pub callouts: Vec<Callout>,
    /// Whether a query has been executed since the table was loaded.
    pub has_run: bool,

    // -- presentation --
    pub sort: TableSort,
    pub color_map: ColorMap,
    pub status: Option<StatusMessage>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            source_path: None,
            identifier_input: String::new(),
            match_mode: MatchMode::ByCode,
            year_mode: YearMode::Trend,
            single_year: None,
            trend_years: BTreeSet::new(),
            show_callouts: true,
            results: Vec::new(),
            callouts: Vec::new(),
            has_run: false,
            sort: TableSort::default(),
            color_map: ColorMap::default(),
            status: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table: default the year selections to
    /// "latest year" / "all years" and rebuild the colour map.
    pub fn set_table(&mut self, table: IndexTable, path: PathBuf) {
        self.single_year = table.years.last().copied();
        self.trend_years = table.years.iter().copied().collect();
        self.color_map = ColorMap::new(&table.company_names);
        self.results.clear();
        self.callouts.clear();
        self.has_run = false;
        self.sort = TableSort::default();
        self.status = None;
        self.source_path = Some(path);
        self.table = Some(table);
    }

    /// Load a file and install it, or surface the failure as a status line.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} records, {} companies, years {:?}",
                    table.len(),
                    table.company_names.len(),
                    table.year_range()
                );
                self.set_table(table, path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status = Some(StatusMessage::error(format!("Load failed: {e}")));
            }
        }
    }

    /// Re-read the current source file.
    pub fn reload(&mut self) {
        if let Some(path) = self.source_path.clone() {
            self.load_path(&path);
        }
    }

    /// Years the current form selects, regardless of mode.
    pub fn selected_years(&self) -> BTreeSet<i32> {
        match self.year_mode {
            YearMode::Single => self.single_year.into_iter().collect(),
            YearMode::Trend => self.trend_years.clone(),
        }
    }

    /// Year that callouts annotate: the single year, or the latest of the
    /// trend selection.
    pub fn callout_target_year(&self) -> Option<i32> {
        match self.year_mode {
            YearMode::Single => self.single_year,
            YearMode::Trend => self.trend_years.iter().next_back().copied(),
        }
    }

    /// Execute the query form against the loaded table.
    pub fn run_query(&mut self) {
        let Some(table) = &self.table else {
            self.status = Some(StatusMessage::warning("Load a dataset first"));
            return;
        };

        let identifiers = parse_identifiers(&self.identifier_input);
        let years = self.selected_years();

        if let Err(e) = validate_query(&identifiers, &years) {
            self.status = Some(StatusMessage::warning(e.to_string()));
            return;
        }

        let results = filter_indices(table, &identifiers, &years, self.match_mode);

        self.callouts = match (self.show_callouts, self.callout_target_year()) {
            (true, Some(year)) => compute_callouts(table, &results, year),
            _ => Vec::new(),
        };

        if results.is_empty() {
            self.status = Some(StatusMessage::info(
                "No data for the given codes/names and years",
            ));
        } else {
            let companies: BTreeSet<&str> = results
                .iter()
                .map(|&i| table.records[i].company_name.as_str())
                .collect();
            let result_years: BTreeSet<i32> =
                results.iter().map(|&i| table.records[i].year).collect();
            self.status = Some(StatusMessage::info(format!(
                "{} companies · {} years · {} records",
                companies.len(),
                result_years.len(),
                results.len()
            )));
        }

        self.results = results;
        self.has_run = true;
    }

    /// Restore the query form to its post-load defaults and drop results.
    pub fn reset_query(&mut self) {
        self.identifier_input.clear();
        self.match_mode = MatchMode::ByCode;
        self.year_mode = YearMode::Trend;
        self.show_callouts = true;
        if let Some(table) = &self.table {
            self.single_year = table.years.last().copied();
            self.trend_years = table.years.iter().copied().collect();
        } else {
            self.single_year = None;
            self.trend_years.clear();
        }
        self.results.clear();
        self.callouts.clear();
        self.has_run = false;
        self.sort = TableSort::default();
        self.status = None;
    }

    /// Select all / no years in trend mode.
    pub fn select_all_years(&mut self) {
        if let Some(table) = &self.table {
            self.trend_years = table.years.iter().copied().collect();
        }
    }

    pub fn select_no_years(&mut self) {
        self.trend_years.clear();
    }

    /// Result rows in the order the current sort state dictates.
    pub fn sorted_results(&self) -> Vec<usize> {
        let Some(table) = &self.table else {
            return Vec::new();
        };
        let mut rows = self.results.clone();
        let sort = self.sort;
        rows.sort_by(|&a, &b| {
            let ra = &table.records[a];
            let rb = &table.records[b];
            let ord = match sort.column {
                SortColumn::Year => ra.year.cmp(&rb.year),
                SortColumn::Code => ra.stock_code.cmp(&rb.stock_code),
                SortColumn::Company => ra.company_name.cmp(&rb.company_name),
                SortColumn::Index => ra.index_value.total_cmp(&rb.index_value),
            };
            if sort.ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        rows
    }

    /// Write the current result set (rounded values) to a CSV file.
    pub fn export_results(&self, path: &Path) -> Result<(), csv::Error> {
        let Some(table) = &self.table else {
            return Ok(());
        };
        let mut writer = csv::Writer::from_path(path)?;
        for &idx in &self.sorted_results() {
            let rec = &table.records[idx];
            writer.serialize(IndexRecord {
                index_value: round2(rec.index_value),
                ..rec.clone()
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, code: &str, name: &str, value: f64) -> IndexRecord {
        IndexRecord {
            year,
            stock_code: code.to_string(),
            company_name: name.to_string(),
            index_value: value,
        }
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::default();
        let table = IndexTable::from_records(vec![
            rec(1999, "600000", "A Bank", 1.23),
            rec(2000, "600000", "A Bank", 2.50),
            rec(2000, "600016", "B Bank", -0.80),
        ]);
        state.set_table(table, PathBuf::from("dt_index.csv"));
        state
    }

    #[test]
    fn set_table_defaults_year_selection() {
        let state = loaded_state();
        assert_eq!(state.single_year, Some(2000));
        assert_eq!(state.trend_years, [1999, 2000].into_iter().collect());
        assert!(!state.has_run);
    }

    #[test]
    fn validation_failure_warns_and_skips_filter() {
        let mut state = loaded_state();
        state.identifier_input = "   ".to_string();
        state.run_query();
        assert!(!state.has_run);
        assert!(state.results.is_empty());
        let status = state.status.expect("status set");
        assert_eq!(status.kind, StatusKind::Warning);
    }

    #[test]
    fn empty_year_selection_warns() {
        let mut state = loaded_state();
        state.identifier_input = "600000".to_string();
        state.select_no_years();
        state.run_query();
        assert!(!state.has_run);
        assert_eq!(state.status.unwrap().kind, StatusKind::Warning);
    }

    #[test]
    fn no_match_reports_info_not_error() {
        let mut state = loaded_state();
        state.identifier_input = "999999".to_string();
        state.run_query();
        assert!(state.has_run);
        assert!(state.results.is_empty());
        assert_eq!(state.status.unwrap().kind, StatusKind::Info);
    }

    #[test]
    fn run_query_populates_results_and_callouts() {
        let mut state = loaded_state();
        state.identifier_input = "600000,600016".to_string();
        state.run_query();
        assert_eq!(state.results.len(), 3);
        // Callouts target the latest trend year.
        assert_eq!(state.callouts.len(), 2);
        assert!(state.callouts.iter().all(|c| c.year == 2000));
    }

    #[test]
    fn single_year_mode_restricts_years() {
        let mut state = loaded_state();
        state.identifier_input = "600000".to_string();
        state.year_mode = YearMode::Single;
        state.single_year = Some(1999);
        state.run_query();
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.callouts.len(), 1);
        assert_eq!(state.callouts[0].year, 1999);
    }

    #[test]
    fn match_by_name() {
        let mut state = loaded_state();
        state.identifier_input = "B Bank".to_string();
        state.match_mode = MatchMode::ByName;
        state.run_query();
        assert_eq!(state.results.len(), 1);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = loaded_state();
        state.identifier_input = "600000".to_string();
        state.match_mode = MatchMode::ByName;
        state.year_mode = YearMode::Single;
        state.sort.toggle(SortColumn::Index);
        state.run_query();

        state.reset_query();
        assert!(state.identifier_input.is_empty());
        assert_eq!(state.match_mode, MatchMode::ByCode);
        assert_eq!(state.year_mode, YearMode::Trend);
        assert_eq!(state.trend_years.len(), 2);
        assert!(state.results.is_empty());
        assert!(state.callouts.is_empty());
        assert!(!state.has_run);
        assert_eq!(state.sort, TableSort::default());
    }

    #[test]
    fn sort_toggle_flips_direction() {
        let mut state = loaded_state();
        state.identifier_input = "600000,600016".to_string();
        state.run_query();

        state.sort.toggle(SortColumn::Index);
        let asc = state.sorted_results();
        assert_eq!(state.table.as_ref().unwrap().records[asc[0]].index_value, -0.80);

        state.sort.toggle(SortColumn::Index);
        let desc = state.sorted_results();
        assert_eq!(state.table.as_ref().unwrap().records[desc[0]].index_value, 2.50);
    }
}
