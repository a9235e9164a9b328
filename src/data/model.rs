use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// IndexRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// One company's digital-transformation-index value for one year.
///
/// At most one record per (stock_code, year) pair is expected, although the
/// source file does not enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub year: i32,
    /// Stock code, always text. Numeric cells in the source are coerced.
    pub stock_code: String,
    pub company_name: String,
    /// Raw index value. Rounded to 2 decimals only at presentation time.
    pub index_value: f64,
}

// ---------------------------------------------------------------------------
// IndexTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed lookup lists.
#[derive(Debug, Clone, Default)]
pub struct IndexTable {
    /// All records, sorted by year ascending.
    pub records: Vec<IndexRecord>,
    /// Sorted distinct years.
    pub years: Vec<i32>,
    /// Sorted distinct stock codes.
    pub stock_codes: Vec<String>,
    /// Sorted distinct company names.
    pub company_names: Vec<String>,
}

impl IndexTable {
    /// Build the table from raw records: sort by year, derive lookup lists.
    pub fn from_records(mut records: Vec<IndexRecord>) -> Self {
        records.sort_by_key(|r| r.year);

        let mut years = BTreeSet::new();
        let mut stock_codes = BTreeSet::new();
        let mut company_names = BTreeSet::new();
        for rec in &records {
            years.insert(rec.year);
            stock_codes.insert(rec.stock_code.clone());
            company_names.insert(rec.company_name.clone());
        }

        IndexTable {
            records,
            years: years.into_iter().collect(),
            stock_codes: stock_codes.into_iter().collect(),
            company_names: company_names.into_iter().collect(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inclusive (first, last) year covered by the dataset.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        match (self.years.first(), self.years.last()) {
            (Some(&lo), Some(&hi)) => Some((lo, hi)),
            _ => None,
        }
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

    #[test]
    fn from_records_sorts_by_year() {
        let table = IndexTable::from_records(vec![
            rec(2003, "600000", "A Bank", 1.0),
            rec(1999, "600016", "B Bank", 2.0),
            rec(2001, "600000", "A Bank", 3.0),
        ]);
        let years: Vec<i32> = table.records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![1999, 2001, 2003]);
    }

    #[test]
    fn derives_sorted_distinct_lookups() {
        let table = IndexTable::from_records(vec![
            rec(2001, "600016", "B Bank", 1.0),
            rec(2000, "600000", "A Bank", 2.0),
            rec(2001, "600000", "A Bank", 3.0),
        ]);
        assert_eq!(table.years, vec![2000, 2001]);
        assert_eq!(table.stock_codes, vec!["600000", "600016"]);
        assert_eq!(table.company_names, vec!["A Bank", "B Bank"]);
        assert_eq!(table.year_range(), Some((2000, 2001)));
    }

    #[test]
    fn empty_table() {
        let table = IndexTable::from_records(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.year_range(), None);
    }
}
