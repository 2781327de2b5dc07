use std::collections::HashMap;

/// A single cell. `None` is a null or absent value and is written as an empty field.
pub type Cell = Option<String>;

/// Column-ordered, string-typed table that every pipeline stage reads and writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from named rows, taking the column union in first-seen order.
    pub fn from_records<I, R, K>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, Cell)>,
        K: Into<String>,
    {
        let mut table = Table::default();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in records {
            let mut row = vec![None; table.columns.len()];
            for (key, value) in record {
                let key = key.into();
                let idx = match index.get(&key) {
                    Some(&idx) => idx,
                    None => {
                        let idx = table.columns.len();
                        index.insert(key.clone(), idx);
                        table.columns.push(key);
                        for existing in table.rows.iter_mut() {
                            existing.push(None);
                        }
                        row.push(None);
                        idx
                    }
                };
                row[idx] = value;
            }
            table.rows.push(row);
        }

        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append an all-null column unless it already exists; returns its index.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in self.rows.iter_mut() {
            row.push(None);
        }
        self.columns.len() - 1
    }

    /// Append a row, padding a short one with `None`. A row wider than the header is
    /// refused and its width returned.
    pub fn push_row(&mut self, mut row: Vec<Cell>) -> std::result::Result<(), usize> {
        if row.len() > self.columns.len() {
            return Err(row.len());
        }
        row.resize(self.columns.len(), None);
        self.rows.push(row);
        Ok(())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    pub fn set(&mut self, row: usize, column: &str, value: Cell) {
        let idx = self.ensure_column(column);
        if let Some(r) = self.rows.get_mut(row) {
            r[idx] = value;
        }
    }

    /// Values of one column in row order; every entry is `None` when the column is absent.
    pub fn column_values(&self, name: &str) -> Vec<Option<&str>> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().map(|r| r[idx].as_deref()).collect(),
            None => vec![None; self.rows.len()],
        }
    }

    /// Rewrite every cell of a column, creating the column first if needed.
    pub fn map_column<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(Cell) -> Cell,
    {
        let idx = self.ensure_column(name);
        for row in self.rows.iter_mut() {
            let value = row[idx].take();
            row[idx] = f(value);
        }
    }

    pub fn retain_rows<F>(&mut self, mut f: F)
    where
        F: FnMut(&[String], &[Cell]) -> bool,
    {
        let columns = &self.columns;
        self.rows.retain(|row| f(columns.as_slice(), row.as_slice()));
    }

    /// Stack tables vertically. Columns are the union in first-seen order and cells a
    /// table does not have are `None`. Row order is kept within and across tables.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut out = Table::default();
        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .map(|c| out.ensure_column(c))
                .collect();
            let width = out.columns.len();
            for row in table.rows {
                let mut merged = vec![None; width];
                for (value, &idx) in row.into_iter().zip(mapping.iter()) {
                    merged[idx] = value;
                }
                out.rows.push(merged);
            }
        }
        out
    }
}
