use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::ParseWarning;

/// Field name to value, in declaration order.
pub type ScalarRecord = IndexMap<String, String>;

/// One loop row; keys match the loop header in order.
pub type Row = IndexMap<String, String>;

/// Contents of one category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Category {
    Scalar(ScalarRecord),
    Loop(Vec<Row>),
}

impl Category {
    pub fn as_scalar(&self) -> Option<&ScalarRecord> {
        match self {
            Category::Scalar(record) => Some(record),
            Category::Loop(_) => None,
        }
    }

    pub fn as_loop(&self) -> Option<&[Row]> {
        match self {
            Category::Loop(rows) => Some(rows),
            Category::Scalar(_) => None,
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, Category::Loop(_))
    }
}

/// Categories of one parsed input, in order of first appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    categories: IndexMap<String, Category>,
    block_name: Option<String>,
    warnings: Vec<ParseWarning>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name from the `data_` header, if the input had one.
    pub fn block_name(&self) -> Option<&str> {
        self.block_name.as_deref()
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<&Category> {
        self.categories.get(category)
    }

    pub fn scalar(&self, category: &str, field: &str) -> Option<&str> {
        self.get(category)?
            .as_scalar()?
            .get(field)
            .map(String::as_str)
    }

    pub fn rows(&self, category: &str) -> Option<&[Row]> {
        self.get(category)?.as_loop()
    }

    /// Values of one loop column, top to bottom.
    pub fn column<'a>(
        &'a self,
        category: &str,
        field: &'a str,
    ) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let rows = self.rows(category)?;
        if !rows.first()?.contains_key(field) {
            return None;
        }
        Some(
            rows.iter()
                .filter_map(move |row| row.get(field).map(String::as_str)),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.categories.iter().map(|(name, category)| (name.as_str(), category))
    }

    pub fn into_categories(self) -> IndexMap<String, Category> {
        self.categories
    }

    pub(crate) fn set_block_name(&mut self, name: String) {
        self.block_name = Some(name);
    }

    pub(crate) fn push_warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }

    /// Sets `field` in a scalar category, replacing a loop of the same name.
    pub(crate) fn set_scalar(&mut self, category: String, field: String, value: String) {
        let slot = self
            .categories
            .entry(category)
            .or_insert_with(|| Category::Scalar(ScalarRecord::new()));
        if slot.is_loop() {
            *slot = Category::Scalar(ScalarRecord::new());
        }
        if let Category::Scalar(record) = slot {
            record.insert(field, value);
        }
    }

    pub(crate) fn set_loop(&mut self, category: String, rows: Vec<Row>) {
        self.categories.insert(category, Category::Loop(rows));
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.categories.serialize(serializer)
    }
}
