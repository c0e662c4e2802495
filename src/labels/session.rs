use chrono::{DateTime, Local, NaiveDate};

use super::catalog::Catalog;
use super::error::{LabelError, Result};
use super::expiry::compute_expiry;
use super::history::LabelHistory;
use super::record::{LabelId, LabelRecord};

/// State of one label-printing session: catalog, history and the label
/// currently shown in the preview pane
#[derive(Debug, Clone, Default)]
pub struct LabelSession {
    catalog: Catalog,
    history: LabelHistory,
    current: Option<LabelRecord>,
}

impl LabelSession {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            history: LabelHistory::new(),
            current: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn history(&self) -> &LabelHistory {
        &self.history
    }

    /// Most recently printed or reprinted label
    pub fn current_preview(&self) -> Option<&LabelRecord> {
        self.current.as_ref()
    }

    pub fn print(&mut self, product_name: &str, category: &str, production_date: NaiveDate) -> Result<LabelRecord> {
        self.print_at(product_name, category, production_date, Local::now())
    }

    pub fn print_at(
        &mut self,
        product_name: &str,
        category: &str,
        production_date: NaiveDate,
        now: DateTime<Local>,
    ) -> Result<LabelRecord> {
        let product_name = product_name.trim();
        if product_name.is_empty() {
            return Err(LabelError::InvalidInput("product name is empty".to_string()));
        }

        let rule = self
            .catalog
            .lookup(category)
            .ok_or_else(|| LabelError::CategoryNotFound(category.to_string()))?;
        let expiry = compute_expiry(production_date, rule.shelf_life_days)?;

        let record = LabelRecord::new(product_name.to_string(), rule, production_date, expiry, now);
        tracing::info!(
            id = %record.id,
            product = %record.product_name,
            category = %record.category,
            expiry = %record.expiry_date,
            "Label printed"
        );

        self.push(record.clone());
        Ok(record)
    }

    pub fn reprint(&mut self, id: &LabelId) -> Result<LabelRecord> {
        self.reprint_at(id, Local::now())
    }

    pub fn reprint_at(&mut self, id: &LabelId, now: DateTime<Local>) -> Result<LabelRecord> {
        let original = self.history.get(id).ok_or(LabelError::NotFound(*id))?;
        let record = original.duplicate(now);
        tracing::info!(original = %id, id = %record.id, product = %record.product_name, "Label reprinted");

        self.push(record.clone());
        Ok(record)
    }

    /// Remove a label from history. Returns whether anything was removed.
    pub fn delete(&mut self, id: &LabelId) -> bool {
        match self.history.remove(id) {
            Some(removed) => {
                tracing::info!(id = %id, product = %removed.product_name, "Label deleted from history");
                true
            }
            None => {
                tracing::debug!(id = %id, "Delete of unknown label ignored");
                false
            }
        }
    }

    /// Expiry date the form shows before anything is printed
    pub fn preview_expiry(&self, category: &str, production_date: NaiveDate) -> Option<NaiveDate> {
        let rule = self.catalog.lookup(category)?;
        compute_expiry(production_date, rule.shelf_life_days).ok()
    }

    fn push(&mut self, record: LabelRecord) {
        self.current = Some(record.clone());
        if let Some(evicted) = self.history.insert(record) {
            tracing::debug!(id = %evicted.id, product = %evicted.product_name, "Oldest label evicted from history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::catalog::CategoryRule;
    use crate::labels::history::HISTORY_CAPACITY;
    use chrono::{Duration, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_print_chicken() {
        let mut session = LabelSession::default();
        assert!(session.current_preview().is_none());

        let record = session.print_at("Chicken", "Мясо", date(2024, 1, 1), noon()).unwrap();
        assert_eq!(record.expiry_date, date(2024, 1, 4));
        assert_eq!(record.temperature_range, "0-4°C");
        assert_eq!(record.shelf_life_days, 3);
        assert_eq!(record.printed_at, noon());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.current_preview(), Some(&record));
    }

    #[test]
    fn test_print_trims_name_and_rejects_empty() {
        let mut session = LabelSession::default();
        let record = session.print_at("  Борщ ", "Готовые блюда", date(2024, 1, 1), noon()).unwrap();
        assert_eq!(record.product_name, "Борщ");

        let err = session.print_at("   ", "Мясо", date(2024, 1, 1), noon()).unwrap_err();
        assert!(matches!(err, LabelError::InvalidInput(_)));
        assert_eq!(session.history().len(), 1, "Failed print must not touch history");
    }

    #[test]
    fn test_print_unknown_category() {
        let mut session = LabelSession::default();
        let err = session.print_at("Bread", "Хлеб", date(2024, 1, 1), noon()).unwrap_err();
        assert_eq!(err, LabelError::CategoryNotFound("Хлеб".to_string()));
        assert!(session.history().is_empty());
        assert!(session.current_preview().is_none());
    }

    #[test]
    fn test_eleven_prints_drop_the_first() {
        let mut session = LabelSession::default();
        for i in 0..=HISTORY_CAPACITY {
            session.print_at(&format!("product-{}", i), "Овощи", date(2024, 1, 1), noon()).unwrap();
        }

        assert_eq!(session.history().len(), HISTORY_CAPACITY);
        assert!(session.history().iter().all(|r| r.product_name != "product-0"));
        assert_eq!(session.current_preview().unwrap().product_name, "product-10");
    }

    #[test]
    fn test_reprint_duplicates_record() {
        let mut session = LabelSession::default();
        let original = session.print_at("Salmon", "Рыба", date(2024, 1, 1), noon()).unwrap();

        let later = noon() + Duration::hours(3);
        let copy = session.reprint_at(&original.id, later).unwrap();

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.printed_at, later);
        assert_eq!(copy.product_name, original.product_name);
        assert_eq!(copy.category, original.category);
        assert_eq!(copy.shelf_life_days, original.shelf_life_days);
        assert_eq!(copy.temperature_range, original.temperature_range);
        assert_eq!(copy.production_date, original.production_date);
        assert_eq!(copy.expiry_date, original.expiry_date);

        // Original untouched and still present
        assert_eq!(session.history().get(&original.id), Some(&original));
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().at(0).unwrap().id, copy.id);
        assert_eq!(session.current_preview().unwrap().id, copy.id);
    }

    #[test]
    fn test_reprint_unknown_id() {
        let mut session = LabelSession::default();
        session.print_at("Salmon", "Рыба", date(2024, 1, 1), noon()).unwrap();

        let missing = LabelId::new();
        let err = session.reprint_at(&missing, noon()).unwrap_err();
        assert_eq!(err, LabelError::NotFound(missing));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut session = LabelSession::default();
        let record = session.print_at("Cream", "Молочные продукты", date(2024, 1, 1), noon()).unwrap();

        assert!(!session.delete(&LabelId::new()));
        assert_eq!(session.history().len(), 1);

        assert!(session.delete(&record.id));
        assert!(!session.delete(&record.id));
        assert!(session.history().is_empty());
        // Preview keeps showing the last print
        assert_eq!(session.current_preview().map(|r| r.id), Some(record.id));
    }

    #[test]
    fn test_rule_fields_are_frozen_at_print_time() {
        let mut session = LabelSession::new(Catalog::new(vec![CategoryRule::new("Соусы", 10, "2-8°C")]));
        let record = session.print_at("Pesto", "Соусы", date(2024, 1, 1), noon()).unwrap();

        // A session with a changed catalog must not alter the existing record
        let mut changed = LabelSession::new(Catalog::new(vec![CategoryRule::new("Соусы", 4, "0-2°C")]));
        changed.history = session.history.clone();
        let copy = changed.reprint_at(&record.id, noon()).unwrap();

        assert_eq!(copy.shelf_life_days, 10);
        assert_eq!(copy.temperature_range, "2-8°C");
        assert_eq!(copy.expiry_date, date(2024, 1, 11));
    }

    #[test]
    fn test_preview_expiry() {
        let session = LabelSession::default();
        assert_eq!(session.preview_expiry("Десерты", date(2024, 2, 28)), Some(date(2024, 3, 2)));
        assert_eq!(session.preview_expiry("Хлеб", date(2024, 2, 28)), None);
    }
}
