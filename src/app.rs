use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use std::time::Instant;

use crate::config::AppConfig;
use crate::labels::{parse_production_date, Catalog, CategoryRule, LabelId, LabelRecord, LabelSession};
use crate::theme::Theme;

/// How long a status message stays in the info line
const STATUS_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Form,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Category,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
    ConfirmDelete,
}

pub struct App {
    pub section: Section,
    pub field: FormField,
    pub popup: Popup,

    pub session: LabelSession,
    pub config: AppConfig,
    pub theme: Theme,
    persist_config: bool,  // Only the real app writes config.toml

    // Form inputs
    pub name_input: String,
    pub category_index: Option<usize>,
    pub date_input: String,

    // History selection
    pub selected_label: usize,
    pub pending_delete: Option<LabelId>,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    /// App backed by the on-disk config
    pub fn load() -> Result<Self> {
        let config = AppConfig::load().unwrap_or_default();
        let mut app = Self::new(config);
        app.persist_config = true;
        Ok(app)
    }

    pub fn new(config: AppConfig) -> Self {
        let session = LabelSession::new(Catalog::builtin());
        let category_index = config
            .last_category
            .as_deref()
            .and_then(|name| session.catalog().position(name));
        let theme = Theme::load(&config.theme);

        Self {
            section: Section::Form,
            field: FormField::Name,
            popup: Popup::None,

            session,
            config,
            theme,
            persist_config: false,

            name_input: String::new(),
            category_index,
            date_input: Local::now().date_naive().format("%Y-%m-%d").to_string(),

            selected_label: 0,
            pending_delete: None,

            status_message: None,
            status_message_time: None,
        }
    }

    /// Set a status message (auto-clears after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Whether printable keys should go into a text field
    pub fn is_editing_text(&self) -> bool {
        self.section == Section::Form && matches!(self.field, FormField::Name | FormField::Date)
    }

    pub fn selected_category(&self) -> Option<&CategoryRule> {
        self.category_index.and_then(|i| self.session.catalog().get(i))
    }

    pub fn production_date(&self) -> crate::labels::Result<NaiveDate> {
        parse_production_date(&self.date_input)
    }

    /// Expiry shown in the form before printing
    pub fn form_expiry(&self) -> Option<NaiveDate> {
        let category = self.selected_category()?;
        let date = self.production_date().ok()?;
        self.session.preview_expiry(&category.name, date)
    }

    /// Print is only offered once name and category are filled in
    pub fn can_print(&self) -> bool {
        !self.name_input.trim().is_empty() && self.selected_category().is_some()
    }

    pub fn selected_record(&self) -> Option<&LabelRecord> {
        self.session.history().at(self.selected_label)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }

        match self.section {
            Section::Form => self.handle_form_key(key),
            Section::History => self.handle_history_key(key),
        }
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Enter | KeyCode::F(1) | KeyCode::Char('q')) {
                    self.popup = Popup::None;
                }
            }
            Popup::ConfirmDelete => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.confirm_delete();
                    self.popup = Popup::None;
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.pending_delete = None;
                    self.popup = Popup::None;
                }
                _ => {}
            },
            Popup::None => {}
        }
        Ok(())
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_prev(),
            KeyCode::Esc => self.section = Section::History,
            KeyCode::F(1) => self.popup = Popup::Help,
            KeyCode::Enter | KeyCode::F(2) => self.print_label()?,

            KeyCode::Left | KeyCode::Up if self.field == FormField::Category => self.cycle_category(false),
            KeyCode::Right | KeyCode::Down if self.field == FormField::Category => self.cycle_category(true),

            // Step the production date a day at a time
            KeyCode::Up if self.field == FormField::Date => self.shift_date(1),
            KeyCode::Down if self.field == FormField::Date => self.shift_date(-1),

            KeyCode::Backspace => match self.field {
                FormField::Name => {
                    self.name_input.pop();
                }
                FormField::Date => {
                    self.date_input.pop();
                }
                FormField::Category => {}
            },
            KeyCode::Char(c) => match self.field {
                FormField::Name => self.name_input.push(c),
                FormField::Date if c.is_ascii_digit() || c == '-' || c == '.' => self.date_input.push(c),
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn handle_history_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Tab => {
                self.section = Section::Form;
                self.field = FormField::Name;
            }
            KeyCode::BackTab => {
                self.section = Section::Form;
                self.field = FormField::Date;
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('r') | KeyCode::Enter => self.reprint_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(),
            KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::F(1) => self.popup = Popup::Help,
            _ => {}
        }
        Ok(())
    }

    fn focus_next(&mut self) {
        match (self.section, self.field) {
            (Section::Form, FormField::Name) => self.field = FormField::Category,
            (Section::Form, FormField::Category) => self.field = FormField::Date,
            (Section::Form, FormField::Date) => self.section = Section::History,
            (Section::History, _) => {
                self.section = Section::Form;
                self.field = FormField::Name;
            }
        }
    }

    fn focus_prev(&mut self) {
        match (self.section, self.field) {
            (Section::Form, FormField::Name) => self.section = Section::History,
            (Section::Form, FormField::Category) => self.field = FormField::Name,
            (Section::Form, FormField::Date) => self.field = FormField::Category,
            (Section::History, _) => {
                self.section = Section::Form;
                self.field = FormField::Date;
            }
        }
    }

    fn cycle_category(&mut self, forward: bool) {
        if self.session.catalog().is_empty() {
            return;
        }
        let len = self.session.catalog().len();
        self.category_index = Some(match (self.category_index, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => i.checked_sub(1).unwrap_or(len - 1),
        });
    }

    fn shift_date(&mut self, days: i64) {
        let Ok(date) = self.production_date() else {
            self.set_status("Неверная дата производства");
            return;
        };
        let shifted = if days >= 0 {
            date.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            date.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(shifted) = shifted {
            self.date_input = shifted.format("%Y-%m-%d").to_string();
        }
    }

    fn move_down(&mut self) {
        let len = self.session.history().len();
        if len > 0 {
            self.selected_label = (self.selected_label + 1) % len;
        }
    }

    fn move_up(&mut self) {
        let len = self.session.history().len();
        if len > 0 {
            self.selected_label = self.selected_label.checked_sub(1).unwrap_or(len - 1);
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.session.history().len();
        if self.selected_label >= len {
            self.selected_label = len.saturating_sub(1);
        }
    }

    fn print_label(&mut self) -> Result<()> {
        if !self.can_print() {
            self.set_status("Введите название продукта и выберите категорию");
            return Ok(());
        }

        let date = match self.production_date() {
            Ok(d) => d,
            Err(e) => {
                self.set_status(format!("Ошибка: {}", e));
                return Ok(());
            }
        };
        let category = match self.selected_category() {
            Some(c) => c.name.clone(),
            None => return Ok(()),
        };

        match self.session.print(&self.name_input, &category, date) {
            Ok(record) => {
                self.set_status(format!("Этикетка для \"{}\" отправлена на печать", record.product_name));
                self.notify_label("Этикетка отправлена на печать", &record);
                self.name_input.clear();
                self.selected_label = 0;
                self.remember_category(category)?;
            }
            Err(e) => self.set_status(format!("Ошибка: {}", e)),
        }
        Ok(())
    }

    fn remember_category(&mut self, category: String) -> Result<()> {
        if self.config.last_category.as_deref() == Some(category.as_str()) {
            return Ok(());
        }
        self.config.last_category = Some(category);
        if self.persist_config {
            self.config.save()?;
        }
        Ok(())
    }

    fn reprint_selected(&mut self) {
        let Some(id) = self.selected_record().map(|r| r.id) else {
            return;
        };

        match self.session.reprint(&id) {
            Ok(record) => {
                self.set_status(format!("Этикетка для \"{}\" перепечатана", record.product_name));
                self.notify_label("Этикетка перепечатана", &record);
                self.selected_label = 0;
            }
            Err(e) => self.set_status(format!("Ошибка: {}", e)),
        }
    }

    fn request_delete(&mut self) {
        if let Some(record) = self.selected_record() {
            let id = record.id;
            let msg = format!("Удалить \"{}\" из истории?", record.product_name);
            self.pending_delete = Some(id);
            self.set_status(msg);
            self.popup = Popup::ConfirmDelete;
        }
    }

    fn confirm_delete(&mut self) {
        if let Some(id) = self.pending_delete.take() {
            if self.session.delete(&id) {
                self.set_status("Запись удалена из истории");
            }
            self.clamp_selection();
        }
    }

    /// Desktop notification, if enabled in config
    fn notify_label(&self, summary: &str, record: &LabelRecord) {
        if !self.config.notifications {
            return;
        }
        let body = format!(
            "{} ({}), годен до {}",
            record.product_name,
            record.category,
            record.expiry_date.format(self.config.display_date_format())
        );
        if let Err(e) = crate::notify(summary, &body) {
            tracing::warn!("Notification failed: {}", e);
        }
    }

    pub fn tick(&mut self) {
        // Clear status message after timeout
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_TIMEOUT_SECS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}
