use chrono::{DateTime, Local, NaiveDate};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, FormField, Popup, Section};
use crate::labels::expiry::{days_until_expiry, expiry_status};
use crate::labels::{ExpiryStatus, LabelRecord};
use crate::theme::Theme;

/// Badge text for the history table and preview
pub fn status_text(status: ExpiryStatus) -> &'static str {
    match status {
        ExpiryStatus::Expired => "Просрочен",
        ExpiryStatus::ExpiringSoon => "Скоро истечет",
        ExpiryStatus::Fresh => "Свежий",
    }
}

fn fmt_date(app: &App, date: NaiveDate) -> String {
    date.format(app.config.display_date_format()).to_string()
}

fn box_block<'a>(title: &'a str, active: bool, theme: &Theme) -> Block<'a> {
    let border_color = if active { theme.accent } else { theme.inactive };
    let title_style = if active {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.inactive)
    };

    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let now = Local::now();

    // Form and preview need a fixed height; history takes what's left
    let top_height = if area.height < 30 { Constraint::Min(14) } else { Constraint::Length(18) };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),  // Info line
            top_height,             // Form + preview
            Constraint::Min(6),     // History
            Constraint::Length(1),  // Footer
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_info_line(f, app, chunks[0]);
    draw_form_box(f, app, top[0]);
    draw_preview_box(f, app, &now, top[1]);
    draw_history_box(f, app, &now, chunks[2]);
    draw_footer(f, app, chunks[3]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f, app),
        Popup::ConfirmDelete => draw_confirm_popup(f, app),
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(t.expiring)))
    } else {
        Line::from(vec![
            Span::styled("Система печати этикеток", Style::default().fg(t.header)),
            Span::styled(" │ ", Style::default().fg(t.text_dim)),
            Span::styled(
                format!("В истории: {}", app.session.history().len()),
                Style::default().fg(t.text_dim),
            ),
        ])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_form_box(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let is_active = app.section == Section::Form;
    let block = box_block(" Создание этикетки ", is_active, t);
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Name
            Constraint::Length(3),  // Category
            Constraint::Length(3),  // Date
            Constraint::Min(3),     // Rule summary
            Constraint::Length(1),  // Print hint
        ])
        .split(inner_area);

    let focused = |field: FormField| is_active && app.field == field;

    let input = |title: &'static str, value: String, field: FormField| {
        let active = focused(field);
        Paragraph::new(value)
            .style(Style::default().fg(t.text))
            .block(
                Block::default()
                    .title(Span::styled(title, Style::default().fg(if active { t.accent } else { t.header })))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(if active { t.accent } else { t.inactive })),
            )
    };

    let cursor = |field: FormField| if focused(field) { "_" } else { "" };

    f.render_widget(
        input(" Название продукта ", format!("{}{}", app.name_input, cursor(FormField::Name)), FormField::Name),
        inner[0],
    );

    let category_text = match app.selected_category() {
        Some(rule) => format!("◀ {} ({} дн.) ▶", rule.name, rule.shelf_life_days),
        None => "◀ Выберите категорию ▶".to_string(),
    };
    f.render_widget(input(" Категория ", category_text, FormField::Category), inner[1]);

    f.render_widget(
        input(" Дата производства ", format!("{}{}", app.date_input, cursor(FormField::Date)), FormField::Date),
        inner[2],
    );

    // Shelf life summary for the selected category
    let summary: Vec<Line> = match app.selected_category() {
        Some(rule) => {
            let expiry = match app.form_expiry() {
                Some(date) => Span::styled(fmt_date(app, date), Style::default().fg(t.expiring)),
                None => Span::styled("неверная дата", Style::default().fg(t.expired)),
            };
            vec![
                Line::from(vec![
                    Span::styled(" Срок годности: ", Style::default().fg(t.header)),
                    Span::styled(format!("{} дней", rule.shelf_life_days), Style::default().fg(t.fresh)),
                ]),
                Line::from(vec![
                    Span::styled(" Температура:   ", Style::default().fg(t.header)),
                    Span::styled(rule.temperature_range.as_str(), Style::default().fg(t.text)),
                ]),
                Line::from(vec![Span::styled(" Годен до:      ", Style::default().fg(t.header)), expiry]),
            ]
        }
        None => vec![Line::from(Span::styled(
            " Выберите категорию, чтобы увидеть срок годности",
            Style::default().fg(t.text_dim),
        ))],
    };
    f.render_widget(Paragraph::new(summary), inner[3]);

    let hint_style = if app.can_print() {
        Style::default().fg(t.fresh).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(t.inactive)
    };
    let hint = Paragraph::new(Line::from(vec![
        Span::styled("[ ", Style::default().fg(t.text_dim)),
        Span::styled("Enter = Печать этикетки", hint_style),
        Span::styled(" ]", Style::default().fg(t.text_dim)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(hint, inner[4]);
}

/// Bars drawn from the barcode digits: odd digits wide, even narrow
fn barcode_bars(code: &str) -> String {
    code.chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| if d % 2 == 1 { '█' } else { '▌' })
        .collect()
}

fn draw_preview_box(f: &mut Frame, app: &App, now: &DateTime<Local>, area: Rect) {
    let t = &app.theme;
    let block = box_block(" Предварительный просмотр ", false, t);

    let Some(label) = app.session.current_preview() else {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Заполните форму для предварительного просмотра этикетки",
                Style::default().fg(t.text_dim),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
        f.render_widget(empty, area);
        return;
    };

    let status = expiry_status(label, now);
    let expiry_style = Style::default().fg(t.status_color(status)).add_modifier(Modifier::BOLD);

    let row = |name: &'static str, value: String, style: Style| {
        Line::from(vec![
            Span::styled(format!("{:<14}", name), Style::default().fg(t.header)),
            Span::styled(value, style),
        ])
    };

    let mut lines = vec![
        Line::styled(
            label.product_name.to_uppercase(),
            Style::default().fg(t.text).add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center),
        Line::styled(format!("[ {} ]", label.category), Style::default().fg(t.accent)).alignment(Alignment::Center),
        Line::from(""),
        row("Изготовлено:", fmt_date(app, label.production_date), Style::default().fg(t.text)),
        row("Время:", label.printed_at.format("%H:%M").to_string(), Style::default().fg(t.text)),
        row("Годен до:", fmt_date(app, label.expiry_date), expiry_style),
        Line::from(""),
        Line::styled(format!("Хранить при {}", label.temperature_range), Style::default().fg(t.text_dim))
            .alignment(Alignment::Center),
        Line::styled(barcode_bars(&label.barcode()), Style::default().fg(t.text)).alignment(Alignment::Center),
        Line::styled(label.barcode(), Style::default().fg(t.text_dim)).alignment(Alignment::Center),
    ];

    if let Some(warning) = expiry_warning(label, now) {
        lines.push(Line::from(""));
        lines.push(
            Line::styled(warning, Style::default().fg(t.status_color(status)).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center),
        );
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn expiry_warning(label: &LabelRecord, now: &DateTime<Local>) -> Option<String> {
    match expiry_status(label, now) {
        ExpiryStatus::Fresh => None,
        ExpiryStatus::Expired => Some("⚠ Срок годности истёк".to_string()),
        ExpiryStatus::ExpiringSoon => Some(format!(
            "⚠ Срок годности истекает через {} дн.",
            days_until_expiry(label.expiry_date, now.date_naive())
        )),
    }
}

fn draw_history_box(f: &mut Frame, app: &App, now: &DateTime<Local>, area: Rect) {
    let t = &app.theme;
    let is_active = app.section == Section::History;
    let block = box_block(" Недавно напечатанные этикетки ", is_active, t);

    // Responsive columns based on width
    let show_id = area.width > 90;

    let mut header_cells = vec!["Продукт", "Категория", "Годен до", "Статус", "Напечатано"];
    if show_id {
        header_cells.push("ID");
    }
    let header = Row::new(
        header_cells
            .into_iter()
            .map(|h| Span::styled(h, Style::default().fg(t.header)))
            .collect::<Vec<_>>(),
    );

    let rows: Vec<Row> = if app.session.history().is_empty() {
        vec![Row::new(vec![Span::styled(
            "  Этикетки еще не печатались",
            Style::default().fg(t.text_dim),
        )])]
    } else {
        app.session
            .history()
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let status = expiry_status(label, now);
                let mut cells = vec![
                    Span::styled(label.product_name.clone(), Style::default().fg(t.text)),
                    Span::styled(label.category.clone(), Style::default().fg(t.text_dim)),
                    Span::styled(fmt_date(app, label.expiry_date), Style::default().fg(t.text)),
                    Span::styled(status_text(status), Style::default().fg(t.status_color(status))),
                    Span::styled(label.printed_at.format("%d.%m %H:%M").to_string(), Style::default().fg(t.text_dim)),
                ];
                if show_id {
                    cells.push(Span::styled(label.id.short(), Style::default().fg(t.inactive)));
                }

                let row_style = if i == app.selected_label && is_active {
                    Style::default().bg(t.bg_selected).fg(t.text)
                } else {
                    Style::default()
                };
                Row::new(cells).style(row_style)
            })
            .collect()
    };

    let widths = if show_id {
        vec![
            Constraint::Percentage(24),
            Constraint::Percentage(20),
            Constraint::Percentage(13),
            Constraint::Percentage(15),
            Constraint::Percentage(16),
            Constraint::Percentage(12),
        ]
    } else {
        vec![
            Constraint::Percentage(28),
            Constraint::Percentage(22),
            Constraint::Percentage(15),
            Constraint::Percentage(17),
            Constraint::Percentage(18),
        ]
    };

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let hints: Vec<(&str, &str)> = match (app.section, app.field) {
        (Section::Form, FormField::Category) => vec![
            ("←→", "Категория"),
            ("Enter", "Печать"),
            ("Tab", "Далее"),
            ("F1", "Справка"),
        ],
        (Section::Form, FormField::Date) => vec![
            ("↑↓", "±1 день"),
            ("Enter", "Печать"),
            ("Tab", "Далее"),
            ("Esc", "История"),
            ("F1", "Справка"),
        ],
        (Section::Form, FormField::Name) => vec![
            ("Enter", "Печать"),
            ("Tab", "Далее"),
            ("Esc", "История"),
            ("F1", "Справка"),
        ],
        (Section::History, _) => vec![
            ("↑↓", "Выбор"),
            ("r", "Перепечатать"),
            ("d", "Удалить"),
            ("Tab", "Форма"),
            ("h", "Справка"),
            ("q", "Выход"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 3 } else if area.width < 80 { 4 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(t.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(t.text_dim)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(t.header).add_modifier(Modifier::BOLD)))
    };
    let binding = |keys: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", keys), Style::default().fg(t.accent)),
            Span::raw(text),
        ])
    };

    let help_text = vec![
        heading("═══ Форма ═══"),
        binding("Tab", "Следующее поле (Название → Категория → Дата → История)"),
        binding("←/→", "Сменить категорию"),
        binding("↑/↓", "Дата производства ±1 день"),
        binding("Enter", "Напечатать этикетку"),
        binding("Esc", "Перейти к истории"),
        Line::from(""),
        heading("═══ История ═══"),
        binding("↑/↓ j/k", "Выбрать запись"),
        binding("r/Enter", "Перепечатать выбранную этикетку"),
        binding("d", "Удалить запись из истории"),
        Line::from(Span::styled(
            "            Хранятся последние 10 этикеток",
            Style::default().fg(t.text_dim),
        )),
        Line::from(""),
        heading("═══ Статусы ═══"),
        Line::from(vec![
            Span::styled("  Свежий        ", Style::default().fg(t.fresh)),
            Span::raw("больше 2 дней до истечения"),
        ]),
        Line::from(vec![
            Span::styled("  Скоро истечет ", Style::default().fg(t.expiring)),
            Span::raw("1-2 дня до истечения"),
        ]),
        Line::from(vec![
            Span::styled("  Просрочен     ", Style::default().fg(t.expired)),
            Span::raw("срок годности наступил"),
        ]),
        Line::from(""),
        heading("═══ Командная строка ═══"),
        binding("--print", "kitchen-labels --print Курица --category Мясо"),
        binding("--categories", "Список категорий в JSON"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Нажмите ", Style::default().fg(t.text_dim)),
            Span::styled("Esc", Style::default().fg(t.accent)),
            Span::styled(", чтобы закрыть", Style::default().fg(t.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" Справка ", Style::default().fg(t.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn draw_confirm_popup(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let popup_area = centered_rect(40, 20, f.area());

    f.render_widget(Clear, popup_area);

    let message = app.status_message.as_deref().unwrap_or("Удалить запись?");

    let confirm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(t.expiring))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y", Style::default().fg(t.fresh).add_modifier(Modifier::BOLD)),
            Span::raw(" Да   "),
            Span::styled("n", Style::default().fg(t.expired).add_modifier(Modifier::BOLD)),
            Span::raw(" Нет"),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Подтверждение ", Style::default().fg(t.expiring)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.expiring)),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    f.render_widget(confirm, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use chrono::TimeZone;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_barcode_bars() {
        assert_eq!(barcode_bars("0123"), "▌█▌█");
    }

    #[test]
    fn test_expiry_warning_text() {
        let mut app = App::new(AppConfig::default());
        let printed = Local.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let label = app
            .session
            .print_at("Salmon", "Рыба", NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(), printed)
            .unwrap();

        let warning = expiry_warning(&label, &printed).unwrap();
        assert!(warning.contains("через 2 дн."), "{}", warning);

        let later = printed + chrono::Duration::days(5);
        assert_eq!(expiry_warning(&label, &later).as_deref(), Some("⚠ Срок годности истёк"));

        let earlier = printed - chrono::Duration::days(5);
        assert!(expiry_warning(&label, &earlier).is_none());
    }

    #[test]
    fn test_draw_renders_printed_label() {
        let mut app = App::new(AppConfig::default());
        app.session
            .print("Chicken", "Мясо", Local::now().date_naive())
            .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("CHICKEN"));
        assert!(content.contains("Chicken"));
    }

    #[test]
    fn test_draw_small_terminal_with_popups() {
        let mut app = App::new(AppConfig::default());
        let mut terminal = Terminal::new(TestBackend::new(50, 20)).unwrap();

        for popup in [Popup::None, Popup::Help, Popup::ConfirmDelete] {
            app.popup = popup;
            terminal.draw(|f| draw(f, &app)).unwrap();
        }
    }
}
