use anyhow::Result;
use crossterm::event::{self, KeyCode};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{BarChart, Block, Borders, List, ListItem, ListState, Paragraph},
};

use smartgym::performance::{ChartMetric, MachinePerformanceGroup};

const HELP: &str = "j/k: navigate | m: reps/load | q: quit";

struct HistoryView {
    groups: Vec<MachinePerformanceGroup>,
    selected: usize,
    metric: ChartMetric,
}

impl HistoryView {
    fn new(groups: Vec<MachinePerformanceGroup>) -> Self {
        Self {
            groups,
            selected: 0,
            metric: ChartMetric::Reps,
        }
    }

    fn scroll_down(&mut self) {
        if !self.groups.is_empty() && self.selected < self.groups.len() - 1 {
            self.selected += 1;
            self.metric = ChartMetric::Reps;
        }
    }

    fn scroll_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.metric = ChartMetric::Reps;
        }
    }

    fn selected_group(&self) -> Option<&MachinePerformanceGroup> {
        self.groups.get(self.selected)
    }

    /// The load chart is only offered for machines with at least one recorded load.
    fn toggle_metric(&mut self) {
        let has_load = self.selected_group().is_some_and(|g| g.has_load_data());
        self.metric = match self.metric {
            ChartMetric::Reps if has_load => ChartMetric::Load,
            _ => ChartMetric::Reps,
        };
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

        let header = Paragraph::new("SmartGym - Performance history")
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        if self.groups.is_empty() {
            let empty_msg = Paragraph::new(
                "No performances logged yet.\nScan a machine and finish an exercise first!",
            )
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title("Machines"));
            frame.render_widget(empty_msg, chunks[1]);
        } else {
            let body = Layout::horizontal([Constraint::Percentage(30), Constraint::Min(1)])
                .split(chunks[1]);
            self.draw_machines(frame, body[0]);
            self.draw_details(frame, body[1]);
        }

        let footer = Paragraph::new(HELP)
            .style(Style::default().fg(Color::White))
            .block(Block::default().borders(Borders::ALL).title("Status"));
        frame.render_widget(footer, chunks[2]);
    }

    fn draw_machines(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .groups
            .iter()
            .enumerate()
            .map(|(idx, group)| {
                let style = if idx == self.selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(group.machine_name.clone()).style(style)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Machines ({} total)", self.groups.len())),
        );
        let mut list_state = ListState::default();
        list_state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_details(&self, frame: &mut Frame, area: Rect) {
        let Some(group) = self.selected_group() else {
            return;
        };
        let chunks = Layout::vertical([Constraint::Length(6), Constraint::Min(1)]).split(area);

        let summary = group.summary();
        let last_load = if group.has_load_data() {
            format!("{:.1} kg", summary.last_load)
        } else {
            "-".to_string()
        };
        let text = format!(
            "{}\nSessions: {}\nAverage reps: {}\nTotal volume: {:.0} kg | Last load: {}",
            group.exercise_title,
            summary.record_count,
            summary.average_reps,
            summary.total_volume,
            last_load
        );
        let details = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(group.machine_name.as_str()));
        frame.render_widget(details, chunks[0]);

        let series = group.chart(self.metric);
        let data: Vec<(&str, u64)> = series
            .labels
            .iter()
            .zip(series.values.iter())
            .map(|(label, value)| (label.as_str(), value.max(0.0).round() as u64))
            .collect();
        let chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Last sessions ({})", self.metric.as_str())),
            )
            .data(data.as_slice())
            .bar_width(7)
            .bar_gap(2)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(chart, chunks[1]);
    }
}

pub fn run_history_view(
    mut terminal: DefaultTerminal,
    groups: Vec<MachinePerformanceGroup>,
) -> Result<()> {
    let mut view = HistoryView::new(groups);

    loop {
        terminal.draw(|frame| view.draw(frame))?;

        if let event::Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('j') | KeyCode::Down => view.scroll_down(),
                KeyCode::Char('k') | KeyCode::Up => view.scroll_up(),
                KeyCode::Char('m') | KeyCode::Char('M') => view.toggle_metric(),
                _ => {}
            }
        }
    }
}
