use ratatui::{prelude::*, widgets::*, Frame};

use crate::state_store::{Notification, NotificationKind};

fn notification_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Error => Color::Red,
    }
}

fn notification_line(notification: &Notification) -> Line<'static> {
    Line::from(Span::styled(
        notification.message.clone(),
        Style::default().fg(notification_color(notification.kind)),
    ))
}

/// Single notification in a bordered box, the terminal stand-in for a toast
pub fn render_notification<B: Backend>(frame: &mut Frame<B>, notification: &Notification, area: Rect) {
    let toast = Paragraph::new(notification_line(notification))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(notification_color(notification.kind))),
        );

    frame.render_widget(toast, area);
}

/// Newest notifications first, as many as fit
pub fn render_notification_list<B: Backend>(
    frame: &mut Frame<B>,
    notifications: &[Notification],
    area: Rect,
) {
    let items: Vec<ListItem> = notifications
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .map(|notification| ListItem::new(notification_line(notification)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Notifications"),
    );
    frame.render_widget(list, area);
}
