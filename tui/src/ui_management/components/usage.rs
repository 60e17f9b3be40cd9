use ratatui::{
    style::Stylize,
    text::{Line, Span, Text},
};

/// A key binding shown in the usage panel
#[derive(Debug, Clone, PartialEq)]
pub struct UsageInfoLine {
    pub keys: Vec<String>,
    pub description: String,
}

impl UsageInfoLine {
    pub fn new(keys: &[&str], description: impl Into<String>) -> Self {
        UsageInfoLine {
            keys: keys.iter().map(|key| String::from(*key)).collect(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageInfo {
    pub description: Option<String>,
    pub lines: Vec<UsageInfoLine>,
}

pub trait HasUsageInfo {
    fn usage_info(&self) -> UsageInfo;
}

fn key_to_span<'a>(key: &str) -> Span<'a> {
    Span::from(format!("({})", key)).bold()
}

fn key_bindings<'a>(keys: &[String]) -> Vec<Span<'a>> {
    match keys {
        [] => vec![],
        [key] => vec![key_to_span(key)],
        [first, second] => vec![key_to_span(first), " or ".into(), key_to_span(second)],
        [rest @ .., last] => {
            let mut bindings: Vec<Span> = Vec::with_capacity(keys.len() * 2);

            for key in rest {
                bindings.push(key_to_span(key));
                bindings.push(", ".into());
            }

            bindings.push("or ".into());
            bindings.push(key_to_span(last));

            bindings
        }
    }
}

pub fn widget_usage_to_text<'a>(usage: UsageInfo) -> Text<'a> {
    let mut lines: Vec<Line> = vec![];
    if let Some(description) = usage.description {
        lines.push(Line::from(description));
    }

    for line in usage.lines {
        let mut bindings = key_bindings(&line.keys);
        bindings.push(Span::from(format!(" {}", line.description)));

        lines.push(Line::from(bindings));
    }

    Text::from(lines)
}
