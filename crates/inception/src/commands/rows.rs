//! Table rows and line formats shared by the entity and event commands.

use tabled::Tabled;

use inception_core::{EntityChange, EntityRecord, ReviewEvent};

use crate::output::Painter;

// ── Entities ────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct EntityRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Permissions")]
    permissions: String,
}

impl From<&EntityRecord> for EntityRow {
    fn from(r: &EntityRecord) -> Self {
        Self {
            kind: r.kind.to_string(),
            id: r.id.clone(),
            name: r.name.clone(),
            state: state_text(r),
            permissions: r
                .permissions
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Set state flags as descriptions, `-` for stateless kinds.
pub fn state_text(r: &EntityRecord) -> String {
    let descriptions = r.state_description();
    if descriptions.is_empty() {
        "-".into()
    } else {
        descriptions.join(", ")
    }
}

/// One line per entity change: `~ door/d-1 Front Door: Door is unlocked`.
pub fn change_line(change: &EntityChange, painter: Painter) -> String {
    let record = change.record();
    let key = painter.key(&change.key().to_string());
    if change.is_removal() {
        painter.removed(&format!("- {key} {}", record.name))
    } else {
        format!("~ {key} {}: {}", record.name, state_text(record))
    }
}

// ── Events ──────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct EventRow {
    #[tabled(rename = "Ticks")]
    ticks: u64,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Code")]
    code: u64,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Who")]
    who: String,
    #[tabled(rename = "What")]
    what: String,
}

impl From<&ReviewEvent> for EventRow {
    fn from(e: &ReviewEvent) -> Self {
        Self {
            ticks: e.when_ticks,
            when: e.when.clone().unwrap_or_default(),
            category: e.category.to_string(),
            code: e.message_value,
            message: message_text(e),
            who: e.who.clone().unwrap_or_default(),
            what: e.what.clone().unwrap_or_default(),
        }
    }
}

/// The controller's description when it sent one, else the table's.
fn message_text(e: &ReviewEvent) -> String {
    e.description
        .clone()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| e.message_description.clone())
}

/// One line per event: `[access] 2024-05-01T10:00:00+10:00 Door Locked (Reception, Front Door)`.
pub fn event_line(e: &ReviewEvent, painter: Painter) -> String {
    let when = e
        .when
        .clone()
        .unwrap_or_else(|| format!("@{}", e.when_ticks));
    let context: Vec<&str> = [e.who.as_deref(), e.what.as_deref(), e.r#where.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    let mut line = format!(
        "[{}] {} {}",
        painter.category(e.category),
        painter.dim(&when),
        message_text(e)
    );
    if !context.is_empty() {
        line.push_str(&format!(" ({})", context.join(", ")));
    }
    line
}
