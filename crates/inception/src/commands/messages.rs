//! `messages`: the static review message table. Works offline.

use serde::Serialize;
use tabled::Tabled;

use inception_core::EventCategory;
use inception_core::model::messages::MESSAGES;

use crate::cli::{GlobalOpts, MessagesArgs};
use crate::error::CliError;
use crate::output;

#[derive(Clone, Serialize, Tabled)]
struct MessageEntry {
    #[tabled(rename = "Code")]
    code: u64,
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Category")]
    category: EventCategory,
    #[tabled(rename = "Description")]
    description: &'static str,
}

pub fn handle(args: &MessagesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let entries: Vec<MessageEntry> = MESSAGES
        .iter()
        .map(|m| MessageEntry {
            code: m.code,
            key: m.key,
            category: EventCategory::from_code(m.code),
            description: m.description,
        })
        .filter(|e| args.category.is_none_or(|c| c == e.category))
        .collect();

    let out = output::render_list(global.output, &entries, Clone::clone, |e| e.key.to_owned())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
