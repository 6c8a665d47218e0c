//! Line commands for driving the editor from a terminal.
//!
//! ```text
//! set <id> <speaker|start|end|text> <value...>
//! title <value...>
//! part <field> <value...>
//! focus <id>
//! play|pause|rewind|add-before|add-after|delete <id>
//! autoplay on|off
//! speaker <old> <new...>
//! speaker <old...> -> <new...>
//! ```

use crate::kernel::event::UiEvent;
use crate::kernel::segment::{SegmentField, SegmentId};

pub const USAGE: &str = "commands: set <id> <field> <value>, title <value>, part <field> <value>, \
focus <id>, play|pause|rewind|add-before|add-after|delete <id>, autoplay on|off, \
speaker <old> <new> (or <old> -> <new> for names with spaces)";

pub fn parse_command(line: &str) -> Result<UiEvent, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim_start();

    match verb {
        "set" => {
            let (id, rest) = next_token(rest);
            let segment = parse_id(Some(id))?;
            let (field, value) = next_token(rest);
            if field.is_empty() {
                return Err("missing field".to_string());
            }
            let field: SegmentField = field.parse()?;
            Ok(UiEvent::SegmentChanged {
                segment,
                field,
                value: value.to_string(),
            })
        }
        "title" => Ok(UiEvent::TranscriptionChanged {
            field: "title".to_string(),
            value: rest.to_string(),
        }),
        "part" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if field.is_empty() {
                return Err("missing field".to_string());
            }
            Ok(UiEvent::TranscriptionChanged {
                field: field.to_string(),
                value: value.trim_start().to_string(),
            })
        }
        "focus" => Ok(UiEvent::TextFocused {
            segment: parse_id(Some(rest))?,
        }),
        "autoplay" => match rest {
            "on" => Ok(UiEvent::AutoplayToggled(true)),
            "off" => Ok(UiEvent::AutoplayToggled(false)),
            other => Err(format!("autoplay expects on|off, got {:?}", other)),
        },
        "speaker" => {
            let (old, new) = match rest.split_once("->") {
                Some((old, new)) => (old.trim(), new.trim()),
                None => next_token(rest),
            };
            if old.is_empty() || new.trim().is_empty() {
                return Err("speaker expects an old and a new name".to_string());
            }
            Ok(UiEvent::SpeakerRenamed {
                old: old.to_string(),
                new: new.trim().to_string(),
            })
        }
        "" => Err(USAGE.to_string()),
        // Anything else is a control button; the binder decides if it exists.
        control => Ok(UiEvent::ControlClicked {
            segment: parse_id(Some(rest))?,
            control: control.to_string(),
        }),
    }
}

/// First whitespace-delimited token and the rest of the line, both trimmed
/// at the front.
fn next_token(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    let (token, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    (token, rest.trim_start())
}

fn parse_id(token: Option<&str>) -> Result<SegmentId, String> {
    let token = token.map(str::trim).unwrap_or("");
    token
        .parse()
        .map_err(|_| format!("expected a segment id, got {:?}", token))
}
