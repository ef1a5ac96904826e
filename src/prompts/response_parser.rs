//! Lenient parser for labelled prompt records in free-text model output.
//!
//! Records look like
//!
//! ```text
//! ---
//! Tool: getPetById
//! Name: getPetById
//! Arguments: petId
//! Description: Fetch one pet
//! Text: "Show me pet {{petId}}"
//! ---
//! ```
//!
//! Labels are case-insensitive. Unlabelled lines continue the text of the
//! current record. A record is kept only when it has both a name and a text;
//! anything else is dropped without error.

use crate::openapi::Prompt;

#[derive(Debug, Default)]
struct Draft {
    name: String,
    args: String,
    text: String,
    desc: String,
}

impl Draft {
    fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Tool,
    Name,
    Arguments,
    Description,
    Text,
}

const LABELS: &[(&str, Label)] = &[
    ("tool:", Label::Tool),
    ("name:", Label::Name),
    ("arguments:", Label::Arguments),
    ("description:", Label::Description),
    ("text:", Label::Text),
];

fn split_label(line: &str) -> Option<(Label, &str)> {
    LABELS.iter().find_map(|(prefix, label)| {
        let head = line.get(..prefix.len())?;
        head.eq_ignore_ascii_case(prefix)
            .then(|| (*label, line[prefix.len()..].trim()))
    })
}

/// Undo doubled braces and strip surrounding quotes
fn clean_text(text: &str) -> String {
    text.replace("{{", "{")
        .replace("}}", "}")
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

/// Models answer "EMPTY" or "none" for argument-less tools
fn clean_arguments(args: &str) -> String {
    let trimmed = args.trim();
    let bare = trimmed.trim_start_matches('(').trim_end_matches(')');
    if bare.eq_ignore_ascii_case("empty") || bare.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Extract prompt records from model output.
///
/// The emitted prompt name is forced to the most recent `Tool:` label so that
/// prompts link to their tools whatever the model wrote under `Name:`.
pub fn parse_prompt_records(text: &str) -> Vec<Prompt> {
    let mut prompts = Vec::new();
    let mut current_tool: Option<String> = None;
    let mut draft = Draft::default();

    let mut finish = |draft: &mut Draft, tool: &Option<String>| {
        if !draft.is_complete() {
            return;
        }
        let done = std::mem::take(draft);
        prompts.push(Prompt {
            name: tool.clone().unwrap_or(done.name),
            args: clean_arguments(&done.args),
            text: clean_text(&done.text),
            desc: done.desc,
        });
    };

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line == "---" {
            finish(&mut draft, &current_tool);
            continue;
        }

        match split_label(line) {
            Some((Label::Tool, value)) => current_tool = Some(value.to_string()),
            Some((Label::Name, value)) => draft.name = value.to_string(),
            Some((Label::Arguments, value)) => draft.args = value.to_string(),
            Some((Label::Description, value)) => draft.desc = value.to_string(),
            Some((Label::Text, value)) => draft.text = value.to_string(),
            None if !draft.name.is_empty() => {
                if !draft.text.is_empty() {
                    draft.text.push(' ');
                }
                draft.text.push_str(line);
            }
            None => {}
        }
    }
    finish(&mut draft, &current_tool);

    prompts
}
