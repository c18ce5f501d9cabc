// src/cli/script.rs
//! Line-oriented edit scripts replayed by `notedit edit`.
use std::time::Duration;

use crate::domain::{
    BlockType, DomainError, EditorCommand, HeadingLevel, ListKind, MarkKind, Position, Selection,
    TextAlign,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Command(EditorCommand),
    Title(String),
    Select(Selection),
    /// Path or `data:` URL, resolved when the step runs.
    Image(String),
    Wait(Duration),
}

/// Parses a whole script; blank lines and `#` comments are skipped.
pub fn parse_script(source: &str) -> Result<Vec<ScriptStep>, DomainError> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            parse_step(line.trim_start().trim_end_matches('\r')).map_err(|reason| {
                DomainError::InvalidScript {
                    line: index + 1,
                    reason,
                }
            })
        })
        .collect()
}

fn parse_step(line: &str) -> Result<ScriptStep, String> {
    let (keyword, rest) = line.split_once(' ').unwrap_or((line, ""));
    let arg = rest.trim();
    let command = |c: EditorCommand| -> Result<ScriptStep, String> { Ok(ScriptStep::Command(c)) };

    match keyword {
        // typed text is kept verbatim
        "type" => command(EditorCommand::InsertText(rest.to_string())),
        "title" => Ok(ScriptStep::Title(arg.to_string())),
        "enter" => command(EditorCommand::SplitBlock),
        "select" => parse_selection(arg).map(ScriptStep::Select),
        "heading" => {
            let level: u64 = arg
                .parse()
                .map_err(|_| format!("heading level must be a number, got {arg:?}"))?;
            if !(1..=3).contains(&level) {
                return Err(format!("heading level must be 1-3, got {level}"));
            }
            command(EditorCommand::SetBlock(BlockType::Heading(HeadingLevel::clamped(level))))
        }
        "paragraph" => command(EditorCommand::SetBlock(BlockType::Paragraph)),
        "codeblock" => command(EditorCommand::SetBlock(BlockType::CodeBlock)),
        "bullet-list" => command(EditorCommand::ToggleList(ListKind::Bullet)),
        "ordered-list" => command(EditorCommand::ToggleList(ListKind::Ordered)),
        "task-list" => command(EditorCommand::ToggleList(ListKind::Task)),
        "blockquote" => command(EditorCommand::ToggleBlockquote),
        "task" => command(EditorCommand::ToggleTask),
        "align" => arg
            .parse::<TextAlign>()
            .map(|align| ScriptStep::Command(EditorCommand::SetTextAlign(align)))
            .map_err(|e| e.to_string()),
        "link" if arg.is_empty() => Err("link needs an href".to_string()),
        "link" => command(EditorCommand::SetLink(Some(arg.to_string()))),
        "unlink" => command(EditorCommand::SetLink(Some(String::new()))),
        "link-cancel" => command(EditorCommand::SetLink(None)),
        "image" => Ok(ScriptStep::Image(arg.to_string())),
        "undo" => command(EditorCommand::Undo),
        "redo" => command(EditorCommand::Redo),
        "wait" => arg
            .parse::<u64>()
            .map(|ms| ScriptStep::Wait(Duration::from_millis(ms)))
            .map_err(|_| format!("wait needs milliseconds, got {arg:?}")),
        other => match other.parse::<MarkKind>() {
            Ok(kind) => command(EditorCommand::ToggleMark(kind)),
            Err(_) => Err(format!("unknown step {other:?}")),
        },
    }
}

fn parse_selection(arg: &str) -> Result<Selection, String> {
    let mut parts = arg.split_whitespace();
    let anchor = parts
        .next()
        .ok_or_else(|| "select needs <block>:<offset>".to_string())
        .and_then(parse_position)?;
    let selection = match parts.next() {
        Some(head) => Selection::range(anchor, parse_position(head)?),
        None => Selection::cursor(anchor),
    };
    if parts.next().is_some() {
        return Err("select takes at most two positions".to_string());
    }
    Ok(selection)
}

fn parse_position(token: &str) -> Result<Position, String> {
    let invalid = || format!("expected <block>:<offset>, got {token:?}");
    let (block, offset) = token.split_once(':').ok_or_else(invalid)?;
    Ok(Position::new(
        block.parse().map_err(|_| invalid())?,
        offset.parse().map_err(|_| invalid())?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bold", EditorCommand::ToggleMark(MarkKind::Bold))]
    #[case("subscript", EditorCommand::ToggleMark(MarkKind::Subscript))]
    #[case("heading 2", EditorCommand::SetBlock(BlockType::Heading(HeadingLevel::H2)))]
    #[case("task-list", EditorCommand::ToggleList(ListKind::Task))]
    #[case("align justify", EditorCommand::SetTextAlign(TextAlign::Justify))]
    #[case("link https://a.io", EditorCommand::SetLink(Some("https://a.io".into())))]
    #[case("unlink", EditorCommand::SetLink(Some(String::new())))]
    #[case("link-cancel", EditorCommand::SetLink(None))]
    #[case("type  two spaces", EditorCommand::InsertText(" two spaces".into()))]
    fn given_command_line_when_parsing_then_maps_to_command(
        #[case] line: &str,
        #[case] expected: EditorCommand,
    ) {
        let steps = parse_script(line).unwrap();

        assert_eq!(steps, vec![ScriptStep::Command(expected)]);
    }

    #[test]
    fn given_select_with_two_positions_when_parsing_then_builds_range() {
        let steps = parse_script("select 1:2 3:0").unwrap();

        assert_eq!(
            steps,
            vec![ScriptStep::Select(Selection::range(
                Position::new(1, 2),
                Position::new(3, 0)
            ))]
        );
    }

    #[test]
    fn given_comments_and_blank_lines_when_parsing_then_skips_them() {
        let source = "# setup\n\ntitle Plan\n  wait 600\n";

        let steps = parse_script(source).unwrap();

        assert_eq!(
            steps,
            vec![
                ScriptStep::Title("Plan".into()),
                ScriptStep::Wait(Duration::from_millis(600)),
            ]
        );
    }

    #[rstest]
    #[case("bold\nheading 7", 2)]
    #[case("# c\nselect 1", 2)]
    #[case("frobnicate", 1)]
    #[case("\n\nwait soon", 3)]
    fn given_bad_line_when_parsing_then_reports_line_number(
        #[case] source: &str,
        #[case] line: usize,
    ) {
        let result = parse_script(source);

        assert!(matches!(result, Err(DomainError::InvalidScript { line: l, .. }) if l == line));
    }
}
