//! Autocomplete providers and helpers.
//!
//! The editor treats a provider as a pure function from `(lines, cursor)` to
//! an optional suggestion set, plus an `apply_completion` operation that
//! computes the post-completion buffer. Everything here is synchronous; all
//! I/O failures degrade to "no suggestions".

use std::collections::HashSet;
use std::fs::{read_dir, symlink_metadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::fuzzy::fuzzy_filter;

fn path_delimiters() -> &'static HashSet<char> {
    static DELIMITERS: std::sync::OnceLock<HashSet<char>> = std::sync::OnceLock::new();
    DELIMITERS.get_or_init(|| [' ', '\t', '"', '\'', '='].into_iter().collect())
}

fn find_last_delimiter(text: &str) -> Option<usize> {
    for (idx, ch) in text.char_indices().rev() {
        if path_delimiters().contains(&ch) {
            return Some(idx);
        }
    }
    None
}

fn find_unclosed_quote_start(text: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut quote_start = None;

    for (idx, ch) in text.char_indices() {
        if ch == '"' {
            in_quotes = !in_quotes;
            if in_quotes {
                quote_start = Some(idx);
            }
        }
    }

    if in_quotes {
        quote_start
    } else {
        None
    }
}

fn is_token_start(text: &str, index: usize) -> bool {
    if index == 0 {
        return true;
    }
    text[..index]
        .chars()
        .last()
        .map(|ch| path_delimiters().contains(&ch))
        .unwrap_or(true)
}

fn extract_quoted_prefix(text: &str) -> Option<String> {
    let quote_start = find_unclosed_quote_start(text)?;

    if quote_start > 0 {
        let before = text[..quote_start].chars().last();
        if before == Some('@') {
            if !is_token_start(text, quote_start - 1) {
                return None;
            }
            return text.get(quote_start - 1..).map(|value| value.to_string());
        }
    }

    if !is_token_start(text, quote_start) {
        return None;
    }

    text.get(quote_start..).map(|value| value.to_string())
}

#[derive(Debug, Clone)]
struct ParsedPathPrefix {
    raw_prefix: String,
    is_at_prefix: bool,
    is_quoted_prefix: bool,
}

fn parse_path_prefix(prefix: &str) -> ParsedPathPrefix {
    if let Some(rest) = prefix.strip_prefix("@\"") {
        return ParsedPathPrefix {
            raw_prefix: rest.to_string(),
            is_at_prefix: true,
            is_quoted_prefix: true,
        };
    }
    if let Some(rest) = prefix.strip_prefix('"') {
        return ParsedPathPrefix {
            raw_prefix: rest.to_string(),
            is_at_prefix: false,
            is_quoted_prefix: true,
        };
    }
    if let Some(rest) = prefix.strip_prefix('@') {
        return ParsedPathPrefix {
            raw_prefix: rest.to_string(),
            is_at_prefix: true,
            is_quoted_prefix: false,
        };
    }
    ParsedPathPrefix {
        raw_prefix: prefix.to_string(),
        is_at_prefix: false,
        is_quoted_prefix: false,
    }
}

fn build_completion_value(path: &str, options: &CompletionOptions) -> String {
    let needs_quotes = options.is_quoted_prefix || path.contains(' ');
    let prefix = if options.is_at_prefix { "@" } else { "" };

    if !needs_quotes {
        return format!("{prefix}{path}");
    }

    format!("{prefix}\"{path}\"")
}

fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() || dir == "." {
        return name.to_string();
    }
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

#[derive(Debug, Clone)]
struct CompletionOptions {
    is_at_prefix: bool,
    is_quoted_prefix: bool,
}

#[derive(Debug, Clone)]
pub struct AutocompleteItem {
    pub value: String,
    pub label: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AutocompleteSuggestions {
    pub items: Vec<AutocompleteItem>,
    pub prefix: String,
}

#[derive(Clone)]
pub struct SlashCommand {
    pub name: String,
    pub description: Option<String>,
    pub get_argument_completions:
        Option<Arc<dyn Fn(&str) -> Option<Vec<AutocompleteItem>> + Send + Sync>>,
}

#[derive(Clone)]
pub enum CommandEntry {
    Command(SlashCommand),
    Item(AutocompleteItem),
}

impl CommandEntry {
    fn name(&self) -> &str {
        match self {
            CommandEntry::Command(cmd) => cmd.name.as_str(),
            CommandEntry::Item(item) => item.value.as_str(),
        }
    }

    fn label(&self) -> &str {
        match self {
            CommandEntry::Command(cmd) => cmd.name.as_str(),
            CommandEntry::Item(item) => item.label.as_str(),
        }
    }

    fn description(&self) -> Option<&str> {
        match self {
            CommandEntry::Command(cmd) => cmd.description.as_deref(),
            CommandEntry::Item(item) => item.description.as_deref(),
        }
    }

    fn argument_completions(&self, prefix: &str) -> Option<Vec<AutocompleteItem>> {
        match self {
            CommandEntry::Command(cmd) => cmd
                .get_argument_completions
                .as_ref()
                .and_then(|handler| handler(prefix)),
            CommandEntry::Item(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResult {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
}

pub trait AutocompleteProvider {
    fn get_suggestions(
        &self,
        lines: &[String],
        cursor_line: usize,
        cursor_col: usize,
    ) -> Option<AutocompleteSuggestions>;

    /// Suggestions for an explicit completion request (Tab) where the
    /// regular triggers did not fire.
    fn get_force_file_suggestions(
        &self,
        _lines: &[String],
        _cursor_line: usize,
        _cursor_col: usize,
    ) -> Option<AutocompleteSuggestions> {
        None
    }

    fn should_trigger_file_completion(
        &self,
        _lines: &[String],
        _cursor_line: usize,
        _cursor_col: usize,
    ) -> bool {
        true
    }

    fn apply_completion(
        &self,
        lines: &[String],
        cursor_line: usize,
        cursor_col: usize,
        item: &AutocompleteItem,
        prefix: &str,
    ) -> CompletionResult;
}

/// Slash-command plus filesystem-path completion rooted at `base_path`.
#[derive(Clone)]
pub struct CombinedAutocompleteProvider {
    commands: Vec<CommandEntry>,
    base_path: PathBuf,
}

impl CombinedAutocompleteProvider {
    pub fn new(commands: Vec<CommandEntry>, base_path: PathBuf) -> Self {
        Self {
            commands,
            base_path,
        }
    }

    fn extract_at_prefix(&self, text: &str) -> Option<String> {
        if let Some(prefix) = extract_quoted_prefix(text) {
            if prefix.starts_with("@\"") {
                return Some(prefix);
            }
        }

        let last_delim = find_last_delimiter(text);
        let token_start = last_delim.map(|idx| idx + 1).unwrap_or(0);

        if text.get(token_start..token_start + 1) == Some("@") {
            return Some(text[token_start..].to_string());
        }

        None
    }

    fn extract_path_prefix(&self, text: &str, force_extract: bool) -> Option<String> {
        if let Some(prefix) = extract_quoted_prefix(text) {
            return Some(prefix);
        }

        let last_delim = find_last_delimiter(text);
        let path_prefix = match last_delim {
            Some(idx) => text.get(idx + 1..).unwrap_or("").to_string(),
            None => text.to_string(),
        };

        if force_extract {
            return Some(path_prefix);
        }

        if path_prefix.contains('/')
            || path_prefix.starts_with('.')
            || path_prefix.starts_with("~/")
        {
            return Some(path_prefix);
        }

        if path_prefix.is_empty() && text.ends_with(' ') {
            return Some(path_prefix);
        }

        None
    }

    fn expand_home_path(&self, path: &str) -> String {
        let home = std::env::var("HOME").unwrap_or_default();
        if let Some(rest) = path.strip_prefix("~/") {
            let mut expanded = Path::new(&home).join(rest).to_string_lossy().to_string();
            if path.ends_with('/') && !expanded.ends_with('/') {
                expanded.push('/');
            }
            return expanded;
        }
        if path == "~" {
            return home;
        }
        path.to_string()
    }

    fn get_file_suggestions(&self, prefix: &str) -> Vec<AutocompleteItem> {
        let parsed = parse_path_prefix(prefix);
        let mut expanded_prefix = parsed.raw_prefix.clone();

        if expanded_prefix.starts_with('~') {
            expanded_prefix = self.expand_home_path(&expanded_prefix);
        }

        let is_root_prefix = parsed.raw_prefix.is_empty()
            || parsed.raw_prefix == "./"
            || parsed.raw_prefix == "../"
            || parsed.raw_prefix == "~"
            || parsed.raw_prefix == "~/"
            || parsed.raw_prefix == "/";

        let (search_dir, search_prefix) = if is_root_prefix || parsed.raw_prefix.ends_with('/') {
            let dir = if parsed.raw_prefix.starts_with('~') || expanded_prefix.starts_with('/') {
                expanded_prefix.clone()
            } else {
                self.base_path
                    .join(&expanded_prefix)
                    .to_string_lossy()
                    .to_string()
            };
            (dir, String::new())
        } else {
            let dir = dirname(&expanded_prefix).to_string();
            let file = basename(&expanded_prefix).to_string();
            let search_dir =
                if parsed.raw_prefix.starts_with('~') || expanded_prefix.starts_with('/') {
                    dir
                } else {
                    self.base_path.join(dir).to_string_lossy().to_string()
                };
            (search_dir, file)
        };

        let entries = match read_dir(&search_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut suggestions = Vec::new();
        let search_prefix_lower = search_prefix.to_lowercase();

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.to_lowercase().starts_with(&search_prefix_lower) {
                continue;
            }

            let mut is_directory = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            if !is_directory {
                if let Ok(metadata) = symlink_metadata(entry.path()) {
                    if metadata.file_type().is_symlink() {
                        if let Ok(target_meta) = entry.path().metadata() {
                            is_directory = target_meta.is_dir();
                        }
                    }
                }
            }

            let display_prefix = parsed.raw_prefix.clone();
            let relative_path = if display_prefix.ends_with('/') {
                format!("{display_prefix}{name}")
            } else if display_prefix.contains('/') {
                if display_prefix.starts_with("~/") {
                    let home_relative = display_prefix
                        .strip_prefix("~/")
                        .expect("display_prefix starts with ~/");
                    let dir = dirname(home_relative);
                    if dir == "." {
                        format!("~/{name}")
                    } else {
                        format!("~/{}/{}", dir, name)
                    }
                } else if display_prefix.starts_with('/') {
                    let dir = dirname(&display_prefix);
                    if dir == "/" {
                        format!("/{name}")
                    } else {
                        format!("{}/{}", dir, name)
                    }
                } else {
                    join_path(dirname(&display_prefix), &name)
                }
            } else if display_prefix.starts_with('~') {
                format!("~/{name}")
            } else {
                name.clone()
            };

            let path_value = if is_directory {
                format!("{relative_path}/")
            } else {
                relative_path
            };

            let value = build_completion_value(
                &path_value,
                &CompletionOptions {
                    is_at_prefix: parsed.is_at_prefix,
                    is_quoted_prefix: parsed.is_quoted_prefix,
                },
            );

            suggestions.push(AutocompleteItem {
                value,
                label: format!("{}{}", name, if is_directory { "/" } else { "" }),
                description: None,
            });
        }

        suggestions.sort_by(|a, b| {
            let a_is_dir = a.label.ends_with('/');
            let b_is_dir = b.label.ends_with('/');
            if a_is_dir && !b_is_dir {
                return std::cmp::Ordering::Less;
            }
            if !a_is_dir && b_is_dir {
                return std::cmp::Ordering::Greater;
            }
            a.label.cmp(&b.label)
        });

        suggestions
    }

    fn get_command_suggestions(&self, text_before_cursor: &str) -> Option<AutocompleteSuggestions> {
        if let Some(space_index) = text_before_cursor.find(' ') {
            let command_name = &text_before_cursor[1..space_index];
            let argument_text = &text_before_cursor[space_index + 1..];

            if let Some(command) = self
                .commands
                .iter()
                .find(|entry| entry.name() == command_name)
            {
                if let Some(argument_suggestions) = command.argument_completions(argument_text) {
                    if argument_suggestions.is_empty() {
                        return None;
                    }
                    return Some(AutocompleteSuggestions {
                        items: argument_suggestions,
                        prefix: argument_text.to_string(),
                    });
                }
            }

            return None;
        }

        let query = &text_before_cursor[1..];
        let filtered = fuzzy_filter(&self.commands, query, |entry| entry.name().to_string());
        if filtered.is_empty() {
            return None;
        }

        let items = filtered
            .into_iter()
            .map(|entry| AutocompleteItem {
                value: entry.name().to_string(),
                label: entry.label().to_string(),
                description: entry.description().map(|d| d.to_string()),
            })
            .collect();

        Some(AutocompleteSuggestions {
            items,
            prefix: text_before_cursor.to_string(),
        })
    }
}

impl AutocompleteProvider for CombinedAutocompleteProvider {
    fn get_suggestions(
        &self,
        lines: &[String],
        cursor_line: usize,
        cursor_col: usize,
    ) -> Option<AutocompleteSuggestions> {
        let current_line = lines.get(cursor_line).map(String::as_str).unwrap_or("");
        let text_before_cursor = current_line.get(..cursor_col).unwrap_or(current_line);

        if let Some(at_prefix) = self.extract_at_prefix(text_before_cursor) {
            let suggestions = self.get_file_suggestions(&at_prefix);
            if suggestions.is_empty() {
                return None;
            }
            return Some(AutocompleteSuggestions {
                items: suggestions,
                prefix: at_prefix,
            });
        }

        if text_before_cursor.starts_with('/') {
            return self.get_command_suggestions(text_before_cursor);
        }

        if let Some(path_prefix) = self.extract_path_prefix(text_before_cursor, false) {
            let suggestions = self.get_file_suggestions(&path_prefix);
            if suggestions.is_empty() {
                return None;
            }
            return Some(AutocompleteSuggestions {
                items: suggestions,
                prefix: path_prefix,
            });
        }

        None
    }

    fn get_force_file_suggestions(
        &self,
        lines: &[String],
        cursor_line: usize,
        cursor_col: usize,
    ) -> Option<AutocompleteSuggestions> {
        let current_line = lines.get(cursor_line).map(String::as_str).unwrap_or("");
        let text_before_cursor = current_line.get(..cursor_col).unwrap_or(current_line);

        if text_before_cursor.trim().starts_with('/') && !text_before_cursor.trim().contains(' ') {
            return None;
        }

        let path_prefix = self.extract_path_prefix(text_before_cursor, true)?;
        let suggestions = self.get_file_suggestions(&path_prefix);
        if suggestions.is_empty() {
            return None;
        }
        Some(AutocompleteSuggestions {
            items: suggestions,
            prefix: path_prefix,
        })
    }

    fn should_trigger_file_completion(
        &self,
        lines: &[String],
        cursor_line: usize,
        cursor_col: usize,
    ) -> bool {
        let current_line = lines.get(cursor_line).map(String::as_str).unwrap_or("");
        let text_before_cursor = current_line.get(..cursor_col).unwrap_or(current_line);

        // Inside an unfinished slash command, Tab belongs to the command list.
        !(text_before_cursor.trim().starts_with('/') && !text_before_cursor.trim().contains(' '))
    }

    fn apply_completion(
        &self,
        lines: &[String],
        cursor_line: usize,
        cursor_col: usize,
        item: &AutocompleteItem,
        prefix: &str,
    ) -> CompletionResult {
        let current_line = lines.get(cursor_line).map(String::as_str).unwrap_or("");
        let prefix_len = prefix.len();
        let before_prefix_len = cursor_col.saturating_sub(prefix_len);
        let before_prefix = current_line.get(..before_prefix_len).unwrap_or("");
        let after_cursor = current_line.get(cursor_col..).unwrap_or("");

        let is_quoted_prefix = prefix.starts_with('"') || prefix.starts_with("@\"");
        let has_leading_quote_after_cursor = after_cursor.starts_with('"');
        let has_trailing_quote_in_item = item.value.ends_with('"');

        let adjusted_after_cursor =
            if is_quoted_prefix && has_trailing_quote_in_item && has_leading_quote_after_cursor {
                after_cursor.get(1..).unwrap_or("")
            } else {
                after_cursor
            };

        let is_slash_command = prefix.starts_with('/')
            && before_prefix.trim().is_empty()
            && !prefix[1..].contains('/');
        if is_slash_command {
            let new_line = format!("{}/{} {}", before_prefix, item.value, adjusted_after_cursor);
            let mut new_lines = lines.to_vec();
            new_lines[cursor_line] = new_line;
            return CompletionResult {
                lines: new_lines,
                cursor_line,
                cursor_col: before_prefix.len() + item.value.len() + 2,
            };
        }

        if prefix.starts_with('@') {
            let is_directory = item.label.ends_with('/');
            let suffix = if is_directory { "" } else { " " };
            let new_line = format!(
                "{}{}{}{}",
                before_prefix, item.value, suffix, adjusted_after_cursor
            );
            let mut new_lines = lines.to_vec();
            new_lines[cursor_line] = new_line;

            let has_trailing_quote = item.value.ends_with('"');
            let cursor_offset = if is_directory && has_trailing_quote {
                item.value.len().saturating_sub(1)
            } else {
                item.value.len()
            };

            return CompletionResult {
                lines: new_lines,
                cursor_line,
                cursor_col: before_prefix.len() + cursor_offset + suffix.len(),
            };
        }

        let new_line = format!("{}{}{}", before_prefix, item.value, adjusted_after_cursor);
        let mut new_lines = lines.to_vec();
        new_lines[cursor_line] = new_line;

        let is_directory = item.label.ends_with('/');
        let has_trailing_quote = item.value.ends_with('"');
        let cursor_offset = if is_directory && has_trailing_quote {
            item.value.len().saturating_sub(1)
        } else {
            item.value.len()
        };

        CompletionResult {
            lines: new_lines,
            cursor_line,
            cursor_col: before_prefix.len() + cursor_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(name: &str, description: Option<&str>) -> CommandEntry {
        CommandEntry::Command(SlashCommand {
            name: name.to_string(),
            description: description.map(|d| d.to_string()),
            get_argument_completions: None,
        })
    }

    fn provider_with_commands(names: &[&str]) -> CombinedAutocompleteProvider {
        let commands = names.iter().map(|name| command(name, None)).collect();
        CombinedAutocompleteProvider::new(commands, PathBuf::from("."))
    }

    #[test]
    fn parse_path_prefix_variants() {
        let parsed = parse_path_prefix("@\"foo");
        assert!(parsed.is_at_prefix);
        assert!(parsed.is_quoted_prefix);
        assert_eq!(parsed.raw_prefix, "foo");

        let parsed = parse_path_prefix("\"bar");
        assert!(!parsed.is_at_prefix);
        assert!(parsed.is_quoted_prefix);
        assert_eq!(parsed.raw_prefix, "bar");

        let parsed = parse_path_prefix("@baz");
        assert!(parsed.is_at_prefix);
        assert!(!parsed.is_quoted_prefix);
        assert_eq!(parsed.raw_prefix, "baz");
    }

    #[test]
    fn completion_value_quotes_when_needed() {
        let value = build_completion_value(
            "foo bar",
            &CompletionOptions {
                is_at_prefix: false,
                is_quoted_prefix: false,
            },
        );
        assert_eq!(value, "\"foo bar\"");

        let value = build_completion_value(
            "foo bar",
            &CompletionOptions {
                is_at_prefix: true,
                is_quoted_prefix: false,
            },
        );
        assert_eq!(value, "@\"foo bar\"");
    }

    #[test]
    fn slash_prefix_filters_commands() {
        let provider = provider_with_commands(&["help", "hello", "model"]);
        let lines = vec!["/he".to_string()];
        let suggestions = provider.get_suggestions(&lines, 0, 3).expect("suggestions");
        assert_eq!(suggestions.prefix, "/he");
        let values: Vec<&str> = suggestions
            .items
            .iter()
            .map(|item| item.value.as_str())
            .collect();
        assert!(values.contains(&"help"));
        assert!(values.contains(&"hello"));
        assert!(!values.contains(&"model"));
    }

    #[test]
    fn unknown_command_yields_none() {
        let provider = provider_with_commands(&["help"]);
        let lines = vec!["/zzz".to_string()];
        assert!(provider.get_suggestions(&lines, 0, 4).is_none());
    }

    #[test]
    fn apply_completion_for_slash_command() {
        let provider = provider_with_commands(&[]);
        let lines = vec!["/he".to_string()];
        let item = AutocompleteItem {
            value: "help".to_string(),
            label: "help".to_string(),
            description: None,
        };
        let result = provider.apply_completion(&lines, 0, 3, &item, "/he");
        assert_eq!(result.lines[0], "/help ");
        assert_eq!(result.cursor_col, 6);
    }

    #[test]
    fn apply_completion_for_at_reference_appends_space_for_files() {
        let provider = provider_with_commands(&[]);
        let lines = vec!["see @src/ma".to_string()];
        let item = AutocompleteItem {
            value: "@src/main.rs".to_string(),
            label: "main.rs".to_string(),
            description: None,
        };
        let result = provider.apply_completion(&lines, 0, 11, &item, "@src/ma");
        assert_eq!(result.lines[0], "see @src/main.rs ");
        assert_eq!(result.cursor_col, "see @src/main.rs ".len());
    }

    #[test]
    fn at_prefix_lists_matching_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("srcdir")).expect("mkdir");
        std::fs::write(dir.path().join("main.rs"), "").expect("write");
        std::fs::write(dir.path().join("mod.rs"), "").expect("write");

        let provider = CombinedAutocompleteProvider::new(Vec::new(), dir.path().to_path_buf());
        let lines = vec!["@m".to_string()];
        let suggestions = provider.get_suggestions(&lines, 0, 2).expect("suggestions");
        assert_eq!(suggestions.prefix, "@m");
        let values: Vec<&str> = suggestions
            .items
            .iter()
            .map(|item| item.value.as_str())
            .collect();
        assert_eq!(values, vec!["@main.rs", "@mod.rs"]);
    }

    #[test]
    fn directories_sort_first_with_trailing_slash() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("alpha")).expect("mkdir");
        std::fs::write(dir.path().join("aardvark.txt"), "").expect("write");

        let provider = CombinedAutocompleteProvider::new(Vec::new(), dir.path().to_path_buf());
        let lines = vec!["@a".to_string()];
        let suggestions = provider.get_suggestions(&lines, 0, 2).expect("suggestions");
        let labels: Vec<&str> = suggestions
            .items
            .iter()
            .map(|item| item.label.as_str())
            .collect();
        assert_eq!(labels, vec!["alpha/", "aardvark.txt"]);
    }

    #[test]
    fn force_file_suggestions_skip_slash_context() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("notes.md"), "").expect("write");
        let provider = CombinedAutocompleteProvider::new(Vec::new(), dir.path().to_path_buf());

        let slash_lines = vec!["/he".to_string()];
        assert!(provider
            .get_force_file_suggestions(&slash_lines, 0, 3)
            .is_none());
        assert!(!provider.should_trigger_file_completion(&slash_lines, 0, 3));

        let plain_lines = vec!["no".to_string()];
        let suggestions = provider
            .get_force_file_suggestions(&plain_lines, 0, 2)
            .expect("suggestions");
        assert_eq!(suggestions.items[0].label, "notes.md");
    }
}
