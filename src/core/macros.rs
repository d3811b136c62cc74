//! Command macro expansion and highlighting for ferrule.
//!
//! A command template such as `tar czf %~x.tar.gz %m %&` is turned into the shell command that
//! is actually run. Expansion is a single left-to-right pass over the template and never fails:
//! anything that is not a recognized macro is copied through as literal text.
//!
//! | macro       | expands to                                      |
//! |-------------|-------------------------------------------------|
//! | `%f` `%~f`  | file name under the cursor                      |
//! | `%F` `%~F`  | file path under the cursor                      |
//! | `%e` `%~e`  | extension of the cursor file (with the dot)     |
//! | `%x` `%~x`  | file name without extension                     |
//! | `%X` `%~X`  | file path without extension                     |
//! | `%m` `%~m`  | marked file names joined by spaces              |
//! | `%M` `%~M`  | marked file paths joined by spaces              |
//! | `%d` `%~d`  | base name of the current directory              |
//! | `%D` `%~D`  | path of the current directory                   |
//! | `%d2` `%D2` | same for the neighbor pane's directory          |
//! | `%t`        | time of day, `HHMMSS`                           |
//! | `%T`        | date, `YYYYMMDD`                                |
//! | `%&`        | run in the background shell, expands to nothing |
//!
//! Without `~` every name and path is quoted as a single shell word. A backslash escapes the
//! following character: `\%f` yields a literal `%f`.
//!
//! The [tokenize] function classifies a template for the shell command line highlighter.

use crate::utils::{extension, quote, remove_ext};

use chrono::{DateTime, Local};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const PREFIX: char = '%';
const ESCAPE: char = '\\';
const NON_QUOTE: char = '~';
const NEXT_DIR: char = '2';

/// Everything a template may refer to, captured from the listing at expansion time.
///
/// `marked_names` and `marked_paths` hold the unquoted forms; the quoted forms are derived
/// while expanding. When nothing is marked the listing provider puts the cursor file here.
#[derive(Debug, Clone)]
pub struct MacroContext {
    pub file_name: String,
    pub file_path: String,
    pub marked_names: Vec<String>,
    pub marked_paths: Vec<String>,
    pub dir_name: String,
    pub dir_path: String,
    pub next_dir_name: String,
    pub next_dir_path: String,
    pub now: DateTime<Local>,
}

impl Default for MacroContext {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            file_path: String::new(),
            marked_names: Vec::new(),
            marked_paths: Vec::new(),
            dir_name: String::new(),
            dir_path: String::new(),
            next_dir_name: String::new(),
            next_dir_path: String::new(),
            now: Local::now(),
        }
    }
}

enum Substitution {
    Text(String),
    Background,
}

#[derive(Clone, Copy)]
enum State {
    Text,
    Escape,
    Prefix { raw: bool },
}

/// Expands every macro in `template`.
///
/// Returns the expanded command and whether `%&` requested background execution.
pub fn expand(template: &str, ctx: &MacroContext) -> (String, bool) {
    let mut out = String::with_capacity(template.len());
    let mut background = false;
    let mut state = State::Text;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        state = match state {
            State::Escape => {
                out.push(c);
                State::Text
            }
            State::Prefix { raw } => {
                if c == NON_QUOTE {
                    if raw {
                        // "%~~" never opens a macro
                        out.push_str("%~~");
                        State::Text
                    } else {
                        State::Prefix { raw: true }
                    }
                } else {
                    let next_dir = matches!(c, 'd' | 'D') && chars.peek() == Some(&NEXT_DIR);
                    match substitute(c, !raw, next_dir, ctx) {
                        Some(Substitution::Text(text)) => {
                            if next_dir {
                                chars.next();
                            }
                            out.push_str(&text);
                            State::Text
                        }
                        Some(Substitution::Background) => {
                            background = true;
                            State::Text
                        }
                        None => {
                            out.push(PREFIX);
                            if raw {
                                out.push(NON_QUOTE);
                            }
                            scan_text(c, &mut out)
                        }
                    }
                }
            }
            State::Text => scan_text(c, &mut out),
        };
    }

    match state {
        State::Text => {}
        State::Escape => out.push(ESCAPE),
        State::Prefix { raw } => {
            out.push(PREFIX);
            if raw {
                out.push(NON_QUOTE);
            }
        }
    }
    (out, background)
}

fn scan_text(c: char, out: &mut String) -> State {
    match c {
        PREFIX => State::Prefix { raw: false },
        ESCAPE => State::Escape,
        _ => {
            out.push(c);
            State::Text
        }
    }
}

fn substitute(
    letter: char,
    quoted: bool,
    next_dir: bool,
    ctx: &MacroContext,
) -> Option<Substitution> {
    let word = |s: &str| {
        if quoted {
            quote(s)
        } else {
            s.to_string()
        }
    };
    let words = |items: &[String]| {
        items
            .iter()
            .map(|s| word(s))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let text = match letter {
        'f' => word(&ctx.file_name),
        'F' => word(&ctx.file_path),
        'e' => word(extension(&ctx.file_name)),
        'x' => word(remove_ext(&ctx.file_name)),
        'X' => word(remove_ext(&ctx.file_path)),
        'm' => words(&ctx.marked_names),
        'M' => words(&ctx.marked_paths),
        'd' if next_dir => word(&ctx.next_dir_name),
        'd' => word(&ctx.dir_name),
        'D' if next_dir => word(&ctx.next_dir_path),
        'D' => word(&ctx.dir_path),
        't' => ctx.now.format("%H%M%S").to_string(),
        'T' => ctx.now.format("%Y%m%d").to_string(),
        '&' => return Some(Substitution::Background),
        _ => return None,
    };
    Some(Substitution::Text(text))
}

/// Classification of a piece of a command template, used for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain text between separators.
    Text,
    /// Plain text that names a command found in `$PATH`.
    Command,
    /// One of `; | > &`.
    Separator,
    /// A macro reference such as `%f` or `%~D2`.
    Macro,
    /// A leading-space option such as ` -v` or ` --color=never`.
    Option,
    /// A single whitespace character.
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroToken<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([;|>&])|(%~?(?:[&mMfFexXtT]|[dD]2?))|(\s-[\w=-]+)|\s")
        .expect("token pattern is valid")
});

/// Splits `cmd` into highlight tokens.
///
/// Text between matches is reported as [TokenKind::Command] when it is in `commands`.
/// Concatenating every token's text yields `cmd` again.
pub fn tokenize<'a>(cmd: &'a str, commands: &HashSet<String>) -> Vec<MacroToken<'a>> {
    let mut tokens = Vec::new();
    let mut start = 0;

    let push_text = |tokens: &mut Vec<MacroToken<'a>>, text: &'a str| {
        if text.is_empty() {
            return;
        }
        let kind = if commands.contains(text) {
            TokenKind::Command
        } else {
            TokenKind::Text
        };
        tokens.push(MacroToken { kind, text });
    };

    for caps in TOKEN_RE.captures_iter(cmd) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&mut tokens, &cmd[start..whole.start()]);

        let kind = if caps.get(1).is_some() {
            TokenKind::Separator
        } else if caps.get(2).is_some() {
            TokenKind::Macro
        } else if caps.get(3).is_some() {
            TokenKind::Option
        } else {
            TokenKind::Space
        };
        tokens.push(MacroToken {
            kind,
            text: whole.as_str(),
        });
        start = whole.end();
    }
    push_text(&mut tokens, &cmd[start..]);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Context of a fresh pane in `/home/me`: the cursor sits on `..` and nothing is marked.
    fn parent_cursor_ctx() -> MacroContext {
        MacroContext {
            file_name: "..".into(),
            file_path: "/home".into(),
            marked_names: vec!["..".into()],
            marked_paths: vec!["/home".into()],
            dir_name: "me".into(),
            dir_path: "/home/me".into(),
            next_dir_name: "tmp".into(),
            next_dir_path: "/tmp".into(),
            now: Local
                .with_ymd_and_hms(2024, 12, 31, 15, 45, 1)
                .single()
                .unwrap_or_else(Local::now),
        }
    }

    fn run(template: &str) -> String {
        expand(template, &parent_cursor_ctx()).0
    }

    #[test]
    fn plain_text_is_untouched() {
        for template in ["", "ls -la", "echo 100", "a ~ b", "tilde~only"] {
            assert_eq!(expand(template, &parent_cursor_ctx()), (template.into(), false));
        }
    }

    #[test]
    fn background_flag_expands_to_nothing() {
        assert_eq!(expand("%&", &parent_cursor_ctx()), (String::new(), true));
        assert_eq!(
            expand("xdg-open %f %&", &parent_cursor_ctx()),
            ("xdg-open '..' ".into(), true)
        );
    }

    #[test]
    #[cfg(not(windows))]
    fn quoted_and_unquoted_forms() {
        let ctx = MacroContext {
            file_name: "foo".into(),
            ..parent_cursor_ctx()
        };
        assert_eq!(expand("%f", &ctx).0, "'foo'");
        assert_eq!(expand("%~f", &ctx).0, "foo");
    }

    #[test]
    #[cfg(not(windows))]
    fn every_letter() {
        assert_eq!(run("%f"), "'..'");
        assert_eq!(run("%F"), "'/home'");
        assert_eq!(run("%x"), "'..'");
        assert_eq!(run("%X"), "'/home'");
        assert_eq!(run("%m"), "'..'");
        assert_eq!(run("%M"), "'/home'");
        assert_eq!(run("%d"), "'me'");
        assert_eq!(run("%D"), "'/home/me'");
        assert_eq!(run("%d2"), "'tmp'");
        assert_eq!(run("%D2"), "'/tmp'");
        assert_eq!(run("%~f"), "..");
        assert_eq!(run("%~F"), "/home");
        assert_eq!(run("%~d2"), "tmp");
        assert_eq!(run("%~D2"), "/tmp");
        assert_eq!(run("%t"), "154501");
        assert_eq!(run("%T"), "20241231");
    }

    #[test]
    #[cfg(not(windows))]
    fn escapes_and_unknown_macros() {
        assert_eq!(run("%%%f"), "%%'..'");
        assert_eq!(run("%%%~f"), "%%..");
        assert_eq!(run("%~~f"), "%~~f");
        assert_eq!(run(r"\%f%f"), "%f'..'");
        assert_eq!(run(r"\%~f%~f"), "%~f..");
        assert_eq!(run(r"%\f%f"), "%f'..'");
        assert_eq!(run(r"%\~f%~f"), "%~f..");
        assert_eq!(run("%AA%ff"), "%AA'..'f");
        assert_eq!(run("%~A~A%~ff"), "%~A~A..f");
    }

    #[test]
    #[cfg(not(windows))]
    fn consecutive_macros_expand_independently() {
        assert_eq!(run("%m %f"), "'..' '..'");
        assert_eq!(run("%~f %f %~m"), ".. '..' ..");
    }

    #[test]
    fn dangling_prefix_and_escape_stay_literal() {
        assert_eq!(run("100%"), "100%");
        assert_eq!(run("50%~"), "50%~");
        assert_eq!(run(r"trailing\"), r"trailing\");
        assert_eq!(run(r"a\\b"), r"a\b");
    }

    #[test]
    #[cfg(not(windows))]
    fn marks_and_extension() {
        let ctx = MacroContext {
            file_name: "song.ogg".into(),
            file_path: "/music/song.ogg".into(),
            marked_names: vec!["a b.txt".into(), "c.txt".into()],
            marked_paths: vec!["/m/a b.txt".into(), "/m/c.txt".into()],
            ..parent_cursor_ctx()
        };
        assert_eq!(expand("%m", &ctx).0, "'a b.txt' 'c.txt'");
        assert_eq!(expand("%~M", &ctx).0, "/m/a b.txt /m/c.txt");
        assert_eq!(expand("%x%e", &ctx).0, "'song''.ogg'");
        assert_eq!(expand("%~X.flac", &ctx).0, "/music/song.flac");
    }

    #[test]
    fn tokenize_classifies_pieces() {
        let commands: HashSet<String> = ["tar".to_string()].into_iter().collect();
        let cmd = "tar -czf %~x.tgz %m; echo done";
        let tokens = tokenize(cmd, &commands);

        let joined: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(joined, cmd);

        assert_eq!(tokens[0], MacroToken { kind: TokenKind::Command, text: "tar" });
        assert_eq!(tokens[1], MacroToken { kind: TokenKind::Option, text: " -czf" });
        assert!(tokens.contains(&MacroToken { kind: TokenKind::Macro, text: "%~x" }));
        assert!(tokens.contains(&MacroToken { kind: TokenKind::Macro, text: "%m" }));
        assert!(tokens.contains(&MacroToken { kind: TokenKind::Separator, text: ";" }));
        assert!(tokens.contains(&MacroToken { kind: TokenKind::Text, text: "echo" }));
    }

    #[test]
    fn tokenize_next_dir_macro_is_one_token() {
        let tokens = tokenize("cp %M %D2", &HashSet::new());
        assert_eq!(tokens.last().map(|t| (t.kind, t.text)), Some((TokenKind::Macro, "%D2")));
    }
}
