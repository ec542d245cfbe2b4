use std::sync::LazyLock;

use regex::Regex;

use crate::config::Boilerplate;

static TRAILING_WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+\n").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static HSPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());
static GLUED_QUE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bQue(el|se)\b").unwrap());

/// Page text after boilerplate removal and whitespace repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPage {
    pub page_number: usize,
    pub cleaned_text: String,
}

/// Drop boilerplate lines, then repair wrapping and spacing. Applying it to
/// its own output changes nothing.
pub fn normalize_page(raw: &str, boilerplate: &Boilerplate) -> String {
    let mut text = TRAILING_WS_RE.replace_all(raw, "\n").into_owned();

    // Rejoining a wrapped word can produce a stamp line ("Ver-\nsión: 02"),
    // and dropping a stamp can bring the halves of a wrapped word together.
    // Every round that changes anything makes the text shorter.
    loop {
        let next = dehyphenate(&drop_boilerplate(&text, boilerplate));
        if next == text {
            break;
        }
        text = next;
    }

    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    let text = HSPACE_RE.replace_all(&text, " ");
    let text = GLUED_QUE_RE.replace_all(text.trim(), "Que $1");
    text.into_owned()
}

fn drop_boilerplate(text: &str, boilerplate: &Boilerplate) -> String {
    text.lines()
        .filter(|line| !boilerplate.is_boilerplate(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rejoin `pala-\nbra` into `palabra`. Consecutive wraps (`a-\nb-\nc`) are
/// handled in a single pass.
fn dehyphenate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("-\n") {
        let (head, tail) = rest.split_at(pos);
        let after = &tail[2..];
        let next_word = after.trim_start_matches(|c: char| c != '\n' && c.is_whitespace());

        let prev_ok = head
            .chars()
            .next_back()
            .or_else(|| out.chars().next_back())
            .is_some_and(char::is_alphanumeric);
        let next_ok = next_word.chars().next().is_some_and(char::is_alphanumeric);

        out.push_str(head);
        if prev_ok && next_ok {
            rest = next_word;
        } else {
            out.push_str("-\n");
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

// ── Tests ──
