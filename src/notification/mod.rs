//! Rendering of push events into Telegram HTML messages.


use std::fmt::Write;

use teloxide::utils::html;

use crate::github::{Commit, PushEvent};

/// Maximum number of commits listed in one notification.
const MAX_LISTED_COMMITS: usize = 5;
/// Length of the commit id shown next to each commit.
const SHORT_ID_LEN: usize = 7;
/// Length of the commit ids used in compare links.
const COMPARE_ID_LEN: usize = 12;
/// Maximum length of a commit summary line, ellipsis included.
const MAX_SUMMARY_LEN: usize = 100;
const ELLIPSIS: &str = "...";

/// Formats a push event as a notification message.
///
/// The output never depends on anything but `event`, so equal events always
/// render to identical text.
pub fn format_push_event(event: &PushEvent) -> String {
    let mut msg = String::new();
    let commit_count = event.commits.len();

    // `write!` into a String cannot fail.
    let _ = writeln!(msg, "🔔 <b>New push to {}</b>", html::escape(&event.repository.full_name));
    let _ = writeln!(msg, "Branch: <code>{}</code>", html::escape(event.branch()));
    let _ = writeln!(msg, "Pushed by: {}", html::escape(&event.pusher.name));
    msg.push('\n');

    if commit_count == 0 {
        msg.push_str("No commits in this push.\n");
    } else {
        let _ = writeln!(msg, "📝 <b>{commit_count} commit{}:</b>", plural_suffix(commit_count));
        msg.push('\n');

        for commit in event.commits.iter().take(MAX_LISTED_COMMITS) {
            write_commit(&mut msg, commit, &event.pusher.name);
        }

        if commit_count > MAX_LISTED_COMMITS {
            let hidden = commit_count - MAX_LISTED_COMMITS;
            let _ = writeln!(msg, "\n...and {hidden} more commit{}", plural_suffix(hidden));
        }
    }

    msg.push('\n');
    msg.push_str(&link(&event.repository.html_url, "View repository"));

    match event.commits.as_slice() {
        [] => {}
        [only] => {
            msg.push_str(" | ");
            msg.push_str(&link(&only.url, "View commit"));
        }
        [first, .., last] => {
            let compare_url = format!(
                "{}/compare/{}...{}",
                event.repository.html_url,
                prefix(&first.id, COMPARE_ID_LEN),
                prefix(&last.id, COMPARE_ID_LEN),
            );
            msg.push_str(" | ");
            msg.push_str(&link(&compare_url, "View changes"));
        }
    }

    msg
}

fn write_commit(msg: &mut String, commit: &Commit, pusher: &str) {
    let _ = writeln!(
        msg,
        "<code>{}</code> {}",
        html::escape(prefix(&commit.id, SHORT_ID_LEN)),
        html::escape(&summary_line(&commit.message)),
    );

    if let Some(author) = commit.author_name().filter(|author| *author != pusher) {
        let _ = writeln!(msg, "   by {}", html::escape(author));
    }
}

/// First line of a commit message, shortened to [`MAX_SUMMARY_LEN`] characters.
fn summary_line(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or_default();
    if first_line.chars().count() <= MAX_SUMMARY_LEN {
        return first_line.to_string();
    }

    let keep = MAX_SUMMARY_LEN - ELLIPSIS.len();
    let mut truncated: String = first_line.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// The first `len` characters of `s`, or all of it if shorter.
fn prefix(s: &str, len: usize) -> &str {
    match s.char_indices().nth(len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn plural_suffix(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

fn link(url: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", html::escape(url), text)
}
