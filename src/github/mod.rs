//! GitHub webhook payload types.
//!
//! Only the fields the bot reads are modelled; serde ignores the rest of the
//! payload. Missing strings deserialize as empty so that validation happens
//! in one place (the notifier) instead of as opaque parse errors.


use serde::Deserialize;

/// Prefix GitHub puts in front of branch names in `ref`.
const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// A `push` event delivered to the webhook endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushEvent {
    /// Full git ref that was pushed, e.g. `refs/heads/main`.
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    /// The repository that received the push.
    pub repository: Repository,
    /// Who pushed.
    #[serde(default)]
    pub pusher: Pusher,
    /// Commits in the order GitHub lists them (oldest first).
    #[serde(default)]
    pub commits: Vec<Commit>,
}

impl PushEvent {
    /// Returns the branch name, or the raw ref when it is not a branch ref.
    pub fn branch(&self) -> &str {
        self.git_ref.strip_prefix(BRANCH_REF_PREFIX).unwrap_or(&self.git_ref)
    }
}

/// The repository a push event belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Repository {
    /// `owner/name`, the key subscriptions are stored under.
    #[serde(default)]
    pub full_name: String,
    /// Web URL of the repository.
    #[serde(default)]
    pub html_url: String,
}

/// The user who pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Pusher {
    /// GitHub login of the pusher.
    #[serde(default)]
    pub name: String,
}

/// A commit included in a push.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Commit {
    /// Full commit SHA.
    pub id: String,
    /// Full commit message; the first line is its summary.
    #[serde(default)]
    pub message: String,
    /// Web URL of the commit.
    #[serde(default)]
    pub url: String,
    /// Git author, which may differ from the pusher.
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

impl Commit {
    /// Author name, if GitHub sent a non-empty one.
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.name.as_str()).filter(|name| !name.is_empty())
    }
}

/// Author of a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommitAuthor {
    /// Author name as recorded in git.
    #[serde(default)]
    pub name: String,
}
