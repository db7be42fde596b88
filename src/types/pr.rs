use serde::{Deserialize, Serialize};

/// One open pull request as listed by a PR source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// `owner/name`, or empty when `gh` did not report a repository.
    pub repository_name: String,
    pub number: u64,
    pub title: String,
    pub url: String,
}

impl PullRequestRef {
    /// Menu label: `owner/repo#N title`, degrading to `#N` when nothing else is known.
    pub fn label(&self) -> String {
        let title = self.title.trim();
        match (self.repository_name.is_empty(), title.is_empty()) {
            (false, _) => format!("{}#{} {title}", self.repository_name, self.number)
                .trim_end()
                .to_owned(),
            (true, false) => title.to_owned(),
            (true, true) => format!("#{}", self.number),
        }
    }
}
