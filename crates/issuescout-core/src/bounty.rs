// Bounty issue verification
//
// The search queries already encode bounty intent via GitHub qualifiers;
// this module is the secondary check that what came back actually looks
// like money is on the table.
use crate::models::{Issue, Label};

/// Label fragments that mark an issue as carrying a reward
const LABEL_KEYWORDS: &[&str] = &[
    "bounty",
    "bountysource",
    "funded",
    "cash-prize",
    "sponsor",
    "paid",
    "bounty-ready",
    "bounty-available",
    "reward",
    "prize",
    "issuehunt",
];

/// Monetary keywords checked against title and body text
const TEXT_KEYWORDS: &[&str] = &[
    "bounty",
    "bounties",
    "bountysource",
    "issuehunt",
    "cash prize",
    "cash reward",
    "monetary reward",
    "sponsor",
    "sponsorship",
    "sponsored",
    "paid",
    "payment",
    "reward",
    "prize",
    "prize money",
    "funded",
    "funding",
    "compensation",
    "compensated",
];

/// The fixed search queries the bounty feed cycles through. Most common
/// labels first, so partial batches still surface the good stuff.
pub fn bounty_queries() -> Vec<String> {
    [
        "state:open no:assignee label:bounty",
        "state:open no:assignee label:bountysource",
        "state:open no:assignee bounty in:title",
        "state:open no:assignee label:funded",
        "state:open no:assignee label:sponsor",
        "state:open no:assignee reward in:title",
    ]
    .iter()
    .map(|q| q.to_string())
    .collect()
}

pub fn has_bounty_label(labels: &[Label]) -> bool {
    labels.iter().any(|label| {
        let name = label.name.to_lowercase();
        LABEL_KEYWORDS.iter().any(|kw| name.contains(kw))
    })
}

/// Does this issue actually advertise a bounty? Label first, then title,
/// then body (when present). Substring, case-insensitive.
pub fn is_bounty_issue(issue: &Issue) -> bool {
    if has_bounty_label(&issue.labels) {
        return true;
    }

    let title = issue.title.to_lowercase();
    if TEXT_KEYWORDS.iter().any(|kw| title.contains(kw)) {
        return true;
    }

    if let Some(body) = &issue.body {
        let body = body.to_lowercase();
        if TEXT_KEYWORDS.iter().any(|kw| body.contains(kw)) {
            return true;
        }
    }

    false
}
