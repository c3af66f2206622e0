use crate::domain::ports::RankedNode;
use regex::Regex;
use std::sync::OnceLock;

/// `<node>: <score>`, tolerating a leading list marker (`1.`, `2)`, `-`, `*`).
/// The score is whatever follows the last colon, so identities may contain colons.
fn ranked_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?:(?:\d+[.)]|[-*])\s+)?(?P<node>.*\S)\s*:\s*(?P<score>[-+]?(?:\d+(?:\.\d*)?|\.\d+))\s*$",
        )
        .expect("ranked line regex")
    })
}

/// Parse an oracle response. Lines that do not fit the format are skipped.
pub fn parse_ranked_response(response: &str) -> Vec<RankedNode> {
    response
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<RankedNode> {
    let caps = ranked_line_regex().captures(line)?;
    let node = caps.name("node")?.as_str().trim();
    let score: f64 = caps.name("score")?.as_str().parse().ok()?;
    if node.is_empty() {
        return None;
    }
    Some(RankedNode {
        identity: node.to_string(),
        score,
    })
}
