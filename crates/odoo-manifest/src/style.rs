use crate::{ManifestError, Result};

/// Quote character and indentation width a manifest is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestStyle {
    pub quote: char,
    pub indent: usize,
}

impl ManifestStyle {
    pub fn sniff(source: &str) -> Result<Self> {
        Ok(Self {
            quote: sniff_quote_char(source),
            indent: sniff_indent_width(source)?,
        })
    }
}

/// The quote character used most often; ties go to `"`.
pub fn sniff_quote_char(source: &str) -> char {
    let single = source.matches('\'').count();
    let double = source.matches('"').count();
    if single > double { '\'' } else { '"' }
}

/// Indentation width voted for by the most indented lines.
///
/// Every non-blank line indented with spaces votes for each of 4, 2 and 3
/// that divides its indentation. Ties go to the width that received a vote
/// first.
pub fn sniff_indent_width(source: &str) -> Result<usize> {
    const CANDIDATES: [usize; 3] = [4, 2, 3];

    // (width, votes) in the order widths were first voted for
    let mut votes: Vec<(usize, usize)> = Vec::with_capacity(CANDIDATES.len());
    for line in source.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let leading = line.len() - line.trim_start_matches(' ').len();
        if leading == 0 {
            continue;
        }
        for width in CANDIDATES {
            if leading % width != 0 {
                continue;
            }
            match votes.iter_mut().find(|(w, _)| *w == width) {
                Some((_, count)) => *count += 1,
                None => votes.push((width, 1)),
            }
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for (width, count) in votes {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((width, count));
        }
    }
    best.map(|(width, _)| width)
        .ok_or(ManifestError::UnknownIndentation)
}
