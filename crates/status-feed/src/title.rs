//! Incident title grammar.
//!
//! Status titles name the affected locations in a leading bracketed group,
//! e.g. `[FRA/SBG5] Network degradation`, or point at a single rack, e.g.
//! `Incident on Rack A12 in SBG5`. Region codes are exactly three characters;
//! anything longer is a datacenter code starting with its region code.

use crate::error::TitleError;

/// Length of a region code.
const REGION_CODE_LENGTH: usize = 3;

/// Word that marks a rack reference.
const RACK_INDICATOR: &str = "rack";

/// A location named in a title's bracketed group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationToken {
    /// A three character region code.
    Region(String),
    /// A datacenter code.
    Datacenter(String),
}

impl LocationToken {
    /// Classify a raw token by length.
    pub fn from_token(token: &str) -> Self {
        if is_region_token(token) {
            LocationToken::Region(token.to_string())
        } else {
            LocationToken::Datacenter(token.to_string())
        }
    }

    /// The code carried by this token.
    pub fn code(&self) -> &str {
        match self {
            LocationToken::Region(code) | LocationToken::Datacenter(code) => code,
        }
    }
}

/// What an incident title points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleScope {
    /// A single rack, by label.
    Rack(String),
    /// One or more regions and datacenters, in title order.
    Locations(Vec<LocationToken>),
}

/// Check whether a token is a region code.
pub fn is_region_token(token: &str) -> bool {
    token.chars().count() == REGION_CODE_LENGTH
}

/// Check whether a title (or word) mentions a rack, ignoring case.
pub fn is_rack_reference(title: &str) -> bool {
    title.to_lowercase().contains(RACK_INDICATOR)
}

/// Extract the label following the first rack word.
///
/// `"Incident on Rack A12 in SBG5"` yields `"A12"`.
pub fn extract_rack_label(title: &str) -> Result<String, TitleError> {
    let words: Vec<&str> = title.split_whitespace().collect();

    words
        .iter()
        .position(|word| is_rack_reference(word))
        .and_then(|index| words.get(index + 1))
        .map(|label| label.to_string())
        .ok_or_else(|| TitleError::RackLabelNotFound(title.to_string()))
}

/// Extract the location tokens of the first bracketed group.
///
/// `"Scheduled maintenance [FRA/SBG5]"` yields `["FRA", "SBG5"]`. Later
/// bracketed groups are ignored.
pub fn extract_location_tokens(title: &str) -> Result<Vec<String>, TitleError> {
    let missing = || TitleError::NoLocationSegment(title.to_string());

    let close = title.find(']').ok_or_else(missing)?;
    let head = &title[..close];
    let open = head.rfind('[').ok_or_else(missing)?;

    let tokens: Vec<String> = head[open + 1..]
        .trim()
        .split('/')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();

    if tokens.is_empty() {
        return Err(missing());
    }

    Ok(tokens)
}

/// Region code of a datacenter code (its first three characters).
pub fn region_from_datacenter_code(code: &str) -> &str {
    match code.char_indices().nth(REGION_CODE_LENGTH) {
        Some((end, _)) => &code[..end],
        None => code,
    }
}

/// Decide what a title points at.
///
/// A bracketed location group wins; racks named alongside it are picked up
/// later by datacenter escalation. Only titles without a group are read as
/// rack references.
pub fn classify(title: &str) -> Result<TitleScope, TitleError> {
    match extract_location_tokens(title) {
        Ok(tokens) => Ok(TitleScope::Locations(
            tokens.iter().map(|t| LocationToken::from_token(t)).collect(),
        )),
        Err(_) if is_rack_reference(title) => extract_rack_label(title).map(TitleScope::Rack),
        Err(e) => Err(e),
    }
}
