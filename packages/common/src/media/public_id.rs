//! Recovering a remote asset's public id from the URL it is served from.
//!
//! Delivery URLs look like
//! `https://res.cloudinary.com/<cloud>/image/upload/v1712345678/gym_gallery/abc.jpg`.
//! The public id is the path after `upload/` with the optional version
//! segment and the file extension removed: `gym_gallery/abc`. Raw assets
//! keep their extension as part of the id (`live_update_files/plan.pdf`).

use super::traits::ResourceType;

const UPLOAD_MARKER: &str = "upload/";

/// Extract the public id from a stored media reference.
///
/// Returns `None` when the reference carries no `upload/` marker or nothing
/// remains after stripping. Stored values have been seen with the delivery
/// prefix applied twice, so the text after the *last* marker is used.
pub fn public_id_from_url(reference: &str) -> Option<String> {
    parse(reference, false)
}

/// Extract the public id the store knows an asset of `resource_type` by.
pub fn public_id_for(reference: &str, resource_type: ResourceType) -> Option<String> {
    parse(reference, resource_type == ResourceType::Raw)
}

fn parse(reference: &str, keep_extension: bool) -> Option<String> {
    let reference = reference.trim();
    let (_, after) = reference.rsplit_once(UPLOAD_MARKER)?;

    let after = after
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_matches('/');

    let mut segments: Vec<&str> = after.split('/').filter(|s| !s.is_empty()).collect();
    if segments.first().is_some_and(|s| is_version_segment(s)) {
        segments.remove(0);
    }

    let last = segments.pop()?;
    let stem = match last.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() && !keep_extension => stem,
        _ => last,
    };
    segments.push(stem);

    let public_id = segments.join("/");
    if public_id.is_empty() {
        None
    } else {
        Some(public_id)
    }
}

/// `v` followed by one or more ASCII digits, e.g. `v1712345678`.
fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
