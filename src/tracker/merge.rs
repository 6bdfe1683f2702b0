use chrono::NaiveDate;

use super::session::Session;

/// A summary bucket: the UTC calendar day of the start plus the project tag.
type GroupKey = (NaiveDate, String);

/// Collapses same-day sessions of the same project into one summary session
/// each. Sessions missing a start, an end, or a project tag never merge and
/// pass through unchanged, so in-progress and untagged work is left alone.
/// Merged summaries come first, pass-through sessions after, both in the
/// order they were first encountered.
pub fn merge_sessions(sessions: Vec<Session>) -> Vec<Session> {
    let mut groups: Vec<(GroupKey, Vec<Session>)> = Vec::new();
    let mut passthrough: Vec<Session> = Vec::new();

    for session in sessions {
        match group_key(&session) {
            Some(key) => match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(session),
                None => groups.push((key, vec![session])),
            },
            None => passthrough.push(session),
        }
    }

    let mut merged: Vec<Session> = groups
        .into_iter()
        .map(|((_, tag), members)| collapse_group(tag, members))
        .collect();
    merged.extend(passthrough);
    merged
}

fn group_key(session: &Session) -> Option<GroupKey> {
    let start = session.start_time?;
    session.end_time?;
    let tag = session.project_tag.as_ref()?;
    Some((start.date_naive(), tag.clone()))
}

/// Reduces one group to a single session: earliest start, latest end, summed
/// hours, descriptions joined with ". ". The duration is assigned explicitly
/// rather than derived from the merged span, so a gap between two sessions is
/// neither double-counted nor deducted.
fn collapse_group(tag: String, members: Vec<Session>) -> Session {
    let description = members
        .iter()
        .map(|s| s.description.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(". ");

    Session {
        description: Some(description),
        project_tag: Some(tag),
        start_time: members.iter().filter_map(|s| s.start_time).min(),
        end_time: members.iter().filter_map(|s| s.end_time).max(),
        duration: Some(members.iter().filter_map(Session::closed_hours).sum()),
    }
}
