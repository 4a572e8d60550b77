use crate::changelog::Change;

/// Check whether `changes` add up to any new failure on the document or any
/// of its subdocuments.
///
/// At one level the last failure change wins: a later empty `setFailures`
/// clears an earlier `addFailure`. Failures inside added, inserted, or
/// updated subdocuments always count.
#[must_use]
pub fn has_failures(changes: &[Change]) -> bool {
    has_direct_failures(changes) || has_subdocument_failures(changes)
}

/// Collect every failure message the changes carry, in change order,
/// descending into subdocuments.
#[must_use]
pub fn failure_messages(changes: &[Change]) -> Vec<String> {
    let mut out = Vec::new();
    collect_messages(changes, &mut out);

    out
}

fn has_direct_failures(changes: &[Change]) -> bool {
    let mut found = false;
    for change in changes {
        match change {
            Change::AddFailure(_) => found = true,
            Change::SetFailures(failures) => found = !failures.is_empty(),
            _ => {}
        }
    }

    found
}

fn has_subdocument_failures(changes: &[Change]) -> bool {
    changes.iter().any(|change| match change {
        Change::AddSubdocument(subdocument)
        | Change::InsertSubdocument { subdocument, .. } => subdocument.has_failures(),
        Change::UpdateSubdocument { changes, .. } => has_failures(changes),
        _ => false,
    })
}

fn collect_messages(changes: &[Change], out: &mut Vec<String>) {
    for change in changes {
        match change {
            Change::AddFailure(failure) => out.push(failure.message().to_string()),
            Change::SetFailures(failures) => {
                out.extend(failures.iter().map(|f| f.message().to_string()));
            }
            Change::AddSubdocument(subdocument)
            | Change::InsertSubdocument { subdocument, .. } => {
                subdocument.collect_failure_messages(out);
            }
            Change::UpdateSubdocument { changes, .. } => collect_messages(changes, out),
            _ => {}
        }
    }
}
