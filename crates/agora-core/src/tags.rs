use std::collections::BTreeSet;

use agora_store::Workspace;
use agora_types::ContainerRef;

use crate::membership::MembershipOracle;

/// Finds the `@handle` mentions in `text` that name a current member of
/// `target`.
///
/// Text is cut on every character outside `[a-z0-9@]`; pieces containing
/// `@` are cut again on `@`, and each non-empty fragment is a candidate.
/// Matching is case-sensitive. Duplicates collapse.
pub fn resolve_tags(ws: &Workspace, text: &str, target: ContainerRef) -> BTreeSet<String> {
    text.split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '@'))
        .filter(|word| word.contains('@'))
        .flat_map(|word| word.split('@'))
        .filter(|candidate| !candidate.is_empty())
        .filter(|candidate| {
            ws.user_by_handle(candidate)
                .is_some_and(|u| ws.is_member(u.id, target))
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::Container;

    fn workspace() -> (Workspace, ContainerRef) {
        let mut ws = Workspace::default();
        let alice = ws.create_user("a@x.io", "h", "Alice", "", 0);
        let bob = ws.create_user("b@x.io", "h", "Bob", "", 0);
        ws.create_user("c@x.io", "h", "Carol", "", 0);
        let ch = ws.create_channel(alice, "general", true);
        ws.channel_mut(ch).unwrap().add_member(bob);
        (ws, ContainerRef::Channel(ch))
    }

    fn tags(ws: &Workspace, text: &str, target: ContainerRef) -> Vec<String> {
        resolve_tags(ws, text, target).into_iter().collect()
    }

    #[test]
    fn duplicate_mentions_collapse() {
        let (ws, ch) = workspace();
        assert_eq!(tags(&ws, "@alice @alice hi", ch), vec!["alice"]);
    }

    #[test]
    fn non_members_and_unknown_handles_are_ignored() {
        let (ws, ch) = workspace();
        assert_eq!(tags(&ws, "@carol @nobody @bob", ch), vec!["bob"]);
    }

    #[test]
    fn punctuation_terminates_a_handle() {
        let (ws, ch) = workspace();
        assert_eq!(tags(&ws, "hey @bob, and @alice!", ch), vec!["alice", "bob"]);
        assert_eq!(tags(&ws, "@alice@bob", ch), vec!["alice", "bob"]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let (ws, ch) = workspace();
        assert!(tags(&ws, "@Alice @BOB", ch).is_empty());
    }

    #[test]
    fn text_without_at_sign_has_no_tags() {
        let (ws, ch) = workspace();
        assert!(tags(&ws, "alice bob", ch).is_empty());
    }
}
