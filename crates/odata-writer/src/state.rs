// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Writer states and the payload grammar over them.

use std::fmt;

use crate::error::WriterError;

/// Position of the writer in the payload grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriterState {
    /// Nothing has been written yet.
    Start,
    /// Inside an entry (possibly a null entry).
    Entry,
    /// Inside a feed.
    Feed,
    /// Inside a navigation link whose content has not started.
    NavigationLink,
    /// Inside a navigation link after its first content item started.
    NavigationLinkWithContent,
    /// The top-level item has ended.
    Completed,
    /// A failure occurred; only in-stream error reporting remains possible.
    Error,
}

impl WriterState {
    /// Stable state name used in messages and traces.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Entry => "Entry",
            Self::Feed => "Feed",
            Self::NavigationLink => "NavigationLink",
            Self::NavigationLinkWithContent => "NavigationLinkWithContent",
            Self::Completed => "Completed",
            Self::Error => "Error",
        }
    }

    /// Whether the writer has been disabled by a failure.
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Whether the state is one of the two navigation link states.
    pub const fn is_navigation_link(self) -> bool {
        matches!(self, Self::NavigationLink | Self::NavigationLinkWithContent)
    }
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a writer instance was created to produce at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriterKind {
    /// A single top-level feed.
    Feed,
    /// A single top-level entry.
    Entry,
}

/// Kind of item written into a navigation link's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// An expanded feed.
    Feed,
    /// An expanded entry (possibly null).
    Entry,
    /// An entity reference link binding an existing resource.
    EntityReferenceLink,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feed => f.write_str("a feed"),
            Self::Entry => f.write_str("an entry"),
            Self::EntityReferenceLink => f.write_str("an entity reference link"),
        }
    }
}

/// Facts about the writer that the grammar depends on besides the two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionContext {
    /// What the writer writes at the top level.
    pub writer_kind: WriterKind,
    /// Whether the current scope is an entry whose item is null.
    pub current_entry_is_null: bool,
}

/// Decide whether the writer may move from `from` to `to`.
///
/// Entering `Error` is legal from every state, including `Error` itself.
pub fn validate_transition(
    from: WriterState,
    to: WriterState,
    context: TransitionContext,
) -> Result<(), WriterError> {
    use WriterState as S;

    if to == S::Error {
        return Ok(());
    }
    let invalid = || WriterError::InvalidTransition { from, to };
    match from {
        S::Start => match to {
            S::Feed if context.writer_kind == WriterKind::Entry => {
                Err(WriterError::TopLevelFeedWithEntryWriter)
            }
            S::Entry if context.writer_kind == WriterKind::Feed => {
                Err(WriterError::TopLevelEntryWithFeedWriter)
            }
            S::Feed | S::Entry => Ok(()),
            _ => Err(invalid()),
        },
        S::Entry => {
            if context.current_entry_is_null {
                return Err(WriterError::InvalidTransitionFromNullEntry { to });
            }
            match to {
                S::NavigationLink => Ok(()),
                _ => Err(invalid()),
            }
        }
        S::Feed => match to {
            S::Entry => Ok(()),
            _ => Err(invalid()),
        },
        S::NavigationLink => match to {
            S::NavigationLinkWithContent => Ok(()),
            _ => Err(invalid()),
        },
        S::NavigationLinkWithContent => match to {
            S::Feed | S::Entry => Ok(()),
            _ => Err(invalid()),
        },
        S::Completed => Err(invalid()),
        S::Error => Err(WriterError::WriterInErrorState {
            attempted: to.name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [WriterState; 7] = [
        WriterState::Start,
        WriterState::Entry,
        WriterState::Feed,
        WriterState::NavigationLink,
        WriterState::NavigationLinkWithContent,
        WriterState::Completed,
        WriterState::Error,
    ];

    fn ctx(writer_kind: WriterKind) -> TransitionContext {
        TransitionContext {
            writer_kind,
            current_entry_is_null: false,
        }
    }

    fn legal(from: WriterState, to: WriterState, kind: WriterKind) -> bool {
        validate_transition(from, to, ctx(kind)).is_ok()
    }

    #[test]
    fn error_is_reachable_from_everywhere() {
        for from in ALL {
            assert!(legal(from, WriterState::Error, WriterKind::Feed), "{from}");
        }
    }

    #[test]
    fn grammar_table_matches_payload_shape() {
        use WriterState as S;
        let allowed = [
            (S::Start, S::Feed),
            (S::Feed, S::Entry),
            (S::Entry, S::NavigationLink),
            (S::NavigationLink, S::NavigationLinkWithContent),
            (S::NavigationLinkWithContent, S::Feed),
            (S::NavigationLinkWithContent, S::Entry),
        ];
        for from in ALL {
            for to in ALL {
                if to == S::Error || from == S::Error {
                    continue;
                }
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    legal(from, to, WriterKind::Feed),
                    expected,
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn top_level_kind_is_enforced() {
        assert_eq!(
            validate_transition(WriterState::Start, WriterState::Feed, ctx(WriterKind::Entry)),
            Err(WriterError::TopLevelFeedWithEntryWriter)
        );
        assert_eq!(
            validate_transition(WriterState::Start, WriterState::Entry, ctx(WriterKind::Feed)),
            Err(WriterError::TopLevelEntryWithFeedWriter)
        );
        assert!(legal(WriterState::Start, WriterState::Entry, WriterKind::Entry));
    }

    #[test]
    fn null_entry_admits_nothing_but_error() {
        let null = TransitionContext {
            writer_kind: WriterKind::Entry,
            current_entry_is_null: true,
        };
        assert_eq!(
            validate_transition(WriterState::Entry, WriterState::NavigationLink, null),
            Err(WriterError::InvalidTransitionFromNullEntry {
                to: WriterState::NavigationLink
            })
        );
        assert!(validate_transition(WriterState::Entry, WriterState::Error, null).is_ok());
    }

    #[test]
    fn error_only_leads_to_error() {
        assert_eq!(
            validate_transition(WriterState::Error, WriterState::Feed, ctx(WriterKind::Feed)),
            Err(WriterError::WriterInErrorState { attempted: "Feed" })
        );
    }

    #[test]
    fn completed_is_terminal() {
        for to in ALL {
            if to != WriterState::Error {
                assert!(!legal(WriterState::Completed, to, WriterKind::Feed));
            }
        }
    }
}
