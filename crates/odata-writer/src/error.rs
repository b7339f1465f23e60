// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Writer error taxonomy.

use odata_payload::ODataVersion;
use thiserror::Error;

use crate::state::{ContentKind, WriterState};

/// Broad classification of a [`WriterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The caller drove the writer through an illegal sequence.
    Protocol,
    /// A payload item or its metadata is invalid.
    Validation,
    /// A format hook failed to emit or flush output.
    Output,
    /// The writer reached a state it declares unreachable. Always a writer bug.
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Protocol => write!(f, "protocol"),
            Self::Validation => write!(f, "validation"),
            Self::Output => write!(f, "output"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Every failure the writer can report.
///
/// [`code`](WriterError::code) is stable and meant for machines;
/// the `Display` text is meant for people.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriterError {
    // ─── Protocol ────────────────────────────────────────────────────────────
    /// The payload grammar does not allow `to` after `from`.
    #[error("cannot transition from state '{from}' to state '{to}'")]
    InvalidTransition {
        /// Current state.
        from: WriterState,
        /// Requested state.
        to: WriterState,
    },
    /// A writer created for a single entry was asked for a top-level feed.
    #[error("cannot write a top-level feed with a writer created to write a single entry")]
    TopLevelFeedWithEntryWriter,
    /// A writer created for a feed was asked for a top-level entry.
    #[error("cannot write a top-level entry with a writer created to write a feed")]
    TopLevelEntryWithFeedWriter,
    /// A null entry has no content, so nothing may be nested inside it.
    #[error("cannot transition from state 'Entry' to state '{to}' when the current entry is null")]
    InvalidTransitionFromNullEntry {
        /// Requested state.
        to: WriterState,
    },
    /// A synchronous method was called on a writer created for asynchronous use.
    #[error("a synchronous operation was called on an asynchronous writer")]
    SyncCallOnAsyncWriter,
    /// An asynchronous method was called on a writer created for synchronous use.
    #[error("an asynchronous operation was called on a synchronous writer")]
    AsyncCallOnSyncWriter,
    /// `write_end` was called with no open feed, entry or link.
    #[error("write_end was called in state '{state}', which has no open scope to end")]
    WriteEndInInvalidState {
        /// Current state.
        state: WriterState,
    },
    /// An earlier failure disabled the writer.
    #[error("cannot perform '{attempted}': the writer is in state 'Error' after an earlier failure")]
    WriterInErrorState {
        /// The operation or state that was attempted.
        attempted: &'static str,
    },
    /// A navigation link was closed without content while writing a response.
    #[error("navigation link '{link}' has no content; deferred links may only be written in requests")]
    DeferredLinkInResponse {
        /// Link name.
        link: String,
    },
    /// Entity reference links bind resources and belong to requests only.
    #[error("an entity reference link cannot be written in a response")]
    EntityReferenceLinkInResponse,
    /// Entity reference links must be written inside a navigation link.
    #[error("an entity reference link can only be written inside a navigation link")]
    EntityReferenceLinkWithoutNavigationLink,
    /// A second item was written into the content of a link that takes one.
    #[error("multiple items were written into the content of navigation link '{link}'; only collection-valued links in requests accept more than one")]
    MultipleItemsInNavigationLinkContent {
        /// Link name.
        link: String,
    },
    /// An in-stream error would follow the end of the payload.
    #[error("cannot transition from state 'Completed' to state 'Error': the payload is already complete")]
    InStreamErrorAfterCompleted,
    /// Null entries may only be written as the content of a navigation link.
    #[error("a null entry can only be written directly inside a navigation link, not in state '{state}'")]
    NullEntryOutsideNavigationLink {
        /// Current state.
        state: WriterState,
    },

    // ─── Validation ──────────────────────────────────────────────────────────
    /// The type name is not an entity type of the model.
    #[error("type name '{type_name}' does not name an entity type of the model")]
    UnrecognizedTypeName {
        /// The type name as written.
        type_name: String,
    },
    /// A model is present but the entry carries no type name and none is expected.
    #[error("the entry has no type name and no expected type is known")]
    MissingTypeName,
    /// The entry's type is not assignable to the writer's expected type.
    #[error("entity type '{type_name}' is not compatible with the expected type '{expected}'")]
    IncompatibleType {
        /// Resolved type.
        type_name: String,
        /// Expected type.
        expected: String,
    },
    /// A media link entry type was written without a media resource.
    #[error("entity type '{type_name}' is a media link entry but the entry has no media resource")]
    EntryWithoutMediaResource {
        /// Resolved type.
        type_name: String,
    },
    /// A media resource was attached to an entry whose type has no stream.
    #[error("entity type '{type_name}' is not a media link entry but the entry has a media resource")]
    EntryWithMediaResourceAndNonMleType {
        /// Resolved type.
        type_name: String,
    },
    /// Navigation links must be named.
    #[error("a navigation link must specify a name")]
    NavigationLinkWithoutName,
    /// The link's `is_collection` disagrees with the content written into it.
    #[error("navigation link '{link}' has is_collection={is_collection} but its content is {content}")]
    LinkContentMismatch {
        /// Link name.
        link: String,
        /// The link's declared multiplicity.
        is_collection: bool,
        /// The content being written.
        content: ContentKind,
    },
    /// The link or its content disagrees with the navigation property's multiplicity.
    #[error("navigation link '{link}' does not match its navigation property, which is {metadata} in the model")]
    LinkMetadataMismatch {
        /// Link name.
        link: String,
        /// `collection-valued` or `single-valued`.
        metadata: &'static str,
    },
    /// The declaring entity type has no navigation property of that name.
    #[error("navigation property '{property}' is not defined on entity type '{type_name}'")]
    NavigationPropertyNotDefined {
        /// Link name.
        property: String,
        /// Declaring type.
        type_name: String,
    },
    /// An expanded entry's type is not assignable to the navigation target.
    #[error("entity type '{type_name}' of the expanded entry is not compatible with navigation target type '{expected}'")]
    EntryTypeNotCompatibleWithNavigationProperty {
        /// Resolved entry type.
        type_name: String,
        /// Navigation target type.
        expected: String,
    },
    /// The same property name appeared twice in one entry.
    #[error("property '{name}' appears more than once in the same entry")]
    DuplicatePropertyName {
        /// Property name.
        name: String,
    },
    /// More than one link was written for a single-valued navigation property.
    #[error("multiple links were written for single-valued navigation property '{name}'")]
    MultipleLinksForSingleton {
        /// Property name.
        name: String,
    },
    /// Entries of one top-level feed share no base type.
    #[error("entity types '{first}' and '{second}' in the same feed share no common base type")]
    IncompatibleFeedEntryTypes {
        /// Type established by earlier entries.
        first: String,
        /// Type of the offending entry.
        second: String,
    },
    /// Inline count was set on an expanded feed.
    #[error("only top-level feeds may carry an inline count")]
    InlineCountOnNonTopLevelFeed,
    /// Inline count was set on a request feed.
    #[error("an inline count cannot be written in a request")]
    InlineCountInRequest,
    /// A next-page link was set on a request feed.
    #[error("a next-page link cannot be written in a request")]
    NextPageLinkInRequest,
    /// A feature requires a newer protocol version.
    #[error("{feature} requires protocol version {required} or later; the writer uses {actual}")]
    VersionTooLow {
        /// The gated feature.
        feature: &'static str,
        /// Minimum version.
        required: ODataVersion,
        /// Negotiated version.
        actual: ODataVersion,
    },
    /// A property name is empty or contains reserved characters.
    #[error("invalid property name '{name}': names must be non-empty and must not contain ':', '.' or '@'")]
    InvalidPropertyName {
        /// Property name.
        name: String,
    },
    /// A property is not declared on a closed entity type.
    #[error("property '{name}' is not declared on closed entity type '{type_name}'")]
    UndeclaredProperty {
        /// Property name.
        name: String,
        /// Resolved type.
        type_name: String,
    },
    /// Entity reference links need a URL.
    #[error("an entity reference link must specify a URL")]
    EntityReferenceLinkWithoutUrl,
    /// Entries are nested deeper than the configured quota.
    #[error("the maximum nesting depth of {max} entries was exceeded")]
    MaxNestingDepthExceeded {
        /// Configured maximum.
        max: u32,
    },

    // ─── Output ──────────────────────────────────────────────────────────────
    /// A format hook reported a failure.
    #[error("output error: {0}")]
    Output(String),

    // ─── Internal ────────────────────────────────────────────────────────────
    /// Internal invariant violated (writer state corruption).
    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}

impl WriterError {
    /// Output failure with a message.
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output(message.into())
    }

    /// Stable upper-snake code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::TopLevelFeedWithEntryWriter => "TOP_LEVEL_FEED_WITH_ENTRY_WRITER",
            Self::TopLevelEntryWithFeedWriter => "TOP_LEVEL_ENTRY_WITH_FEED_WRITER",
            Self::InvalidTransitionFromNullEntry { .. } => "INVALID_TRANSITION_FROM_NULL_ENTRY",
            Self::SyncCallOnAsyncWriter => "SYNC_CALL_ON_ASYNC_WRITER",
            Self::AsyncCallOnSyncWriter => "ASYNC_CALL_ON_SYNC_WRITER",
            Self::WriteEndInInvalidState { .. } => "WRITE_END_IN_INVALID_STATE",
            Self::WriterInErrorState { .. } => "WRITER_IN_ERROR_STATE",
            Self::DeferredLinkInResponse { .. } => "DEFERRED_LINK_IN_RESPONSE",
            Self::EntityReferenceLinkInResponse => "ENTITY_REFERENCE_LINK_IN_RESPONSE",
            Self::EntityReferenceLinkWithoutNavigationLink => {
                "ENTITY_REFERENCE_LINK_WITHOUT_NAVIGATION_LINK"
            }
            Self::MultipleItemsInNavigationLinkContent { .. } => {
                "MULTIPLE_ITEMS_IN_NAVIGATION_LINK_CONTENT"
            }
            Self::InStreamErrorAfterCompleted => "IN_STREAM_ERROR_AFTER_COMPLETED",
            Self::NullEntryOutsideNavigationLink { .. } => "NULL_ENTRY_OUTSIDE_NAVIGATION_LINK",
            Self::UnrecognizedTypeName { .. } => "UNRECOGNIZED_TYPE_NAME",
            Self::MissingTypeName => "MISSING_TYPE_NAME",
            Self::IncompatibleType { .. } => "INCOMPATIBLE_TYPE",
            Self::EntryWithoutMediaResource { .. } => "ENTRY_WITHOUT_MEDIA_RESOURCE",
            Self::EntryWithMediaResourceAndNonMleType { .. } => {
                "ENTRY_WITH_MEDIA_RESOURCE_AND_NON_MLE_TYPE"
            }
            Self::NavigationLinkWithoutName => "NAVIGATION_LINK_WITHOUT_NAME",
            Self::LinkContentMismatch { .. } => "LINK_CONTENT_MISMATCH",
            Self::LinkMetadataMismatch { .. } => "LINK_METADATA_MISMATCH",
            Self::NavigationPropertyNotDefined { .. } => "NAVIGATION_PROPERTY_NOT_DEFINED",
            Self::EntryTypeNotCompatibleWithNavigationProperty { .. } => {
                "ENTRY_TYPE_NOT_COMPATIBLE_WITH_NAVIGATION_PROPERTY"
            }
            Self::DuplicatePropertyName { .. } => "DUPLICATE_PROPERTY_NAME",
            Self::MultipleLinksForSingleton { .. } => "MULTIPLE_LINKS_FOR_SINGLETON",
            Self::IncompatibleFeedEntryTypes { .. } => "INCOMPATIBLE_FEED_ENTRY_TYPES",
            Self::InlineCountOnNonTopLevelFeed => "INLINE_COUNT_ON_NON_TOP_LEVEL_FEED",
            Self::InlineCountInRequest => "INLINE_COUNT_IN_REQUEST",
            Self::NextPageLinkInRequest => "NEXT_PAGE_LINK_IN_REQUEST",
            Self::VersionTooLow { .. } => "VERSION_TOO_LOW",
            Self::InvalidPropertyName { .. } => "INVALID_PROPERTY_NAME",
            Self::UndeclaredProperty { .. } => "UNDECLARED_PROPERTY",
            Self::EntityReferenceLinkWithoutUrl => "ENTITY_REFERENCE_LINK_WITHOUT_URL",
            Self::MaxNestingDepthExceeded { .. } => "MAX_NESTING_DEPTH_EXCEEDED",
            Self::Output(_) => "OUTPUT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTransition { .. }
            | Self::TopLevelFeedWithEntryWriter
            | Self::TopLevelEntryWithFeedWriter
            | Self::InvalidTransitionFromNullEntry { .. }
            | Self::SyncCallOnAsyncWriter
            | Self::AsyncCallOnSyncWriter
            | Self::WriteEndInInvalidState { .. }
            | Self::WriterInErrorState { .. }
            | Self::DeferredLinkInResponse { .. }
            | Self::EntityReferenceLinkInResponse
            | Self::EntityReferenceLinkWithoutNavigationLink
            | Self::MultipleItemsInNavigationLinkContent { .. }
            | Self::InStreamErrorAfterCompleted
            | Self::NullEntryOutsideNavigationLink { .. } => ErrorCategory::Protocol,
            Self::Output(_) => ErrorCategory::Output,
            Self::Internal(_) => ErrorCategory::Internal,
            _ => ErrorCategory::Validation,
        }
    }
}

impl From<std::io::Error> for WriterError {
    fn from(err: std::io::Error) -> Self {
        Self::Output(err.to_string())
    }
}
