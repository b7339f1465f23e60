// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The writer orchestrator.
//!
//! [`ODataWriter`] owns the scope stack and the format hooks. Each public
//! operation checks the call discipline, runs one synchronous core step and,
//! when that step fails, pushes an `Error` scope so the writer stays disabled.

use std::sync::Arc;

use odata_edm::EntityTypeRef;
use odata_payload::{ODataEntityReferenceLink, ODataEntry, ODataFeed, ODataNavigationLink};
use tracing::{debug, instrument, warn};

use crate::depth::DepthGuard;
use crate::duplicate::DuplicatePropertyNamesChecker;
use crate::error::WriterError;
use crate::feed_validator::FeedTypeValidator;
use crate::hooks::FormatHooks;
use crate::scope::{
    EntryScope, FeedScope, NavigationLinkScope, ODataItem, Scope, ScopeKind, ScopeStack,
};
use crate::settings::WriterSettings;
use crate::state::{validate_transition, ContentKind, TransitionContext, WriterKind, WriterState};
use crate::validation::{
    resolve_entity_type, validate_entity_reference_link, validate_entry_in_expanded_link,
    validate_entry_media_resource, validate_expected_type, validate_feed_end, validate_feed_start,
    validate_navigation_link,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallMode {
    Synchronous,
    Asynchronous,
}

/// Sequences feeds, entries and navigation links into a valid payload.
///
/// A writer produces exactly one top-level item, a feed or an entry according
/// to its [`WriterKind`], and drives a [`FormatHooks`] implementation in
/// document order. It accepts either the synchronous or the `_async` method
/// set, as chosen by [`WriterSettings::synchronous`].
pub struct ODataWriter<H: FormatHooks> {
    hooks: H,
    settings: WriterSettings,
    kind: WriterKind,
    expected_type: Option<EntityTypeRef>,
    scopes: ScopeStack<H::FeedState, H::EntryState>,
    depth: DepthGuard,
    flushed_on_completion: bool,
}

impl<H: FormatHooks> ODataWriter<H> {
    /// Writer for one top-level item of the given kind.
    pub fn new(hooks: H, settings: WriterSettings, kind: WriterKind) -> Self {
        let depth = DepthGuard::new(settings.message_quotas.max_nesting_depth);
        Self {
            hooks,
            settings,
            kind,
            expected_type: None,
            scopes: ScopeStack::new(),
            depth,
            flushed_on_completion: false,
        }
    }

    /// Writer for a top-level feed.
    pub fn feed_writer(hooks: H, settings: WriterSettings) -> Self {
        Self::new(hooks, settings, WriterKind::Feed)
    }

    /// Writer for a top-level entry.
    pub fn entry_writer(hooks: H, settings: WriterSettings) -> Self {
        Self::new(hooks, settings, WriterKind::Entry)
    }

    /// Expect top-level entries of `type_name` (or a derived type).
    ///
    /// Ignored when the settings carry no model.
    pub fn with_expected_type(mut self, type_name: &str) -> Result<Self, WriterError> {
        if let Some(model) = &self.settings.model {
            let ty = model.find_entity_type(type_name).ok_or_else(|| {
                WriterError::UnrecognizedTypeName {
                    type_name: type_name.to_owned(),
                }
            })?;
            self.expected_type = Some(ty);
        }
        Ok(self)
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    /// Current state.
    pub fn state(&self) -> WriterState {
        self.scopes.current().state()
    }

    /// Item of the current scope, if any.
    pub fn current_item(&self) -> Option<ODataItem> {
        self.scopes.current().item()
    }

    /// Whether the current scope is the top-level item.
    pub fn is_top_level(&self) -> bool {
        self.scopes.is_top_level()
    }

    /// Number of scopes on the stack, including the bottom sentinel.
    pub fn depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Entries currently open.
    pub fn entry_depth(&self) -> u32 {
        self.depth.current()
    }

    /// Entries started so far in the innermost open feed.
    pub fn current_feed_entry_count(&self) -> Option<usize> {
        self.scopes.nearest_feed().map(|feed| feed.entry_count)
    }

    /// What the writer writes at the top level.
    pub fn kind(&self) -> WriterKind {
        self.kind
    }

    /// Settings the writer was created with.
    pub fn settings(&self) -> &WriterSettings {
        &self.settings
    }

    /// The format hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Consume the writer and return its format hooks.
    pub fn into_hooks(self) -> H {
        self.hooks
    }

    // ─── Synchronous API ─────────────────────────────────────────────────────

    /// Start a feed.
    pub fn write_start_feed(&mut self, feed: ODataFeed) -> Result<(), WriterError> {
        self.guarded(CallMode::Synchronous, "write_start_feed", |w| {
            w.start_feed_core(feed)
        })
    }

    /// Start an entry.
    pub fn write_start_entry(&mut self, entry: ODataEntry) -> Result<(), WriterError> {
        self.guarded(CallMode::Synchronous, "write_start_entry", |w| {
            w.start_entry_core(Some(entry))
        })
    }

    /// Start a null entry as the content of a single-valued navigation link.
    pub fn write_start_null_entry(&mut self) -> Result<(), WriterError> {
        self.guarded(CallMode::Synchronous, "write_start_null_entry", |w| {
            w.start_entry_core(None)
        })
    }

    /// Start a navigation link of the current entry.
    pub fn write_start_navigation_link(
        &mut self,
        link: ODataNavigationLink,
    ) -> Result<(), WriterError> {
        self.guarded(CallMode::Synchronous, "write_start_navigation_link", |w| {
            w.start_navigation_link_core(link)
        })
    }

    /// End the current feed, entry or navigation link. Flushes once the payload completes.
    pub fn write_end(&mut self) -> Result<(), WriterError> {
        self.guarded(CallMode::Synchronous, "write_end", Self::end_core)?;
        if self.state() == WriterState::Completed {
            self.flush()?;
            self.flushed_on_completion = true;
        }
        Ok(())
    }

    /// Bind an existing resource into the current navigation link (requests only).
    pub fn write_entity_reference_link(
        &mut self,
        link: ODataEntityReferenceLink,
    ) -> Result<(), WriterError> {
        self.guarded(CallMode::Synchronous, "write_entity_reference_link", |w| {
            w.entity_reference_link_core(link)
        })
    }

    /// Flush buffered output.
    ///
    /// A completed payload is flushed by its last `write_end`; later calls do nothing.
    pub fn flush(&mut self) -> Result<(), WriterError> {
        self.guarded(CallMode::Synchronous, "flush", |w| {
            if w.flushed_on_completion {
                return Ok(());
            }
            w.hooks.flush_synchronously()
        })
    }

    /// Report that the format layer is about to write an in-stream error.
    ///
    /// Moves the writer to `Error`. Legal in every state except `Completed`,
    /// including `Error` itself.
    pub fn on_in_stream_error(&mut self) -> Result<(), WriterError> {
        let result = self.in_stream_error_core();
        self.fault(result)
    }

    // ─── Asynchronous API ────────────────────────────────────────────────────

    /// Start a feed.
    #[instrument(level = "debug", skip_all)]
    pub async fn write_start_feed_async(&mut self, feed: ODataFeed) -> Result<(), WriterError> {
        self.guarded(CallMode::Asynchronous, "write_start_feed_async", |w| {
            w.start_feed_core(feed)
        })
    }

    /// Start an entry.
    #[instrument(level = "debug", skip_all)]
    pub async fn write_start_entry_async(&mut self, entry: ODataEntry) -> Result<(), WriterError> {
        self.guarded(CallMode::Asynchronous, "write_start_entry_async", |w| {
            w.start_entry_core(Some(entry))
        })
    }

    /// Start a null entry as the content of a single-valued navigation link.
    #[instrument(level = "debug", skip_all)]
    pub async fn write_start_null_entry_async(&mut self) -> Result<(), WriterError> {
        self.guarded(CallMode::Asynchronous, "write_start_null_entry_async", |w| {
            w.start_entry_core(None)
        })
    }

    /// Start a navigation link of the current entry.
    #[instrument(level = "debug", skip_all)]
    pub async fn write_start_navigation_link_async(
        &mut self,
        link: ODataNavigationLink,
    ) -> Result<(), WriterError> {
        self.guarded(
            CallMode::Asynchronous,
            "write_start_navigation_link_async",
            |w| w.start_navigation_link_core(link),
        )
    }

    /// End the current feed, entry or navigation link. Flushes once the payload completes.
    #[instrument(level = "debug", skip_all)]
    pub async fn write_end_async(&mut self) -> Result<(), WriterError> {
        self.guarded(CallMode::Asynchronous, "write_end_async", Self::end_core)?;
        if self.state() == WriterState::Completed {
            self.flush_async().await?;
            self.flushed_on_completion = true;
        }
        Ok(())
    }

    /// Bind an existing resource into the current navigation link (requests only).
    #[instrument(level = "debug", skip_all)]
    pub async fn write_entity_reference_link_async(
        &mut self,
        link: ODataEntityReferenceLink,
    ) -> Result<(), WriterError> {
        self.guarded(
            CallMode::Asynchronous,
            "write_entity_reference_link_async",
            |w| w.entity_reference_link_core(link),
        )
    }

    /// Flush buffered output without blocking.
    ///
    /// A completed payload is flushed by its last `write_end_async`; later calls do nothing.
    #[instrument(level = "debug", skip_all)]
    pub async fn flush_async(&mut self) -> Result<(), WriterError> {
        let result = match self.check_call(CallMode::Asynchronous, "flush_async") {
            Ok(()) if self.flushed_on_completion => Ok(()),
            Ok(()) => self.hooks.flush_asynchronously().await,
            Err(err) => Err(err),
        };
        self.fault(result)
    }

    // ─── Fault isolation ─────────────────────────────────────────────────────

    fn guarded<T>(
        &mut self,
        mode: CallMode,
        operation: &'static str,
        body: impl FnOnce(&mut Self) -> Result<T, WriterError>,
    ) -> Result<T, WriterError> {
        let result = self.check_call(mode, operation).and_then(|()| body(self));
        self.fault(result)
    }

    fn check_call(&self, mode: CallMode, operation: &'static str) -> Result<(), WriterError> {
        if self.state().is_error() {
            return Err(WriterError::WriterInErrorState {
                attempted: operation,
            });
        }
        match (mode, self.settings.synchronous) {
            (CallMode::Synchronous, false) => Err(WriterError::SyncCallOnAsyncWriter),
            (CallMode::Asynchronous, true) => Err(WriterError::AsyncCallOnSyncWriter),
            _ => Ok(()),
        }
    }

    fn fault<T>(&mut self, result: Result<T, WriterError>) -> Result<T, WriterError> {
        if let Err(err) = &result {
            if !self.state().is_error() {
                warn!(
                    code = err.code(),
                    category = %err.category(),
                    state = %self.state(),
                    "writer entering error state: {err}"
                );
                self.enter_error_scope();
            }
        }
        result
    }

    fn enter_error_scope(&mut self) {
        let current = self.scopes.current();
        let scope = Scope::error(current.item(), current.skip_writing);
        self.scopes.push(scope);
    }

    // ─── Core operations ─────────────────────────────────────────────────────

    fn transition_context(&self) -> TransitionContext {
        TransitionContext {
            writer_kind: self.kind,
            current_entry_is_null: self.scopes.current_is_null_entry(),
        }
    }

    /// Emit `start_payload` before the first item. The top-level transition is
    /// checked first so a wrong writer kind fails before any hook runs.
    fn start_payload_in_start_state(&mut self, next: WriterState) -> Result<(), WriterError> {
        if self.state() == WriterState::Start {
            validate_transition(WriterState::Start, next, self.transition_context())?;
            debug!("starting payload");
            self.hooks.start_payload()?;
        }
        Ok(())
    }

    /// Validate the transition into `next` and compute the new scope's skip flag.
    fn prepare_enter(
        &mut self,
        next: WriterState,
        link_name: Option<&str>,
    ) -> Result<bool, WriterError> {
        let from = self.state();
        validate_transition(from, next, self.transition_context())?;
        let current = self.scopes.current_mut();
        let mut skip_writing = current.skip_writing;
        match &mut current.kind {
            ScopeKind::Entry(scope) => {
                if let (false, Some(entry), Some(name)) = (skip_writing, &scope.entry, link_name) {
                    skip_writing = entry.skips_navigation_link(name);
                }
            }
            ScopeKind::Feed(scope) if next == WriterState::Entry => scope.entry_count += 1,
            _ => {}
        }
        debug!(%from, to = %next, skip_writing, "entering scope");
        Ok(skip_writing)
    }

    fn leave_scope(&mut self) -> Result<(), WriterError> {
        let left = self
            .scopes
            .pop()
            .ok_or(WriterError::Internal("no open scope to leave"))?;
        debug!(from = %left.state(), to = %self.state(), "left scope");
        if self.scopes.depth() == 1 {
            self.scopes.complete()?;
            debug!("payload completed");
            self.hooks.end_payload()?;
        }
        Ok(())
    }

    fn start_feed_core(&mut self, feed: ODataFeed) -> Result<(), WriterError> {
        self.start_payload_in_start_state(WriterState::Feed)?;
        self.check_for_navigation_link_with_content(ContentKind::Feed)?;
        let skip_writing = self.prepare_enter(WriterState::Feed, None)?;

        let feed = Arc::new(feed);
        let validator = if self.scopes.depth() == 1 {
            self.settings.model.clone().map(FeedTypeValidator::new)
        } else {
            None
        };
        let state = self.hooks.create_feed_scope(&feed, skip_writing);
        self.scopes.push(Scope::new(
            ScopeKind::Feed(FeedScope::new(feed, state, validator)),
            skip_writing,
        ));
        if skip_writing {
            return Ok(());
        }

        let is_top_level = self.scopes.is_top_level();
        let scope = self.scopes.current_feed_mut()?;
        validate_feed_start(
            &scope.feed,
            is_top_level,
            self.settings.writing_response,
            self.settings.version,
        )?;
        self.hooks.start_feed(&scope.feed, &mut scope.state)
    }

    fn start_entry_core(&mut self, entry: Option<ODataEntry>) -> Result<(), WriterError> {
        if entry.is_none() && self.state() != WriterState::NavigationLink {
            return Err(WriterError::NullEntryOutsideNavigationLink {
                state: self.state(),
            });
        }
        self.start_payload_in_start_state(WriterState::Entry)?;
        self.check_for_navigation_link_with_content(ContentKind::Entry)?;
        let skip_writing = self.prepare_enter(WriterState::Entry, None)?;

        let entry = entry.map(Arc::new);
        let checker = entry.as_ref().map(|_| {
            DuplicatePropertyNamesChecker::new(
                self.settings.behavior.allow_duplicate_property_names,
                self.settings.writing_response,
            )
        });
        let state = self.hooks.create_entry_scope(entry.as_deref(), skip_writing);
        self.scopes.push(Scope::new(
            ScopeKind::Entry(EntryScope::new(entry.clone(), checker, state)),
            skip_writing,
        ));
        if skip_writing {
            return Ok(());
        }

        self.depth.increment()?;
        if let Some(entry) = &entry {
            if let Some(entity_type) = self.validate_entry_start(entry)? {
                self.scopes.current_entry_mut()?.set_entity_type(entity_type)?;
            }
        }
        let scope = self.scopes.current_entry_mut()?;
        self.hooks.start_entry(scope.entry.as_deref(), &mut scope.state)
    }

    /// Type checks for a non-null entry that was just pushed. Returns its resolved type.
    fn validate_entry_start(
        &mut self,
        entry: &ODataEntry,
    ) -> Result<Option<EntityTypeRef>, WriterError> {
        let Some(model) = self.settings.model.clone() else {
            return Ok(None);
        };
        let (nested, target) = match self.scopes.parent_navigation_link()? {
            Some(link_scope) => (true, link_scope.target().cloned()),
            None => (false, None),
        };
        let fallback = if nested {
            target.as_ref().map(|t| t.entity_type.clone())
        } else {
            self.expected_type.clone()
        };

        let entity_type =
            resolve_entity_type(Some(&*model), entry.type_name.as_deref(), fallback.as_ref())?;
        validate_entry_media_resource(
            entry,
            entity_type.as_ref(),
            self.settings.behavior.validate_media_resource,
        )?;
        if nested {
            validate_entry_in_expanded_link(Some(&*model), entity_type.as_ref(), target.as_ref())?;
        } else if let (Some(expected), Some(actual)) = (&self.expected_type, &entity_type) {
            validate_expected_type(&*model, actual, expected)?;
        }
        if let Some(validator) = self.scopes.top_level_feed_validator_mut() {
            validator.validate_entry(entity_type.as_ref())?;
        }
        Ok(entity_type)
    }

    fn start_navigation_link_core(&mut self, link: ODataNavigationLink) -> Result<(), WriterError> {
        let skip_writing = self.prepare_enter(WriterState::NavigationLink, Some(&link.name))?;
        self.scopes.push(Scope::new(
            ScopeKind::NavigationLink(NavigationLinkScope::new(Arc::new(link))),
            skip_writing,
        ));
        Ok(())
    }

    fn entity_reference_link_core(
        &mut self,
        link: ODataEntityReferenceLink,
    ) -> Result<(), WriterError> {
        if self.settings.writing_response {
            return Err(WriterError::EntityReferenceLinkInResponse);
        }
        self.check_for_navigation_link_with_content(ContentKind::EntityReferenceLink)?;
        if self.scopes.current().skip_writing {
            return Ok(());
        }
        validate_entity_reference_link(&link)?;
        let parent = Arc::clone(&self.scopes.current_link()?.link);
        self.hooks
            .write_entity_reference_in_navigation_link_content(&parent, &link)
    }

    /// Promote the current navigation link when its first content item arrives,
    /// or check that a further item is allowed.
    fn check_for_navigation_link_with_content(
        &mut self,
        kind: ContentKind,
    ) -> Result<(), WriterError> {
        let state = self.state();
        if !state.is_navigation_link() {
            return if kind == ContentKind::EntityReferenceLink {
                Err(WriterError::EntityReferenceLinkWithoutNavigationLink)
            } else {
                Ok(())
            };
        }
        let (link, target) = {
            let scope = self.scopes.current_link()?;
            (Arc::clone(&scope.link), scope.target().cloned())
        };

        if state == WriterState::NavigationLinkWithContent {
            let collection_valued = link
                .is_collection
                .unwrap_or_else(|| target.is_some_and(|t| t.property.is_collection));
            if self.settings.writing_response || !collection_valued {
                return Err(WriterError::MultipleItemsInNavigationLinkContent {
                    link: link.name.clone(),
                });
            }
            return Ok(());
        }

        validate_transition(
            state,
            WriterState::NavigationLinkWithContent,
            self.transition_context(),
        )?;
        let declaring_type = self.scopes.parent_entry_type()?;
        let target = validate_navigation_link(
            self.settings.model.as_deref(),
            &link,
            declaring_type.as_ref(),
            Some(kind),
        )?;
        self.scopes.promote(target)?;
        debug!(link = %link.name, content = %kind, "navigation link content started");
        if self.scopes.current().skip_writing {
            return Ok(());
        }
        self.scopes
            .parent_entry_mut()?
            .checker_mut()?
            .check_navigation_link(
                &link,
                kind != ContentKind::EntityReferenceLink,
                Some(kind == ContentKind::Feed),
            )?;
        self.hooks.start_navigation_link_with_content(&link)
    }

    fn end_core(&mut self) -> Result<(), WriterError> {
        let state = self.state();
        let skip_writing = self.scopes.current().skip_writing;
        match state {
            WriterState::Entry => {
                if !skip_writing {
                    let scope = self.scopes.current_entry_mut()?;
                    scope.validate_end(self.settings.model.as_deref(), self.settings.behavior)?;
                    self.hooks
                        .end_entry(scope.entry.as_deref(), &mut scope.state)?;
                    self.depth.decrement()?;
                }
            }
            WriterState::Feed => {
                if !skip_writing {
                    let scope = self.scopes.current_feed_mut()?;
                    validate_feed_end(
                        &scope.feed,
                        self.settings.writing_response,
                        self.settings.version,
                    )?;
                    self.hooks.end_feed(&scope.feed, &mut scope.state)?;
                }
            }
            WriterState::NavigationLink => {
                let link = Arc::clone(&self.scopes.current_link()?.link);
                if self.settings.writing_response {
                    return Err(WriterError::DeferredLinkInResponse {
                        link: link.name.clone(),
                    });
                }
                if !skip_writing {
                    let declaring_type = self.scopes.parent_entry_type()?;
                    let target = validate_navigation_link(
                        self.settings.model.as_deref(),
                        &link,
                        declaring_type.as_ref(),
                        None,
                    )?;
                    let is_collection = link
                        .is_collection
                        .or_else(|| target.map(|t| t.property.is_collection));
                    self.scopes
                        .parent_entry_mut()?
                        .checker_mut()?
                        .check_navigation_link(&link, false, is_collection)?;
                    self.hooks.write_deferred_navigation_link(&link)?;
                }
            }
            WriterState::NavigationLinkWithContent => {
                if !skip_writing {
                    let link = Arc::clone(&self.scopes.current_link()?.link);
                    self.hooks.end_navigation_link_with_content(&link)?;
                }
            }
            WriterState::Start | WriterState::Completed | WriterState::Error => {
                return Err(WriterError::WriteEndInInvalidState { state });
            }
        }
        self.leave_scope()
    }

    fn in_stream_error_core(&mut self) -> Result<(), WriterError> {
        if self.state() == WriterState::Completed {
            return Err(WriterError::InStreamErrorAfterCompleted);
        }
        self.start_payload_in_start_state(WriterState::Error)?;
        validate_transition(self.state(), WriterState::Error, self.transition_context())?;
        debug!(from = %self.state(), "in-stream error reported");
        self.enter_error_scope();
        Ok(())
    }
}
