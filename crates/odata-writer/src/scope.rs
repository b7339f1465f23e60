// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scope stack: one frame per open feed, entry or navigation link.
//!
//! The bottom frame is a sentinel (`Start`, later `Completed`) that is never
//! popped, so the current scope always exists. Each frame carries its item,
//! the skip-writing flag, and any state the format hooks attached to it.

use std::sync::Arc;

use odata_edm::{EdmModel, EntityTypeRef};
use odata_payload::{ODataEntry, ODataFeed, ODataNavigationLink};

use crate::duplicate::DuplicatePropertyNamesChecker;
use crate::error::WriterError;
use crate::feed_validator::FeedTypeValidator;
use crate::settings::WriterBehavior;
use crate::state::WriterState;
use crate::validation::{validate_entry_end, NavigationTarget};

/// The item a scope was opened for.
#[derive(Debug, Clone, PartialEq)]
pub enum ODataItem {
    /// A feed.
    Feed(Arc<ODataFeed>),
    /// A non-null entry.
    Entry(Arc<ODataEntry>),
    /// A navigation link.
    NavigationLink(Arc<ODataNavigationLink>),
}

pub(crate) struct FeedScope<F> {
    pub(crate) feed: Arc<ODataFeed>,
    pub(crate) entry_count: usize,
    pub(crate) validator: Option<FeedTypeValidator>,
    pub(crate) state: F,
}

impl<F> FeedScope<F> {
    pub(crate) fn new(feed: Arc<ODataFeed>, state: F, validator: Option<FeedTypeValidator>) -> Self {
        Self {
            feed,
            entry_count: 0,
            validator,
            state,
        }
    }
}

pub(crate) struct EntryScope<E> {
    pub(crate) entry: Option<Arc<ODataEntry>>,
    entity_type: Option<EntityTypeRef>,
    checker: Option<DuplicatePropertyNamesChecker>,
    pub(crate) state: E,
}

impl<E> EntryScope<E> {
    pub(crate) fn new(
        entry: Option<Arc<ODataEntry>>,
        checker: Option<DuplicatePropertyNamesChecker>,
        state: E,
    ) -> Self {
        Self {
            entry,
            entity_type: None,
            checker,
            state,
        }
    }

    pub(crate) fn entity_type(&self) -> Option<&EntityTypeRef> {
        self.entity_type.as_ref()
    }

    /// Record the resolved entity type. Set at most once per scope.
    pub(crate) fn set_entity_type(&mut self, entity_type: EntityTypeRef) -> Result<(), WriterError> {
        if self.entity_type.is_some() {
            return Err(WriterError::Internal("entry entity type assigned twice"));
        }
        self.entity_type = Some(entity_type);
        Ok(())
    }

    pub(crate) fn checker_mut(&mut self) -> Result<&mut DuplicatePropertyNamesChecker, WriterError> {
        self.checker
            .as_mut()
            .ok_or(WriterError::Internal("null entry has no duplicate checker"))
    }

    /// Property rules for the entry as it ends. Null entries have none.
    pub(crate) fn validate_end(
        &mut self,
        model: Option<&dyn EdmModel>,
        behavior: WriterBehavior,
    ) -> Result<(), WriterError> {
        let (Some(entry), Some(checker)) = (&self.entry, &mut self.checker) else {
            return Ok(());
        };
        validate_entry_end(entry, self.entity_type.as_ref(), checker, model, behavior)
    }
}

pub(crate) struct NavigationLinkScope {
    pub(crate) link: Arc<ODataNavigationLink>,
    target: Option<NavigationTarget>,
}

impl NavigationLinkScope {
    pub(crate) fn new(link: Arc<ODataNavigationLink>) -> Self {
        Self { link, target: None }
    }

    pub(crate) fn target(&self) -> Option<&NavigationTarget> {
        self.target.as_ref()
    }
}

pub(crate) enum ScopeKind<F, E> {
    Start,
    Feed(FeedScope<F>),
    Entry(EntryScope<E>),
    NavigationLink(NavigationLinkScope),
    NavigationLinkWithContent(NavigationLinkScope),
    Completed,
    Error(Option<ODataItem>),
}

pub(crate) struct Scope<F, E> {
    pub(crate) kind: ScopeKind<F, E>,
    pub(crate) skip_writing: bool,
}

impl<F, E> Scope<F, E> {
    pub(crate) fn new(kind: ScopeKind<F, E>, skip_writing: bool) -> Self {
        Self { kind, skip_writing }
    }

    pub(crate) fn error(item: Option<ODataItem>, skip_writing: bool) -> Self {
        Self::new(ScopeKind::Error(item), skip_writing)
    }

    pub(crate) fn state(&self) -> WriterState {
        match &self.kind {
            ScopeKind::Start => WriterState::Start,
            ScopeKind::Feed(_) => WriterState::Feed,
            ScopeKind::Entry(_) => WriterState::Entry,
            ScopeKind::NavigationLink(_) => WriterState::NavigationLink,
            ScopeKind::NavigationLinkWithContent(_) => WriterState::NavigationLinkWithContent,
            ScopeKind::Completed => WriterState::Completed,
            ScopeKind::Error(_) => WriterState::Error,
        }
    }

    pub(crate) fn item(&self) -> Option<ODataItem> {
        match &self.kind {
            ScopeKind::Feed(scope) => Some(ODataItem::Feed(Arc::clone(&scope.feed))),
            ScopeKind::Entry(scope) => scope.entry.clone().map(ODataItem::Entry),
            ScopeKind::NavigationLink(scope) | ScopeKind::NavigationLinkWithContent(scope) => {
                Some(ODataItem::NavigationLink(Arc::clone(&scope.link)))
            }
            ScopeKind::Error(item) => item.clone(),
            ScopeKind::Start | ScopeKind::Completed => None,
        }
    }

    fn is_null_entry(&self) -> bool {
        matches!(&self.kind, ScopeKind::Entry(scope) if scope.entry.is_none())
    }
}

pub(crate) struct ScopeStack<F, E> {
    base: Scope<F, E>,
    above: Vec<Scope<F, E>>,
}

impl<F, E> ScopeStack<F, E> {
    pub(crate) fn new() -> Self {
        Self {
            base: Scope::new(ScopeKind::Start, false),
            above: Vec::new(),
        }
    }

    /// Number of frames including the sentinel.
    pub(crate) fn depth(&self) -> usize {
        self.above.len() + 1
    }

    pub(crate) fn is_top_level(&self) -> bool {
        self.depth() == 2
    }

    pub(crate) fn current(&self) -> &Scope<F, E> {
        self.above.last().unwrap_or(&self.base)
    }

    pub(crate) fn current_mut(&mut self) -> &mut Scope<F, E> {
        match self.above.last_mut() {
            Some(scope) => scope,
            None => &mut self.base,
        }
    }

    pub(crate) fn current_is_null_entry(&self) -> bool {
        self.current().is_null_entry()
    }

    fn nth_from_top(&self, n: usize) -> Option<&Scope<F, E>> {
        let len = self.above.len();
        match n.cmp(&len) {
            std::cmp::Ordering::Less => self.above.get(len - 1 - n),
            std::cmp::Ordering::Equal => Some(&self.base),
            std::cmp::Ordering::Greater => None,
        }
    }

    fn nth_from_top_mut(&mut self, n: usize) -> Option<&mut Scope<F, E>> {
        let len = self.above.len();
        match n.cmp(&len) {
            std::cmp::Ordering::Less => self.above.get_mut(len - 1 - n),
            std::cmp::Ordering::Equal => Some(&mut self.base),
            std::cmp::Ordering::Greater => None,
        }
    }

    pub(crate) fn push(&mut self, scope: Scope<F, E>) {
        self.above.push(scope);
    }

    /// Pop the current frame. The sentinel is never popped.
    pub(crate) fn pop(&mut self) -> Option<Scope<F, E>> {
        self.above.pop()
    }

    /// Replace the `Start` sentinel with `Completed` once every frame is closed.
    pub(crate) fn complete(&mut self) -> Result<(), WriterError> {
        if !self.above.is_empty() || !matches!(self.base.kind, ScopeKind::Start) {
            return Err(WriterError::Internal(
                "payload completed with open scopes or twice",
            ));
        }
        self.base = Scope::new(ScopeKind::Completed, false);
        Ok(())
    }

    /// Turn the current `NavigationLink` frame into `NavigationLinkWithContent`,
    /// assigning the link's resolved target.
    pub(crate) fn promote(&mut self, target: Option<NavigationTarget>) -> Result<(), WriterError> {
        let Some(scope) = self.above.pop() else {
            return Err(WriterError::Internal("no navigation link scope to promote"));
        };
        let skip_writing = scope.skip_writing;
        match scope.kind {
            ScopeKind::NavigationLink(mut link_scope) if link_scope.target.is_none() => {
                link_scope.target = target;
                self.above.push(Scope::new(
                    ScopeKind::NavigationLinkWithContent(link_scope),
                    skip_writing,
                ));
                Ok(())
            }
            other => {
                self.above.push(Scope::new(other, skip_writing));
                Err(WriterError::Internal(
                    "promoted scope is not an unresolved navigation link",
                ))
            }
        }
    }

    pub(crate) fn current_feed_mut(&mut self) -> Result<&mut FeedScope<F>, WriterError> {
        match &mut self.current_mut().kind {
            ScopeKind::Feed(scope) => Ok(scope),
            _ => Err(WriterError::Internal("current scope is not a feed")),
        }
    }

    pub(crate) fn current_entry_mut(&mut self) -> Result<&mut EntryScope<E>, WriterError> {
        match &mut self.current_mut().kind {
            ScopeKind::Entry(scope) => Ok(scope),
            _ => Err(WriterError::Internal("current scope is not an entry")),
        }
    }

    pub(crate) fn current_link(&self) -> Result<&NavigationLinkScope, WriterError> {
        match &self.current().kind {
            ScopeKind::NavigationLink(scope) | ScopeKind::NavigationLinkWithContent(scope) => {
                Ok(scope)
            }
            _ => Err(WriterError::Internal("current scope is not a navigation link")),
        }
    }

    /// Entry owning the current navigation link.
    pub(crate) fn parent_entry_mut(&mut self) -> Result<&mut EntryScope<E>, WriterError> {
        match self.nth_from_top_mut(1).map(|scope| &mut scope.kind) {
            Some(ScopeKind::Entry(scope)) => Ok(scope),
            _ => Err(WriterError::Internal(
                "navigation link is not nested in an entry",
            )),
        }
    }

    /// Entity type of the entry owning the current navigation link.
    pub(crate) fn parent_entry_type(&self) -> Result<Option<EntityTypeRef>, WriterError> {
        match self.nth_from_top(1).map(|scope| &scope.kind) {
            Some(ScopeKind::Entry(scope)) => Ok(scope.entity_type().cloned()),
            _ => Err(WriterError::Internal(
                "navigation link is not nested in an entry",
            )),
        }
    }

    /// Navigation link whose content holds the current entry, directly or through a feed.
    pub(crate) fn parent_navigation_link(&self) -> Result<Option<&NavigationLinkScope>, WriterError> {
        let mut n = 1;
        loop {
            match self.nth_from_top(n).map(|scope| &scope.kind) {
                Some(ScopeKind::Start) => return Ok(None),
                Some(ScopeKind::NavigationLinkWithContent(scope)) => return Ok(Some(scope)),
                Some(ScopeKind::Feed(_)) if n == 1 => n += 1,
                _ => {
                    return Err(WriterError::Internal(
                        "entry is not nested in a feed or navigation link",
                    ))
                }
            }
        }
    }

    /// Feed validator of the top-level feed, when the current entry sits directly in it.
    pub(crate) fn top_level_feed_validator_mut(&mut self) -> Option<&mut FeedTypeValidator> {
        if self.depth() != 3 {
            return None;
        }
        match self.nth_from_top_mut(1).map(|scope| &mut scope.kind) {
            Some(ScopeKind::Feed(scope)) => scope.validator.as_mut(),
            _ => None,
        }
    }

    /// Innermost open feed.
    pub(crate) fn nearest_feed(&self) -> Option<&FeedScope<F>> {
        self.above.iter().rev().find_map(|scope| match &scope.kind {
            ScopeKind::Feed(feed) => Some(feed),
            _ => None,
        })
    }
}
