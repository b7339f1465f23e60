// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deferred links, expansions, entity reference bindings and projections.
#![allow(missing_docs)]

use odata_dry_tests::{best_friend_link, friends_link, person, HookEvent, RecordingHooks};
use odata_payload::{
    ODataEntityReferenceLink, ODataFeed, ODataNavigationLink, ProjectedProperties,
};
use odata_writer::{ContentKind, ODataWriter, WriterError, WriterSettings, WriterState};

fn entry_writer(settings: WriterSettings) -> (RecordingHooks, ODataWriter<RecordingHooks>) {
    let hooks = RecordingHooks::new();
    let writer = ODataWriter::entry_writer(hooks.clone(), settings);
    (hooks, writer)
}

fn reference(key: u32) -> ODataEntityReferenceLink {
    ODataEntityReferenceLink::new(format!("http://host/People('{key}')"))
}

#[test]
fn deferred_link_in_request_is_written_on_end() {
    let (hooks, mut writer) = entry_writer(WriterSettings::request());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer.write_start_navigation_link(friends_link()).unwrap();
    assert_eq!(hooks.count("DeferredLink"), 0);
    writer.write_end().unwrap();
    writer.write_end().unwrap();

    assert_eq!(
        hooks.events(),
        vec![
            HookEvent::StartPayload,
            HookEvent::StartEntry(Some("1".into())),
            HookEvent::DeferredLink("Friends".into()),
            HookEvent::EndEntry(Some("1".into())),
            HookEvent::EndPayload,
            HookEvent::Flush,
        ]
    );
}

#[test]
fn deferred_link_in_response_is_rejected() {
    let (hooks, mut writer) = entry_writer(WriterSettings::response());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer.write_start_navigation_link(friends_link()).unwrap();
    let err = writer.write_end().unwrap_err();

    assert_eq!(
        err,
        WriterError::DeferredLinkInResponse {
            link: "Friends".into()
        }
    );
    assert_eq!(hooks.count("DeferredLink"), 0);
}

#[test]
fn request_binds_an_expanded_feed_and_references_into_one_collection() {
    let (hooks, mut writer) = entry_writer(WriterSettings::request());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer.write_start_navigation_link(friends_link()).unwrap();
    writer.write_start_feed(ODataFeed::new()).unwrap();
    writer.write_start_entry(person("2", "Grace")).unwrap();
    writer.write_end().unwrap();
    writer.write_end().unwrap();
    writer.write_entity_reference_link(reference(3)).unwrap();
    writer.write_entity_reference_link(reference(4)).unwrap();
    writer.write_end().unwrap();
    writer.write_end().unwrap();

    assert_eq!(
        hooks.events(),
        vec![
            HookEvent::StartPayload,
            HookEvent::StartEntry(Some("1".into())),
            HookEvent::StartLinkContent("Friends".into()),
            HookEvent::StartFeed(None),
            HookEvent::StartEntry(Some("2".into())),
            HookEvent::EndEntry(Some("2".into())),
            HookEvent::EndFeed(None),
            HookEvent::EntityReference("Friends".into(), "http://host/People('3')".into()),
            HookEvent::EntityReference("Friends".into(), "http://host/People('4')".into()),
            HookEvent::EndLinkContent("Friends".into()),
            HookEvent::EndEntry(Some("1".into())),
            HookEvent::EndPayload,
            HookEvent::Flush,
        ]
    );
}

#[test]
fn single_valued_link_takes_one_item() {
    let (_hooks, mut writer) = entry_writer(WriterSettings::request());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer.write_start_navigation_link(best_friend_link()).unwrap();
    writer.write_entity_reference_link(reference(2)).unwrap();
    let err = writer.write_entity_reference_link(reference(3)).unwrap_err();

    assert_eq!(
        err,
        WriterError::MultipleItemsInNavigationLinkContent {
            link: "BestFriend".into()
        }
    );
    assert_eq!(writer.state(), WriterState::Error);
}

#[test]
fn response_link_takes_one_item_even_when_collection_valued() {
    let (_hooks, mut writer) = entry_writer(WriterSettings::response());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer.write_start_navigation_link(friends_link()).unwrap();
    writer.write_start_feed(ODataFeed::new()).unwrap();
    writer.write_end().unwrap();
    let err = writer.write_start_feed(ODataFeed::new()).unwrap_err();

    assert!(matches!(
        err,
        WriterError::MultipleItemsInNavigationLinkContent { .. }
    ));
}

#[test]
fn entity_reference_needs_an_open_navigation_link() {
    let hooks = RecordingHooks::new();
    let mut writer = ODataWriter::feed_writer(hooks.clone(), WriterSettings::request());

    writer.write_start_feed(ODataFeed::new()).unwrap();
    let err = writer.write_entity_reference_link(reference(1)).unwrap_err();

    assert_eq!(err, WriterError::EntityReferenceLinkWithoutNavigationLink);
}

#[test]
fn entity_reference_needs_a_url() {
    let (hooks, mut writer) = entry_writer(WriterSettings::request());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer.write_start_navigation_link(friends_link()).unwrap();
    let err = writer
        .write_entity_reference_link(ODataEntityReferenceLink::new(""))
        .unwrap_err();

    assert_eq!(err, WriterError::EntityReferenceLinkWithoutUrl);
    assert_eq!(hooks.count("EntityReference"), 0);
}

#[test]
fn expanded_single_link_cannot_be_repeated_in_a_request() {
    let (_hooks, mut writer) = entry_writer(WriterSettings::request());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer.write_start_navigation_link(best_friend_link()).unwrap();
    writer.write_start_entry(person("2", "Grace")).unwrap();
    writer.write_end().unwrap();
    writer.write_end().unwrap();
    writer.write_start_navigation_link(best_friend_link()).unwrap();
    let err = writer.write_end().unwrap_err();

    assert_eq!(
        err,
        WriterError::MultipleLinksForSingleton {
            name: "BestFriend".into()
        }
    );
}

#[test]
fn bound_collection_cannot_later_expand_a_single_entry() {
    let (hooks, mut writer) = entry_writer(WriterSettings::request());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer
        .write_start_navigation_link(ODataNavigationLink::collection("Friends"))
        .unwrap();
    writer.write_end().unwrap();
    writer
        .write_start_navigation_link(ODataNavigationLink::new("Friends"))
        .unwrap();
    let err = writer.write_start_entry(person("2", "Grace")).unwrap_err();

    assert_eq!(
        err,
        WriterError::MultipleLinksForSingleton {
            name: "Friends".into()
        }
    );
    assert_eq!(writer.state(), WriterState::Error);
    assert_eq!(
        hooks.names(),
        ["StartPayload", "StartEntry", "DeferredLink"]
    );
}

#[test]
fn collection_link_may_repeat_in_a_request() {
    let (hooks, mut writer) = entry_writer(WriterSettings::request());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    for key in [2, 3] {
        writer.write_start_navigation_link(friends_link()).unwrap();
        writer.write_entity_reference_link(reference(key)).unwrap();
        writer.write_end().unwrap();
    }
    writer.write_end().unwrap();

    assert_eq!(hooks.count("EntityReference"), 2);
    assert_eq!(writer.state(), WriterState::Completed);
}

#[test]
fn response_link_cannot_repeat() {
    let (_hooks, mut writer) = entry_writer(WriterSettings::response());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer.write_start_navigation_link(friends_link()).unwrap();
    writer.write_start_feed(ODataFeed::new()).unwrap();
    writer.write_end().unwrap();
    writer.write_end().unwrap();
    writer.write_start_navigation_link(friends_link()).unwrap();
    let err = writer.write_start_feed(ODataFeed::new()).unwrap_err();

    assert_eq!(
        err,
        WriterError::DuplicatePropertyName {
            name: "Friends".into()
        }
    );
}

#[test]
fn link_content_must_match_its_multiplicity() {
    let (_hooks, mut writer) = entry_writer(WriterSettings::response());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer.write_start_navigation_link(best_friend_link()).unwrap();
    let err = writer.write_start_feed(ODataFeed::new()).unwrap_err();

    assert_eq!(
        err,
        WriterError::LinkContentMismatch {
            link: "BestFriend".into(),
            is_collection: false,
            content: ContentKind::Feed,
        }
    );
}

#[test]
fn unnamed_link_is_rejected_when_its_content_starts() {
    let (_hooks, mut writer) = entry_writer(WriterSettings::response());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer
        .write_start_navigation_link(ODataNavigationLink::new(""))
        .unwrap();
    let err = writer.write_start_feed(ODataFeed::new()).unwrap_err();

    assert_eq!(err, WriterError::NavigationLinkWithoutName);
}

#[test]
fn projected_out_link_writes_nothing_beneath_it() {
    let (hooks, mut writer) = entry_writer(WriterSettings::response());
    let root = person("1", "Ada").with_projection(ProjectedProperties::new(["Name"]));

    writer.write_start_entry(root).unwrap();
    writer.write_start_navigation_link(friends_link()).unwrap();
    writer.write_start_feed(ODataFeed::new()).unwrap();
    writer.write_start_entry(person("2", "Grace")).unwrap();
    assert_eq!(writer.entry_depth(), 1);
    writer.write_end().unwrap();
    writer.write_end().unwrap();
    writer.write_end().unwrap();
    writer.write_end().unwrap();

    assert_eq!(
        hooks.events(),
        vec![
            HookEvent::StartPayload,
            HookEvent::StartEntry(Some("1".into())),
            HookEvent::EndEntry(Some("1".into())),
            HookEvent::EndPayload,
            HookEvent::Flush,
        ]
    );
    assert_eq!(hooks.skipped_scopes_created(), 2);
    assert_eq!(hooks.scopes_created(), 3);
}

#[test]
fn projected_out_link_is_still_validated() {
    let (hooks, mut writer) = entry_writer(WriterSettings::response());
    let root = person("1", "Ada").with_projection(ProjectedProperties::new(["Name"]));

    writer.write_start_entry(root).unwrap();
    writer.write_start_navigation_link(best_friend_link()).unwrap();
    let err = writer.write_start_feed(ODataFeed::new()).unwrap_err();

    assert!(matches!(err, WriterError::LinkContentMismatch { .. }));
    assert_eq!(hooks.count("StartLinkContent"), 0);
}

#[test]
fn projection_keeps_listed_links() {
    let (hooks, mut writer) = entry_writer(WriterSettings::response());
    let root = person("1", "Ada").with_projection(ProjectedProperties::new(["BestFriend"]));

    writer.write_start_entry(root).unwrap();
    writer.write_start_navigation_link(best_friend_link()).unwrap();
    writer.write_start_entry(person("2", "Grace")).unwrap();

    assert_eq!(hooks.count("StartLinkContent"), 1);
    assert_eq!(writer.entry_depth(), 2);
}
