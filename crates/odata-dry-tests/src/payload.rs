// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Payload item builders matching [`people_model`](crate::people_model).

use odata_payload::{MediaResource, ODataEntry, ODataFeed, ODataNavigationLink, ODataProperty};

/// The `People` feed.
pub fn person_feed() -> ODataFeed {
    ODataFeed::new().with_id("People")
}

/// An `NS.Person` entry with a `Name`.
pub fn person(id: &str, name: &str) -> ODataEntry {
    ODataEntry::new()
        .with_type_name("NS.Person")
        .with_id(id)
        .with_property(ODataProperty::new("Name", name))
}

/// An `NS.Employee` entry.
pub fn employee(id: &str) -> ODataEntry {
    ODataEntry::new()
        .with_type_name("NS.Employee")
        .with_id(id)
        .with_property(ODataProperty::new("Salary", 1000_i64))
}

/// An `NS.Customer` entry.
pub fn customer(id: &str) -> ODataEntry {
    ODataEntry::new()
        .with_type_name("NS.Customer")
        .with_id(id)
        .with_property(ODataProperty::new("Tier", "gold"))
}

/// An `NS.Product` entry.
pub fn product(id: &str) -> ODataEntry {
    ODataEntry::new()
        .with_type_name("NS.Product")
        .with_id(id)
        .with_property(ODataProperty::new("Title", "Widget"))
}

/// An `NS.Photo` media link entry with its media resource.
pub fn photo(id: &str) -> ODataEntry {
    ODataEntry::new()
        .with_type_name("NS.Photo")
        .with_id(id)
        .with_media_resource(MediaResource {
            read_link: Some(format!("http://host/Photos('{id}')/$value")),
            content_type: Some("image/png".into()),
            ..MediaResource::default()
        })
}

/// The collection-valued `Friends` link.
pub fn friends_link() -> ODataNavigationLink {
    ODataNavigationLink::collection("Friends").with_url("http://host/People('1')/Friends")
}

/// The single-valued `BestFriend` link.
pub fn best_friend_link() -> ODataNavigationLink {
    ODataNavigationLink::single("BestFriend").with_url("http://host/People('1')/BestFriend")
}
