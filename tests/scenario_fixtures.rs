//! Scenario fixture behavior against the in-memory service.

use std::collections::HashMap;

use candlepin_testkit::api::{check_for_hateoas, ConsumerType};
use candlepin_testkit::scenario::{random_string, Scenario};

mod common;

#[test]
fn owners_are_deleted_in_reverse_creation_order() {
    let admin = common::admin_client();
    let mut scenario = Scenario::new(admin.clone());

    let first = scenario.create_owner(&random_string("owner")).unwrap();
    let second = scenario.create_owner(&random_string("owner")).unwrap();
    let third = scenario
        .create_owner_under(&random_string("owner"), Some(&first))
        .unwrap();
    assert_eq!(
        third.parent_owner.as_ref().unwrap().key,
        first.key
    );

    scenario.teardown().unwrap();
    assert_eq!(
        admin.deleted_owners(),
        vec![third.key, second.key, first.key]
    );
}

#[test]
fn consumer_clients_carry_their_identity() {
    let admin = common::admin_client();
    let mut scenario = Scenario::new(admin);

    let owner = scenario.create_owner(&random_string("owner")).unwrap();
    let user_client = scenario
        .user_client(&owner, &random_string("testuser"))
        .unwrap();

    let mut facts = HashMap::new();
    facts.insert("uname.machine".to_string(), "x86_64".to_string());
    let (consumer, _consumer_client) = scenario
        .consumer_client(
            &user_client,
            &random_string("consumer"),
            ConsumerType::System,
            None,
            &facts,
        )
        .unwrap();
    assert_eq!(consumer.consumer_type, ConsumerType::System);
    assert_eq!(
        consumer.facts.get("uname.machine").unwrap(),
        "x86_64"
    );
    assert!(consumer.username.is_some());

    // The trusted header mode works for the same consumer.
    scenario.trusted_consumer_client(&consumer.uuid).unwrap();

    scenario.teardown().unwrap();
}

#[test]
fn content_records_default_to_yum() {
    let admin = common::admin_client();
    let mut scenario = Scenario::new(admin);

    scenario.create_owner(&random_string("owner")).unwrap();
    let product = scenario
        .create_product(None, None, &HashMap::new())
        .unwrap();
    let content = scenario.create_content(&[&product]).unwrap();
    assert_eq!(content.content_type, "yum");
    assert_eq!(content.modified_product_ids, vec![product.id]);

    scenario.teardown().unwrap();
}

#[test]
fn hateoas_references_have_exactly_two_fields() {
    let reference = serde_json::json!({
        "href": "/candlepin/owners/admin",
        "id": "8a8b"
    });
    check_for_hateoas(&reference).unwrap();

    let full_record = serde_json::json!({
        "href": "/candlepin/owners/admin",
        "id": "8a8b",
        "displayName": "Admin Owner"
    });
    assert!(check_for_hateoas(&full_record).is_err());
}
