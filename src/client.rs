//! The service client boundary.
//!
//! The REST client that actually talks to the service is an external
//! collaborator. All helpers are written against [`CandlepinApi`], which
//! captures the operations they need; implementations decide transport,
//! wire details and how each authentication mode is carried.
//! [`crate::test::MemoryCandlepin`] implements the trait in memory for
//! suites that run without a deployment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::api::{
    Consumer, ConsumerType, Content, EntitlementCert, IdCert, NewContent,
    NewSubscription, Owner, Pool, Product, Subscription, User,
};
use crate::TestkitResult;

//------------ CandlepinApi --------------------------------------------------

/// The operations the test helpers need from a service client.
///
/// All operations are synchronous and run to completion before
/// returning. Timeouts and retries, if any, live inside the
/// implementation.
pub trait CandlepinApi: Sized {
    /// Creates an owner, optionally under a parent owner.
    fn create_owner(
        &self,
        key: &str,
        parent: Option<&Owner>,
    ) -> TestkitResult<Owner>;

    /// Deletes an owner and everything beneath it.
    fn delete_owner(&self, key: &str) -> TestkitResult<()>;

    /// Creates a product.
    fn create_product(
        &self,
        id: &str,
        name: &str,
        attributes: &HashMap<String, String>,
    ) -> TestkitResult<Product>;

    /// Creates a content record.
    fn create_content(&self, content: &NewContent) -> TestkitResult<Content>;

    /// Creates a user under an owner.
    fn create_user(
        &self,
        owner_key: &str,
        username: &str,
        password: &str,
    ) -> TestkitResult<User>;

    /// Registers a consumer for the client's current identity.
    fn register(
        &self,
        name: &str,
        consumer_type: ConsumerType,
        username: Option<&str>,
        facts: &HashMap<String, String>,
    ) -> TestkitResult<Consumer>;

    /// Binds the client's consumer to a pool, returning the entitlement
    /// certificates the service granted.
    fn consume_pool(
        &self,
        pool_id: &str,
    ) -> TestkitResult<Vec<EntitlementCert>>;

    /// Creates a subscription under an owner.
    fn create_subscription(
        &self,
        owner_key: &str,
        subscription: &NewSubscription,
    ) -> TestkitResult<Subscription>;

    /// Re-derives the owner's pools from its subscriptions.
    fn refresh_pools(&self, owner_key: &str) -> TestkitResult<()>;

    /// Lists an owner's pools, optionally narrowed to one product.
    fn list_pools(
        &self,
        owner_id: &str,
        product_id: Option<&str>,
    ) -> TestkitResult<Vec<Pool>>;

    /// Asks the service for an export of the client's consumer, placed
    /// under `dest_dir`. Returns the path of the archive the service
    /// claims to have produced; whether it actually exists is for the
    /// caller to verify.
    fn export_consumer(&self, dest_dir: &Path) -> TestkitResult<PathBuf>;

    /// Returns a sibling client for the same service, authenticated
    /// with username and password.
    fn connect_basic(
        &self,
        username: &str,
        password: &str,
    ) -> TestkitResult<Self>;

    /// Returns a sibling client authenticated with a consumer identity
    /// certificate.
    fn connect_client_cert(&self, id_cert: &IdCert) -> TestkitResult<Self>;

    /// Returns a sibling client that identifies a consumer through the
    /// trusted header, without credentials.
    fn connect_trusted_consumer(&self, uuid: &str) -> TestkitResult<Self>;
}
