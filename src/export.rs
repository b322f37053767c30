//! Retrieval and unpacking of consumer data exports.
//!
//! An export arrives as a zip archive containing a second archive,
//! `consumer_export.zip`, with the actual data. The pipeline asks the
//! client for an export, unpacks both archive levels into one
//! destination directory and hands back a handle for assertions. The
//! process working directory is captured when the flow starts and
//! restored exactly once during cleanup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use chrono::NaiveDate;
use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::api::{
    Consumer, ConsumerType, EntitlementCert, NewSubscription, Owner, Pool,
    Product,
};
use crate::client::CandlepinApi;
use crate::error::{Error, TestkitIoError};
use crate::scenario::{random_string, Scenario};
use crate::{file, TestkitResult};

/// The nested archive inside every consumer export.
pub const CONSUMER_EXPORT_ARCHIVE: &str = "consumer_export.zip";

/// Allocates a fresh random-named directory under the system temp dir.
///
/// Every export gets its own directory, so tests can run in parallel
/// without stepping on each other.
pub fn export_dir() -> TestkitResult<PathBuf> {
    let name = format!(
        "candlepin-export-{}",
        hex::encode(rand::random::<[u8; 8]>())
    );
    let dir = env::temp_dir().join(name);
    file::create_dir(&dir)?;
    Ok(dir)
}

/// Extracts a zip archive into `dest`, creating parent directories as
/// needed. An archive without entries produces an empty tree. Entries
/// whose path would escape `dest` are skipped.
pub fn unzip_into(archive: &Path, dest: &Path) -> TestkitResult<()> {
    let f = fs::File::open(archive).map_err(|e| {
        TestkitIoError::new(
            format!(
                "could not open archive: {}",
                archive.to_string_lossy()
            ),
            e,
        )
    })?;
    let mut zip = zip::ZipArchive::new(f)?;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let rel = match entry.enclosed_name() {
            Some(rel) => rel.to_path_buf(),
            None => {
                warn!(
                    "skipping archive entry with unsafe path: {}",
                    entry.name()
                );
                continue;
            }
        };
        let target = dest.join(rel);
        if entry.is_dir() {
            file::create_dir(&target)?;
        } else {
            let mut out = file::create_file_with_path(&target)?;
            io::copy(&mut entry, &mut out).map_err(|e| {
                TestkitIoError::new(
                    format!(
                        "could not extract entry: {}",
                        target.to_string_lossy()
                    ),
                    e,
                )
            })?;
        }
    }
    Ok(())
}

/// Requests an export for the client's consumer identity and unpacks
/// it, outer and nested archive both, into `dest_root`.
pub fn retrieve_export<C: CandlepinApi>(
    client: &C,
    dest_root: &Path,
) -> TestkitResult<ExportTree> {
    let saved_dir = env::current_dir().map_err(|e| {
        TestkitIoError::new(
            "could not read current working directory".to_string(),
            e,
        )
    })?;
    let archive = client.export_consumer(dest_root)?;
    debug!("export archive: {}", archive.to_string_lossy());
    expand_export(&archive, dest_root, saved_dir)
}

/// Steps 2-5 of the retrieval flow, separated from the client call so
/// archives built by hand can go through the same path.
fn expand_export(
    archive: &Path,
    dest_root: &Path,
    saved_dir: PathBuf,
) -> TestkitResult<ExportTree> {
    if !archive.is_file() {
        return Err(Error::MissingArchive(archive.to_path_buf()));
    }
    unzip_into(archive, dest_root)?;

    let nested = dest_root.join(CONSUMER_EXPORT_ARCHIVE);
    if !nested.is_file() {
        return Err(Error::MissingNestedArchive(nested));
    }
    unzip_into(&nested, dest_root)?;

    Ok(ExportTree {
        root: dest_root.to_path_buf(),
        saved_dir,
        released: false,
    })
}

//------------ ExportTree ----------------------------------------------------

/// The unpacked export below its destination root.
///
/// The handle doubles as a scoped guard: [`ExportTree::cleanup`]
/// restores the working directory captured when the flow started, then
/// removes the whole tree. Dropping the handle performs the same
/// release when `cleanup` was never called, so a failed assertion
/// mid-flow still cleans up. The restore happens exactly once either
/// way; nested save/restore is not supported.
pub struct ExportTree {
    root: PathBuf,
    saved_dir: PathBuf,
    released: bool,
}

impl ExportTree {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists entry names under `rel` inside the tree, sorted.
    pub fn entries(&self, rel: &str) -> TestkitResult<Vec<String>> {
        file::files_in_dir(&self.root.join(rel))
    }

    /// Reads a file inside the tree fully into a string.
    pub fn read_to_string(&self, rel: &str) -> TestkitResult<String> {
        file::read_to_string(&self.root.join(rel))
    }

    /// Parses a JSON file inside the tree into the expected type.
    pub fn load_json<O: DeserializeOwned>(
        &self,
        rel: &str,
    ) -> TestkitResult<O> {
        file::load_json(&self.root.join(rel))
    }

    /// Restores the saved working directory, then deletes the tree.
    pub fn cleanup(mut self) -> TestkitResult<()> {
        self.release()
    }

    fn release(&mut self) -> TestkitResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        env::set_current_dir(&self.saved_dir).map_err(|e| {
            TestkitIoError::new(
                format!(
                    "could not restore working directory: {}",
                    self.saved_dir.to_string_lossy()
                ),
                e,
            )
        })?;
        file::remove_dir_all(&self.root)
    }
}

impl Drop for ExportTree {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("export cleanup failed: {}", e);
        }
    }
}

//------------ ExportScenario ------------------------------------------------

/// The full export flow against a live client.
///
/// Sets up an owner with one flexible-expiry product and one plain
/// product, registers a candlepin-type consumer bound to both pools and
/// retrieves the consumer's unpacked export. Creating an export is
/// expensive on the service side, so suites typically share one
/// scenario across their cases.
pub struct ExportScenario<C: CandlepinApi> {
    scenario: Scenario<C>,
    pub owner: Owner,
    pub consumer: Consumer,
    pub flex_product: Product,
    pub other_product: Product,
    pub flex_cert: EntitlementCert,
    pub end_date: NaiveDate,
    pub flex_days: u32,
    pub tree: ExportTree,
}

impl<C: CandlepinApi> ExportScenario<C> {
    pub fn create(admin: C) -> TestkitResult<Self> {
        let flex_days = 30;
        let end_date = NaiveDate::from_ymd_opt(2025, 5, 29).unwrap();

        let mut scenario = Scenario::new(admin);
        let owner = scenario.create_owner(&random_string("test_owner"))?;
        let owner_client =
            scenario.user_client(&owner, &random_string("testuser"))?;

        let mut flex_attributes = HashMap::new();
        flex_attributes
            .insert("flex_expiry".to_string(), flex_days.to_string());
        let flex_product =
            scenario.create_product(None, None, &flex_attributes)?;
        let other_product =
            scenario.create_product(None, None, &HashMap::new())?;

        let mut subscription =
            NewSubscription::new(&flex_product.id, 2, end_date);
        subscription.account_number = "12345".to_string();
        scenario
            .admin()
            .create_subscription(&owner.key, &subscription)?;
        let mut subscription =
            NewSubscription::new(&other_product.id, 4, end_date);
        subscription.account_number = "12345".to_string();
        scenario
            .admin()
            .create_subscription(&owner.key, &subscription)?;
        scenario.admin().refresh_pools(&owner.key)?;

        let flex_pool = single_pool(
            &scenario.admin().list_pools(
                &owner.id,
                Some(&flex_product.id),
            )?,
            &flex_product.id,
        )?;
        let other_pool = single_pool(
            &scenario.admin().list_pools(
                &owner.id,
                Some(&other_product.id),
            )?,
            &other_product.id,
        )?;

        let (consumer, consumer_client) = scenario.consumer_client(
            &owner_client,
            &random_string("consumer"),
            ConsumerType::Candlepin,
            None,
            &HashMap::new(),
        )?;

        let mut certs = consumer_client.consume_pool(&flex_pool)?;
        let flex_cert = certs.drain(..).next().ok_or_else(|| {
            Error::ApiFailure(
                "no entitlement certificate granted".to_string(),
            )
        })?;
        consumer_client.consume_pool(&other_pool)?;

        let dest_root = export_dir()?;
        let tree = retrieve_export(&consumer_client, &dest_root)?;

        Ok(ExportScenario {
            scenario,
            owner,
            consumer,
            flex_product,
            other_product,
            flex_cert,
            end_date,
            flex_days,
            tree,
        })
    }

    pub fn admin(&self) -> &C {
        self.scenario.admin()
    }

    /// Restores the working directory, removes the export tree, then
    /// deletes the owner. Both steps run even when the first fails; the
    /// first failure wins.
    pub fn teardown(self) -> TestkitResult<()> {
        let ExportScenario {
            mut scenario, tree, ..
        } = self;
        let tree_result = tree.cleanup();
        let owner_result = scenario.teardown();
        tree_result.and(owner_result)
    }
}

fn single_pool(pools: &[Pool], product_id: &str) -> TestkitResult<String> {
    pools
        .first()
        .map(|pool| pool.id.clone())
        .ok_or_else(|| {
            Error::ApiFailure(format!(
                "no pool for product {}",
                product_id
            ))
        })
}

//------------ Tests ---------------------------------------------------------
