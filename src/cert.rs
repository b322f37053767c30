//! Entitlement certificate checks.
//!
//! An entitlement certificate carries two end dates. The cryptographic
//! validity (`notAfter`) may be pushed out by a flexible-expiry grace
//! period, while the order end date recorded in a custom extension must
//! keep the original contract terms. The checks here assert that the two
//! diverge by exactly the flex offset and nothing else.

use chrono::{DateTime, Days, NaiveDate, Utc};
use lazy_static::lazy_static;
use x509_parser::certificate::X509Certificate;
use x509_parser::der_parser::oid::Oid;
use x509_parser::prelude::FromDer;

use crate::api::EntitlementCert;
use crate::error::Error;
use crate::TestkitResult;

/// The extension carrying the unmodified contractual end date.
pub const OID_ORDER_END_DATE: &str = "1.3.6.1.4.1.2312.9.4.7";

pub(crate) const OID_ORDER_END_DATE_PARTS: [u64; 10] =
    [1, 3, 6, 1, 4, 1, 2312, 9, 4, 7];

lazy_static! {
    static ref ORDER_END_DATE_OID: Oid<'static> =
        Oid::from(&OID_ORDER_END_DATE_PARTS).unwrap();
}

//------------ Certificate checks --------------------------------------------

/// Checks both end dates in an entitlement certificate.
///
/// The certificate's `notAfter` must fall on `end_date` plus
/// `flex_days`, while the order end date in the
/// `1.3.6.1.4.1.2312.9.4.7` extension must still equal `end_date`
/// itself. Comparison is at calendar-date granularity in UTC; time of
/// day is ignored.
pub fn verify_cert_dates(
    record: &EntitlementCert,
    end_date: NaiveDate,
    flex_days: u32,
) -> TestkitResult<()> {
    if record.flex_expiry_days != flex_days {
        return Err(Error::FlexDaysMismatch {
            expected: flex_days,
            found: record.flex_expiry_days,
        });
    }

    let der = decode_pem(&record.cert)?;
    let (_, cert) = X509Certificate::from_der(&der).map_err(|e| {
        Error::CertDecode(format!("cannot parse certificate: {}", e))
    })?;

    let cert_end_date = not_after_date(&cert)?;
    let flex_end_date = end_date + Days::new(u64::from(flex_days));
    if cert_end_date != flex_end_date {
        return Err(Error::CertEndDateMismatch {
            expected: flex_end_date,
            found: cert_end_date,
        });
    }

    let value = extension_value(&cert, &ORDER_END_DATE_OID)?
        .ok_or_else(|| {
            Error::MissingExtension(OID_ORDER_END_DATE.to_string())
        })?;
    let order_end_date = parse_extension_date(&value)?;
    if order_end_date != end_date {
        return Err(Error::OrderEndDateMismatch {
            expected: end_date,
            found: order_end_date,
        });
    }

    Ok(())
}

/// Returns the string value of the extension with the given OID, or
/// `None` when the certificate does not carry it.
///
/// Values for this encoding scheme are occasionally prefixed with two
/// literal dots; the prefix is stripped before the value is returned.
pub fn extension_value(
    cert: &X509Certificate,
    oid: &Oid,
) -> TestkitResult<Option<String>> {
    let ext = cert.get_extension_unique(oid).map_err(|e| {
        Error::CertDecode(format!("cannot read extensions: {}", e))
    })?;
    Ok(ext.map(|ext| {
        let value = String::from_utf8_lossy(ext.value);
        match value.strip_prefix("..") {
            Some(stripped) => stripped.to_string(),
            None => value.to_string(),
        }
    }))
}

/// The certificate expiry as a calendar date in UTC.
fn not_after_date(cert: &X509Certificate) -> TestkitResult<NaiveDate> {
    let timestamp = cert.validity().not_after.timestamp();
    let when =
        DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
            Error::CertDecode(format!(
                "certificate 'not after' out of range: {}",
                timestamp
            ))
        })?;
    Ok(when.date_naive())
}

fn parse_extension_date(value: &str) -> TestkitResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| Error::ExtensionDateInvalid(value.to_string()))
}

fn decode_pem(pem: &str) -> TestkitResult<Vec<u8>> {
    let der = rustls_pemfile::certs(&mut pem.as_bytes())
        .next()
        .ok_or_else(|| {
            Error::CertDecode("no certificate in PEM payload".to_string())
        })?
        .map_err(|e| {
            Error::CertDecode(format!("invalid PEM payload: {}", e))
        })?;
    Ok(der.as_ref().to_vec())
}

//------------ Tests ---------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Datelike;
    use rcgen::{CertificateParams, CustomExtension, KeyPair};

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// A self-signed certificate expiring on `not_after`, with the order
    /// end date extension set to `extension` when given.
    fn make_cert(not_after: NaiveDate, extension: Option<&[u8]>) -> String {
        let mut params =
            CertificateParams::new(vec!["consumer.example.org".to_string()])
                .unwrap();
        params.not_after = rcgen::date_time_ymd(
            not_after.year(),
            not_after.month() as u8,
            not_after.day() as u8,
        );
        if let Some(content) = extension {
            params.custom_extensions.push(
                CustomExtension::from_oid_content(
                    &OID_ORDER_END_DATE_PARTS,
                    content.to_vec(),
                ),
            );
        }
        let key = KeyPair::generate().unwrap();
        params.self_signed(&key).unwrap().pem()
    }

    fn record(cert: String, flex_expiry_days: u32) -> EntitlementCert {
        EntitlementCert {
            id: "ent-1".to_string(),
            cert,
            flex_expiry_days,
        }
    }

    #[test]
    fn should_accept_matching_dates() {
        // 2025-05-29 plus 30 flex days expires on 2025-06-28.
        let cert =
            make_cert(date(2025, 6, 28), Some(b"..2025-05-29"));
        verify_cert_dates(&record(cert, 30), date(2025, 5, 29), 30)
            .unwrap();
    }

    #[test]
    fn should_strip_leading_dots_only_when_present() {
        let cert = make_cert(date(2025, 6, 28), Some(b"2025-05-29"));
        verify_cert_dates(&record(cert, 30), date(2025, 5, 29), 30)
            .unwrap();
    }

    #[test]
    fn should_reject_unexpected_flex_days() {
        let cert =
            make_cert(date(2025, 6, 28), Some(b"..2025-05-29"));
        assert!(matches!(
            verify_cert_dates(&record(cert, 15), date(2025, 5, 29), 30),
            Err(Error::FlexDaysMismatch {
                expected: 30,
                found: 15
            })
        ));
    }

    #[test]
    fn should_reject_wrong_certificate_end_date() {
        let cert =
            make_cert(date(2025, 6, 27), Some(b"..2025-05-29"));
        assert!(matches!(
            verify_cert_dates(&record(cert, 30), date(2025, 5, 29), 30),
            Err(Error::CertEndDateMismatch { .. })
        ));
    }

    #[test]
    fn should_reject_flexed_order_end_date() {
        // The extension must hold the original terms, not the flexed
        // date.
        let cert =
            make_cert(date(2025, 6, 28), Some(b"..2025-06-28"));
        assert!(matches!(
            verify_cert_dates(&record(cert, 30), date(2025, 5, 29), 30),
            Err(Error::OrderEndDateMismatch { .. })
        ));
    }

    #[test]
    fn should_report_missing_extension() {
        let cert = make_cert(date(2025, 6, 28), None);
        assert!(matches!(
            verify_cert_dates(&record(cert, 30), date(2025, 5, 29), 30),
            Err(Error::MissingExtension(_))
        ));
    }

    #[test]
    fn should_report_unparseable_extension_value() {
        let cert = make_cert(date(2025, 6, 28), Some(b"..someday"));
        assert!(matches!(
            verify_cert_dates(&record(cert, 30), date(2025, 5, 29), 30),
            Err(Error::ExtensionDateInvalid(_))
        ));
    }

    #[test]
    fn should_reject_garbage_pem() {
        let record = record("not a certificate".to_string(), 0);
        assert!(matches!(
            verify_cert_dates(&record, date(2025, 5, 29), 0),
            Err(Error::CertDecode(_))
        ));
    }
}
