//! Minimum-supported-version resolution.
//!
//! For a client on version `V`, the minimum supported version is the
//! smallest configured version strictly greater than `V` among records that
//! carry an `expire_at`. It marks the next boundary the client will have to
//! cross once its own deadline passes.

use appgate_state::{AppVersion, ParseError, PlatformSnapshot, VersionRecord};

/// Resolve the minimum supported version for `version` in `snapshot`.
///
/// Ties between equal versions keep the first record in snapshot order.
/// Records without `expire_at` are never parsed; a malformed version on a
/// record that does carry one is reported as [`ParseError`].
pub fn min_supported_version<'a>(
    version: &AppVersion,
    snapshot: &'a PlatformSnapshot,
) -> Result<Option<&'a VersionRecord>, ParseError> {
    let mut best: Option<(AppVersion, &'a VersionRecord)> = None;

    for record in snapshot.iter().filter(|r| r.expire_at.is_some()) {
        let candidate = record.parsed_version()?;
        if candidate <= *version {
            continue;
        }
        let replace = best
            .as_ref()
            .map_or(true, |(current, _)| candidate < *current);
        if replace {
            best = Some((candidate, record));
        }
    }

    Ok(best.map(|(_, record)| record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use appgate_state::Platform;
    use chrono::{TimeZone, Utc};

    fn record(version: &str, expires: bool) -> VersionRecord {
        let record = VersionRecord::new(Platform::Ios, version);
        if expires {
            record.with_expire_at(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
        } else {
            record
        }
    }

    fn snapshot(records: Vec<VersionRecord>) -> PlatformSnapshot {
        PlatformSnapshot::from_history(Platform::Ios, records)
    }

    fn v(s: &str) -> AppVersion {
        s.parse().unwrap()
    }

    #[test]
    fn picks_smallest_greater_version_with_deadline() {
        let snap = snapshot(vec![
            record("1.1.1", false),
            record("2.2.2", true),
            record("4.4.4", true),
            record("6.6.6", false),
        ]);

        let min = |s: &str| {
            min_supported_version(&v(s), &snap)
                .unwrap()
                .map(|r| r.version.clone())
        };
        assert_eq!(min("1.1.1").as_deref(), Some("2.2.2"));
        assert_eq!(min("2.2.2").as_deref(), Some("4.4.4"));
        assert_eq!(min("3.3.3").as_deref(), Some("4.4.4"));
        assert_eq!(min("4.4.4"), None);
        assert_eq!(min("7.0.0"), None);
    }

    #[test]
    fn compares_numerically_not_lexically() {
        let snap = snapshot(vec![record("10.0.0", true), record("9.0.0", true)]);
        let min = min_supported_version(&v("8.0.0"), &snap).unwrap().unwrap();
        assert_eq!(min.version, "9.0.0");
    }

    #[test]
    fn empty_snapshot_has_no_boundary() {
        let snap = PlatformSnapshot::empty(Platform::Android);
        assert!(min_supported_version(&v("1.0.0"), &snap).unwrap().is_none());
    }

    #[test]
    fn malformed_version_with_deadline_is_an_error() {
        let snap = snapshot(vec![record("not-a-version", true)]);
        assert!(min_supported_version(&v("1.0.0"), &snap).is_err());
    }

    #[test]
    fn malformed_version_without_deadline_is_ignored() {
        let snap = snapshot(vec![record("not-a-version", false), record("2.0.0", true)]);
        let min = min_supported_version(&v("1.0.0"), &snap).unwrap().unwrap();
        assert_eq!(min.version, "2.0.0");
    }

    #[test]
    fn result_is_minimal_among_candidates() {
        let versions = ["1.0.0", "1.0.1", "1.2.0", "1.2.0.b", "2.0.0", "3.1.4"];
        let snap = snapshot(versions.iter().map(|s| record(s, true)).collect());

        for client in ["0.9.0", "1.0.0", "1.1.0", "1.2.0", "2.5.0", "9.9.9"] {
            let client_v = v(client);
            let resolved = min_supported_version(&client_v, &snap).unwrap();
            let candidates: Vec<AppVersion> = snap
                .iter()
                .map(|r| r.parsed_version().unwrap())
                .filter(|c| *c > client_v)
                .collect();
            match resolved {
                Some(found) => {
                    let found_v = found.parsed_version().unwrap();
                    assert!(found.expire_at.is_some());
                    assert!(found_v > client_v);
                    assert!(candidates.iter().all(|c| found_v <= *c));
                }
                None => assert!(candidates.is_empty()),
            }
        }
    }
}
