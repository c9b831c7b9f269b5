//! Version ordering for strimzi, Kafka and Kafka IBP versions
//!
//! Strimzi versions look like `strimzi-cluster-operator.v0.23.0-0`: only the
//! trailing `X.Y.Z-B` part is compared. Kafka versions (`2.8.0`) and IBP
//! versions (`2.8`) are dotted numbers, optionally followed by `-B`.

use super::status::StrimziVersion;
use std::cmp::Ordering;
use thiserror::Error;

/// A version string that does not follow the expected format
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("'{0}' does not follow expected Strimzi Version format")]
    Strimzi(String),

    #[error("'{0}' is not a valid version")]
    Malformed(String),
}

/// Parsed dotted version with an optional build number
#[derive(Debug, Clone, PartialEq, Eq)]
struct BuildVersion {
    numbers: Vec<u64>,
    build: u64,
}

impl BuildVersion {
    fn parse(version: &str) -> Result<Self, VersionError> {
        let malformed = || VersionError::Malformed(version.to_string());

        let (dotted, build) = match version.split_once('-') {
            Some((dotted, build)) => (dotted, parse_number(build).ok_or_else(malformed)?),
            None => (version, 0),
        };
        let numbers = dotted
            .split('.')
            .map(|part| parse_number(part).ok_or_else(malformed))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { numbers, build })
    }

    fn compare(&self, other: &Self) -> Ordering {
        let len = self.numbers.len().max(other.numbers.len());
        (0..len)
            .map(|i| {
                let a = self.numbers.get(i).copied().unwrap_or(0);
                let b = other.numbers.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
            .then(self.build.cmp(&other.build))
    }
}

fn parse_number(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Extract the trailing `X.Y.Z-B` part of a strimzi version
fn strimzi_version_number(version: &str) -> Option<&str> {
    let (head, build) = version.rsplit_once('-')?;
    parse_number(build)?;

    // longest trailing run of digits and dots, then keep the last three components
    let run_start = head
        .char_indices()
        .rev()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let run = &head[run_start..];
    let components: Vec<&str> = run.split('.').collect();
    if components.len() < 3 {
        return None;
    }
    let tail = &components[components.len() - 3..];
    if tail.iter().any(|c| parse_number(c).is_none()) {
        return None;
    }

    let tail_len: usize = tail.iter().map(|c| c.len()).sum::<usize>() + 2;
    let start = head.len() - tail_len;
    Some(&version[start..])
}

/// Compare two dotted versions with optional build numbers
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(BuildVersion::parse(a)?.compare(&BuildVersion::parse(b)?))
}

/// Compare two strimzi versions by their `X.Y.Z-B` suffix
pub fn compare_strimzi_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    let a_number = strimzi_version_number(a).ok_or_else(|| VersionError::Strimzi(a.to_string()))?;
    let b_number = strimzi_version_number(b).ok_or_else(|| VersionError::Strimzi(b.to_string()))?;
    compare_versions(a_number, b_number)
}

fn sort_versions(versions: &mut Vec<String>) -> Result<(), VersionError> {
    let mut parsed = versions
        .drain(..)
        .map(|v| BuildVersion::parse(&v).map(|p| (p, v)))
        .collect::<Result<Vec<_>, _>>()?;
    parsed.sort_by(|(a, _), (b, _)| a.compare(b));
    versions.extend(parsed.into_iter().map(|(_, v)| v));
    Ok(())
}

/// Sort strimzi versions ascending, along with the Kafka and IBP versions of each
pub fn strimzi_versions_deep_sort(versions: Vec<StrimziVersion>) -> Result<Vec<StrimziVersion>, VersionError> {
    let mut keyed = versions
        .into_iter()
        .map(|v| {
            let number = strimzi_version_number(&v.version)
                .ok_or_else(|| VersionError::Strimzi(v.version.clone()))?;
            let key = BuildVersion::parse(number)?;
            Ok((key, v))
        })
        .collect::<Result<Vec<_>, VersionError>>()?;
    keyed.sort_by(|(a, _), (b, _)| a.compare(b));

    keyed
        .into_iter()
        .map(|(_, mut version)| {
            sort_versions(&mut version.kafka_versions)?;
            sort_versions(&mut version.kafka_ibp_versions)?;
            Ok(version)
        })
        .collect()
}
