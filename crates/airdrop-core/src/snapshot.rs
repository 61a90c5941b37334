//! Snapshot discovery, parsing, and network validation.
//!
//! A snapshot file looks like:
//!
//! ```json
//! {
//!   "network": "Ethereum",
//!   "contract_address": "0xbc4c...",
//!   "block_height": 19000000,
//!   "snapshot": [["0xholder", ["0x1", "0x2a"]], ...]
//! }
//! ```
//!
//! `snapshot` may instead be an object `{"0xholder": [1, 42], ...}`. The two
//! shapes are resolved once into a [`HolderList`] and normalized into
//! [`Holding`]s; nothing downstream sees the wire shape.
//!
//! String token ids are read as base-16 only in the list-of-pairs shape; an
//! id that is not base-16 is logged and still counted. In the object-map
//! shape string ids are kept verbatim.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{InputModeError, SnapshotError};
use crate::types::{Holding, Snapshot, TokenId};

#[derive(Deserialize)]
struct SnapshotFile {
    network: String,
    contract_address: String,
    snapshot: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    block_height: Option<u64>,
    #[serde(default)]
    chain_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireTokenId {
    Number(serde_json::Number),
    Text(String),
}

type WireHolders = Vec<(String, Vec<WireTokenId>)>;

/// The two holder wire shapes, in file order.
enum HolderList {
    /// `[[address, tokenIds], ...]`
    Pairs(WireHolders),
    /// `{address: tokenIds, ...}`
    Map(WireHolders),
}

impl HolderList {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Array(_) => serde_json::from_value::<WireHolders>(value)
                .map(HolderList::Pairs)
                .map_err(|e| format!("snapshot pairs: {e}")),
            Value::Object(map) => map
                .into_iter()
                .map(|(address, ids)| {
                    serde_json::from_value::<Vec<WireTokenId>>(ids)
                        .map(|ids| (address.clone(), ids))
                        .map_err(|e| format!("holder {address}: {e}"))
                })
                .collect::<Result<WireHolders, String>>()
                .map(HolderList::Map),
            other => Err(format!(
                "snapshot must be an array of [address, tokenIds] pairs or an address map, got {}",
                value_kind(&other)
            )),
        }
    }

    fn normalize(self, file: &str) -> Vec<Holding> {
        match self {
            HolderList::Pairs(pairs) => pairs
                .into_iter()
                .map(|(address, ids)| {
                    let token_ids = ids
                        .into_iter()
                        .map(|id| match id {
                            WireTokenId::Number(n) => TokenId::Number(n.to_string()),
                            WireTokenId::Text(s) => match parse_hex_token_id(&s) {
                                Some(hex) => TokenId::Hex(hex),
                                None => {
                                    warn!(
                                        file = %file,
                                        holder = %address,
                                        token_id = %s,
                                        "token id is not base-16; counted as-is"
                                    );
                                    TokenId::InvalidHex(s)
                                }
                            },
                        })
                        .collect();
                    Holding { address, token_ids }
                })
                .collect(),
            HolderList::Map(entries) => entries
                .into_iter()
                .map(|(address, ids)| Holding {
                    address,
                    token_ids: ids
                        .into_iter()
                        .map(|id| match id {
                            WireTokenId::Number(n) => TokenId::Number(n.to_string()),
                            WireTokenId::Text(s) => TokenId::Raw(s),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse a base-16 token id, with or without a `0x` prefix.
///
/// Returns the canonical form: lowercase, no prefix, no leading zeros.
pub fn parse_hex_token_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let canonical = digits.trim_start_matches('0').to_ascii_lowercase();
    if canonical.is_empty() {
        Some("0".to_string())
    } else {
        Some(canonical)
    }
}

/// Parse snapshot JSON. `source` is recorded on the snapshot and used in errors.
pub fn parse_snapshot(raw: &str, source: &Path) -> Result<Snapshot, SnapshotError> {
    let file = source.display().to_string();
    let parse_err = |reason: String| SnapshotError::Parse {
        file: file.clone(),
        reason,
    };

    let doc: SnapshotFile = serde_json::from_str(raw).map_err(|e| parse_err(e.to_string()))?;
    let holders = HolderList::from_value(doc.snapshot)
        .map_err(parse_err)?
        .normalize(&file);

    Ok(Snapshot {
        source: source.to_path_buf(),
        network: doc.network,
        contract_address: doc.contract_address,
        name: doc.name,
        block_height: doc.block_height,
        chain_id: doc.chain_id,
        holders,
    })
}

/// Read and parse one snapshot file.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot, SnapshotError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| SnapshotError::Unreadable {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let snapshot = parse_snapshot(&raw, path)?;
    debug!(
        file = %path.display(),
        network = %snapshot.network,
        contract = %snapshot.contract_address,
        holders = snapshot.holders.len(),
        tokens = snapshot.token_total(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

/// Load every path in order. The first failure aborts the whole load.
pub fn load_snapshots(paths: &[PathBuf]) -> Result<Vec<Snapshot>, SnapshotError> {
    paths.iter().map(load_snapshot).collect()
}

/// Files in `folder` named `*_{network}.json`, network matched
/// case-insensitively, sorted by file name.
pub fn discover(folder: &Path, network: &str) -> Result<Vec<PathBuf>, SnapshotError> {
    let folder_name = folder.display().to_string();
    let suffix = format!("_{}.json", network.to_lowercase());

    let entries = std::fs::read_dir(folder).map_err(|e| SnapshotError::FolderUnreadable {
        folder: folder_name.clone(),
        reason: e.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SnapshotError::FolderUnreadable {
            folder: folder_name.clone(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.to_lowercase().ends_with(&suffix) {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(SnapshotError::NotFound {
            folder: folder_name,
            network: network.to_string(),
        });
    }
    matches.sort();
    Ok(matches)
}

/// Primary network's files, then each aggregate network's files in the order
/// given. A file matched twice keeps its first position.
pub fn discover_many(
    folder: &Path,
    primary: &str,
    aggregates: &[String],
) -> Result<Vec<PathBuf>, SnapshotError> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for network in std::iter::once(primary).chain(aggregates.iter().map(String::as_str)) {
        for path in discover(folder, network)? {
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }
    Ok(paths)
}

/// Check every snapshot declares the same network, case-insensitively.
///
/// With no `expected` network the first snapshot's declaration is used.
/// Returns the network the run is labelled with.
pub fn validate_networks(
    snapshots: &[Snapshot],
    expected: Option<&str>,
) -> Result<String, SnapshotError> {
    let expected = match expected {
        Some(network) => network.to_string(),
        None => match snapshots.first() {
            Some(first) => first.network.clone(),
            None => return Ok(String::new()),
        },
    };

    for snapshot in snapshots {
        if !snapshot.network.eq_ignore_ascii_case(&expected) {
            return Err(SnapshotError::NetworkMismatch {
                file: snapshot.source_name(),
                expected,
                got: snapshot.network.clone(),
            });
        }
    }
    Ok(expected)
}

/// Where the run's snapshots come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    /// An explicit list of files, optionally labelled with a network.
    Files {
        paths: Vec<PathBuf>,
        network: Option<String>,
    },
    /// Every `*_{network}.json` in a folder, plus aggregate networks.
    Folder {
        folder: PathBuf,
        network: String,
        aggregate_networks: Vec<String>,
    },
}

impl SnapshotSource {
    /// Resolve the snapshot-source flags into one input mode.
    pub fn resolve(
        snapshots: Vec<PathBuf>,
        folder: Option<PathBuf>,
        network: Option<String>,
        aggregate_networks: Vec<String>,
    ) -> Result<Self, InputModeError> {
        let network = network
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let aggregate_networks: Vec<String> = aggregate_networks
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        let snapshots: Vec<PathBuf> = snapshots
            .into_iter()
            .filter(|p| !p.as_os_str().is_empty())
            .collect();

        match (snapshots.is_empty(), folder) {
            (false, Some(_)) => Err(InputModeError::Conflicting),
            (false, None) => {
                if !aggregate_networks.is_empty() {
                    return Err(InputModeError::AggregateWithoutFolder);
                }
                Ok(SnapshotSource::Files {
                    paths: snapshots,
                    network,
                })
            }
            (true, Some(folder)) => {
                let network = network.ok_or(InputModeError::FolderWithoutNetwork)?;
                Ok(SnapshotSource::Folder {
                    folder,
                    network,
                    aggregate_networks,
                })
            }
            (true, None) if !aggregate_networks.is_empty() => {
                Err(InputModeError::AggregateWithoutFolder)
            }
            (true, None) => Err(InputModeError::Missing),
        }
    }

    /// Cross-network aggregation: network validation is skipped.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, SnapshotSource::Folder { aggregate_networks, .. } if !aggregate_networks.is_empty())
    }

    /// Network named on the command line, if any.
    pub fn network(&self) -> Option<&str> {
        match self {
            SnapshotSource::Files { network, .. } => network.as_deref(),
            SnapshotSource::Folder { network, .. } => Some(network),
        }
    }

    /// Snapshot files to load, in processing order.
    pub fn paths(&self) -> Result<Vec<PathBuf>, SnapshotError> {
        match self {
            SnapshotSource::Files { paths, .. } => Ok(paths.clone()),
            SnapshotSource::Folder {
                folder,
                network,
                aggregate_networks,
            } => discover_many(folder, network, aggregate_networks),
        }
    }
}
