//! Error types for the airdrop engine.
//!
//! One enum per pipeline concern, unified by [`DropError`]. Every variant
//! aborts the run; nothing here is retried.
use thiserror::Error;

/// The rewards config file could not be read or parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cannot read rewards config {path}: {reason}")] Unreadable { path: String, reason: String },
    #[error("cannot parse rewards config {path}: {reason}")] Malformed { path: String, reason: String },
}

/// The rewards config parsed but violates a table invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("rewards config has no contracts")] NoContracts,
    #[error("contract {contract} has an empty reward vector")] EmptyRewardVector { contract: String },
    #[error("contract {contract} has {got} reward tokens, expected {expected}")] LengthMismatch { contract: String, expected: usize, got: usize },
    #[error("contract {contract} is configured more than once (addresses are case-insensitive)")] DuplicateContract { contract: String },
}

/// The snapshot-source flags are conflicting or incomplete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputModeError {
    #[error("--snapshots cannot be combined with --snapshots-folder")] Conflicting,
    #[error("either --snapshots or --snapshots-folder with --network is required")] Missing,
    #[error("--snapshots-folder requires --network")] FolderWithoutNetwork,
    #[error("--aggregate-networks requires --snapshots-folder and --network")] AggregateWithoutFolder,
    #[error("--snapshots list is empty")] EmptySnapshotList,
    #[error("token cap must be greater than zero")] InvalidCap,
}

/// Snapshot discovery or parsing failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// No file in the folder matched `*_{network}.json`.
    #[error("no snapshot files matching *_{network}.json in {folder}")]
    NotFound {
        /// Folder that was scanned.
        folder: String,
        /// Network token that was searched for.
        network: String,
    },

    /// The folder itself could not be listed.
    #[error("cannot list snapshot folder {folder}: {reason}")]
    FolderUnreadable { folder: String, reason: String },

    /// The snapshot file could not be read.
    #[error("cannot read snapshot {file}: {reason}")]
    Unreadable { file: String, reason: String },

    /// The snapshot file is not a valid snapshot document.
    #[error("cannot parse snapshot {file}: {reason}")]
    Parse { file: String, reason: String },

    /// A snapshot declares a different network than the run expects.
    #[error("snapshot {file} declares network {got}, expected {expected}")]
    NetworkMismatch {
        file: String,
        expected: String,
        got: String,
    },
}

/// Writing an output artifact failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutputError {
    #[error("cannot create output directory {path}: {reason}")] CreateDir { path: String, reason: String },
    #[error("cannot write {path}: {reason}")] Write { path: String, reason: String },
    #[error("cannot read {path}: {reason}")] Read { path: String, reason: String },
}

/// Top-level error for a pipeline run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DropError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] ConfigValidation(#[from] ConfigValidationError),
    #[error(transparent)] InputMode(#[from] InputModeError),
    #[error(transparent)] Snapshot(#[from] SnapshotError),
    #[error(transparent)] Output(#[from] OutputError),
    #[error("no eligible holders after aggregation")] EmptyResult,
    #[error("reward overflow for holder {address} at token index {index}")] RewardOverflow { address: String, index: usize },
}

impl DropError {
    /// Process exit status for this error: 2 for usage errors, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            DropError::InputMode(_) => 2,
            _ => 1,
        }
    }
}
