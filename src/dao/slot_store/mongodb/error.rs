use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for MongoDB slot-store operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Errors raised by the MongoDB slot-store backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// Offending URI.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The client could not be constructed from the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The bootstrap ping never succeeded.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Driver error from the last attempt.
        #[source]
        source: MongoError,
    },
    /// A supervision ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The conditional reservation write failed.
    #[error("failed to reserve block `{block_id}`")]
    Reserve {
        /// Block the caller attempted to claim.
        block_id: u32,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading the reservations collection failed.
    #[error("failed to read the reservations snapshot")]
    Snapshot {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Clearing the reservations collection failed.
    #[error("failed to reset reservations")]
    Reset {
        /// Driver error.
        #[source]
        source: MongoError,
    },
}
