//! Domain model (ids, artifact records, gate decisions, outcomes, errors).

pub mod artifact;
pub mod errors;
pub mod gate;
pub mod ids;
pub mod outcome;

pub use artifact::{Artifact, ArtifactKind, ArtifactStatus, FileMeta, Payload, TextBody};
pub use errors::ShareError;
pub use gate::{Admission, GateDecision, Verdict};
pub use ids::{ArtifactId, BlobKey};
pub use outcome::{AccessOutcome, AccessPayload, CreateOptions, Created, Removal, SweepReport};
