//! AccessGate - アクセス可否の判定
//!
//! 判定は純粋関数 [`evaluate`] で行い、カウントの更新は [`check_and_consume`] で
//! 同じ呼び出しの中で行います。ArtifactStore 実装は自分のロック（または条件付き更新）の
//! 内側で `check_and_consume` を呼ぶことで、check と increment を 1 つの原子操作にします。
//!
//! # 判定順序
//! 1. `expires_at` を過ぎていれば `Expired`（カウントに関係なく）
//! 2. `max_access` に達していれば `LimitReached`
//! 3. それ以外は `Allowed`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::Artifact;

/// Pure verdict (no mutation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allowed,
    Expired,
    LimitReached,
}

impl Verdict {
    /// Both denials are terminal: time only moves forward and the count never decreases.
    pub fn is_permanent_denial(self) -> bool {
        matches!(self, Verdict::Expired | Verdict::LimitReached)
    }
}

/// Result of an atomic check-and-consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "access_count", rename_all = "snake_case")]
pub enum GateDecision {
    /// Access granted; carries the new access count.
    Allowed(u64),
    Expired,
    LimitReached,
}

/// Decision plus the record as it stands right after the decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub decision: GateDecision,
    pub artifact: Artifact,
}

pub fn evaluate(artifact: &Artifact, now: DateTime<Utc>) -> Verdict {
    if let Some(expires_at) = artifact.expires_at
        && now >= expires_at
    {
        return Verdict::Expired;
    }
    if let Some(max_access) = artifact.max_access
        && artifact.access_count >= max_access
    {
        return Verdict::LimitReached;
    }
    Verdict::Allowed
}

/// Evaluate and, when allowed, increment `access_count` in place.
///
/// Callers must hold exclusive access to `artifact` for the whole call.
pub fn check_and_consume(artifact: &mut Artifact, now: DateTime<Utc>) -> GateDecision {
    match evaluate(artifact, now) {
        Verdict::Expired => GateDecision::Expired,
        Verdict::LimitReached => GateDecision::LimitReached,
        Verdict::Allowed => {
            artifact.access_count = artifact.access_count.saturating_add(1);
            GateDecision::Allowed(artifact.access_count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtifactId, Payload, TextBody};
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn artifact(expires_in: Option<i64>, max_access: Option<u64>, count: u64) -> Artifact {
        let mut a = Artifact::new(
            ArtifactId::from_u128(7),
            now(),
            Payload::Text(TextBody {
                title: "T".to_string(),
                content: "C".to_string(),
            }),
        )
        .with_expires_at(expires_in.map(|h| now() + Duration::hours(h)))
        .with_max_access(max_access);
        a.access_count = count;
        a
    }

    #[rstest]
    #[case::unlimited(None, None, 1_000, Verdict::Allowed)]
    #[case::under_limit(None, Some(3), 2, Verdict::Allowed)]
    #[case::at_limit(None, Some(3), 3, Verdict::LimitReached)]
    #[case::not_yet_expired(Some(1), None, 0, Verdict::Allowed)]
    fn evaluate_at_creation_time(
        #[case] expires_in: Option<i64>,
        #[case] max_access: Option<u64>,
        #[case] count: u64,
        #[case] expected: Verdict,
    ) {
        let a = artifact(expires_in, max_access, count);
        assert_eq!(evaluate(&a, now()), expected);
    }

    #[rstest]
    #[case::fresh(0)]
    #[case::exhausted(5)]
    fn expiry_wins_over_count(#[case] count: u64) {
        let a = artifact(Some(1), Some(5), count);
        assert_eq!(evaluate(&a, now() + Duration::hours(2)), Verdict::Expired);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let a = artifact(Some(1), None, 0);
        assert_eq!(evaluate(&a, now() + Duration::hours(1)), Verdict::Expired);
        assert_eq!(
            evaluate(&a, now() + Duration::hours(1) - Duration::milliseconds(1)),
            Verdict::Allowed
        );
    }

    #[test]
    fn consume_increments_only_when_allowed() {
        let mut a = artifact(None, Some(2), 0);
        assert_eq!(check_and_consume(&mut a, now()), GateDecision::Allowed(1));
        assert_eq!(check_and_consume(&mut a, now()), GateDecision::Allowed(2));
        assert_eq!(check_and_consume(&mut a, now()), GateDecision::LimitReached);
        assert_eq!(a.access_count, 2);
    }

    #[test]
    fn consume_on_expired_leaves_count_untouched() {
        let mut a = artifact(Some(1), None, 4);
        let decision = check_and_consume(&mut a, now() + Duration::days(1));
        assert_eq!(decision, GateDecision::Expired);
        assert_eq!(a.access_count, 4);
    }

    #[test]
    fn permanent_denials() {
        assert!(!Verdict::Allowed.is_permanent_denial());
        assert!(Verdict::Expired.is_permanent_denial());
        assert!(Verdict::LimitReached.is_permanent_denial());
    }
}
