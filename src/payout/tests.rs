//! Unit tests for the payout workflow.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::predicate::{always, eq};
use rstest::{fixture, rstest};
use tokio::sync::Barrier;

use super::models::test_support::summary;
use super::{
    BucketView, ClaimOutcome, ClaimRequest, ContributorId, MockIdentityResolver,
    MockPayoutGateway, PayoutError, PayoutGateway, PayoutStatus, PayoutWorkflow, PullRequestId,
    PullRequestSummary, StaticIdentity, ViewKind,
};
use crate::telemetry::TelemetryEvent;
use crate::telemetry::test_support::RecordingTelemetrySink;
use crate::wallet::WalletBinding;

fn contributor() -> ContributorId {
    ContributorId::new("gh-42").expect("contributor should be valid")
}

#[fixture]
fn signed_in() -> StaticIdentity {
    StaticIdentity::signed_in(contributor())
}

#[fixture]
fn wallet() -> WalletBinding {
    WalletBinding::new()
}

/// Backend holding `{A: requested, B: ineligible, C: claimable}` for gh-42.
fn seeded_gateway() -> MockPayoutGateway {
    let mut gateway = MockPayoutGateway::new();
    gateway
        .expect_pull_requests()
        .with(eq(contributor()), always())
        .returning(|_, status| {
            let prs = match status {
                PayoutStatus::Requested => vec![summary(1, "A", status)],
                PayoutStatus::Ineligible => vec![summary(2, "B", status)],
                PayoutStatus::Claimable => vec![summary(3, "C", status)],
                PayoutStatus::Paid => Vec::new(),
            };
            Ok(prs)
        });
    gateway
}

fn ids(prs: Option<&[PullRequestSummary]>) -> Vec<u64> {
    prs.unwrap_or_default().iter().map(|pr| pr.id.get()).collect()
}

fn accepted_claim() -> ClaimOutcome {
    ClaimOutcome {
        success: true,
        message: "PR successfully claimed".to_owned(),
        review_id: Some(11),
        status: Some("claimed".to_owned()),
    }
}

#[rstest]
#[tokio::test]
async fn dashboard_partitions_contributor_pull_requests(
    signed_in: StaticIdentity,
    wallet: WalletBinding,
) {
    let gateway = seeded_gateway();
    let workflow = PayoutWorkflow::new(&signed_in, &gateway, &wallet);

    let view = workflow
        .load(ViewKind::All)
        .await
        .expect("view should load");

    assert_eq!(view.contributor(), &contributor());
    assert_eq!(ids(view.pull_requests(PayoutStatus::Requested)), vec![1]);
    assert_eq!(ids(view.pull_requests(PayoutStatus::Ineligible)), vec![2]);
    assert_eq!(ids(view.pull_requests(PayoutStatus::Claimable)), vec![3]);
    assert_eq!(ids(view.pull_requests(PayoutStatus::Paid)), Vec::<u64>::new());
    assert!(view.duplicate_ids().is_empty(), "buckets must not overlap");
    assert_eq!(
        view.all_ids(),
        [1, 2, 3].into_iter().map(PullRequestId::new).collect::<BTreeSet<_>>()
    );
}

#[rstest]
#[case(ViewKind::Review, vec![PayoutStatus::Requested, PayoutStatus::Ineligible])]
#[case(ViewKind::Rewards, vec![PayoutStatus::Claimable, PayoutStatus::Paid])]
#[tokio::test]
async fn named_views_query_only_their_statuses(
    signed_in: StaticIdentity,
    wallet: WalletBinding,
    #[case] kind: ViewKind,
    #[case] expected: Vec<PayoutStatus>,
) {
    let mut gateway = MockPayoutGateway::new();
    let allowed = expected.clone();
    gateway
        .expect_pull_requests()
        .withf(move |_, status| allowed.contains(status))
        .times(2)
        .returning(|_, _| Ok(Vec::new()));
    let workflow = PayoutWorkflow::new(&signed_in, &gateway, &wallet);

    let view = workflow.load(kind).await.expect("view should load");
    let statuses: Vec<_> = view.buckets().iter().map(|bucket| bucket.status).collect();
    assert_eq!(statuses, expected);
}

#[rstest]
#[tokio::test]
async fn empty_bucket_is_empty_not_error(signed_in: StaticIdentity, wallet: WalletBinding) {
    let gateway = seeded_gateway();
    let workflow = PayoutWorkflow::new(&signed_in, &gateway, &wallet);

    let paid = workflow
        .fetch_bucket(&contributor(), PayoutStatus::Paid)
        .await;
    assert_eq!(paid, Ok(Vec::new()));
}

#[rstest]
#[tokio::test]
async fn failed_bucket_keeps_successful_buckets(
    signed_in: StaticIdentity,
    wallet: WalletBinding,
) {
    let mut gateway = MockPayoutGateway::new();
    gateway.expect_pull_requests().returning(|_, status| {
        if status == PayoutStatus::Ineligible {
            Err(PayoutError::BackendUnavailable {
                message: "connection reset".to_owned(),
            })
        } else {
            Ok(vec![summary(1, "A", status)])
        }
    });
    let workflow = PayoutWorkflow::new(&signed_in, &gateway, &wallet);

    let view = workflow
        .load(ViewKind::Review)
        .await
        .expect("view should load");

    assert_eq!(ids(view.pull_requests(PayoutStatus::Requested)), vec![1]);
    assert!(matches!(
        view.bucket(PayoutStatus::Ineligible),
        Some(Err(PayoutError::BackendUnavailable { .. }))
    ));
    assert!(!view.is_complete());
    assert_eq!(view.failures().len(), 1);
}

#[rstest]
#[tokio::test]
async fn backend_misclassification_is_surfaced_not_corrected(
    signed_in: StaticIdentity,
    wallet: WalletBinding,
) {
    let mut gateway = MockPayoutGateway::new();
    gateway
        .expect_pull_requests()
        .returning(|_, status| Ok(vec![summary(7, "moving", status)]));
    let workflow = PayoutWorkflow::new(&signed_in, &gateway, &wallet);

    let view = workflow
        .load(ViewKind::Review)
        .await
        .expect("view should load");

    assert_eq!(ids(view.pull_requests(PayoutStatus::Requested)), vec![7]);
    assert_eq!(ids(view.pull_requests(PayoutStatus::Ineligible)), vec![7]);
    assert_eq!(
        view.duplicate_ids().get(&PullRequestId::new(7)),
        Some(&vec![PayoutStatus::Requested, PayoutStatus::Ineligible])
    );
}

#[rstest]
#[tokio::test]
async fn unauthenticated_view_issues_no_queries(wallet: WalletBinding) {
    let identity = StaticIdentity::signed_out();
    let mut gateway = MockPayoutGateway::new();
    gateway.expect_pull_requests().times(0);
    let workflow = PayoutWorkflow::new(&identity, &gateway, &wallet);

    let result = workflow.load(ViewKind::All).await;
    assert_eq!(result, Err(PayoutError::Unauthenticated));
}

#[rstest]
#[tokio::test]
async fn identity_provider_failures_propagate(wallet: WalletBinding) {
    let mut identity = MockIdentityResolver::new();
    identity.expect_resolve().times(1).returning(|| {
        Err(PayoutError::IdentityProvider {
            message: "timeout".to_owned(),
        })
    });
    let mut gateway = MockPayoutGateway::new();
    gateway.expect_pull_requests().times(0);
    let workflow = PayoutWorkflow::new(&identity, &gateway, &wallet);

    let result = workflow.load(ViewKind::Review).await;
    assert!(matches!(result, Err(PayoutError::IdentityProvider { .. })));
}

/// Gateway whose queries only complete once every expected query is in
/// flight, proving the workflow does not issue them one at a time.
struct RendezvousGateway {
    barrier: Barrier,
}

#[async_trait]
impl PayoutGateway for RendezvousGateway {
    async fn pull_requests(
        &self,
        _contributor: &ContributorId,
        status: PayoutStatus,
    ) -> Result<Vec<PullRequestSummary>, PayoutError> {
        self.barrier.wait().await;
        Ok(vec![summary(1, status.as_str(), status)])
    }

    async fn claim(&self, _request: &ClaimRequest) -> Result<ClaimOutcome, PayoutError> {
        Err(PayoutError::BackendUnavailable {
            message: "not used".to_owned(),
        })
    }
}

#[rstest]
#[tokio::test]
async fn bucket_queries_run_concurrently(signed_in: StaticIdentity, wallet: WalletBinding) {
    let gateway = RendezvousGateway {
        barrier: Barrier::new(PayoutStatus::ALL.len()),
    };
    let workflow = PayoutWorkflow::new(&signed_in, &gateway, &wallet);

    let view: BucketView =
        tokio::time::timeout(Duration::from_secs(1), workflow.load(ViewKind::All))
            .await
            .expect("sequential queries would never pass the barrier")
            .expect("view should load");
    assert!(view.is_complete());
}

#[rstest]
#[case(1)]
#[case(42)]
#[case(u64::MAX)]
#[tokio::test]
async fn claim_without_wallet_never_reaches_network(wallet: WalletBinding, #[case] pr_id: u64) {
    let mut identity = MockIdentityResolver::new();
    identity.expect_resolve().times(0);
    let mut gateway = MockPayoutGateway::new();
    gateway.expect_claim().times(0);
    let workflow = PayoutWorkflow::new(&identity, &gateway, &wallet);

    let result = workflow.claim(PullRequestId::new(pr_id)).await;
    assert_eq!(result, Err(PayoutError::WalletNotConnected));
    assert!(
        PayoutError::WalletNotConnected.is_recoverable(),
        "connecting a wallet recovers"
    );
}

#[rstest]
#[tokio::test]
async fn claim_forwards_bound_wallet_and_returns_outcome(
    signed_in: StaticIdentity,
    wallet: WalletBinding,
) {
    wallet.connect("0xABC");
    let mut gateway = MockPayoutGateway::new();
    gateway
        .expect_claim()
        .withf(|request| {
            request.contributor.as_str() == "gh-42"
                && request.pr_id == PullRequestId::new(3)
                && request.wallet_address.as_str() == "0xABC"
        })
        .times(1)
        .returning(|_| Ok(accepted_claim()));
    let workflow = PayoutWorkflow::new(&signed_in, &gateway, &wallet);

    let outcome = workflow.claim(PullRequestId::new(3)).await;
    assert_eq!(outcome, Ok(accepted_claim()));
}

#[rstest]
#[tokio::test]
async fn claim_after_disconnect_is_gated(signed_in: StaticIdentity, wallet: WalletBinding) {
    wallet.connect("0xABC");
    wallet.disconnect();
    let mut gateway = MockPayoutGateway::new();
    gateway.expect_claim().times(0);
    let workflow = PayoutWorkflow::new(&signed_in, &gateway, &wallet);

    assert_eq!(
        workflow.claim(PullRequestId::new(3)).await,
        Err(PayoutError::WalletNotConnected)
    );
}

#[rstest]
#[tokio::test]
async fn claim_without_session_is_unauthenticated(wallet: WalletBinding) {
    wallet.connect("0xABC");
    let identity = StaticIdentity::signed_out();
    let mut gateway = MockPayoutGateway::new();
    gateway.expect_claim().times(0);
    let workflow = PayoutWorkflow::new(&identity, &gateway, &wallet);

    assert_eq!(
        workflow.claim(PullRequestId::new(3)).await,
        Err(PayoutError::Unauthenticated)
    );
}

#[rstest]
#[tokio::test]
async fn claim_failures_are_not_retried(signed_in: StaticIdentity, wallet: WalletBinding) {
    wallet.connect("0xABC");
    let mut gateway = MockPayoutGateway::new();
    gateway.expect_claim().times(1).returning(|_| {
        Err(PayoutError::BackendUnavailable {
            message: "503".to_owned(),
        })
    });
    let workflow = PayoutWorkflow::new(&signed_in, &gateway, &wallet);

    let result = workflow.claim(PullRequestId::new(3)).await;
    assert!(matches!(
        result,
        Err(PayoutError::BackendUnavailable { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn telemetry_records_buckets_and_claims(signed_in: StaticIdentity, wallet: WalletBinding) {
    wallet.connect("0xABC");
    let mut gateway = seeded_gateway();
    gateway.expect_claim().returning(|_| Ok(accepted_claim()));
    let sink = Arc::new(RecordingTelemetrySink::default());
    let workflow =
        PayoutWorkflow::new(&signed_in, &gateway, &wallet).with_telemetry(sink.clone());

    workflow
        .load(ViewKind::Rewards)
        .await
        .expect("view should load");
    workflow
        .claim(PullRequestId::new(3))
        .await
        .expect("claim should succeed");

    assert_eq!(
        sink.take(),
        vec![
            TelemetryEvent::BucketLoaded {
                status: PayoutStatus::Claimable,
                count: 1
            },
            TelemetryEvent::BucketLoaded {
                status: PayoutStatus::Paid,
                count: 0
            },
            TelemetryEvent::ClaimSubmitted {
                pr_id: 3,
                success: true
            },
        ]
    );
}
