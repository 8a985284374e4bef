use std::sync::Barrier;
use std::thread;

use super::common::*;
use crate::workflows::recruitment::capacity::CapacityError;
use crate::workflows::recruitment::domain::{ApplicationId, ApplicationStatus, ErrorKind, JobId};
use crate::workflows::recruitment::lifecycle::{RejectionSource, StatusAction, TransitionError};
use crate::workflows::recruitment::onboarding::OnboardingError;
use crate::workflows::recruitment::scheduler::SchedulingError;
use crate::workflows::recruitment::service::RecruitmentServiceError;

fn hired_with_complete_checklist(harness: &Harness) -> ApplicationId {
    let id = admitted_application(harness);
    harness
        .service
        .apply_action(&id, StatusAction::Accept)
        .expect("accepts");
    harness
        .service
        .complete_checklist(&id)
        .expect("checklist completes");
    id
}

#[test]
fn underage_candidate_is_rejected_on_submission() {
    let harness = harness(5, 2);
    let posting = harness.service.open_job(job_request()).expect("job opens");
    let mut submission = submission(&posting.id);
    submission.profile.age = Some(19);

    let record = harness.service.submit(submission).expect("stored");

    assert_eq!(record.status(), ApplicationStatus::Rejected);
    let rejection = record.stage.rejection().expect("reason recorded");
    assert_eq!(rejection.source, RejectionSource::Eligibility);
    assert!(rejection.reason.contains("21"));
    assert!(record.stage.schedule().is_none());
    assert!(record.stage.onboarding().is_none());
}

#[test]
fn online_interview_without_link_leaves_status_unchanged() {
    let harness = harness(5, 2);
    let id = admitted_application(&harness);

    let err = harness
        .service
        .schedule_interview(&id, online_interview(None))
        .expect_err("link required");

    assert!(matches!(
        err,
        RecruitmentServiceError::Scheduling(SchedulingError::MissingMeetingLink)
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        harness.applications.stored(&id).status(),
        ApplicationStatus::Applied
    );
}

#[test]
fn first_schedule_moves_to_interview_and_reschedule_keeps_status() {
    let harness = harness(5, 2);
    let id = admitted_application(&harness);
    harness
        .service
        .apply_action(&id, StatusAction::Screen)
        .expect("screens");

    let record = harness
        .service
        .schedule_interview(&id, online_interview(Some("https://meet.example/hr-1")))
        .expect("schedules");
    assert_eq!(record.status(), ApplicationStatus::Interview);

    let mut moved = online_interview(Some("https://meet.example/hr-2"));
    moved.date = chrono::NaiveDate::from_ymd_opt(2026, 10, 24).expect("valid date");
    let record = harness
        .service
        .apply_action(&id, StatusAction::Interview { schedule: moved })
        .expect("reschedules");
    assert_eq!(record.status(), ApplicationStatus::Interview);
    assert_eq!(
        record.stage.schedule().map(|slot| slot.date),
        chrono::NaiveDate::from_ymd_opt(2026, 10, 24)
    );
}

#[test]
fn accept_creates_three_item_checklist_at_zero() {
    let harness = harness(5, 2);
    let id = admitted_application(&harness);

    let record = harness
        .service
        .apply_action(&id, StatusAction::Accept)
        .expect("accepts");

    let onboarding = record.stage.onboarding().expect("onboarding created");
    assert_eq!(onboarding.checklist().total(), 3);
    assert_eq!(onboarding.checklist().completed(), 0);
    assert_eq!(onboarding.progress_percent(), 0);
}

#[test]
fn partial_checklist_blocks_conversion() {
    let harness = harness(5, 2);
    let id = admitted_application(&harness);
    harness
        .service
        .apply_action(&id, StatusAction::Accept)
        .expect("accepts");

    harness
        .service
        .toggle_checklist_item(&id, "contract_signed", true)
        .expect("known item");
    let record = harness
        .service
        .toggle_checklist_item(&id, "inventory_handover", true)
        .expect("known item");
    assert_eq!(
        record.stage.onboarding().map(|onboarding| onboarding.progress_percent()),
        Some(67)
    );

    let err = harness
        .service
        .convert_to_staff(&id)
        .expect_err("checklist incomplete");
    assert!(matches!(
        err,
        RecruitmentServiceError::Onboarding(OnboardingError::ChecklistIncomplete { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::PreconditionNotMet);
    assert_eq!(
        harness.divisions.get(&finance()).expect("known").current_staff_count,
        2
    );
    assert!(harness.provisioner.events().is_empty());
}

#[test]
fn full_division_refuses_conversion_until_capacity_grows() {
    let harness = harness(3, 2);
    let id = hired_with_complete_checklist(&harness);

    harness
        .divisions
        .critical_section(&finance(), |division| division.admit_staff())
        .expect("last slot filled");
    assert_eq!(
        harness.divisions.get(&finance()).expect("known").available_slots,
        0
    );

    let err = harness
        .service
        .convert_to_staff(&id)
        .expect_err("no slots left");
    assert!(matches!(
        err,
        RecruitmentServiceError::Capacity(CapacityError::CapacityExceeded { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    let stored = harness.applications.stored(&id);
    assert!(!stored
        .stage
        .onboarding()
        .expect("still hired")
        .is_converted_to_staff());

    harness
        .divisions
        .set_capacity(&finance(), 4)
        .expect("capacity raised");
    let conversion = harness.service.convert_to_staff(&id).expect("converts");

    assert_eq!(conversion.account.division_id, finance());
    assert_eq!(conversion.account.position, "Accounting Staff");
    assert_eq!(conversion.account.email, "ayu.pratiwi@example.com");
    let view = harness.divisions.get(&finance()).expect("known");
    assert_eq!(view.current_staff_count, 4);
    assert_eq!(view.available_slots, 0);
    assert_eq!(harness.provisioner.events().len(), 1);
}

#[test]
fn racing_conversions_for_last_slot_admit_exactly_one() {
    let harness = harness(3, 1);
    let first = hired_with_complete_checklist(&harness);
    let second = hired_with_complete_checklist(&harness);
    harness
        .divisions
        .critical_section(&finance(), |division| division.admit_staff())
        .expect("one slot left");

    let ids = [first, second];
    let barrier = Barrier::new(2);
    let outcomes: Vec<bool> = thread::scope(|scope| {
        let handles: Vec<_> = ids
            .iter()
            .map(|id| {
                let service = harness.service.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    service.convert_to_staff(id).is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread joins"))
            .collect()
    });

    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let view = harness.divisions.get(&finance()).expect("known");
    assert_eq!(view.current_staff_count, 3);
    assert_eq!(view.available_slots, 0);
    assert_eq!(harness.provisioner.events().len(), 1);
}

#[test]
fn duplicate_conversion_is_refused() {
    let harness = harness(5, 0);
    let id = hired_with_complete_checklist(&harness);

    harness.service.convert_to_staff(&id).expect("first converts");
    let err = harness
        .service
        .convert_to_staff(&id)
        .expect_err("already converted");

    assert!(matches!(
        err,
        RecruitmentServiceError::Onboarding(OnboardingError::AlreadyConverted)
    ));
    assert_eq!(
        harness.divisions.get(&finance()).expect("known").current_staff_count,
        1
    );
    assert_eq!(harness.provisioner.events().len(), 1);
}

#[test]
fn provisioning_failure_rolls_back_slot_and_record() {
    let harness = harness_with(5, 2, MemoryProvisioner::failing());
    let id = hired_with_complete_checklist(&harness);

    let err = harness
        .service
        .convert_to_staff(&id)
        .expect_err("provisioner offline");

    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(
        harness.divisions.get(&finance()).expect("known").current_staff_count,
        2
    );
    let stored = harness.applications.stored(&id);
    let onboarding = stored.stage.onboarding().expect("still hired");
    assert!(!onboarding.is_converted_to_staff());
    assert_eq!(onboarding.progress_percent(), 100);
}

#[test]
fn account_is_provisioned_before_conversion_is_visible() {
    let harness = harness(5, 2);
    harness.provisioner.observe(harness.applications.clone());
    let id = hired_with_complete_checklist(&harness);

    harness.service.convert_to_staff(&id).expect("converts");

    assert_eq!(harness.provisioner.stored_converted(), vec![false]);
    let stored = harness.applications.stored(&id);
    let onboarding = stored.stage.onboarding().expect("still hired");
    assert!(onboarding.is_converted_to_staff());
    assert!(onboarding.converted_at().is_some());
}

#[test]
fn failed_provisioning_never_exposes_a_converted_record() {
    let harness = harness_with(5, 2, MemoryProvisioner::failing());
    harness.provisioner.observe(harness.applications.clone());
    let id = hired_with_complete_checklist(&harness);

    harness
        .service
        .convert_to_staff(&id)
        .expect_err("provisioner offline");

    assert_eq!(harness.provisioner.stored_converted(), vec![false]);
    assert!(harness
        .service
        .get(&id)
        .expect("still stored")
        .stage
        .onboarding()
        .and_then(|onboarding| onboarding.converted_at())
        .is_none());
}

#[test]
fn terminal_applications_refuse_further_actions() {
    let harness = harness(5, 2);
    let id = admitted_application(&harness);
    harness
        .service
        .apply_action(
            &id,
            StatusAction::Reject {
                reason: Some("Position filled internally".to_string()),
            },
        )
        .expect("rejects");

    let err = harness
        .service
        .apply_action(&id, StatusAction::Accept)
        .expect_err("terminal");
    assert!(matches!(
        err,
        RecruitmentServiceError::Transition(TransitionError::IllegalTransition {
            from: ApplicationStatus::Rejected,
            ..
        })
    ));
    assert_eq!(err.kind(), ErrorKind::IllegalTransition);
}

#[test]
fn rejection_requires_reason() {
    let harness = harness(5, 2);
    let id = admitted_application(&harness);

    let err = harness
        .service
        .apply_action(&id, StatusAction::Reject { reason: None })
        .expect_err("reason required");

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        harness.applications.stored(&id).status(),
        ApplicationStatus::Applied
    );
}

#[test]
fn checklist_updates_require_hired_status() {
    let harness = harness(5, 2);
    let id = admitted_application(&harness);

    let err = harness
        .service
        .toggle_checklist_item(&id, "contract_signed", true)
        .expect_err("not hired");
    assert_eq!(err.kind(), ErrorKind::IllegalTransition);
}

#[test]
fn job_opening_requires_free_slot() {
    let harness = harness(2, 2);

    let err = harness
        .service
        .open_job(job_request())
        .expect_err("division full");
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
}

#[test]
fn closed_or_unknown_postings_refuse_submissions() {
    let harness = harness(5, 2);
    let posting = harness.service.open_job(job_request()).expect("job opens");
    harness.service.close_job(&posting.id).expect("closes");

    let err = harness
        .service
        .submit(submission(&posting.id))
        .expect_err("posting closed");
    assert!(matches!(err, RecruitmentServiceError::JobClosed(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = harness
        .service
        .submit(submission(&JobId("job-missing".to_string())))
        .expect_err("unknown posting");
    assert!(matches!(err, RecruitmentServiceError::UnknownJob(_)));
}

#[test]
fn edited_criteria_apply_to_later_submissions_only() {
    let harness = harness(5, 2);
    let posting = harness.service.open_job(job_request()).expect("job opens");
    let early = harness
        .service
        .submit(submission(&posting.id))
        .expect("stored");

    let mut stricter = job_request();
    stricter.eligibility.min_experience_years = Some(5);
    harness
        .service
        .edit_job(&posting.id, stricter)
        .expect("edits");

    let late = harness
        .service
        .submit(submission(&posting.id))
        .expect("stored");

    assert_eq!(
        harness.applications.stored(&early.id).status(),
        ApplicationStatus::Applied
    );
    assert_eq!(late.status(), ApplicationStatus::Rejected);
}
