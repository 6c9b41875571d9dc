use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use hiring_pipeline::{
    config::EngineSettings,
    database::{
        memory_store::MemoryApplicationStore,
        store::{AnalyticsScope, ApplicationStore, NewApplication, NoteFilter, StageRotation},
    },
    dto::{
        application_dto::SubmitApplicationPayload,
        document_dto::AttachDocumentPayload,
        interview_dto::{
            CompleteInterviewPayload, RescheduleInterviewPayload, ScheduleInterviewPayload,
            UpdateInterviewPayload,
        },
        note_dto::{CreateNotePayload, UpdateNotePayload},
    },
    error::Error,
    models::{
        application::ApplicationStatus,
        document::DocumentType,
        interview::{InterviewStatus, InterviewType},
    },
    services::notification_service::{NotificationEvent, RecordingNotifier},
    utils::time::now,
    AppState,
};

const EMPLOYER: i64 = 900;

fn setup() -> (AppState, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let state = AppState::new(
        Arc::new(MemoryApplicationStore::new()),
        notifier.clone(),
        EngineSettings::default(),
        "test_secret_key",
    );
    (state, notifier)
}

fn submission(job_id: i64, score: i64) -> SubmitApplicationPayload {
    SubmitApplicationPayload {
        job_id,
        company_id: Some(1),
        match_score: Decimal::from(score),
        source: Some("linkedin".to_string()),
        documents: Vec::new(),
    }
}

fn note(content: &str, stage_id: Option<i64>) -> CreateNotePayload {
    CreateNotePayload {
        stage_id,
        content: content.to_string(),
        note_type: None,
        visibility: None,
        sentiment: None,
        is_pinned: false,
    }
}

fn interview_at(at: chrono::DateTime<chrono::Utc>) -> ScheduleInterviewPayload {
    ScheduleInterviewPayload {
        stage_id: None,
        interviewer_id: Some(EMPLOYER),
        scheduled_at: at,
        interview_type: InterviewType::Online,
        location: None,
        meeting_link: None,
        duration_minutes: None,
    }
}

async fn advance(state: &AppState, id: i64, path: &[ApplicationStatus]) {
    for status in path {
        state
            .transition_service
            .transition(id, *status, Some(EMPLOYER), None)
            .await
            .expect("legal transition");
    }
}

#[tokio::test]
async fn submit_then_screen_rotates_the_open_stage() {
    let (state, notifier) = setup();

    let mut payload = submission(10, 72);
    payload.documents.push(AttachDocumentPayload {
        document_type: DocumentType::Cv,
        file_name: "cv.pdf".to_string(),
        file_url: "https://files.example.com/cv.pdf".to_string(),
        file_type: Some("application/pdf".to_string()),
        file_size: 2048,
    });
    let submitted = state.transition_service.submit(1, payload).await.unwrap();
    let app_id = submitted.application.id;
    assert_eq!(submitted.application.status, ApplicationStatus::Applied);
    assert_eq!(submitted.stage.stage_name, ApplicationStatus::Applied);
    assert!(submitted.stage.is_open());
    assert_eq!(submitted.documents.len(), 1);
    assert_eq!(submitted.documents[0].application_id, app_id);

    let outcome = state
        .transition_service
        .transition(app_id, ApplicationStatus::Screening, Some(EMPLOYER), Some("looks good".to_string()))
        .await
        .unwrap();
    assert_eq!(outcome.previous_status, ApplicationStatus::Applied);
    assert_eq!(outcome.application.status, ApplicationStatus::Screening);
    assert_eq!(outcome.stage.handled_by, Some(EMPLOYER));

    let history = state.stage_service.stage_history(app_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(!history[0].is_open());
    assert!(history[0].duration_seconds.is_some());
    assert!(history[1].is_open());
    assert_eq!(history.iter().filter(|s| s.is_open()).count(), 1);

    let duplicate = state.transition_service.submit(1, submission(10, 50)).await;
    assert!(matches!(duplicate, Err(Error::DuplicateApplication { job_id: 10, user_id: 1 })));

    let events = notifier.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], NotificationEvent::ApplicationReceived { .. }));
    assert_eq!(
        events[1],
        NotificationEvent::StatusChanged {
            application_id: app_id,
            user_id: 1,
            from: ApplicationStatus::Applied,
            to: ApplicationStatus::Screening,
        }
    );
}

#[tokio::test]
async fn illegal_transition_writes_nothing() {
    let (state, notifier) = setup();
    let app = state.transition_service.submit(2, submission(11, 60)).await.unwrap().application;

    let skipped = state
        .transition_service
        .transition(app.id, ApplicationStatus::Offered, Some(EMPLOYER), None)
        .await;
    assert!(matches!(skipped, Err(Error::InvalidTransition(_))));

    let reloaded = state.transition_service.get(app.id).await.unwrap();
    assert_eq!(reloaded.status, ApplicationStatus::Applied);
    assert_eq!(reloaded.updated_at, app.updated_at);
    assert_eq!(state.stage_service.stage_history(app.id).await.unwrap().len(), 1);
    assert_eq!(notifier.events().len(), 1);
}

#[tokio::test]
async fn withdraw_requires_the_applicant_and_an_open_application() {
    let (state, _) = setup();
    let app = state.transition_service.submit(3, submission(12, 60)).await.unwrap().application;

    let stranger = state.transition_service.withdraw(app.id, 4, None).await;
    assert!(matches!(stranger, Err(Error::PermissionDenied(_))));

    let late = state.transition_service.submit(5, submission(12, 60)).await.unwrap().application;
    advance(
        &state,
        late.id,
        &[ApplicationStatus::Screening, ApplicationStatus::Rejected],
    )
    .await;
    let too_late = state.transition_service.withdraw(late.id, 5, None).await;
    assert!(matches!(too_late, Err(Error::InvalidTransition(_))));

    let withdrawn = state
        .transition_service
        .withdraw(app.id, 3, Some("accepted another offer".to_string()))
        .await
        .unwrap();
    assert_eq!(withdrawn.application.status, ApplicationStatus::Withdrawn);
    assert_eq!(withdrawn.stage.notes.as_deref(), Some("accepted another offer"));
}

#[tokio::test]
async fn bulk_reject_reports_per_item_failures() {
    let (state, _) = setup();
    let mut ids = Vec::new();
    for user in 1..=5 {
        let app = state.transition_service.submit(user, submission(20, 50)).await.unwrap().application;
        ids.push(app.id);
    }
    advance(
        &state,
        ids[2],
        &[
            ApplicationStatus::Screening,
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Interview,
            ApplicationStatus::Offered,
            ApplicationStatus::Hired,
        ],
    )
    .await;

    let mut request = ids.clone();
    request.push(ids[0]);
    let outcome = state
        .transition_service
        .bulk_reject(&request, Some(EMPLOYER), Some("position filled".to_string()))
        .await
        .unwrap();

    assert_eq!(outcome.attempted(), 5);
    assert_eq!(outcome.succeeded, vec![ids[0], ids[1], ids[3], ids[4]]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].application_id, ids[2]);
    assert_eq!(outcome.failed[0].kind, "invalid_transition");

    let hired = state.transition_service.get(ids[2]).await.unwrap();
    assert_eq!(hired.status, ApplicationStatus::Hired);

    let empty = state.transition_service.bulk_reject(&[], None, None).await;
    assert!(matches!(empty, Err(Error::Validation(_))));
    let too_many: Vec<i64> = (1..=501).collect();
    let oversized = state.transition_service.bulk_reject(&too_many, None, None).await;
    assert!(matches!(oversized, Err(Error::Validation(_))));
}

#[tokio::test]
async fn bulk_delete_cascades_children() {
    let (state, _) = setup();
    let app = state.transition_service.submit(1, submission(30, 50)).await.unwrap().application;
    state
        .note_service
        .create(
            app.id,
            EMPLOYER,
            CreateNotePayload {
                stage_id: None,
                content: "strong candidate".to_string(),
                note_type: None,
                visibility: None,
                sentiment: None,
                is_pinned: false,
            },
        )
        .await
        .unwrap();

    let deleted = state.transition_service.bulk_delete(&[app.id, app.id + 1000]).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(matches!(state.transition_service.get(app.id).await, Err(Error::NotFound(_))));
    assert!(state.store.stage_history(app.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn manual_stage_completion_closes_once() {
    let (state, _) = setup();
    let app = state.transition_service.submit(1, submission(40, 50)).await.unwrap().application;
    let current = state.stage_service.current_stage(app.id).await.unwrap();

    let closed = state
        .stage_service
        .complete_stage(current.id, Some("paused by recruiter".to_string()))
        .await
        .unwrap();
    assert!(!closed.is_open());
    assert!(closed.duration_seconds.unwrap() >= 0);
    assert_eq!(closed.notes.as_deref(), Some("paused by recruiter"));

    let again = state.stage_service.complete_stage(current.id, None).await;
    assert!(matches!(again, Err(Error::InvalidTransition(_))));
    assert!(matches!(state.stage_service.current_stage(app.id).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn deleting_a_stage_detaches_its_notes() {
    let (state, _) = setup();
    let app = state.transition_service.submit(1, submission(41, 50)).await.unwrap().application;
    let applied_stage = state.stage_service.current_stage(app.id).await.unwrap();

    let note = state
        .note_service
        .create(
            app.id,
            EMPLOYER,
            CreateNotePayload {
                stage_id: Some(applied_stage.id),
                content: "phone screen booked".to_string(),
                note_type: None,
                visibility: None,
                sentiment: None,
                is_pinned: true,
            },
        )
        .await
        .unwrap();

    let open = state.stage_service.delete_stage(applied_stage.id).await;
    assert!(matches!(open, Err(Error::InvalidTransition(_))));

    advance(&state, app.id, &[ApplicationStatus::Screening]).await;
    state.stage_service.delete_stage(applied_stage.id).await.unwrap();

    let reloaded = state.note_service.get(note.id).await.unwrap();
    assert_eq!(reloaded.stage_id, None);
    assert!(reloaded.is_pinned);
}

#[tokio::test]
async fn interview_lifecycle_and_scoring() {
    let (state, notifier) = setup();
    let app = state.transition_service.submit(1, submission(50, 80)).await.unwrap().application;
    let at = now() + Duration::hours(2);

    let interview = state
        .interview_service
        .schedule(
            app.id,
            ScheduleInterviewPayload {
                stage_id: None,
                interviewer_id: Some(EMPLOYER),
                scheduled_at: at,
                interview_type: InterviewType::Online,
                location: None,
                meeting_link: Some("https://meet.example.com/abc".to_string()),
                duration_minutes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(interview.status, InterviewStatus::Scheduled);
    assert_eq!(interview.duration_minutes, 60);

    let past = state
        .interview_service
        .reschedule(
            interview.id,
            RescheduleInterviewPayload {
                scheduled_at: now() - Duration::hours(1),
                reason: "interviewer sick".to_string(),
            },
        )
        .await;
    assert!(matches!(past, Err(Error::Validation(_))));

    let moved = state
        .interview_service
        .reschedule(
            interview.id,
            RescheduleInterviewPayload {
                scheduled_at: at + Duration::days(1),
                reason: "interviewer sick".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.id, interview.id);
    assert_eq!(moved.scheduled_at, at + Duration::days(1));
    assert_eq!(moved.reschedule_reason.as_deref(), Some("interviewer sick"));

    let completed = state
        .interview_service
        .complete(
            interview.id,
            CompleteInterviewPayload {
                overall_score: Some(Decimal::from(100)),
                technical_score: Some(Decimal::from(80)),
                communication_score: Some(Decimal::from(90)),
                personality_score: None,
                remarks: Some("solid systems knowledge".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.status, InterviewStatus::Completed);
    assert_eq!(completed.average_score(), Decimal::from(85));
    assert!(completed.ended_at.is_some());

    let cancel_after = state.interview_service.cancel(interview.id, None).await;
    assert!(matches!(cancel_after, Err(Error::InvalidTransition(_))));

    let scheduled_events = notifier
        .events()
        .into_iter()
        .filter(|e| matches!(e, NotificationEvent::InterviewScheduled { .. }))
        .count();
    assert_eq!(scheduled_events, 2);
}

#[tokio::test]
async fn out_of_range_scores_are_rejected() {
    let (state, _) = setup();
    let app = state.transition_service.submit(1, submission(51, 80)).await.unwrap().application;
    let interview = state
        .interview_service
        .schedule(
            app.id,
            ScheduleInterviewPayload {
                stage_id: None,
                interviewer_id: None,
                scheduled_at: now() + Duration::hours(1),
                interview_type: InterviewType::Onsite,
                location: Some("Room 4".to_string()),
                meeting_link: None,
                duration_minutes: Some(45),
            },
        )
        .await
        .unwrap();

    let result = state
        .interview_service
        .complete(
            interview.id,
            CompleteInterviewPayload {
                technical_score: Some(Decimal::from(120)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(Error::Validation(_))));
    let reloaded = state.interview_service.get(interview.id).await.unwrap();
    assert_eq!(reloaded.status, InterviewStatus::Scheduled);
}

#[tokio::test]
async fn reminders_fire_once_per_interview() {
    let (state, notifier) = setup();
    let app = state.transition_service.submit(1, submission(52, 80)).await.unwrap().application;
    let base = now();
    for minutes in [30, 240] {
        state
            .interview_service
            .schedule(
                app.id,
                ScheduleInterviewPayload {
                    stage_id: None,
                    interviewer_id: None,
                    scheduled_at: base + Duration::minutes(minutes),
                    interview_type: InterviewType::Hybrid,
                    location: None,
                    meeting_link: None,
                    duration_minutes: None,
                },
            )
            .await
            .unwrap();
    }

    assert_eq!(state.interview_service.send_due_reminders(base).await.unwrap(), 1);
    assert_eq!(state.interview_service.send_due_reminders(base).await.unwrap(), 0);
    let reminders = notifier
        .events()
        .into_iter()
        .filter(|e| matches!(e, NotificationEvent::InterviewReminder { .. }))
        .count();
    assert_eq!(reminders, 1);

    let upcoming = state.interview_service.upcoming(Some(base), None).await.unwrap();
    assert_eq!(upcoming.len(), 2);
}

#[tokio::test]
async fn analytics_reflect_pipeline_state() {
    let (state, _) = setup();
    let scope = AnalyticsScope::for_job(60);
    let mut ids = Vec::new();
    for (user, score) in [(1, 50), (2, 90), (3, 70)] {
        let app = state.transition_service.submit(user, submission(60, score)).await.unwrap().application;
        ids.push(app.id);
    }
    advance(&state, ids[1], &[ApplicationStatus::Screening, ApplicationStatus::Shortlisted]).await;
    advance(&state, ids[2], &[ApplicationStatus::Screening, ApplicationStatus::Rejected]).await;

    let funnel = state.analytics_service.conversion_funnel(scope).await.unwrap();
    let counts: Vec<i64> = funnel.steps.iter().map(|s| s.count).collect();
    assert_eq!(counts, vec![3, 2, 1, 0, 0, 0]);
    assert_eq!(funnel.steps[1].conversion_rate, 66.67);
    assert_eq!(funnel.steps[2].conversion_rate, 50.0);

    let distribution = state.analytics_service.status_distribution(scope).await.unwrap();
    let rejected = distribution
        .iter()
        .find(|d| d.status == ApplicationStatus::Rejected)
        .unwrap();
    assert_eq!(rejected.count, 1);

    let top = state.analytics_service.top_applicants(60, Some(2)).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!((top[0].rank, top[0].application.id), (1, ids[1]));
    assert_eq!(top[1].application.id, ids[2]);

    let stage_times = state.analytics_service.stage_time_stats(scope).await.unwrap();
    let applied = stage_times
        .iter()
        .find(|s| s.stage == ApplicationStatus::Applied)
        .unwrap();
    assert_eq!(applied.count, 2);
    assert_eq!(applied.max_days, 0);

    let sources = state.analytics_service.source_stats(scope).await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].count, 3);
    assert_eq!(sources[0].average_match_score, 70.0);

    let today = now().date_naive();
    let trend = state
        .analytics_service
        .application_trend(scope, today - Duration::days(2), today)
        .await
        .unwrap();
    assert_eq!(trend.len(), 3);
    assert_eq!(trend[2].total, 3);
    assert_eq!(trend[2].rejected, 1);
    assert_eq!(trend[0].total, 0);

    let backwards = state
        .analytics_service
        .application_trend(scope, today, today - Duration::days(1))
        .await;
    assert!(matches!(backwards, Err(Error::Validation(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transitions_leave_one_open_stage() {
    let (state, _) = setup();
    let id = state.transition_service.submit(1, submission(70, 60)).await.unwrap().application.id;

    let first = {
        let state = state.clone();
        tokio::spawn(async move {
            state
                .transition_service
                .transition(id, ApplicationStatus::Screening, Some(EMPLOYER), None)
                .await
        })
    };
    let second = {
        let state = state.clone();
        tokio::spawn(async move {
            state
                .transition_service
                .transition(id, ApplicationStatus::Screening, Some(EMPLOYER + 1), None)
                .await
        })
    };
    let (first, second) = tokio::join!(first, second);
    let results = [first.unwrap(), second.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(loser, Error::Conflict(_) | Error::InvalidTransition(_)));

    let history = state.stage_service.stage_history(id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.iter().filter(|s| s.is_open()).count(), 1);
    assert_eq!(
        state.transition_service.get(id).await.unwrap().status,
        ApplicationStatus::Screening
    );
}

#[tokio::test]
async fn stale_stage_rotation_is_a_retryable_conflict() {
    let (state, _) = setup();
    let app = state.transition_service.submit(1, submission(71, 60)).await.unwrap().application;
    advance(&state, app.id, &[ApplicationStatus::Screening]).await;

    let stale = state
        .store
        .rotate_stage(StageRotation {
            application_id: app.id,
            expected_status: ApplicationStatus::Applied,
            target: ApplicationStatus::Rejected,
            actor_id: Some(EMPLOYER),
            notes: None,
            at: now(),
        })
        .await;
    let err = stale.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert!(err.is_retryable());
    assert_eq!(err.kind(), "conflict");

    let history = state.stage_service.stage_history(app.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].stage_name, ApplicationStatus::Screening);
    assert!(history[1].is_open());
}

#[tokio::test]
async fn stale_interview_save_cannot_undo_a_reschedule() {
    let (state, _) = setup();
    let app = state.transition_service.submit(1, submission(72, 60)).await.unwrap().application;
    let at = now() + Duration::minutes(30);
    let interview = state.interview_service.schedule(app.id, interview_at(at)).await.unwrap();
    assert_eq!(interview.version, 0);

    let stale = state.interview_service.get(interview.id).await.unwrap();
    let moved = state
        .interview_service
        .reschedule(
            interview.id,
            RescheduleInterviewPayload {
                scheduled_at: at + Duration::days(1),
                reason: "panel moved".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.status, InterviewStatus::Scheduled);
    assert_eq!(moved.version, stale.version + 1);

    let mut reminded = stale.clone();
    reminded.reminder_sent_at = Some(now());
    let lost = state.store.save_interview(&reminded, InterviewStatus::Scheduled).await;
    let err = lost.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert!(err.is_retryable());

    let reloaded = state.interview_service.get(interview.id).await.unwrap();
    assert_eq!(reloaded.scheduled_at, at + Duration::days(1));
    assert_eq!(reloaded.reschedule_reason.as_deref(), Some("panel moved"));
    assert_eq!(reloaded.reminder_sent_at, None);
}

#[tokio::test]
async fn stale_note_save_keeps_a_deleted_stage_detached() {
    let (state, _) = setup();
    let app = state.transition_service.submit(1, submission(73, 60)).await.unwrap().application;
    let applied_stage = state.stage_service.current_stage(app.id).await.unwrap();
    let created = state
        .note_service
        .create(app.id, EMPLOYER, note("references pending", Some(applied_stage.id)))
        .await
        .unwrap();

    let mut stale = state.note_service.get(created.id).await.unwrap();
    advance(&state, app.id, &[ApplicationStatus::Screening]).await;
    state.stage_service.delete_stage(applied_stage.id).await.unwrap();

    stale.content = "references received".to_string();
    stale.is_pinned = true;
    let saved = state.store.save_note(&stale).await.unwrap();
    assert_eq!(saved.stage_id, None);
    assert_eq!(saved.content, "references received");
    assert!(saved.is_pinned);

    let reloaded = state.note_service.get(created.id).await.unwrap();
    assert_eq!(reloaded.stage_id, None);
}

#[tokio::test]
async fn notes_pin_idempotently_and_list_pinned_first() {
    let (state, _) = setup();
    let app = state.transition_service.submit(1, submission(74, 60)).await.unwrap().application;
    let mut ids = Vec::new();
    for content in ["first call", "take-home sent", "offer discussed"] {
        let created = state.note_service.create(app.id, EMPLOYER, note(content, None)).await.unwrap();
        ids.push(created.id);
    }

    let pinned = state.note_service.pin(ids[0]).await.unwrap();
    assert!(pinned.is_pinned);
    let again = state.note_service.pin(ids[0]).await.unwrap();
    assert!(again.is_pinned);
    assert_eq!(again.updated_at, pinned.updated_at);

    let listed: Vec<i64> = state
        .note_service
        .list_for_application(app.id, NoteFilter::default())
        .await
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(listed, vec![ids[0], ids[2], ids[1]]);

    let pinned_only = state
        .note_service
        .list_for_application(
            app.id,
            NoteFilter {
                pinned_only: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pinned_only.len(), 1);

    let updated = state
        .note_service
        .update(
            ids[1],
            UpdateNotePayload {
                content: Some("  take-home graded  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.content, "take-home graded");
    assert!(!updated.is_pinned);

    let unpinned = state.note_service.unpin(ids[0]).await.unwrap();
    assert!(!unpinned.is_pinned);
    let unpinned_again = state.note_service.unpin(ids[0]).await.unwrap();
    assert_eq!(unpinned_again.updated_at, unpinned.updated_at);

    let listed: Vec<i64> = state
        .note_service
        .list_for_application(app.id, NoteFilter::default())
        .await
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);
}

#[tokio::test]
async fn interview_cancel_no_show_and_detail_updates() {
    let (state, _) = setup();
    let app = state.transition_service.submit(1, submission(75, 60)).await.unwrap().application;
    let base = now() + Duration::hours(3);
    let cancelled = state.interview_service.schedule(app.id, interview_at(base)).await.unwrap();
    let missed = state
        .interview_service
        .schedule(app.id, interview_at(base + Duration::hours(1)))
        .await
        .unwrap();

    let updated = state
        .interview_service
        .update_details(
            cancelled.id,
            UpdateInterviewPayload {
                interviewer_id: Some(EMPLOYER + 5),
                location: Some("Room 12".to_string()),
                meeting_link: None,
                duration_minutes: Some(90),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.interviewer_id, Some(EMPLOYER + 5));
    assert_eq!(updated.location.as_deref(), Some("Room 12"));
    assert_eq!(updated.duration_minutes, 90);
    assert_eq!(updated.status, InterviewStatus::Scheduled);

    let too_long = state
        .interview_service
        .update_details(
            cancelled.id,
            UpdateInterviewPayload {
                duration_minutes: Some(1000),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(too_long.unwrap_err().kind(), "validation_error");

    let done = state
        .interview_service
        .cancel(cancelled.id, Some("  role put on hold ".to_string()))
        .await
        .unwrap();
    assert_eq!(done.status, InterviewStatus::Cancelled);
    assert_eq!(done.cancel_reason.as_deref(), Some("role put on hold"));
    assert_eq!(done.duration_minutes, 90);

    let no_show = state.interview_service.mark_no_show(missed.id).await.unwrap();
    assert_eq!(no_show.status, InterviewStatus::NoShow);

    let edit_after = state
        .interview_service
        .update_details(missed.id, UpdateInterviewPayload::default())
        .await;
    assert!(matches!(edit_after, Err(Error::InvalidTransition(_))));
    let twice = state.interview_service.mark_no_show(missed.id).await;
    assert!(matches!(twice, Err(Error::InvalidTransition(_))));
}

#[tokio::test]
async fn verifying_a_document_twice_keeps_the_first_verifier() {
    let (state, _) = setup();
    let app = state.transition_service.submit(1, submission(76, 60)).await.unwrap().application;
    let document = state
        .document_service
        .attach(
            app.id,
            1,
            AttachDocumentPayload {
                document_type: DocumentType::Cv,
                file_name: " resume.pdf ".to_string(),
                file_url: "https://files.example.com/resume.pdf".to_string(),
                file_type: Some("application/pdf".to_string()),
                file_size: 4096,
            },
        )
        .await
        .unwrap();
    assert_eq!(document.file_name, "resume.pdf");
    assert!(!document.is_verified);

    let first = state.document_service.verify(document.id, EMPLOYER).await.unwrap();
    assert!(first.is_verified);
    assert_eq!(first.verified_by, Some(EMPLOYER));
    assert!(first.verified_at.is_some());

    let second = state.document_service.verify(document.id, EMPLOYER + 1).await.unwrap();
    assert_eq!(second.verified_by, Some(EMPLOYER));
    assert_eq!(second.verified_at, first.verified_at);
}

#[tokio::test]
async fn top_applicants_break_score_ties_by_earliest_application() {
    let (state, _) = setup();
    let base = now() - Duration::days(3);
    let mut ids = Vec::new();
    for (user, score, days) in [(1, 75, 2), (2, 75, 0), (3, 80, 1), (4, 75, 1)] {
        let (app, _, _) = state
            .store
            .create_application(
                NewApplication {
                    job_id: 77,
                    user_id: user,
                    company_id: Some(1),
                    match_score: Decimal::from(score),
                    source: "direct".to_string(),
                    applied_at: base + Duration::days(days),
                },
                Vec::new(),
            )
            .await
            .unwrap();
        ids.push(app.id);
    }

    let top = state.analytics_service.top_applicants(77, None).await.unwrap();
    let order: Vec<i64> = top.iter().map(|t| t.application.id).collect();
    assert_eq!(order, vec![ids[2], ids[1], ids[3], ids[0]]);
    let ranks: Vec<usize> = top.iter().map(|t| t.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn trend_ending_on_the_last_calendar_day_is_rejected() {
    let (state, _) = setup();
    let to = NaiveDate::MAX;
    let from = to.pred_opt().unwrap();
    let result = state
        .analytics_service
        .application_trend(AnalyticsScope::for_job(78), from, to)
        .await;
    assert!(matches!(result, Err(Error::Validation(_))));
}
