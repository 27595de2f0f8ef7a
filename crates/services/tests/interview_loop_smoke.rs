use interview_core::IdentityContext;
use interview_core::model::{Difficulty, Evaluation, ReportState};
use interview_core::time::fixed_clock;
use services::{AppServices, GatewayOp, InMemoryGateway, InterviewPhase, RoundOutcome};

#[tokio::test]
async fn interview_loop_runs_to_report_and_lists_session() {
    let gateway = InMemoryGateway::new()
        .with_clock(fixed_clock())
        .with_questions(["Explain CAP", "Design a rate limiter", "Tune a slow query"])
        .with_evaluation(Evaluation::new(6.0, "Fair", "Partially Correct", "...", Vec::new()).unwrap());
    let services = AppServices::in_memory(gateway.clone(), IdentityContext::guest());
    let controller = services.controller();

    let mut outcome = controller.start("Backend Developer", Difficulty::Medium).await.unwrap();
    let mut answered = 0;
    while let RoundOutcome::Question(question) = outcome {
        assert_eq!(question.order_index(), answered + 1);
        controller.submit("An answer with some substance.").await.unwrap();
        answered += 1;
        outcome = controller.next().await.unwrap();
    }
    assert_eq!(outcome, RoundOutcome::ReadyToEnd);
    assert_eq!(answered, 3);

    let ReportState::Ready(report) = controller.end().await.unwrap() else {
        panic!("expected a ready report");
    };
    assert_eq!(report.overall_score(), 6.0);
    assert_eq!(report.total_questions(), Some(3));
    assert_eq!(controller.phase(), InterviewPhase::Completed);
    assert_eq!(gateway.calls(GatewayOp::SubmitAnswer), 3);
    assert_eq!(gateway.calls(GatewayOp::CompleteSession), 1);

    let items = services.reader().list_sessions().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].overall_score, Some(6.0));

    let opened = services.reader().open_report(&items[0].id).await.unwrap();
    assert!(opened.report.is_ready());
}

#[tokio::test]
async fn ending_without_answers_leaves_no_report() {
    let gateway = InMemoryGateway::new().with_questions(Vec::<String>::new());
    let services = AppServices::in_memory(gateway, IdentityContext::guest());
    let controller = services.controller();

    assert_eq!(
        controller.start("QA Engineer", Difficulty::Easy).await.unwrap(),
        RoundOutcome::ReadyToEnd
    );
    assert_eq!(controller.end().await.unwrap(), ReportState::Pending);

    let items = services.reader().list_sessions().await.unwrap();
    let opened = services.reader().open_report(&items[0].id).await.unwrap();
    assert_eq!(opened.report, ReportState::Pending);
}
