use std::sync::Arc;
use std::time::Duration;

use application::job::JobSession;
use application::sdk::{RetryPolicy, SdkCommands};
use domain::error::{JobError, SdkError};
use domain::job::{JobOutcome, JobSpec, PrintJob};
use domain::label::{
    BorderElement, GraphElement, GraphType, LabelBoard, LabelElement, LabelPage, LineType,
    Rotation, TextElement,
};
use domain::printer::PrinterHandle;
use domain::settings::{CallTimeouts, SdkTimings, WorkaroundSettings};
use infrastructure::sdk::{CallCorrelator, MockTransport};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

struct Harness {
    transport: Arc<MockTransport>,
    commands: SdkCommands,
    retry: RetryPolicy,
    workarounds: WorkaroundSettings,
}

impl Harness {
    fn new(timings: SdkTimings) -> Self {
        let (transport, inbound) = MockTransport::new();
        let correlator = Arc::new(CallCorrelator::new(transport.clone(), inbound));
        Self {
            transport,
            commands: SdkCommands::new(correlator, timings, CallTimeouts::default()),
            retry: RetryPolicy::default(),
            workarounds: WorkaroundSettings::default(),
        }
    }

    async fn run(&self, spec: &JobSpec, cancel: &CancellationToken) -> Result<JobOutcome, JobError> {
        JobSession::run(
            &self.commands,
            &self.retry,
            &self.workarounds,
            Uuid::new_v4(),
            printer(),
            spec,
            cancel,
        )
        .await
    }

    fn names(&self) -> Vec<String> {
        self.transport.sent_api_names()
    }
}

fn printer() -> PrinterHandle {
    PrinterHandle::usb("B21-C2B1", 1)
}

fn text_page(value: &str, copies: u32) -> LabelPage {
    LabelPage::new(
        LabelBoard::new(50.0, 30.0),
        vec![LabelElement::Text(TextElement::new(2.0, 2.0, 40.0, 5.0, value))],
        copies,
    )
}

fn spec(pages: Vec<LabelPage>) -> JobSpec {
    JobSpec {
        printer: None,
        density: 3,
        label_type: 1,
        print_mode: 1,
        pages,
    }
}

#[tokio::test]
async fn test_single_copy_prints_placeholder_first() {
    let h = Harness::new(SdkTimings::immediate());

    let outcome = h
        .run(&spec(vec![text_page("Hello", 1)]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        h.names(),
        vec![
            "startJob",
            "InitDrawingBoard",
            "DrawLableText",
            "commitJob",
            "InitDrawingBoard",
            "DrawLableText",
            "commitJob",
            "endJob"
        ]
    );
    assert_eq!(h.transport.sent_parameters("startJob")[0]["count"], 2);

    let texts = h.transport.sent_parameters("DrawLableText");
    assert_eq!(texts[0]["value"], ".");
    assert_eq!(texts[1]["value"], "Hello");

    assert_eq!(outcome.copies, 1);
    assert_eq!(outcome.printed_labels, 1);
    assert!(!outcome.cancelled);
}

#[tokio::test]
async fn test_multi_copy_has_no_placeholder() {
    let h = Harness::new(SdkTimings::immediate());

    let outcome = h
        .run(&spec(vec![text_page("Hello", 3)]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        h.names(),
        vec!["startJob", "InitDrawingBoard", "DrawLableText", "commitJob", "endJob"]
    );
    assert_eq!(h.transport.sent_parameters("startJob")[0]["count"], 3);
    assert_eq!(
        h.transport.sent_parameters("commitJob")[0]["printerImageProcessingInfo"]["printQuantity"],
        3
    );
    assert_eq!(outcome.printed_labels, 3);
}

#[tokio::test]
async fn test_pages_are_printed_in_order() {
    let h = Harness::new(SdkTimings::immediate());

    let outcome = h
        .run(
            &spec(vec![text_page("first", 1), text_page("second", 2)]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(h.transport.sent_parameters("startJob")[0]["count"], 3);
    let values: Vec<String> = h
        .transport
        .sent_parameters("DrawLableText")
        .iter()
        .map(|p| p["value"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(values, vec!["first", "second"]);
    assert_eq!(outcome.printed_labels, 3);
}

#[tokio::test]
async fn test_border_is_drawn_as_four_lines() {
    let h = Harness::new(SdkTimings::immediate());
    let page = LabelPage::new(
        LabelBoard::new(50.0, 30.0),
        vec![LabelElement::Border(BorderElement::new(1.0, 1.0, 48.0, 28.0, 0.5))],
        2,
    );

    h.run(&spec(vec![page]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(h.transport.sent_parameters("DrawLableLine").len(), 4);
    assert!(h.transport.sent_parameters("DrawLableGraph").is_empty());
}

#[tokio::test]
async fn test_rectangle_graph_is_split_but_circle_is_not() {
    let h = Harness::new(SdkTimings::immediate());
    let graph = |graph_type| GraphElement {
        x: 5.0,
        y: 5.0,
        width: 20.0,
        height: 10.0,
        graph_type,
        line_width: 0.5,
        rotate: Rotation::Deg0,
        line_type: LineType::Solid,
        corner_radius: None,
        dash_width: None,
    };
    let page = LabelPage::new(
        LabelBoard::new(50.0, 30.0),
        vec![
            LabelElement::Graph(graph(GraphType::Rectangle)),
            LabelElement::Graph(graph(GraphType::Circle)),
        ],
        2,
    );

    h.run(&spec(vec![page]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(h.transport.sent_parameters("DrawLableLine").len(), 4);
    let graphs = h.transport.sent_parameters("DrawLableGraph");
    assert_eq!(graphs.len(), 1);
    assert_eq!(graphs[0]["graphType"], 1);
}

#[tokio::test]
async fn test_draw_failure_still_ends_job() {
    let h = Harness::new(SdkTimings::immediate());
    h.transport.set_responder(|req| {
        if req.api_name == "DrawLableText" {
            return Some(MockTransport::error_reply("DrawLableText", 9, "bad font"));
        }
        Some(MockTransport::ok_reply(&req.api_name))
    });

    let err = h
        .run(&spec(vec![text_page("Hello", 2)]), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::Sdk(SdkError::Vendor { code: 9, .. })));
    assert_eq!(
        h.names(),
        vec!["startJob", "InitDrawingBoard", "DrawLableText", "endJob"]
    );
}

#[tokio::test]
async fn test_start_failure_skips_end_job() {
    let h = Harness::new(SdkTimings::immediate());
    h.transport.set_responder(|req| {
        if req.api_name == "startJob" {
            return Some(MockTransport::error_reply("startJob", 4, "paper out"));
        }
        Some(MockTransport::ok_reply(&req.api_name))
    });

    let err = h
        .run(&spec(vec![text_page("Hello", 2)]), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(4));
    assert_eq!(h.names(), vec!["startJob"]);
}

#[tokio::test]
async fn test_commit_failure_reports_original_error() {
    let h = Harness::new(SdkTimings::immediate());
    h.transport.set_responder(|req| match req.api_name.as_str() {
        "commitJob" => Some(MockTransport::error_reply("commitJob", 11, "cover open")),
        "endJob" => Some(MockTransport::error_reply("endJob", 12, "ignored")),
        other => Some(MockTransport::ok_reply(other)),
    });

    let err = h
        .run(&spec(vec![text_page("Hello", 2)]), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(11));
    assert_eq!(h.names().last().map(String::as_str), Some("endJob"));
}

#[tokio::test]
async fn test_cancel_stops_at_next_label_boundary() {
    let h = Harness::new(SdkTimings::immediate());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    h.transport.set_responder(move |req| {
        if req.api_name == "commitJob" {
            trigger.cancel();
        }
        Some(MockTransport::ok_reply(&req.api_name))
    });

    let outcome = h
        .run(
            &spec(vec![text_page("first", 1), text_page("second", 1)]),
            &cancel,
        )
        .await
        .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.printed_labels, 1);
    assert_eq!(h.transport.sent_parameters("commitJob").len(), 1);
    assert_eq!(h.names().last().map(String::as_str), Some("endJob"));
}

#[tokio::test(start_paused = true)]
async fn test_settle_delays_between_commands() {
    let h = Harness::new(SdkTimings::default());
    let started = Instant::now();

    h.run(&spec(vec![text_page("Hello", 2)]), &CancellationToken::new())
        .await
        .unwrap();

    let offsets: Vec<(String, Duration)> = h
        .transport
        .sent()
        .into_iter()
        .map(|f| (f.request.api_name, f.at - started))
        .collect();
    let ms = Duration::from_millis;
    assert_eq!(
        offsets,
        vec![
            ("startJob".to_string(), ms(0)),
            ("InitDrawingBoard".to_string(), ms(0)),
            ("DrawLableText".to_string(), ms(0)),
            // between-draws delay, then the draw-complete wait
            ("commitJob".to_string(), ms(400)),
            ("endJob".to_string(), ms(1400)),
        ]
    );
}

#[tokio::test]
async fn test_out_of_order_calls_are_rejected_locally() {
    let h = Harness::new(SdkTimings::immediate());
    let job = PrintJob::new(printer(), 3, 1, 1, 2);
    let mut session = JobSession::new(&h.commands, &h.retry, &h.workarounds, job);

    let text = LabelElement::Text(TextElement::new(0.0, 0.0, 10.0, 5.0, "x"));
    assert!(matches!(
        session.draw(&text).await,
        Err(JobError::Sequence(_))
    ));
    assert!(matches!(
        session.init_board(&LabelBoard::new(50.0, 30.0)).await,
        Err(JobError::Sequence(_))
    ));
    assert!(matches!(
        session.commit(1, true).await,
        Err(JobError::Sequence(_))
    ));

    session.start().await.unwrap();
    assert!(matches!(
        session.draw(&text).await,
        Err(JobError::Sequence(_))
    ));

    assert_eq!(h.names(), vec!["startJob"]);
}

#[tokio::test]
async fn test_end_without_start_sends_nothing() {
    let h = Harness::new(SdkTimings::immediate());
    let job = PrintJob::new(printer(), 3, 1, 1, 2);
    let mut session = JobSession::new(&h.commands, &h.retry, &h.workarounds, job);

    session.end().await;

    assert!(h.names().is_empty());
}
