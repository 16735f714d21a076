//! Structured log events emitted by the renderer.
//!
//! Requires the `tracing` feature:
//! `cargo test -p bedmesh-render --features tracing --test tracing_events`

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bedmesh_render::{BedMeshRenderer, Framebuffer, RenderMode};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use web_time::Duration;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    message: Option<String>,
    fields: HashMap<String, String>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

#[derive(Clone, Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: fields.get("message").cloned(),
            fields,
        });
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let layer = EventCapture::default();
    let events = Arc::clone(&layer.events);
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn find<'a>(events: &'a [CapturedEvent], message: &str) -> Option<&'a CapturedEvent> {
    events.iter().find(|e| e.message.as_deref() == Some(message))
}

#[test]
fn rejected_mesh_logs_warning() {
    let events = capture(|| {
        let mut r = BedMeshRenderer::default();
        let ragged = vec![vec![0.0, 0.1], vec![0.2]];
        assert!(r.set_mesh_data(&ragged, 2, 2).is_err());
    });
    let e = find(&events, "rejected mesh data").expect("warning emitted");
    assert_eq!(e.level, Level::WARN);
    assert_eq!(e.fields.get("rows").map(String::as_str), Some("2"));
}

#[test]
fn not_ready_render_logs_at_debug_only() {
    let events = capture(|| {
        let mut r = BedMeshRenderer::default();
        let mut fb = Framebuffer::new(32, 32);
        assert!(r.render(&mut fb).is_err());
    });
    let e = find(&events, "render skipped: no mesh data").expect("debug emitted");
    assert_eq!(e.level, Level::DEBUG);
    assert!(events.iter().all(|e| e.level > Level::INFO));
}

#[test]
fn fallback_logs_mode_evidence() {
    let events = capture(|| {
        let mut r = BedMeshRenderer::default();
        r.set_render_mode(RenderMode::Auto);
        for _ in 0..10 {
            r.record_frame_time(Duration::from_millis(120));
        }
        assert!(r.evaluate_render_mode().switched);
    });
    let fallback = find(&events, "falling back to 2D heat map").expect("info emitted");
    assert_eq!(fallback.level, Level::INFO);
    let evidence = find(&events, "render mode evaluated").expect("evidence emitted");
    let line = evidence.fields.get("evidence").expect("jsonl field");
    assert!(line.contains(r#""schema":"bedmesh-mode-v1""#), "{line}");
}
