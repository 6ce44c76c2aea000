//! Benchmarks for ghost-text overlay computation.

use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use inkling::editor::EditorBuffer;
use inkling::suggest::overlay::{self, CursorAnchor};
use inkling::suggest::{HeuristicGenerator, SessionEvent, SuggestionSession, SuggestionState};

fn large_draft() -> String {
    "The quick brown fox jumps over the lazy dog.\n".repeat(5_000) + "Hello"
}

fn bench_overlay_idle(c: &mut Criterion) {
    let session = SuggestionSession::new(&large_draft(), Arc::new(HeuristicGenerator));
    c.bench_function("overlay_idle", |b| b.iter(|| black_box(&session).overlay()));
}

fn bench_overlay_visible(c: &mut Criterion) {
    let mut session = SuggestionSession::new(&large_draft(), Arc::new(HeuristicGenerator));
    session.request_suggestion().unwrap();
    assert_eq!(
        session.wait_for_suggestion(Duration::from_secs(5)),
        Some(SessionEvent::SuggestionShown)
    );
    c.bench_function("overlay_visible", |b| b.iter(|| black_box(&session).overlay()));
}

fn bench_anchor_resolve(c: &mut Criterion) {
    let doc = EditorBuffer::from_text(&large_draft());
    let anchor = CursorAnchor::default();
    c.bench_function("anchor_resolve", |b| {
        b.iter(|| black_box(anchor).resolve(black_box(&doc)))
    });
}

fn bench_render_without_suggestion(c: &mut Criterion) {
    let doc = EditorBuffer::from_text(&large_draft());
    let anchor = CursorAnchor::for_document(&doc);
    let state = SuggestionState::Idle;
    c.bench_function("render_idle", |b| {
        b.iter(|| overlay::render(black_box(&doc), anchor, black_box(&state)))
    });
}

criterion_group!(
    benches,
    bench_overlay_idle,
    bench_overlay_visible,
    bench_anchor_resolve,
    bench_render_without_suggestion
);
criterion_main!(benches);
